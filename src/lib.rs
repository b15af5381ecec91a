use spacetimedb::{reducer, table, Identity, ReducerContext, SpacetimeType, Table, Timestamp};

pub mod content;
pub mod rules;
pub mod seed;
pub mod store;

pub use content::{
    ChallengeContent, ChallengeKind, DefaultSettings, MultipleChoiceContent, PhotoContent,
    SubmissionAnswer, UiSchema, ValidationRules, WordGameContent,
};
pub use seed::{GameSummary, SeededGame, SAMPLE_JOIN_CODE};
pub use store::{GameStore, ModuleStore, StoreError};

// ==================== ENUMS ====================

/// Game lifecycle. Status changes happen outside this module
#[derive(SpacetimeType, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Draft,
    Published,
    Archived,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Draft => "draft",
            GameStatus::Published => "published",
            GameStatus::Archived => "archived",
        }
    }
}

#[derive(SpacetimeType, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Paused,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
        }
    }
}

#[derive(SpacetimeType, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Cover,
    Gallery,
    Tutorial,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Cover => "cover",
            MediaKind::Gallery => "gallery",
            MediaKind::Tutorial => "tutorial",
        }
    }
}

#[derive(SpacetimeType, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,   // Player chat
    System, // Server announcements
    Join,
    Leave,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::System => "system",
            MessageKind::Join => "join",
            MessageKind::Leave => "leave",
        }
    }
}

// ==================== NESTED SETTINGS ====================

#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub struct PrivacySettings {
    /// Listed in the public game browser
    pub is_public: bool,
    /// Players may join after start_time has passed
    pub allow_join_after_start: bool,
}

#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    /// CSS color, e.g. "#3b82f6"
    pub primary_color: Option<String>,
    pub cover_image: Option<String>,
}

#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub struct LocationSettings {
    /// Locations must be completed in sequence_order
    pub require_sequential: bool,
    /// Directions shown to players looking for the location
    pub hints: Option<Vec<String>>,
}

#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub struct CompletionRules {
    pub time_limit_secs: Option<u32>,
    pub points: u32,
    /// Percentage (0-100) an answer must match to count as correct
    pub required_accuracy: Option<u32>,
}

// ==================== TABLES ====================

/// Teacher account
/// PRIVATE: holds the password hash
#[table(name = teacher)]
#[derive(Clone, Debug, PartialEq)]
pub struct Teacher {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    pub email: String,

    pub password_hash: String,

    pub created_at: Timestamp,
}

/// Browse category games can be tagged with
#[table(name = category, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    pub name: String,

    pub description: String,

    /// Ascending sort position in the category list
    pub display_order: u32,

    pub created_at: Timestamp,
}

/// A treasure hunt created by a teacher
#[table(name = game, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    /// Owning teacher
    #[index(btree)]
    pub teacher_id: u64,

    pub title: String,

    pub description: String,

    pub short_description: String,

    /// Code players type to join. Unique across all games
    #[unique]
    pub join_code: String,

    pub status: GameStatus,

    pub category_id: Option<u64>,

    pub privacy_settings: PrivacySettings,

    pub display_settings: DisplaySettings,

    /// Optional play window
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,

    pub estimated_duration_minutes: u32,

    pub player_count_min: Option<u32>,
    pub player_count_max: Option<u32>,

    pub created_at: Timestamp,
}

/// Images attached to a game's listing
#[table(name = game_media, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct GameMedia {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    #[index(btree)]
    pub game_id: u64,

    pub kind: MediaKind,

    pub url: String,

    pub alt_text: Option<String>,

    pub display_order: u32,

    pub created_at: Timestamp,
}

/// Physical point of interest players must reach
#[table(name = location, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    #[index(btree)]
    pub game_id: u64,

    pub name: String,

    pub latitude: f64,

    pub longitude: f64,

    /// Position within the game (1-based)
    pub sequence_order: u32,

    /// Geofence radius around the coordinates
    pub radius_meters: u32,

    pub settings: LocationSettings,
}

/// Category of challenge; decides content shape and client component
#[table(name = challenge_type, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct ChallengeType {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    pub name: String,

    pub description: String,

    pub validation_rules: ValidationRules,

    pub ui_schema: UiSchema,

    pub default_settings: DefaultSettings,

    pub is_active: bool,
}

/// Task attached to a location
#[table(name = challenge, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct Challenge {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    #[index(btree)]
    pub location_id: u64,

    /// Challenge type; content must match its validation rules
    pub type_id: u64,

    pub title: String,

    pub content: ChallengeContent,

    pub completion_rules: CompletionRules,

    /// Challenges that must be completed first. Must not form a cycle
    pub prerequisites: Option<Vec<u64>>,

    pub created_at: Timestamp,
}

/// Hint players can unlock for a challenge at a point cost
#[table(name = hint, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct Hint {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    #[index(btree)]
    pub challenge_id: u64,

    pub content: String,

    pub points_penalty: u32,

    /// Minutes after the challenge opens before the hint unlocks
    pub unlock_delay_minutes: u32,
}

#[table(name = team, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct Team {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    pub name: String,

    pub max_players: u32,

    pub created_at: Timestamp,
}

#[table(name = player, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    pub nickname: String,

    /// Live connection, None while disconnected
    pub connection: Option<Identity>,

    pub last_active: Timestamp,

    pub joined_at: Timestamp,
}

/// One play-through of a game
#[table(name = session, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    #[index(btree)]
    pub game_id: u64,

    #[index(btree)]
    pub team_id: Option<u64>,

    pub status: SessionStatus,

    pub start_time: Timestamp,

    pub end_time: Option<Timestamp>,

    /// Sum of points_earned over correct submissions
    pub score: u32,

    /// Free-form session details stored as a JSON object
    pub metadata: String,
}

/// Live progress pointer for a session (one row per session)
#[table(name = session_state, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    #[unique]
    pub session_id: u64,

    pub current_location_id: Option<u64>,

    pub current_challenge_id: Option<u64>,

    /// Progress tracking stored as a JSON object
    /// Example: {"completed": [3, 4], "hintsUnlocked": [1]}
    pub progress_state: String,

    pub updated_at: Timestamp,
}

#[table(name = submission, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    #[index(btree)]
    pub session_id: u64,

    #[index(btree)]
    pub challenge_id: u64,

    /// Denormalized from the challenge
    pub type_id: u64,

    pub answer: SubmissionAnswer,

    pub is_correct: bool,

    pub points_earned: u32,

    /// Submission details stored as a JSON object
    pub metadata: String,

    pub submitted_at: Timestamp,
}

#[table(name = chat_message, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    #[index(btree)]
    pub session_id: u64,

    pub player_id: u64,

    pub content: String,

    pub kind: MessageKind,

    pub sent_at: Timestamp,
}

/// Result of each successful seed call
/// Reducers cannot return values, so callers read the new game id from here
#[table(name = seed_run, public)]
#[derive(Clone, Debug, PartialEq)]
pub struct SeedRun {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    pub game_id: u64,

    pub requested_by: Identity,

    pub seeded_at: Timestamp,
}

// ==================== REDUCERS ====================

/// Initialize module
#[reducer(init)]
pub fn init(_ctx: &ReducerContext) {
    log::info!("[INIT] GeoQuiz module initialized");
}

/// Insert the Jerusalem Old City sample game with its locations, challenges and hints.
/// The join code is fixed, so a second call fails on the unique join_code index.
/// Returning Err rolls back every row inserted by this call.
#[reducer]
pub fn generate_jerusalem_game(ctx: &ReducerContext) -> Result<(), String> {
    let mut store = ModuleStore::new(ctx);

    let seeded = match seed::generate(&mut store, ctx.timestamp) {
        Ok(seeded) => seeded,
        Err(e) => {
            log::error!("[SEED] failed join_code:{} error:{}", SAMPLE_JOIN_CODE, e);
            return Err(e.to_string());
        }
    };

    ctx.db.seed_run().insert(SeedRun {
        id: 0, // auto_inc
        game_id: seeded.game_id,
        requested_by: ctx.sender,
        seeded_at: ctx.timestamp,
    });

    log::info!(
        "[SEED] created game:{} join_code:{} rows:{}",
        seeded.game_id,
        SAMPLE_JOIN_CODE,
        seeded.rows_inserted
    );
    Ok(())
}

/// Log the full tree of a game (locations, challenges, hints, sessions) for a join code
#[reducer]
pub fn inspect_game(ctx: &ReducerContext, join_code: String) -> Result<(), String> {
    let store = ModuleStore::new(ctx);

    let summary = seed::summarize(&store, &join_code).ok_or_else(|| {
        log::warn!("inspect_game: no game with join code '{}'", join_code);
        format!("No game with join code {}", join_code)
    })?;

    log::info!(
        "[GAME] id:{} title:\"{}\" status:{} category:{} locations:{} sessions:{} rows:{}",
        summary.game.id,
        summary.game.title,
        summary.game.status.as_str(),
        summary.category.as_ref().map(|c| c.name.as_str()).unwrap_or("none"),
        summary.locations.len(),
        summary.sessions.len(),
        summary.row_count()
    );
    for loc in &summary.locations {
        log::info!(
            "[GAME]   #{} {} challenges:{} hints:{}",
            loc.location.sequence_order,
            loc.location.name,
            loc.challenges.len(),
            loc.challenges.iter().map(|c| c.hints.len()).sum::<usize>()
        );
    }
    for s in &summary.sessions {
        log::info!(
            "[GAME]   session:{} status:{} score:{} submissions:{}",
            s.session.id,
            s.session.status.as_str(),
            s.session.score,
            s.submissions.len()
        );
    }
    if let Err(e) = summary.check_invariants() {
        log::warn!("[GAME] id:{} invariant violated: {}", summary.game.id, e);
    }
    Ok(())
}
