// Sample data: the "Old City Jerusalem Adventure" game.
//
// Per-location content lives in JERUSALEM_LOCATIONS; `generate` walks it and
// writes rows parent-first so every reference points at a committed row.

use std::collections::HashMap;

use spacetimedb::Timestamp;

use crate::content::{
    ChallengeContent, ChallengeKind, DefaultSettings, MultipleChoiceContent, PhotoContent, UiSchema,
    ValidationRules, WordGameContent,
};
use crate::rules;
use crate::store::{GameStore, StoreError};
use crate::{
    Category, Challenge, ChallengeType, CompletionRules, DisplaySettings, Game, GameStatus, Hint, Location,
    LocationSettings, PrivacySettings, Session, Submission, Teacher,
};

// ==================== CONSTANTS ====================

/// Join code of the sample game. Unique, so the sample seeds once per database
pub const SAMPLE_JOIN_CODE: &str = "JLMOLD";

const TEACHER_EMAIL: &str = "teacher@example.com";
const TEACHER_PASSWORD_HASH: &str = "hashed_password_here";

const CATEGORY_NAME: &str = "Historical Sites";
const CATEGORY_DESCRIPTION: &str = "Explore the rich history of Jerusalem";

const GAME_TITLE: &str = "Old City Jerusalem Adventure";
const GAME_DESCRIPTION: &str =
    "Explore the ancient wonders of Jerusalem's Old City in this educational treasure hunt.";
const GAME_SHORT_DESCRIPTION: &str = "Historic treasure hunt in Jerusalem's Old City";
const GAME_PRIMARY_COLOR: &str = "#3b82f6";
const GAME_COVER_IMAGE: &str = "/images/jerusalem-old-city.jpg";
const GAME_DURATION_MINUTES: u32 = 120;
const GAME_MIN_PLAYERS: u32 = 1;
const GAME_MAX_PLAYERS: u32 = 10;

/// Sample game stays open for a week after seeding
const GAME_WINDOW_MICROS: i64 = 7 * 24 * 60 * 60 * 1_000_000;

// "Find the location" challenges share one set of completion rules
const FIND_TIME_LIMIT_SECS: u32 = 300;
const FIND_POINTS: u32 = 150;
const FIND_REQUIRED_ACCURACY: u32 = 100;

// ==================== FIXTURES ====================

struct ChallengeTypeFixture {
    kind: ChallengeKind,
    name: &'static str,
    description: &'static str,
    time_limit_secs: Option<u32>,
    points: u32,
}

const CHALLENGE_TYPES: [ChallengeTypeFixture; 3] = [
    ChallengeTypeFixture {
        kind: ChallengeKind::MultipleChoice,
        name: "Multiple Choice",
        description: "Answer a question by selecting from options",
        time_limit_secs: Some(60),
        points: 100,
    },
    ChallengeTypeFixture {
        kind: ChallengeKind::Photo,
        name: "Photo Task",
        description: "Take a photo of a specific object or landmark",
        time_limit_secs: None,
        points: 150,
    },
    ChallengeTypeFixture {
        kind: ChallengeKind::WordGame,
        name: "Word Game",
        description: "Solve a word puzzle or anagram",
        time_limit_secs: Some(120),
        points: 200,
    },
];

enum ContentFixture {
    MultipleChoice {
        question: &'static str,
        options: &'static [&'static str],
        correct_option: u32,
    },
    Photo {
        question: &'static str,
        image_url: Option<&'static str>,
    },
    WordGame {
        question: &'static str,
        target_word: &'static str,
    },
}

impl ContentFixture {
    fn kind(&self) -> ChallengeKind {
        match self {
            ContentFixture::MultipleChoice { .. } => ChallengeKind::MultipleChoice,
            ContentFixture::Photo { .. } => ChallengeKind::Photo,
            ContentFixture::WordGame { .. } => ChallengeKind::WordGame,
        }
    }

    fn build(&self) -> ChallengeContent {
        match self {
            ContentFixture::MultipleChoice { question, options, correct_option } => {
                ChallengeContent::MultipleChoice(MultipleChoiceContent {
                    question: question.to_string(),
                    options: options.iter().map(|o| o.to_string()).collect(),
                    correct_option: *correct_option,
                })
            }
            ContentFixture::Photo { question, image_url } => ChallengeContent::Photo(PhotoContent {
                question: question.to_string(),
                image_url: image_url.map(str::to_string),
            }),
            ContentFixture::WordGame { question, target_word } => ChallengeContent::WordGame(WordGameContent {
                question: question.to_string(),
                target_word: target_word.to_string(),
            }),
        }
    }
}

struct AtLocationFixture {
    content: ContentFixture,
    time_limit_secs: Option<u32>,
    points: u32,
}

struct HintFixture {
    content: &'static str,
    points_penalty: u32,
    unlock_delay_minutes: u32,
}

struct LocationFixture {
    name: &'static str,
    latitude: f64,
    longitude: f64,
    sequence_order: u32,
    radius_meters: u32,
    require_sequential: bool,
    directions: &'static [&'static str],
    /// "Find <name>": reach the location
    find: ContentFixture,
    /// "<name> Challenge": task once there
    at_location: AtLocationFixture,
    /// Attached to the find challenge
    hint: Option<HintFixture>,
}

const JERUSALEM_LOCATIONS: [LocationFixture; 3] = [
    LocationFixture {
        name: "Western Wall",
        latitude: 31.7767,
        longitude: 35.2345,
        sequence_order: 1,
        radius_meters: 50,
        require_sequential: true,
        directions: &["Look for the large prayer plaza", "Near the Temple Mount"],
        find: ContentFixture::WordGame {
            question: "Unscramble the letters: STERWEN LALW",
            target_word: "WESTERN WALL",
        },
        at_location: AtLocationFixture {
            content: ContentFixture::MultipleChoice {
                question: "What is the Western Wall a remnant of?",
                options: &[
                    "The First Temple",
                    "The Second Temple",
                    "The Church of the Holy Sepulchre",
                    "Herod's Palace",
                ],
                correct_option: 1,
            },
            time_limit_secs: Some(60),
            points: 100,
        },
        hint: Some(HintFixture {
            content: "It's the holiest place where Jews are permitted to pray",
            points_penalty: 30,
            unlock_delay_minutes: 5,
        }),
    },
    LocationFixture {
        name: "Church of the Holy Sepulchre",
        latitude: 31.7784,
        longitude: 35.2297,
        sequence_order: 2,
        radius_meters: 30,
        require_sequential: true,
        directions: &["In the Christian Quarter", "Look for the large dome"],
        find: ContentFixture::Photo {
            question: "Find the main entrance to the Church",
            image_url: Some("/images/holy-sepulchre-entrance.jpg"),
        },
        at_location: AtLocationFixture {
            content: ContentFixture::MultipleChoice {
                question: "Count the number of lamps hanging above the Edicule. How many are there?",
                options: &["12", "13", "15", "17"],
                correct_option: 1,
            },
            time_limit_secs: Some(60),
            points: 100,
        },
        hint: Some(HintFixture {
            content: "It's in the Christian Quarter, follow the pilgrims",
            points_penalty: 20,
            unlock_delay_minutes: 3,
        }),
    },
    LocationFixture {
        name: "Mahane Yehuda Market",
        latitude: 31.7857,
        longitude: 35.212,
        sequence_order: 3,
        radius_meters: 100,
        require_sequential: false,
        directions: &["Follow the smell of fresh bread and spices", "The busiest market in Jerusalem"],
        find: ContentFixture::WordGame {
            question: "Solve this riddle: 'Where vendors call and flavors meet, Jerusalem's heart with things to eat'",
            target_word: "MAHANE YEHUDA",
        },
        at_location: AtLocationFixture {
            content: ContentFixture::Photo {
                question: "Find and photograph these three spices: Za'atar, Sumac, and Baharat",
                image_url: Some("/images/spices.jpg"),
            },
            time_limit_secs: None,
            points: 250,
        },
        hint: None,
    },
];

// ==================== GENERATOR ====================

/// Outcome of a successful seed
#[derive(Debug, Clone, PartialEq)]
pub struct SeededGame {
    pub game_id: u64,
    pub rows_inserted: u32,
}

/// Insert the sample game and everything under it.
///
/// Stops at the first failing insert. Rows written before the failure are
/// not undone here; the module reducer gets all-or-nothing from its
/// transaction, other stores keep the partial game.
pub fn generate<S: GameStore>(store: &mut S, now: Timestamp) -> Result<SeededGame, StoreError> {
    let mut rows = 0u32;

    let teacher = store.insert_teacher(Teacher {
        id: 0, // auto_inc
        email: TEACHER_EMAIL.to_string(),
        password_hash: TEACHER_PASSWORD_HASH.to_string(),
        created_at: now,
    })?;
    rows += 1;

    let category = store.insert_category(Category {
        id: 0,
        name: CATEGORY_NAME.to_string(),
        description: CATEGORY_DESCRIPTION.to_string(),
        display_order: 1,
        created_at: now,
    })?;
    rows += 1;

    let end_time =
        Timestamp::from_micros_since_unix_epoch(now.to_micros_since_unix_epoch().saturating_add(GAME_WINDOW_MICROS));
    let game = store.insert_game(Game {
        id: 0,
        teacher_id: teacher.id,
        title: GAME_TITLE.to_string(),
        description: GAME_DESCRIPTION.to_string(),
        short_description: GAME_SHORT_DESCRIPTION.to_string(),
        join_code: SAMPLE_JOIN_CODE.to_string(),
        status: GameStatus::Published,
        category_id: Some(category.id),
        privacy_settings: PrivacySettings {
            is_public: true,
            allow_join_after_start: true,
        },
        display_settings: DisplaySettings {
            primary_color: Some(GAME_PRIMARY_COLOR.to_string()),
            cover_image: Some(GAME_COVER_IMAGE.to_string()),
        },
        start_time: Some(now),
        end_time: Some(end_time),
        estimated_duration_minutes: GAME_DURATION_MINUTES,
        player_count_min: Some(GAME_MIN_PLAYERS),
        player_count_max: Some(GAME_MAX_PLAYERS),
        created_at: now,
    })?;
    rows += 1;
    log::debug!("[SEED] game:{} teacher:{} category:{}", game.id, teacher.id, category.id);

    let mut type_ids: HashMap<ChallengeKind, u64> = HashMap::new();
    for fixture in &CHALLENGE_TYPES {
        let challenge_type = store.insert_challenge_type(ChallengeType {
            id: 0,
            name: fixture.name.to_string(),
            description: fixture.description.to_string(),
            validation_rules: ValidationRules { kind: fixture.kind },
            ui_schema: UiSchema {
                component: fixture.kind.component().to_string(),
            },
            default_settings: DefaultSettings {
                time_limit_secs: fixture.time_limit_secs,
                points: fixture.points,
            },
            is_active: true,
        })?;
        type_ids.insert(fixture.kind, challenge_type.id);
        rows += 1;
    }

    for fixture in &JERUSALEM_LOCATIONS {
        let location = store.insert_location(Location {
            id: 0,
            game_id: game.id,
            name: fixture.name.to_string(),
            latitude: fixture.latitude,
            longitude: fixture.longitude,
            sequence_order: fixture.sequence_order,
            radius_meters: fixture.radius_meters,
            settings: LocationSettings {
                require_sequential: fixture.require_sequential,
                hints: Some(fixture.directions.iter().map(|d| d.to_string()).collect()),
            },
        })?;
        rows += 1;

        let find = store.insert_challenge(Challenge {
            id: 0,
            location_id: location.id,
            type_id: type_id_for(&type_ids, fixture.find.kind())?,
            title: format!("Find {}", fixture.name),
            content: fixture.find.build(),
            completion_rules: CompletionRules {
                time_limit_secs: Some(FIND_TIME_LIMIT_SECS),
                points: FIND_POINTS,
                required_accuracy: Some(FIND_REQUIRED_ACCURACY),
            },
            prerequisites: None,
            created_at: now,
        })?;
        rows += 1;

        let at = &fixture.at_location;
        store.insert_challenge(Challenge {
            id: 0,
            location_id: location.id,
            type_id: type_id_for(&type_ids, at.content.kind())?,
            title: format!("{} Challenge", fixture.name),
            content: at.content.build(),
            completion_rules: CompletionRules {
                time_limit_secs: at.time_limit_secs,
                points: at.points,
                required_accuracy: None,
            },
            prerequisites: None,
            created_at: now,
        })?;
        rows += 1;

        if let Some(hint) = &fixture.hint {
            store.insert_hint(Hint {
                id: 0,
                challenge_id: find.id,
                content: hint.content.to_string(),
                points_penalty: hint.points_penalty,
                unlock_delay_minutes: hint.unlock_delay_minutes,
            })?;
            rows += 1;
        }

        log::debug!("[SEED] location:{} \"{}\" hint:{}", location.id, location.name, fixture.hint.is_some());
    }

    Ok(SeededGame {
        game_id: game.id,
        rows_inserted: rows,
    })
}

fn type_id_for(type_ids: &HashMap<ChallengeKind, u64>, kind: ChallengeKind) -> Result<u64, StoreError> {
    type_ids.get(&kind).copied().ok_or_else(|| StoreError::Validation {
        table: "challenge",
        reason: format!("no challenge type seeded for {}", kind.as_str()),
    })
}

// ==================== SUMMARY ====================

/// A game with its category, the full location → challenge → hint tree
/// and the sessions played on it
#[derive(Debug, Clone)]
pub struct GameSummary {
    pub game: Game,
    pub category: Option<Category>,
    /// In play order
    pub locations: Vec<LocationSummary>,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Clone)]
pub struct LocationSummary {
    pub location: Location,
    pub challenges: Vec<ChallengeSummary>,
}

#[derive(Debug, Clone)]
pub struct ChallengeSummary {
    pub challenge: Challenge,
    /// None if the type row is gone
    pub challenge_type: Option<ChallengeType>,
    pub hints: Vec<Hint>,
}

impl ChallengeSummary {
    pub fn type_name(&self) -> Option<&str> {
        self.challenge_type.as_ref().map(|t| t.name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session: Session,
    /// Ordered by id
    pub submissions: Vec<Submission>,
}

impl GameSummary {
    /// Rows covered by the summary: game, category, locations, challenges,
    /// hints, sessions and submissions
    pub fn row_count(&self) -> usize {
        let nested: usize = self
            .locations
            .iter()
            .map(|l| 1 + l.challenges.iter().map(|c| 1 + c.hints.len()).sum::<usize>())
            .sum();
        let played: usize = self.sessions.iter().map(|s| 1 + s.submissions.len()).sum();
        1 + usize::from(self.category.is_some()) + nested + played
    }

    fn challenges(&self) -> impl Iterator<Item = &ChallengeSummary> {
        self.locations.iter().flat_map(|l| l.challenges.iter())
    }

    /// Cross-row invariants that single inserts can't see, plus the
    /// content and play-data checks re-run against the stored rows
    pub fn check_invariants(&self) -> Result<(), String> {
        let locations: Vec<Location> = self.locations.iter().map(|l| l.location.clone()).collect();
        rules::check_sequence_orders(&locations)?;

        for c in self.challenges() {
            let ty = c
                .challenge_type
                .as_ref()
                .ok_or_else(|| format!("challenge {} references missing type {}", c.challenge.id, c.challenge.type_id))?;
            rules::check_content_matches(&ty.validation_rules, &c.challenge.content)
                .map_err(|e| format!("challenge {}: {}", c.challenge.id, e))?;
        }

        let challenges: Vec<Challenge> = self.challenges().map(|c| c.challenge.clone()).collect();
        rules::check_prerequisites_acyclic(&challenges)?;

        for s in &self.sessions {
            rules::check_session_score(&s.session, &s.submissions)
                .map_err(|e| format!("session {}: {}", s.session.id, e))?;
            for submission in &s.submissions {
                let challenge = challenges.iter().find(|c| c.id == submission.challenge_id).ok_or_else(|| {
                    format!(
                        "submission {} answers challenge {} outside game {}",
                        submission.id, submission.challenge_id, self.game.id
                    )
                })?;
                rules::check_submission(challenge, submission)
                    .map_err(|e| format!("submission {}: {}", submission.id, e))?;
            }
        }
        Ok(())
    }
}

/// Walk a game's tree and its sessions through the per-parent indexes,
/// starting from its join code
pub fn summarize<S: GameStore>(store: &S, join_code: &str) -> Option<GameSummary> {
    let game = store.game_by_join_code(join_code)?;
    let category = game.category_id.and_then(|id| store.category(id));

    let locations = rules::ordered_locations(store.locations_for_game(game.id))
        .into_iter()
        .map(|location| {
            let mut challenges = store.challenges_for_location(location.id);
            challenges.sort_by_key(|c| c.id);
            let challenges = challenges
                .into_iter()
                .map(|challenge| ChallengeSummary {
                    challenge_type: store.challenge_type(challenge.type_id),
                    hints: store.hints_for_challenge(challenge.id),
                    challenge,
                })
                .collect();
            LocationSummary { location, challenges }
        })
        .collect();

    let mut sessions = store.sessions_for_game(game.id);
    sessions.sort_by_key(|s| s.id);
    let sessions = sessions
        .into_iter()
        .map(|session| {
            let mut submissions = store.submissions_for_session(session.id);
            submissions.sort_by_key(|s| s.id);
            SessionSummary { session, submissions }
        })
        .collect();

    Some(GameSummary {
        game,
        category,
        locations,
        sessions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{empty_json_object, SubmissionAnswer};
    use crate::store::memory::MemoryStore;
    use crate::SessionStatus;

    fn now() -> Timestamp {
        Timestamp::from_micros_since_unix_epoch(1_760_000_000_000_000)
    }

    fn seeded() -> (MemoryStore, SeededGame) {
        let mut store = MemoryStore::new();
        let seeded = generate(&mut store, now()).expect("seed into empty store");
        (store, seeded)
    }

    fn location_named<'a>(summary: &'a GameSummary, name: &str) -> &'a LocationSummary {
        summary
            .locations
            .iter()
            .find(|l| l.location.name == name)
            .unwrap_or_else(|| panic!("location {} missing", name))
    }

    /// The Western Wall multiple choice challenge
    fn wall_question(store: &MemoryStore) -> Challenge {
        let summary = summarize(store, SAMPLE_JOIN_CODE).unwrap();
        location_named(&summary, "Western Wall").challenges[1].challenge.clone()
    }

    /// Record a session with a stored score and one answer per (option, correct) pair
    fn play(store: &mut MemoryStore, score: u32, answers: &[(u32, bool)]) -> u64 {
        let challenge = wall_question(store);
        let session_id = store.sessions.len() as u64 + 1;
        store.sessions.push(Session {
            id: session_id,
            game_id: store.games[0].id,
            team_id: None,
            status: SessionStatus::Completed,
            start_time: now(),
            end_time: None,
            score,
            metadata: empty_json_object(),
        });
        for &(option, is_correct) in answers {
            let id = store.submissions.len() as u64 + 1;
            store.submissions.push(Submission {
                id,
                session_id,
                challenge_id: challenge.id,
                type_id: challenge.type_id,
                answer: SubmissionAnswer::MultipleChoice(option),
                is_correct,
                points_earned: if is_correct { challenge.completion_rules.points } else { 0 },
                metadata: empty_json_object(),
                submitted_at: now(),
            });
        }
        session_id
    }

    #[test]
    fn test_empty_store_gets_seventeen_rows() {
        let (store, seeded) = seeded();
        assert_eq!(store.teachers.len(), 1);
        assert_eq!(store.categories.len(), 1);
        assert_eq!(store.games.len(), 1);
        assert_eq!(store.challenge_types.len(), 3);
        assert_eq!(store.locations.len(), 3);
        assert_eq!(store.challenges.len(), 6);
        assert_eq!(store.hints.len(), 2);
        assert_eq!(store.row_count(), 17);
        assert_eq!(seeded.rows_inserted, 17);
    }

    #[test]
    fn test_game_id_points_at_published_sample() {
        let (store, seeded) = seeded();
        let game = store.game(seeded.game_id).unwrap();
        assert_eq!(game.join_code, "JLMOLD");
        assert_eq!(game.status, GameStatus::Published);
        assert_eq!(game.status.as_str(), "published");
        assert_eq!(game.teacher_id, store.teachers[0].id);
        assert_eq!(game.category_id, Some(store.categories[0].id));
        assert_eq!(game.player_count_min, Some(1));
        assert_eq!(game.player_count_max, Some(10));

        let start = game.start_time.unwrap().to_micros_since_unix_epoch();
        let end = game.end_time.unwrap().to_micros_since_unix_epoch();
        assert_eq!(end - start, GAME_WINDOW_MICROS);
    }

    #[test]
    fn test_second_seed_hits_join_code_uniqueness() {
        let (mut store, _) = seeded();
        let err = generate(&mut store, now()).unwrap_err();
        assert_eq!(err, StoreError::DuplicateJoinCode(SAMPLE_JOIN_CODE.to_string()));

        // No transaction here: the teacher and category written before the game stay
        assert_eq!(store.games.len(), 1);
        assert_eq!(store.teachers.len(), 2);
        assert_eq!(store.categories.len(), 2);
        assert_eq!(store.row_count(), 19);
    }

    #[test]
    fn test_failure_mid_sequence_leaves_partial_game() {
        let mut store = MemoryStore::new();
        store.fail_table = Some("hint");
        let err = generate(&mut store, now()).unwrap_err();
        assert!(matches!(err, StoreError::Insert { table: "hint", .. }));
        assert!(err.to_string().ends_with("injected failure"));

        // Aborted at the Western Wall hint: first location and both its challenges exist
        assert_eq!(store.games.len(), 1);
        assert_eq!(store.locations.len(), 1);
        assert_eq!(store.challenges.len(), 2);
        assert!(store.hints.is_empty());
    }

    #[test]
    fn test_each_location_has_find_and_at_location_challenge() {
        let (store, _) = seeded();
        let summary = summarize(&store, SAMPLE_JOIN_CODE).unwrap();
        assert_eq!(summary.locations.len(), 3);

        for loc in &summary.locations {
            let titles: Vec<&str> = loc.challenges.iter().map(|c| c.challenge.title.as_str()).collect();
            assert_eq!(
                titles,
                vec![format!("Find {}", loc.location.name), format!("{} Challenge", loc.location.name)]
            );

            let hint_count: usize = loc.challenges.iter().map(|c| c.hints.len()).sum();
            let expects_hint = loc.location.name != "Mahane Yehuda Market";
            assert_eq!(hint_count, usize::from(expects_hint), "hints at {}", loc.location.name);
            // Hints hang off the find challenge
            assert_eq!(loc.challenges[1].hints.len(), 0);
        }
    }

    #[test]
    fn test_challenge_types_follow_dispatch_table() {
        let (store, _) = seeded();
        let summary = summarize(&store, SAMPLE_JOIN_CODE).unwrap();

        let expected = [
            ("Western Wall", "Word Game", "Multiple Choice"),
            ("Church of the Holy Sepulchre", "Photo Task", "Multiple Choice"),
            ("Mahane Yehuda Market", "Word Game", "Photo Task"),
        ];
        for (name, find_type, at_type) in expected {
            let loc = location_named(&summary, name);
            assert_eq!(loc.challenges[0].type_name(), Some(find_type), "find at {}", name);
            assert_eq!(loc.challenges[1].type_name(), Some(at_type), "at-location {}", name);

            // Type ids resolve to types inserted earlier in the same run
            for c in &loc.challenges {
                let ty = store.challenge_type(c.challenge.type_id).unwrap();
                assert_eq!(ty.validation_rules.kind, c.challenge.content.kind());
            }
        }
    }

    #[test]
    fn test_western_wall_and_market_content() {
        let (store, _) = seeded();
        let summary = summarize(&store, SAMPLE_JOIN_CODE).unwrap();

        let wall = &location_named(&summary, "Western Wall").challenges[1].challenge;
        assert_eq!(wall.content.correct_option(), Some(1));
        assert_eq!(wall.content.options().map(|o| o.len()), Some(4));
        assert_eq!(wall.content.options().unwrap()[1], "The Second Temple");
        assert_eq!(wall.completion_rules.time_limit_secs, Some(60));

        let market = &location_named(&summary, "Mahane Yehuda Market").challenges[1];
        assert!(market.challenge.content.options().is_none());
        assert_eq!(market.type_name(), Some("Photo Task"));
        assert_eq!(market.challenge.content.image_url(), Some("/images/spices.jpg"));
        assert_eq!(market.challenge.completion_rules.points, 250);
        assert_eq!(market.challenge.completion_rules.time_limit_secs, None);
    }

    #[test]
    fn test_hint_penalties() {
        let (store, _) = seeded();
        let summary = summarize(&store, SAMPLE_JOIN_CODE).unwrap();

        let wall_hint = &location_named(&summary, "Western Wall").challenges[0].hints[0];
        assert_eq!((wall_hint.points_penalty, wall_hint.unlock_delay_minutes), (30, 5));

        let church_hint = &location_named(&summary, "Church of the Holy Sepulchre").challenges[0].hints[0];
        assert_eq!((church_hint.points_penalty, church_hint.unlock_delay_minutes), (20, 3));
        assert_eq!(church_hint.content, "It's in the Christian Quarter, follow the pilgrims");
    }

    #[test]
    fn test_summary_is_ordered_and_consistent() {
        let (store, _) = seeded();
        let summary = summarize(&store, SAMPLE_JOIN_CODE).unwrap();

        let orders: Vec<u32> = summary.locations.iter().map(|l| l.location.sequence_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(summary.category.as_ref().map(|c| c.name.as_str()), Some("Historical Sites"));
        // Everything except the teacher and the three challenge types
        assert_eq!(summary.row_count(), 13);
        assert!(summary.check_invariants().is_ok());

        assert!(summarize(&store, "NOPE00").is_none());
    }

    #[test]
    fn test_sessions_are_summarized_with_their_submissions() {
        let (mut store, _) = seeded();
        let points = wall_question(&store).completion_rules.points;
        play(&mut store, points, &[(0, false), (1, true)]);
        play(&mut store, 0, &[]);

        let summary = summarize(&store, SAMPLE_JOIN_CODE).unwrap();
        assert_eq!(summary.sessions.len(), 2);
        assert_eq!(summary.sessions[0].submissions.len(), 2);
        assert!(summary.sessions[1].submissions.is_empty());
        assert_eq!(summary.row_count(), 13 + 2 + 2);
        assert!(summary.check_invariants().is_ok());
    }

    #[test]
    fn test_stale_session_score_is_reported() {
        let (mut store, _) = seeded();
        let points = wall_question(&store).completion_rules.points;
        let session_id = play(&mut store, points + 10, &[(1, true)]);

        let err = summarize(&store, SAMPLE_JOIN_CODE).unwrap().check_invariants().unwrap_err();
        assert_eq!(
            err,
            format!("session {}: session score {} but submissions add up to {}", session_id, points + 10, points)
        );
    }

    #[test]
    fn test_inconsistent_submission_is_reported() {
        let (mut store, _) = seeded();
        play(&mut store, 0, &[(2, false)]);
        store.submissions[0].points_earned = 5;

        let err = summarize(&store, SAMPLE_JOIN_CODE).unwrap().check_invariants().unwrap_err();
        assert_eq!(err, "submission 1: incorrect submission earned points");

        store.submissions[0].points_earned = 0;
        store.submissions[0].challenge_id = 99;
        let err = summarize(&store, SAMPLE_JOIN_CODE).unwrap().check_invariants().unwrap_err();
        assert!(err.contains("answers challenge 99 outside game"), "{}", err);
    }

    #[test]
    fn test_content_rechecked_against_type() {
        let (mut store, _) = seeded();
        let wall_id = wall_question(&store).id;
        let row = store.challenges.iter_mut().find(|c| c.id == wall_id).unwrap();
        row.content = ChallengeContent::WordGame(WordGameContent {
            question: "Unscramble".to_string(),
            target_word: "KOTEL".to_string(),
        });

        let err = summarize(&store, SAMPLE_JOIN_CODE).unwrap().check_invariants().unwrap_err();
        assert!(err.starts_with(&format!("challenge {}:", wall_id)), "{}", err);

        store.challenge_types.clear();
        let err = summarize(&store, SAMPLE_JOIN_CODE).unwrap().check_invariants().unwrap_err();
        assert!(err.contains("references missing type"), "{}", err);
    }

    #[test]
    fn test_fixtures_are_internally_consistent() {
        for fixture in &JERUSALEM_LOCATIONS {
            assert!(CHALLENGE_TYPES.iter().any(|t| t.kind == fixture.find.kind()));
            assert!(CHALLENGE_TYPES.iter().any(|t| t.kind == fixture.at_location.content.kind()));
            assert_eq!(fixture.directions.len(), 2, "{}", fixture.name);
        }
    }
}
