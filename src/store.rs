// Write/read seam between game logic and the tables.
// ModuleStore goes through the SpacetimeDB tables of the running module;
// tests use memory::MemoryStore, which enforces the same unique join code.

use std::fmt::Display;

use spacetimedb::{ReducerContext, Table, TryInsertError};
use thiserror::Error;

use crate::rules;
use crate::{category, challenge, challenge_type, game, hint, location, session, submission, teacher};
use crate::{Category, Challenge, ChallengeType, Game, Hint, Location, Session, Submission, Teacher};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Invalid {table} row: {reason}")]
    Validation { table: &'static str, reason: String },

    #[error("Join code {0} is already in use")]
    DuplicateJoinCode(String),

    #[error("{table}.{column} references missing row {id}")]
    MissingReference {
        table: &'static str,
        column: &'static str,
        id: u64,
    },

    #[error("Insert into {table} failed: {reason}")]
    Insert { table: &'static str, reason: String },
}

fn insert_failed(table: &'static str, err: impl Display) -> StoreError {
    StoreError::Insert { table, reason: err.to_string() }
}

fn invalid(table: &'static str, reason: impl Into<String>) -> StoreError {
    StoreError::Validation { table, reason: reason.into() }
}

fn require(found: bool, table: &'static str, column: &'static str, id: u64) -> Result<(), StoreError> {
    if found {
        Ok(())
    } else {
        Err(StoreError::MissingReference { table, column, id })
    }
}

/// Row storage for games and their content.
///
/// Implementors provide the `put_*` primitives (assign the auto-increment id,
/// enforce unique indexes) and the lookups. The `insert_*` methods layer the
/// shape and reference checks on top and are what callers should use.
pub trait GameStore {
    fn put_teacher(&mut self, row: Teacher) -> Result<Teacher, StoreError>;
    fn put_category(&mut self, row: Category) -> Result<Category, StoreError>;
    /// Fails with `DuplicateJoinCode` when the join code is taken
    fn put_game(&mut self, row: Game) -> Result<Game, StoreError>;
    fn put_challenge_type(&mut self, row: ChallengeType) -> Result<ChallengeType, StoreError>;
    fn put_location(&mut self, row: Location) -> Result<Location, StoreError>;
    fn put_challenge(&mut self, row: Challenge) -> Result<Challenge, StoreError>;
    fn put_hint(&mut self, row: Hint) -> Result<Hint, StoreError>;

    fn teacher(&self, id: u64) -> Option<Teacher>;
    fn category(&self, id: u64) -> Option<Category>;
    fn game(&self, id: u64) -> Option<Game>;
    fn game_by_join_code(&self, join_code: &str) -> Option<Game>;
    fn challenge_type(&self, id: u64) -> Option<ChallengeType>;
    fn location(&self, id: u64) -> Option<Location>;
    fn challenge(&self, id: u64) -> Option<Challenge>;
    fn locations_for_game(&self, game_id: u64) -> Vec<Location>;
    fn challenges_for_location(&self, location_id: u64) -> Vec<Challenge>;
    fn hints_for_challenge(&self, challenge_id: u64) -> Vec<Hint>;
    fn sessions_for_game(&self, game_id: u64) -> Vec<Session>;
    fn submissions_for_session(&self, session_id: u64) -> Vec<Submission>;

    fn insert_teacher(&mut self, row: Teacher) -> Result<Teacher, StoreError> {
        if row.email.trim().is_empty() {
            return Err(invalid("teacher", "email is empty"));
        }
        self.put_teacher(row)
    }

    fn insert_category(&mut self, row: Category) -> Result<Category, StoreError> {
        if row.name.trim().is_empty() {
            return Err(invalid("category", "name is empty"));
        }
        self.put_category(row)
    }

    fn insert_game(&mut self, row: Game) -> Result<Game, StoreError> {
        rules::check_game(&row).map_err(|reason| invalid("game", reason))?;
        require(self.teacher(row.teacher_id).is_some(), "game", "teacher_id", row.teacher_id)?;
        if let Some(category_id) = row.category_id {
            require(self.category(category_id).is_some(), "game", "category_id", category_id)?;
        }
        self.put_game(row)
    }

    fn insert_challenge_type(&mut self, row: ChallengeType) -> Result<ChallengeType, StoreError> {
        if row.name.trim().is_empty() {
            return Err(invalid("challenge_type", "name is empty"));
        }
        if row.ui_schema.component.trim().is_empty() {
            return Err(invalid("challenge_type", "ui_schema.component is empty"));
        }
        self.put_challenge_type(row)
    }

    fn insert_location(&mut self, row: Location) -> Result<Location, StoreError> {
        rules::check_location(&row).map_err(|reason| invalid("location", reason))?;
        require(self.game(row.game_id).is_some(), "location", "game_id", row.game_id)?;

        let mut siblings = self.locations_for_game(row.game_id);
        siblings.push(row.clone());
        rules::check_sequence_orders(&siblings).map_err(|reason| invalid("location", reason))?;

        self.put_location(row)
    }

    /// Prerequisites must already exist, so inserts alone can't close a cycle
    fn insert_challenge(&mut self, row: Challenge) -> Result<Challenge, StoreError> {
        require(self.location(row.location_id).is_some(), "challenge", "location_id", row.location_id)?;
        let challenge_type = self.challenge_type(row.type_id).ok_or(StoreError::MissingReference {
            table: "challenge",
            column: "type_id",
            id: row.type_id,
        })?;
        rules::check_content_matches(&challenge_type.validation_rules, &row.content)
            .map_err(|reason| invalid("challenge", reason))?;

        for &prereq in row.prerequisites.iter().flatten() {
            require(self.challenge(prereq).is_some(), "challenge", "prerequisites", prereq)?;
        }
        self.put_challenge(row)
    }

    fn insert_hint(&mut self, row: Hint) -> Result<Hint, StoreError> {
        if row.content.trim().is_empty() {
            return Err(invalid("hint", "content is empty"));
        }
        require(self.challenge(row.challenge_id).is_some(), "hint", "challenge_id", row.challenge_id)?;
        self.put_hint(row)
    }
}

/// GameStore over the module database of the current reducer call.
/// Every write joins the reducer's transaction.
pub struct ModuleStore<'a> {
    ctx: &'a ReducerContext,
}

impl<'a> ModuleStore<'a> {
    pub fn new(ctx: &'a ReducerContext) -> Self {
        Self { ctx }
    }
}

impl GameStore for ModuleStore<'_> {
    fn put_teacher(&mut self, row: Teacher) -> Result<Teacher, StoreError> {
        self.ctx.db.teacher().try_insert(row).map_err(|e| insert_failed("teacher", e))
    }

    fn put_category(&mut self, row: Category) -> Result<Category, StoreError> {
        self.ctx.db.category().try_insert(row).map_err(|e| insert_failed("category", e))
    }

    fn put_game(&mut self, row: Game) -> Result<Game, StoreError> {
        let join_code = row.join_code.clone();
        match self.ctx.db.game().try_insert(row) {
            Ok(game) => Ok(game),
            // id is auto_inc, so join_code is the only unique column that can clash
            Err(TryInsertError::UniqueConstraintViolation(_)) => Err(StoreError::DuplicateJoinCode(join_code)),
            Err(e) => Err(insert_failed("game", e)),
        }
    }

    fn put_challenge_type(&mut self, row: ChallengeType) -> Result<ChallengeType, StoreError> {
        self.ctx.db.challenge_type().try_insert(row).map_err(|e| insert_failed("challenge_type", e))
    }

    fn put_location(&mut self, row: Location) -> Result<Location, StoreError> {
        self.ctx.db.location().try_insert(row).map_err(|e| insert_failed("location", e))
    }

    fn put_challenge(&mut self, row: Challenge) -> Result<Challenge, StoreError> {
        self.ctx.db.challenge().try_insert(row).map_err(|e| insert_failed("challenge", e))
    }

    fn put_hint(&mut self, row: Hint) -> Result<Hint, StoreError> {
        self.ctx.db.hint().try_insert(row).map_err(|e| insert_failed("hint", e))
    }

    fn teacher(&self, id: u64) -> Option<Teacher> {
        self.ctx.db.teacher().id().find(&id)
    }

    fn category(&self, id: u64) -> Option<Category> {
        self.ctx.db.category().id().find(&id)
    }

    fn game(&self, id: u64) -> Option<Game> {
        self.ctx.db.game().id().find(&id)
    }

    fn game_by_join_code(&self, join_code: &str) -> Option<Game> {
        self.ctx.db.game().join_code().find(&join_code.to_string())
    }

    fn challenge_type(&self, id: u64) -> Option<ChallengeType> {
        self.ctx.db.challenge_type().id().find(&id)
    }

    fn location(&self, id: u64) -> Option<Location> {
        self.ctx.db.location().id().find(&id)
    }

    fn challenge(&self, id: u64) -> Option<Challenge> {
        self.ctx.db.challenge().id().find(&id)
    }

    fn locations_for_game(&self, game_id: u64) -> Vec<Location> {
        self.ctx.db.location().game_id().filter(&game_id).collect()
    }

    fn challenges_for_location(&self, location_id: u64) -> Vec<Challenge> {
        self.ctx.db.challenge().location_id().filter(&location_id).collect()
    }

    fn hints_for_challenge(&self, challenge_id: u64) -> Vec<Hint> {
        self.ctx.db.hint().challenge_id().filter(&challenge_id).collect()
    }

    fn sessions_for_game(&self, game_id: u64) -> Vec<Session> {
        self.ctx.db.session().game_id().filter(&game_id).collect()
    }

    fn submissions_for_session(&self, session_id: u64) -> Vec<Submission> {
        self.ctx.db.submission().session_id().filter(&session_id).collect()
    }
}

#[cfg(test)]
pub mod memory {
    use super::*;

    /// Vec-backed store with per-table auto-increment ids starting at 1.
    /// No transactions: rows written before a failure stay written.
    #[derive(Default)]
    pub struct MemoryStore {
        pub teachers: Vec<Teacher>,
        pub categories: Vec<Category>,
        pub games: Vec<Game>,
        pub challenge_types: Vec<ChallengeType>,
        pub locations: Vec<Location>,
        pub challenges: Vec<Challenge>,
        pub hints: Vec<Hint>,
        /// Play data, pushed directly by tests
        pub sessions: Vec<Session>,
        pub submissions: Vec<Submission>,
        /// Table name whose next put fails with `StoreError::Insert`
        pub fail_table: Option<&'static str>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn row_count(&self) -> usize {
            self.teachers.len()
                + self.categories.len()
                + self.games.len()
                + self.challenge_types.len()
                + self.locations.len()
                + self.challenges.len()
                + self.hints.len()
                + self.sessions.len()
                + self.submissions.len()
        }

        fn check_fail(&mut self, table: &'static str) -> Result<(), StoreError> {
            if self.fail_table == Some(table) {
                self.fail_table = None;
                return Err(insert_failed(table, "injected failure"));
            }
            Ok(())
        }
    }

    fn next_id(len: usize) -> u64 {
        len as u64 + 1
    }

    impl GameStore for MemoryStore {
        fn put_teacher(&mut self, mut row: Teacher) -> Result<Teacher, StoreError> {
            self.check_fail("teacher")?;
            row.id = next_id(self.teachers.len());
            self.teachers.push(row.clone());
            Ok(row)
        }

        fn put_category(&mut self, mut row: Category) -> Result<Category, StoreError> {
            self.check_fail("category")?;
            row.id = next_id(self.categories.len());
            self.categories.push(row.clone());
            Ok(row)
        }

        fn put_game(&mut self, mut row: Game) -> Result<Game, StoreError> {
            self.check_fail("game")?;
            if self.games.iter().any(|g| g.join_code == row.join_code) {
                return Err(StoreError::DuplicateJoinCode(row.join_code));
            }
            row.id = next_id(self.games.len());
            self.games.push(row.clone());
            Ok(row)
        }

        fn put_challenge_type(&mut self, mut row: ChallengeType) -> Result<ChallengeType, StoreError> {
            self.check_fail("challenge_type")?;
            row.id = next_id(self.challenge_types.len());
            self.challenge_types.push(row.clone());
            Ok(row)
        }

        fn put_location(&mut self, mut row: Location) -> Result<Location, StoreError> {
            self.check_fail("location")?;
            row.id = next_id(self.locations.len());
            self.locations.push(row.clone());
            Ok(row)
        }

        fn put_challenge(&mut self, mut row: Challenge) -> Result<Challenge, StoreError> {
            self.check_fail("challenge")?;
            row.id = next_id(self.challenges.len());
            self.challenges.push(row.clone());
            Ok(row)
        }

        fn put_hint(&mut self, mut row: Hint) -> Result<Hint, StoreError> {
            self.check_fail("hint")?;
            row.id = next_id(self.hints.len());
            self.hints.push(row.clone());
            Ok(row)
        }

        fn teacher(&self, id: u64) -> Option<Teacher> {
            self.teachers.iter().find(|r| r.id == id).cloned()
        }

        fn category(&self, id: u64) -> Option<Category> {
            self.categories.iter().find(|r| r.id == id).cloned()
        }

        fn game(&self, id: u64) -> Option<Game> {
            self.games.iter().find(|r| r.id == id).cloned()
        }

        fn game_by_join_code(&self, join_code: &str) -> Option<Game> {
            self.games.iter().find(|r| r.join_code == join_code).cloned()
        }

        fn challenge_type(&self, id: u64) -> Option<ChallengeType> {
            self.challenge_types.iter().find(|r| r.id == id).cloned()
        }

        fn location(&self, id: u64) -> Option<Location> {
            self.locations.iter().find(|r| r.id == id).cloned()
        }

        fn challenge(&self, id: u64) -> Option<Challenge> {
            self.challenges.iter().find(|r| r.id == id).cloned()
        }

        fn locations_for_game(&self, game_id: u64) -> Vec<Location> {
            self.locations.iter().filter(|r| r.game_id == game_id).cloned().collect()
        }

        fn challenges_for_location(&self, location_id: u64) -> Vec<Challenge> {
            self.challenges.iter().filter(|r| r.location_id == location_id).cloned().collect()
        }

        fn hints_for_challenge(&self, challenge_id: u64) -> Vec<Hint> {
            self.hints.iter().filter(|r| r.challenge_id == challenge_id).cloned().collect()
        }

        fn sessions_for_game(&self, game_id: u64) -> Vec<Session> {
            self.sessions.iter().filter(|r| r.game_id == game_id).cloned().collect()
        }

        fn submissions_for_session(&self, session_id: u64) -> Vec<Submission> {
            self.submissions.iter().filter(|r| r.session_id == session_id).cloned().collect()
        }
    }
}
