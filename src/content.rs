// Typed payloads for the per-challenge-type columns.
// Each challenge type owns one content shape, one answer shape and one UI component.

use serde_json::{Map, Value};
use spacetimedb::SpacetimeType;

/// Discriminator shared by challenge types, challenge content and answers
#[derive(SpacetimeType, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeKind {
    MultipleChoice,
    Photo,
    WordGame,
}

impl ChallengeKind {
    /// Wire name used by clients ("multipleChoice", "photo", "wordGame")
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::MultipleChoice => "multipleChoice",
            ChallengeKind::Photo => "photo",
            ChallengeKind::WordGame => "wordGame",
        }
    }

    /// Client component that renders challenges of this kind
    pub fn component(&self) -> &'static str {
        match self {
            ChallengeKind::MultipleChoice => "MultipleChoiceChallenge",
            ChallengeKind::Photo => "PhotoChallenge",
            ChallengeKind::WordGame => "WordGameChallenge",
        }
    }
}

/// Rules a challenge's content must satisfy to be accepted for a type
#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub struct ValidationRules {
    pub kind: ChallengeKind,
}

#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub struct UiSchema {
    pub component: String,
}

/// Defaults applied when a challenge of this type omits its own rules
#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub struct DefaultSettings {
    pub time_limit_secs: Option<u32>,
    pub points: u32,
}

#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub struct MultipleChoiceContent {
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`
    pub correct_option: u32,
}

#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub struct PhotoContent {
    pub question: String,
    /// Reference image shown to players
    pub image_url: Option<String>,
}

#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub struct WordGameContent {
    pub question: String,
    pub target_word: String,
}

/// Challenge body, one variant per challenge kind
#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub enum ChallengeContent {
    MultipleChoice(MultipleChoiceContent),
    Photo(PhotoContent),
    WordGame(WordGameContent),
}

impl ChallengeContent {
    pub fn kind(&self) -> ChallengeKind {
        match self {
            ChallengeContent::MultipleChoice(_) => ChallengeKind::MultipleChoice,
            ChallengeContent::Photo(_) => ChallengeKind::Photo,
            ChallengeContent::WordGame(_) => ChallengeKind::WordGame,
        }
    }

    pub fn question(&self) -> &str {
        match self {
            ChallengeContent::MultipleChoice(c) => &c.question,
            ChallengeContent::Photo(c) => &c.question,
            ChallengeContent::WordGame(c) => &c.question,
        }
    }

    /// Options only exist on multiple choice content
    pub fn options(&self) -> Option<&[String]> {
        match self {
            ChallengeContent::MultipleChoice(c) => Some(&c.options),
            _ => None,
        }
    }

    pub fn correct_option(&self) -> Option<u32> {
        match self {
            ChallengeContent::MultipleChoice(c) => Some(c.correct_option),
            _ => None,
        }
    }

    pub fn target_word(&self) -> Option<&str> {
        match self {
            ChallengeContent::WordGame(c) => Some(&c.target_word),
            _ => None,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            ChallengeContent::Photo(c) => c.image_url.as_deref(),
            _ => None,
        }
    }
}

/// A player's answer, shaped by the kind of challenge answered
#[derive(SpacetimeType, Debug, Clone, PartialEq)]
pub enum SubmissionAnswer {
    /// Selected option index
    MultipleChoice(u32),
    /// Uploaded photo URL
    Photo(String),
    /// Guessed word
    WordGame(String),
}

impl SubmissionAnswer {
    pub fn kind(&self) -> ChallengeKind {
        match self {
            SubmissionAnswer::MultipleChoice(_) => ChallengeKind::MultipleChoice,
            SubmissionAnswer::Photo(_) => ChallengeKind::Photo,
            SubmissionAnswer::WordGame(_) => ChallengeKind::WordGame,
        }
    }
}

/// Empty JSON object for metadata and progress columns of test rows
#[cfg(test)]
pub fn empty_json_object() -> String {
    json_object_text(Map::new())
}

#[cfg(test)]
pub fn json_object_text(map: Map<String, Value>) -> String {
    Value::Object(map).to_string()
}

/// Parse a metadata/progress column, which must hold a JSON object
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected JSON object, found {}", json_type_name(&other))),
        Err(e) => Err(format!("invalid JSON: {}", e)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
