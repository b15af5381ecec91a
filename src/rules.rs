// Invariant checks over game rows. Pure functions so they run the same
// against the live module tables and the in-memory test store.

use std::collections::{HashMap, HashSet};

use crate::content::{parse_json_object, ChallengeContent, ValidationRules};
use crate::{Challenge, Game, Location, Session, Submission};

/// Multiple choice questions need at least this many options
const MIN_CHOICE_OPTIONS: usize = 2;

/// Check that a challenge's content has the shape its type expects
pub fn check_content_matches(rules: &ValidationRules, content: &ChallengeContent) -> Result<(), String> {
    if content.kind() != rules.kind {
        return Err(format!(
            "content is {} but challenge type expects {}",
            content.kind().as_str(),
            rules.kind.as_str()
        ));
    }

    if content.question().trim().is_empty() {
        return Err("question is empty".to_string());
    }

    match content {
        ChallengeContent::MultipleChoice(mc) => {
            if mc.options.len() < MIN_CHOICE_OPTIONS {
                return Err(format!(
                    "multiple choice needs at least {} options, got {}",
                    MIN_CHOICE_OPTIONS,
                    mc.options.len()
                ));
            }
            if mc.correct_option as usize >= mc.options.len() {
                return Err(format!(
                    "correct_option {} out of range for {} options",
                    mc.correct_option,
                    mc.options.len()
                ));
            }
        }
        ChallengeContent::WordGame(word) => {
            if word.target_word.trim().is_empty() {
                return Err("target_word is empty".to_string());
            }
        }
        ChallengeContent::Photo(_) => {}
    }

    Ok(())
}

/// Check game fields that the table types alone can't express
pub fn check_game(game: &Game) -> Result<(), String> {
    if game.join_code.trim().is_empty() {
        return Err("join_code is empty".to_string());
    }
    if let (Some(min), Some(max)) = (game.player_count_min, game.player_count_max) {
        if min > max {
            return Err(format!("player_count_min {} exceeds player_count_max {}", min, max));
        }
    }
    if let (Some(start), Some(end)) = (game.start_time, game.end_time) {
        if start.to_micros_since_unix_epoch() > end.to_micros_since_unix_epoch() {
            return Err("end_time is before start_time".to_string());
        }
    }
    Ok(())
}

pub fn check_location(location: &Location) -> Result<(), String> {
    if location.name.trim().is_empty() {
        return Err("name is empty".to_string());
    }
    if !(-90.0..=90.0).contains(&location.latitude) || !(-180.0..=180.0).contains(&location.longitude) {
        return Err(format!(
            "coordinates ({}, {}) out of range",
            location.latitude, location.longitude
        ));
    }
    if location.radius_meters == 0 {
        return Err("radius_meters must be positive".to_string());
    }
    Ok(())
}

/// True when any location in the game enforces sequential completion
pub fn requires_sequential(locations: &[Location]) -> bool {
    locations.iter().any(|l| l.settings.require_sequential)
}

/// Locations in play order (sequence_order, then insertion order)
pub fn ordered_locations(mut locations: Vec<Location>) -> Vec<Location> {
    locations.sort_by_key(|l| (l.sequence_order, l.id));
    locations
}

/// Sequential games need a distinct sequence_order per location
pub fn check_sequence_orders(locations: &[Location]) -> Result<(), String> {
    if !requires_sequential(locations) {
        return Ok(());
    }
    let mut seen = HashSet::new();
    for loc in locations {
        if !seen.insert(loc.sequence_order) {
            return Err(format!(
                "sequence_order {} used twice in a sequential game (location '{}')",
                loc.sequence_order, loc.name
            ));
        }
    }
    Ok(())
}

/// Reject prerequisite graphs with cycles, including self references.
/// Prerequisites pointing outside the given set are ignored.
pub fn check_prerequisites_acyclic(challenges: &[Challenge]) -> Result<(), String> {
    let edges: HashMap<u64, &[u64]> = challenges
        .iter()
        .map(|c| (c.id, c.prerequisites.as_deref().unwrap_or(&[])))
        .collect();

    #[derive(Clone, Copy)]
    enum Mark {
        Visiting,
        Done,
    }
    let mut marks: HashMap<u64, Mark> = HashMap::new();

    for &start in edges.keys() {
        if marks.contains_key(&start) {
            continue;
        }
        // Iterative DFS: (node, index of next prerequisite to visit)
        let mut stack = vec![(start, 0usize)];
        marks.insert(start, Mark::Visiting);

        while let Some((node, next)) = stack.pop() {
            let prereqs = edges.get(&node).copied().unwrap_or(&[]);
            if next >= prereqs.len() {
                marks.insert(node, Mark::Done);
                continue;
            }
            stack.push((node, next + 1));

            let dep = prereqs[next];
            if !edges.contains_key(&dep) {
                continue;
            }
            match marks.get(&dep) {
                Some(Mark::Visiting) => {
                    return Err(format!("challenge {} is part of a prerequisite cycle", dep));
                }
                Some(Mark::Done) => {}
                None => {
                    marks.insert(dep, Mark::Visiting);
                    stack.push((dep, 0));
                }
            }
        }
    }

    Ok(())
}

/// Session score derived from its submissions: points of correct answers only
pub fn derive_session_score<'a>(submissions: impl IntoIterator<Item = &'a Submission>) -> u32 {
    submissions
        .into_iter()
        .filter(|s| s.is_correct)
        .fold(0u32, |acc, s| acc.saturating_add(s.points_earned))
}

/// Check a submission against the challenge it answers
pub fn check_submission(challenge: &Challenge, submission: &Submission) -> Result<(), String> {
    if submission.challenge_id != challenge.id {
        return Err(format!(
            "submission is for challenge {}, not {}",
            submission.challenge_id, challenge.id
        ));
    }
    if submission.type_id != challenge.type_id {
        return Err(format!(
            "type_id {} does not match challenge type {}",
            submission.type_id, challenge.type_id
        ));
    }
    if submission.answer.kind() != challenge.content.kind() {
        return Err(format!(
            "{} answer for a {} challenge",
            submission.answer.kind().as_str(),
            challenge.content.kind().as_str()
        ));
    }
    if !submission.is_correct && submission.points_earned > 0 {
        return Err("incorrect submission earned points".to_string());
    }
    if submission.points_earned > challenge.completion_rules.points {
        return Err(format!(
            "points_earned {} exceeds challenge points {}",
            submission.points_earned, challenge.completion_rules.points
        ));
    }
    parse_json_object(&submission.metadata).map(|_| ())
}

/// Session score must equal the score derived from its submissions
pub fn check_session_score(session: &Session, submissions: &[Submission]) -> Result<(), String> {
    parse_json_object(&session.metadata)?;

    let foreign = submissions.iter().find(|s| s.session_id != session.id);
    if let Some(s) = foreign {
        return Err(format!("submission {} belongs to session {}", s.id, s.session_id));
    }

    let derived = derive_session_score(submissions);
    if session.score != derived {
        return Err(format!("session score {} but submissions add up to {}", session.score, derived));
    }
    Ok(())
}
