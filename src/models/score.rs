//! Result of the most recent completed study session of a deck.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastScore {
    pub correct: u32,
    pub total: u32,
    pub pct: u8,
    pub when: DateTime<Utc>,
}

impl LastScore {
    /// Builds a score stamped with the given time. `correct` is capped at `total`.
    pub fn new(correct: u32, total: u32, when: DateTime<Utc>) -> Self {
        let correct = correct.min(total);
        Self {
            correct,
            total,
            pct: percentage(correct, total),
            when,
        }
    }
}

/// `round(100 * part / whole)` with halves rounded up, or 0 when `whole` is 0.
pub fn percentage(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part.min(whole));
    let whole = u64::from(whole);
    ((200 * part + whole) / (2 * whole)) as u8
}

/// Badge shown next to a deck, derived from its last score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreGrade {
    New,
    Good,
    Fair,
    Poor,
}

impl ScoreGrade {
    pub fn from_score(score: Option<&LastScore>) -> Self {
        match score.map(|s| s.pct) {
            None => ScoreGrade::New,
            Some(pct) if pct >= 80 => ScoreGrade::Good,
            Some(pct) if pct >= 60 => ScoreGrade::Fair,
            Some(_) => ScoreGrade::Poor,
        }
    }
}
