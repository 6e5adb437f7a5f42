//! Core types for quiz sessions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SessionError};

/// Lowest card difficulty.
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest card difficulty.
pub const MAX_DIFFICULTY: u8 = 5;
/// Points awarded per difficulty level for a correct answer.
pub const POINTS_PER_DIFFICULTY: u32 = 10;

/// Study card as seen by a quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub title: String,
    /// Reference answer the typed text is scored against.
    pub content: String,
    /// 1 (easy) to 5 (hard).
    pub difficulty: u8,
}

impl Card {
    /// Points earned by answering this card correctly.
    pub fn points(&self) -> u32 {
        u32::from(self.difficulty) * POINTS_PER_DIFFICULTY
    }
}

/// Check that a difficulty lies within 1-5.
pub fn is_valid_difficulty(difficulty: i32) -> bool {
    (i32::from(MIN_DIFFICULTY)..=i32::from(MAX_DIFFICULTY)).contains(&difficulty)
}

/// Parameters fixed at session start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub total_cards: usize,
    /// Seconds allowed per card, `None` for untimed sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_per_card: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_filter: Option<Uuid>,
}

impl SessionConfig {
    /// Untimed config over all subjects.
    pub fn new(total_cards: usize) -> Self {
        Self {
            total_cards,
            time_per_card: None,
            subject_filter: None,
        }
    }

    pub fn with_time_per_card(mut self, seconds: u32) -> Self {
        self.time_per_card = Some(seconds);
        self
    }

    pub fn with_subject(mut self, subject_id: Uuid) -> Self {
        self.subject_filter = Some(subject_id);
        self
    }

    /// Reject configs that could never produce a playable session.
    pub fn validate(&self) -> Result<()> {
        if self.total_cards == 0 {
            return Err(SessionError::InvalidConfig(
                "total_cards must be positive".to_string(),
            ));
        }
        if self.time_per_card == Some(0) {
            return Err(SessionError::InvalidConfig(
                "time_per_card must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of resolving a single card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub card_id: Uuid,
    pub is_correct: bool,
    pub points: u32,
    /// Similarity of the answer to the reference, `None` when the timer expired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    pub timed_out: bool,
}

/// Final result of a completed session, handed to the host for persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub total_cards: u32,
}
