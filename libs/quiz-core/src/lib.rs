//! Core quiz library used by the memory cards backend.
//!
//! Provides:
//! - Answer scoring by containment and Levenshtein similarity
//! - The timed quiz session state machine
//! - Shared types (Card, SessionConfig, Verdict, SessionSummary)

pub mod error;
pub mod matching;
pub mod session;
pub mod types;

pub use error::{Result, SessionError};
pub use matching::{
    evaluate_answer, is_correct_answer, levenshtein_distance, normalized_similarity,
    AnswerEvaluation, MatchKind, SIMILARITY_THRESHOLD,
};
pub use session::{Advance, QuizSession, SessionStatus};
pub use types::{Card, SessionConfig, SessionSummary, Verdict};
