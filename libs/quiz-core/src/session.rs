//! Timed quiz session state machine.
//!
//! A session walks an ordered list of cards. Each card starts unanswered,
//! is resolved exactly once (by [`QuizSession::submit_answer`] or
//! [`QuizSession::expire_timer`]) and then revealed until the host calls
//! [`QuizSession::advance`]. Advancing past the last card completes the
//! session and yields a [`SessionSummary`].
//!
//! The countdown is driven from outside: the host calls
//! [`QuizSession::tick`] once per second and [`QuizSession::expire_timer`]
//! when [`QuizSession::is_timer_expired`] reports zero time left.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::matching::evaluate_answer;
use crate::types::{Card, SessionConfig, SessionSummary, Verdict};

/// Where the session stands with respect to the current card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Waiting for an answer (or for the timer to run out).
    Unanswered,
    /// Verdict computed and shown; waiting for `advance`.
    Revealed,
    /// Every card has been visited.
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unanswered => "unanswered",
            Self::Revealed => "revealed",
            Self::Completed => "completed",
        }
    }
}

/// Result of [`QuizSession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The next card is now active.
    Next,
    /// The last card was left; the session is over.
    Completed(SessionSummary),
}

/// A single quiz run over a fixed set of cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    cards: Vec<Card>,
    config: SessionConfig,
    current_index: usize,
    score: u32,
    correct_count: u32,
    wrong_count: u32,
    time_remaining: Option<u32>,
    pending_answer: String,
    revealed: bool,
    last_verdict: Option<Verdict>,
}

impl QuizSession {
    /// Start a session over `cards`, keeping only the configured subject and
    /// at most `config.total_cards` cards, in the given order.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for a zero card count or time limit, `EmptyCardSet`
    /// when no card survives filtering.
    pub fn start(cards: Vec<Card>, config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let mut cards: Vec<Card> = match config.subject_filter {
            Some(subject_id) => cards
                .into_iter()
                .filter(|c| c.subject_id == subject_id)
                .collect(),
            None => cards,
        };
        cards.truncate(config.total_cards);

        if cards.is_empty() {
            return Err(SessionError::EmptyCardSet);
        }

        Ok(Self {
            cards,
            time_remaining: config.time_per_card,
            config,
            current_index: 0,
            score: 0,
            correct_count: 0,
            wrong_count: 0,
            pending_answer: String::new(),
            revealed: false,
            last_verdict: None,
        })
    }

    pub fn status(&self) -> SessionStatus {
        if self.current_index >= self.cards.len() {
            SessionStatus::Completed
        } else if self.revealed {
            SessionStatus::Revealed
        } else {
            SessionStatus::Unanswered
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status() == SessionStatus::Completed
    }

    pub fn is_revealed(&self) -> bool {
        self.status() == SessionStatus::Revealed
    }

    /// Card currently shown, `None` once completed.
    pub fn current_card(&self) -> Option<&Card> {
        self.cards.get(self.current_index)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.time_remaining
    }

    pub fn pending_answer(&self) -> &str {
        &self.pending_answer
    }

    /// Verdict of the current card while it is revealed.
    pub fn last_verdict(&self) -> Option<&Verdict> {
        self.last_verdict.as_ref()
    }

    /// True when a timed card ran out of time and still awaits `expire_timer`.
    pub fn is_timer_expired(&self) -> bool {
        self.status() == SessionStatus::Unanswered && self.time_remaining == Some(0)
    }

    /// Final summary, available once completed.
    pub fn summary(&self) -> Option<SessionSummary> {
        self.is_completed().then(|| self.build_summary())
    }

    /// Record draft input for the current card. Ignored unless unanswered.
    pub fn update_pending_answer(&mut self, text: &str) {
        if self.status() == SessionStatus::Unanswered {
            self.pending_answer = text.to_string();
        }
    }

    /// Score `text` against the current card and reveal it.
    ///
    /// Blank input is a no-op and returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` when the card is already revealed or the
    /// session is completed.
    pub fn submit_answer(&mut self, text: &str) -> Result<Option<Verdict>> {
        self.require(SessionStatus::Unanswered, "submit an answer")?;

        if text.trim().is_empty() {
            return Ok(None);
        }

        let Some(card) = self.cards.get(self.current_index) else {
            return Err(self.invalid("submit an answer"));
        };
        let evaluation = evaluate_answer(text, &card.content);
        let verdict = Verdict {
            card_id: card.id,
            is_correct: evaluation.is_correct,
            points: if evaluation.is_correct { card.points() } else { 0 },
            similarity: Some(evaluation.similarity),
            timed_out: false,
        };

        self.pending_answer = text.to_string();
        Ok(Some(self.resolve(verdict)))
    }

    /// Resolve the current card as wrong because its time ran out.
    ///
    /// The pending answer is never scored.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` unless the card is unanswered with zero
    /// time remaining.
    pub fn expire_timer(&mut self) -> Result<Verdict> {
        self.require(SessionStatus::Unanswered, "expire the timer")?;

        match (self.time_remaining, self.cards.get(self.current_index)) {
            (Some(0), Some(card)) => {
                let verdict = Verdict {
                    card_id: card.id,
                    is_correct: false,
                    points: 0,
                    similarity: None,
                    timed_out: true,
                };
                Ok(self.resolve(verdict))
            }
            _ => Err(SessionError::InvalidStateTransition {
                operation: "expire the timer",
                state: "counting down",
            }),
        }
    }

    /// Move past the revealed card.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` unless the current card is revealed.
    pub fn advance(&mut self) -> Result<Advance> {
        self.require(SessionStatus::Revealed, "advance")?;

        self.current_index += 1;
        self.revealed = false;
        self.pending_answer.clear();
        self.last_verdict = None;

        if self.current_index >= self.cards.len() {
            self.time_remaining = None;
            return Ok(Advance::Completed(self.build_summary()));
        }

        self.time_remaining = self.config.time_per_card;
        Ok(Advance::Next)
    }

    /// One second passed. Only counts down an unanswered, timed card.
    pub fn tick(&mut self) {
        if self.status() != SessionStatus::Unanswered {
            return;
        }
        if let Some(remaining) = self.time_remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }

    fn resolve(&mut self, verdict: Verdict) -> Verdict {
        if verdict.is_correct {
            self.correct_count += 1;
            self.score += verdict.points;
        } else {
            self.wrong_count += 1;
        }
        self.revealed = true;
        self.last_verdict = Some(verdict.clone());
        verdict
    }

    fn require(&self, expected: SessionStatus, operation: &'static str) -> Result<()> {
        if self.status() == expected {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidStateTransition {
            operation,
            state: self.status().as_str(),
        }
    }

    fn build_summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            correct_count: self.correct_count,
            wrong_count: self.wrong_count,
            total_cards: u32::try_from(self.cards.len()).unwrap_or(u32::MAX),
        }
    }
}
