//! In-memory registry of running quiz games.
//!
//! Each game wraps a [`QuizSession`] owned by one user. Timed games get a
//! ticker task that drives the countdown at 1 Hz and expires the card when
//! time runs out. The ticker only lives while a card is unanswered: it stops
//! on reveal and is respawned for the next card. Finished, abandoned or idle
//! games are dropped from the registry and their ticker is aborted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use quiz_core::{
    Advance, Card, QuizSession, SessionConfig, SessionError, SessionStatus, SessionSummary,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{CardPrompt, GameView, Reveal};

/// Games idle for longer than this are discarded.
const IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);
const TICK_INTERVAL: Duration = Duration::from_secs(1);
const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

struct ActiveGame {
    user_id: Uuid,
    session: QuizSession,
    ticker: Option<JoinHandle<()>>,
    last_activity: Instant,
}

impl ActiveGame {
    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

/// Outcome of moving past a revealed card.
#[derive(Debug)]
pub enum AdvanceOutcome {
    Next(GameView),
    /// The game is over and has been removed from the registry.
    Completed {
        summary: SessionSummary,
        config: SessionConfig,
    },
}

/// Shared registry of active games keyed by session id
#[derive(Clone, Default)]
pub struct GameRegistry {
    games: Arc<Mutex<HashMap<Uuid, ActiveGame>>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a game for `user_id` over the given cards.
    pub async fn start(
        &self,
        user_id: Uuid,
        cards: Vec<Card>,
        config: SessionConfig,
    ) -> Result<GameView> {
        let session = QuizSession::start(cards, config)?;
        let session_id = Uuid::new_v4();
        let timed = session.config().time_per_card.is_some();
        let view = build_view(session_id, &session);

        let mut games = self.games.lock().await;
        evict_idle(&mut games);

        games.insert(
            session_id,
            ActiveGame {
                user_id,
                session,
                ticker: timed.then(|| self.spawn_ticker(session_id)),
                last_activity: Instant::now(),
            },
        );

        tracing::info!(
            "Started game {} for user {} with {} cards",
            session_id,
            user_id,
            view.total_cards
        );

        Ok(view)
    }

    /// Current snapshot of a game.
    pub async fn view(&self, user_id: Uuid, session_id: Uuid) -> Result<GameView> {
        let mut games = self.games.lock().await;
        let game = owned_game(&mut games, user_id, session_id)?;
        Ok(build_view(session_id, &game.session))
    }

    /// Store draft input for the current card.
    pub async fn update_draft(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        answer: &str,
    ) -> Result<GameView> {
        let mut games = self.games.lock().await;
        let game = owned_game(&mut games, user_id, session_id)?;
        game.session.update_pending_answer(answer);
        Ok(build_view(session_id, &game.session))
    }

    /// Submit an answer for the current card.
    pub async fn submit(&self, user_id: Uuid, session_id: Uuid, answer: &str) -> Result<GameView> {
        let mut games = self.games.lock().await;
        let game = owned_game(&mut games, user_id, session_id)?;

        match game.session.submit_answer(answer) {
            Ok(Some(verdict)) => {
                game.stop_ticker();
                tracing::debug!(
                    "Game {} card {}: correct={} points={}",
                    session_id,
                    verdict.card_id,
                    verdict.is_correct,
                    verdict.points
                );
            }
            Ok(None) => {}
            Err(e) => return Err(rejected(session_id, e)),
        }

        Ok(build_view(session_id, &game.session))
    }

    /// Move past the revealed card, finishing the game on the last one.
    pub async fn advance(&self, user_id: Uuid, session_id: Uuid) -> Result<AdvanceOutcome> {
        let mut games = self.games.lock().await;
        let game = owned_game(&mut games, user_id, session_id)?;

        match game.session.advance() {
            Ok(Advance::Next) => {
                if game.session.config().time_per_card.is_some() {
                    game.ticker = Some(self.spawn_ticker(session_id));
                }
                Ok(AdvanceOutcome::Next(build_view(session_id, &game.session)))
            }
            Ok(Advance::Completed(summary)) => {
                let config = game.session.config().clone();
                if let Some(mut game) = games.remove(&session_id) {
                    game.stop_ticker();
                }
                tracing::info!(
                    "Game {} completed: score={} correct={} wrong={}",
                    session_id,
                    summary.score,
                    summary.correct_count,
                    summary.wrong_count
                );
                Ok(AdvanceOutcome::Completed { summary, config })
            }
            Err(e) => Err(rejected(session_id, e)),
        }
    }

    /// Discard a game without recording it.
    pub async fn abandon(&self, user_id: Uuid, session_id: Uuid) -> Result<()> {
        let mut games = self.games.lock().await;
        owned_game(&mut games, user_id, session_id)?;
        if let Some(mut game) = games.remove(&session_id) {
            game.stop_ticker();
        }
        tracing::info!("Game {} abandoned", session_id);
        Ok(())
    }

    /// Advance the countdown of one game by a second, expiring the card at zero.
    ///
    /// Returns false once the game is gone or no card is counting down.
    pub async fn tick(&self, session_id: Uuid) -> bool {
        let mut games = self.games.lock().await;
        let Some(game) = games.get_mut(&session_id) else {
            return false;
        };

        game.session.tick();
        if game.session.is_timer_expired() {
            match game.session.expire_timer() {
                Ok(verdict) => {
                    tracing::debug!("Game {} card {} timed out", session_id, verdict.card_id)
                }
                Err(e) => tracing::warn!("Game {} failed to expire timer: {}", session_id, e),
            }
        }

        let counting = game.session.status() == SessionStatus::Unanswered;
        if !counting {
            // The calling task ends on its own; detach its handle.
            game.ticker = None;
        }
        counting
    }

    /// Drop games idle past the timeout. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let mut games = self.games.lock().await;
        evict_idle(&mut games)
    }

    /// Periodically sweep idle games.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let evicted = registry.sweep().await;
                if evicted > 0 {
                    tracing::info!("Swept {} idle games", evicted);
                }
            }
        })
    }

    /// Number of games currently held.
    pub async fn active_count(&self) -> usize {
        self.games.lock().await.len()
    }

    fn spawn_ticker(&self, session_id: Uuid) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if !registry.tick(session_id).await {
                    break;
                }
            }
        })
    }
}

fn owned_game(
    games: &mut HashMap<Uuid, ActiveGame>,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<&mut ActiveGame> {
    match games.get_mut(&session_id) {
        Some(game) if game.user_id == user_id => {
            game.last_activity = Instant::now();
            Ok(game)
        }
        _ => Err(ApiError::NotFound(format!("Game {}", session_id))),
    }
}

fn evict_idle(games: &mut HashMap<Uuid, ActiveGame>) -> usize {
    let before = games.len();
    games.retain(|id, game| {
        let keep = game.last_activity.elapsed() < IDLE_TIMEOUT;
        if !keep {
            tracing::info!("Discarding idle game {}", id);
            game.stop_ticker();
        }
        keep
    });
    before - games.len()
}

fn rejected(session_id: Uuid, error: SessionError) -> ApiError {
    tracing::warn!("Game {} rejected operation: {}", session_id, error);
    ApiError::Session(error)
}

/// Snapshot a session for clients. The reference content stays hidden until
/// the card is revealed.
pub fn build_view(session_id: Uuid, session: &QuizSession) -> GameView {
    let card = session.current_card();

    GameView {
        session_id,
        status: session.status(),
        current_index: session.current_index(),
        total_cards: session.total_cards(),
        score: session.score(),
        correct_count: session.correct_count(),
        wrong_count: session.wrong_count(),
        time_remaining: session.time_remaining(),
        pending_answer: session.pending_answer().to_string(),
        card: card.map(|c| CardPrompt {
            id: c.id,
            title: c.title.clone(),
            difficulty: c.difficulty,
            points: c.points(),
        }),
        reveal: match (card, session.last_verdict()) {
            (Some(c), Some(verdict)) if session.is_revealed() => Some(Reveal {
                verdict: verdict.clone(),
                answer: session.pending_answer().to_string(),
                reference: c.content.clone(),
            }),
            _ => None,
        },
    }
}
