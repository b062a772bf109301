//! Application state: in-memory stores, scoring config, prompts, and the
//! optional OpenAI client.
//!
//! This module owns:
//!   - the live problem store (by id, pruned as soon as a problem is answered)
//!   - game sessions (by id) and the global best-score counter
//!   - the prompts + scoring config (from TOML or defaults)
//!   - optional OpenAI client
//!
//! Problems are generated locally by the engine, so unlike a content-driven
//! trainer there is no generated-content pool to manage; the store only holds
//! problems that are currently awaiting an answer.

use std::{collections::HashMap, sync::Arc};

use rand::thread_rng;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::{load_game_config_from_env, Prompts, Scoring};
use crate::domain::{Difficulty, Mode, Problem};
use crate::engine::generate;
use crate::openai::OpenAI;

/// Per-player progress. The level derived from the score is what the engine
/// uses to scale operand magnitude upward.
#[derive(Clone, Debug, Serialize)]
pub struct GameSession {
    pub id: String,
    pub score: u32,
    pub streak: u32,
    pub level: u32,
    pub total_answered: u32,
    pub correct_answered: u32,
}

impl GameSession {
    pub fn new(id: String) -> Self {
        Self {
            id,
            score: 0,
            streak: 0,
            level: 1,
            total_answered: 0,
            correct_answered: 0,
        }
    }

    /// Apply a correct answer: base points plus a streak bonus that grows
    /// every `streak_bonus_every` answers. Returns true when this answer
    /// lifted the session to a new level.
    pub fn record_correct(&mut self, scoring: &Scoring) -> bool {
        self.total_answered += 1;
        self.correct_answered += 1;
        let bonus = self.streak / scoring.streak_bonus_every * scoring.streak_bonus_points;
        self.score += scoring.base_points + bonus;
        self.streak += 1;
        let new_level = self.score / scoring.score_per_level + 1;
        let leveled_up = new_level > self.level;
        self.level = new_level;
        leveled_up
    }

    /// A wrong answer resets the streak; score and level are kept.
    pub fn record_wrong(&mut self) {
        self.total_answered += 1;
        self.streak = 0;
    }

    /// Accuracy percentage, rounded; 100 before anything was answered.
    pub fn accuracy(&self) -> u32 {
        if self.total_answered == 0 {
            100
        } else {
            (self.correct_answered * 100 + self.total_answered / 2) / self.total_answered
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub problems: Arc<RwLock<HashMap<String, Problem>>>,
    pub sessions: Arc<RwLock<HashMap<String, GameSession>>>,
    pub high_score: Arc<RwLock<u32>>,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub scoring: Scoring,
}

impl AppState {
    /// Build state from env: load config and init the optional OpenAI client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_game_config_from_env().unwrap_or_default();

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "math_pulse_backend", base_url = %oa.base_url, tip_model = %oa.tip_model, "OpenAI tips enabled.");
        } else {
            info!(target: "math_pulse_backend", "OpenAI disabled (no OPENAI_API_KEY). Using static tips.");
        }

        Self {
            problems: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            high_score: Arc::new(RwLock::new(0)),
            openai,
            prompts: cfg.prompts,
            scoring: cfg.scoring,
        }
    }

    /// Create a fresh session and return its snapshot.
    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self) -> GameSession {
        let session = GameSession::new(Uuid::new_v4().to_string());
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        info!(target: "math_pulse_backend", id = %session.id, "Session created");
        session
    }

    /// Read-only snapshot of a session.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: &str) -> Option<GameSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Generate a problem for the session's current level and keep it until
    /// the answer comes back. None when the session is unknown.
    #[instrument(level = "info", skip(self), fields(%session_id, ?difficulty, ?mode))]
    pub async fn next_problem(
        &self,
        session_id: &str,
        difficulty: Difficulty,
        mode: Mode,
    ) -> Option<Problem> {
        let level = self.sessions.read().await.get(session_id)?.level;
        let problem = generate(&mut thread_rng(), difficulty, mode, level);
        self.problems
            .write()
            .await
            .insert(problem.id.clone(), problem.clone());
        info!(target: "problem", id = %problem.id, ?difficulty, ?mode, level, "Problem generated");
        Some(problem)
    }

    /// Take a problem out of the store; answered problems are not kept.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn take_problem(&self, id: &str) -> Option<Problem> {
        self.problems.write().await.remove(id)
    }

    /// Apply an answer outcome to the session and bump the global best score
    /// if needed. Returns the updated snapshot plus whether this answer
    /// leveled the player up.
    #[instrument(level = "debug", skip(self), fields(%session_id, correct))]
    pub async fn record_outcome(&self, session_id: &str, correct: bool) -> Option<(GameSession, bool)> {
        let snapshot = {
            let mut sessions = self.sessions.write().await;
            let session = sessions.get_mut(session_id)?;
            let leveled_up = if correct {
                session.record_correct(&self.scoring)
            } else {
                session.record_wrong();
                false
            };
            (session.clone(), leveled_up)
        };

        let mut best = self.high_score.write().await;
        if snapshot.0.score > *best {
            *best = snapshot.0.score;
        }
        Some(snapshot)
    }
}
