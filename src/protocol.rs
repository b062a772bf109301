//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::content::reward_for_accuracy;
use crate::domain::{AnswerValue, Difficulty, Mode, Op, Problem};
use crate::logic::Verdict;
use crate::state::GameSession;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    NewSession,
    NewProblem {
        #[serde(rename = "sessionId")]
        session_id: String,
        difficulty: Difficulty,
        mode: Mode,
    },
    SubmitAnswer {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "problemId")]
        problem_id: String,
        answer: String,
    },
    Tip {
        question: String,
        #[serde(rename = "wrongAnswer")]
        wrong_answer: String,
    },
    SessionState {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        session: SessionOut,
    },
    Problem {
        problem: ProblemOut,
    },
    AnswerResult {
        correct: bool,
        expected: String,
        mascot: String,
        score: u32,
        streak: u32,
        level: u32,
        #[serde(rename = "levelUp")]
        level_up: bool,
        accuracy: u32,
        #[serde(rename = "highScore")]
        high_score: u32,
    },
    Tip {
        text: String,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for problem delivery. The answer stays on
/// the server; evaluation goes through the answer endpoint.
#[derive(Debug, Serialize)]
pub struct ProblemOut {
    pub id: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<AnswerValue>>,
    pub operator: Op,
    pub difficulty: Difficulty,
    pub mode: Mode,
    #[serde(rename = "funnyObject", skip_serializing_if = "Option::is_none")]
    pub funny_object: Option<&'static str>,
}

/// Convert the full internal `Problem` to the public DTO.
pub fn to_out(p: &Problem) -> ProblemOut {
    ProblemOut {
        id: p.id.clone(),
        question: p.question.clone(),
        options: p.options.clone(),
        operator: p.operator,
        difficulty: p.difficulty,
        mode: p.mode,
        funny_object: p.funny_object,
    }
}

/// Session snapshot, including the accuracy-derived reward tier.
#[derive(Debug, Serialize)]
pub struct SessionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub score: u32,
    pub streak: u32,
    pub level: u32,
    pub accuracy: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    pub reward: RewardOut,
}

#[derive(Debug, Serialize)]
pub struct RewardOut {
    pub name: &'static str,
    pub badge: &'static str,
}

pub fn session_out(s: &GameSession, high_score: u32) -> SessionOut {
    let accuracy = s.accuracy();
    let (name, badge) = reward_for_accuracy(accuracy);
    SessionOut {
        session_id: s.id.clone(),
        score: s.score,
        streak: s.streak,
        level: s.level,
        accuracy,
        high_score,
        reward: RewardOut { name, badge },
    }
}

pub fn answer_result_ws(v: &Verdict) -> ServerWsMessage {
    ServerWsMessage::AnswerResult {
        correct: v.correct,
        expected: v.expected.clone(),
        mascot: v.mascot.clone(),
        score: v.session.score,
        streak: v.session.streak,
        level: v.session.level,
        level_up: v.level_up,
        accuracy: v.session.accuracy(),
        high_score: v.high_score,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ProblemQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub difficulty: Option<Difficulty>,
    pub mode: Option<Mode>,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "problemId")]
    pub problem_id: String,
    pub answer: String,
}
#[derive(Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    pub expected: String,
    pub mascot: String,
    pub score: u32,
    pub streak: u32,
    pub level: u32,
    #[serde(rename = "levelUp")]
    pub level_up: bool,
    pub accuracy: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
}

pub fn answer_out(v: &Verdict) -> AnswerOut {
    AnswerOut {
        correct: v.correct,
        expected: v.expected.clone(),
        mascot: v.mascot.clone(),
        score: v.session.score,
        streak: v.session.streak,
        level: v.session.level,
        level_up: v.level_up,
        accuracy: v.session.accuracy(),
        high_score: v.high_score,
    }
}

#[derive(Deserialize)]
pub struct TipIn {
    pub question: String,
    #[serde(rename = "wrongAnswer")]
    pub wrong_answer: String,
}
#[derive(Serialize)]
pub struct TipOut {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
