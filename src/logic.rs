//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Serving the next problem for a session (engine + store)
//!   - Evaluating answers and applying the scoring curve
//!   - Producing a tip for a wrong answer (OpenAI with a static fallback)

use rand::{thread_rng, Rng};
use tracing::{error, info, instrument};

use crate::content::{CHEERS, FUNNY_FAILS, TIP_EMPTY_FALLBACK, TIP_ERROR_FALLBACK};
use crate::state::{AppState, GameSession};
use crate::util::normalize_answer;

/// Outcome of one answer, shared by the HTTP and WS reply shapes.
#[derive(Debug)]
pub struct Verdict {
  pub correct: bool,
  pub expected: String,
  pub mascot: String,
  pub session: GameSession,
  pub level_up: bool,
  pub high_score: u32,
}

/// Evaluate a submitted answer against the stored problem.
///
/// The comparison contract: string-coerce both sides, trim, uppercase,
/// equality. The problem leaves the store here; a second submission for the
/// same id is an error.
#[instrument(level = "info", skip(state, answer), fields(%session_id, %problem_id, answer_len = answer.len()))]
pub async fn evaluate_answer(
  state: &AppState,
  session_id: &str,
  problem_id: &str,
  answer: &str,
) -> Result<Verdict, String> {
  if state.get_session(session_id).await.is_none() {
    return Err(format!("Unknown sessionId: {}", session_id));
  }
  let Some(problem) = state.take_problem(problem_id).await else {
    return Err(format!("Unknown problemId: {}", problem_id));
  };

  let expected = problem.answer.normalized();
  let correct = normalize_answer(answer) == expected;
  let (session, level_up) = state
    .record_outcome(session_id, correct)
    .await
    .ok_or_else(|| format!("Unknown sessionId: {}", session_id))?;

  let mascot = {
    let mut rng = thread_rng();
    let pool = if correct { CHEERS } else { FUNNY_FAILS };
    pool[rng.gen_range(0..pool.len())].to_string()
  };

  info!(
    target: "problem",
    id = %problem_id,
    %correct,
    score = session.score,
    streak = session.streak,
    level = session.level,
    "Answer evaluated"
  );

  let high_score = *state.high_score.read().await;
  Ok(Verdict { correct, expected, mascot, session, level_up, high_score })
}

/// Tip for a wrong answer. Any OpenAI failure degrades to a static line; the
/// player-facing flow never sees an error.
#[instrument(level = "info", skip(state, question, wrong_answer), fields(question_len = question.len()))]
pub async fn get_tip_text(state: &AppState, question: &str, wrong_answer: &str) -> String {
  if let Some(oa) = &state.openai {
    match oa.math_tip(&state.prompts, question, wrong_answer).await {
      Ok(t) if !t.trim().is_empty() => return t,
      Ok(_) => return TIP_EMPTY_FALLBACK.into(),
      Err(e) => {
        error!(target: "math_pulse_backend", error = %e, "OpenAI math_tip failed; using static tip.");
      }
    }
  }
  TIP_ERROR_FALLBACK.into()
}
