//! HTTP endpoint handlers. These are thin wrappers that forward to core
//! logic; each handler is instrumented and logs parameters and basic result
//! info.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::domain::{Difficulty, Mode};
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let session = state.create_session().await;
  let high_score = *state.high_score.read().await;
  Json(session_out(&session, high_score))
}

#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SessionQuery>,
) -> impl IntoResponse {
  match state.get_session(&q.session_id).await {
    Some(session) => {
      let high_score = *state.high_score.read().await;
      Json(session_out(&session, high_score)).into_response()
    }
    None => not_found(format!("Unknown sessionId: {}", q.session_id)),
  }
}

#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_get_problem(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProblemQuery>,
) -> impl IntoResponse {
  let difficulty = q.difficulty.unwrap_or(Difficulty::Easy);
  let mode = q.mode.unwrap_or(Mode::Choice);
  match state.next_problem(&q.session_id, difficulty, mode).await {
    Some(problem) => {
      info!(target: "problem", id = %problem.id, ?difficulty, ?mode, "HTTP problem served");
      Json(to_out(&problem)).into_response()
    }
    None => not_found(format!("Unknown sessionId: {}", q.session_id)),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, %body.problem_id, answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> impl IntoResponse {
  match evaluate_answer(&state, &body.session_id, &body.problem_id, &body.answer).await {
    Ok(verdict) => {
      info!(target: "problem", id = %body.problem_id, correct = verdict.correct, "HTTP submit_answer evaluated");
      Json(answer_out(&verdict)).into_response()
    }
    Err(message) => not_found(message),
  }
}

#[instrument(level = "info", skip(state, body), fields(question_len = body.question.len()))]
pub async fn http_post_tip(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TipIn>,
) -> impl IntoResponse {
  let text = get_tip_text(&state, &body.question, &body.wrong_answer).await;
  Json(TipOut { text })
}

fn not_found(message: String) -> axum::response::Response {
  (StatusCode::NOT_FOUND, Json(ErrorOut { message })).into_response()
}
