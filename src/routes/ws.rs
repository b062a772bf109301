//! WebSocket upgrade + message loop. Each client message is parsed as JSON
//! and forwarded to core logic. We reply with a single JSON message per
//! request.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{answer_result_ws, session_out, to_out, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "math_pulse_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "math_pulse_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target = "math_pulse_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => {
            error!(target: "math_pulse_backend", payload = %trunc_for_log(&txt, 120), error = %e, "WS invalid JSON");
            ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }
          }
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "math_pulse_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "math_pulse_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::NewSession => {
      let session = state.create_session().await;
      let high_score = *state.high_score.read().await;
      ServerWsMessage::Session { session: session_out(&session, high_score) }
    }

    ClientWsMessage::NewProblem { session_id, difficulty, mode } => {
      match state.next_problem(&session_id, difficulty, mode).await {
        Some(problem) => {
          tracing::info!(target: "problem", id = %problem.id, ?difficulty, ?mode, "WS problem served");
          ServerWsMessage::Problem { problem: to_out(&problem) }
        }
        None => ServerWsMessage::Error { message: format!("Unknown sessionId: {}", session_id) },
      }
    }

    ClientWsMessage::SubmitAnswer { session_id, problem_id, answer } => {
      match evaluate_answer(state, &session_id, &problem_id, &answer).await {
        Ok(verdict) => {
          tracing::info!(target: "problem", id = %problem_id, correct = verdict.correct, "WS submit_answer evaluated");
          answer_result_ws(&verdict)
        }
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::Tip { question, wrong_answer } => {
      let text = get_tip_text(state, &question, &wrong_answer).await;
      ServerWsMessage::Tip { text }
    }

    ClientWsMessage::SessionState { session_id } => match state.get_session(&session_id).await {
      Some(session) => {
        let high_score = *state.high_score.read().await;
        ServerWsMessage::Session { session: session_out(&session, high_score) }
      }
      None => ServerWsMessage::Error { message: format!("Unknown sessionId: {}", session_id) },
    },
  }
}
