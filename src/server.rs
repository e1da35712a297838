//! HTTP transport: one request plays the human move and the agent's reply.

use crate::agent::{PayloadAgent, RemoteAgent};
use crate::games::tictactoe::{
    Board, CELL_COUNT, GameState, Mark, Outcome, Square, turn_owner, winner,
};
use crate::orchestrator::{Orchestrator, OrchestratorError};
use crate::protocol::ProtocolHandler;
use crate::sink::TracingSink;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const USAGE: &str = "agent_tictactoe\n\n\
    POST /move  {\"board\": [9 x \"\"|\"X\"|\"O\"], \"move\": 0-8}\n\
    \x20           -> {\"board\": [...], \"winner\": null|\"X\"|\"O\"|\"Draw\"}\n\
    GET  /health\n";

/// State shared by all requests.
#[derive(Debug, Clone)]
pub struct AppState {
    handler: Arc<ProtocolHandler>,
    human_mark: Mark,
}

impl AppState {
    /// Creates request state around a shared protocol handler.
    pub fn new(handler: Arc<ProtocolHandler>, human_mark: Mark) -> Self {
        Self {
            handler,
            human_mark,
        }
    }
}

/// Body of `POST /move`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    /// Current cells, row-major.
    pub board: [Square; CELL_COUNT],
    /// Cell chosen by the human.
    #[serde(rename = "move")]
    pub mv: i64,
}

/// Reply of `POST /move`.
#[derive(Debug, Clone, Serialize)]
pub struct MoveResponse {
    /// Cells after the step.
    pub board: Board,
    /// `null` while in progress, else `"X"`, `"O"` or `"Draw"`.
    pub winner: Option<&'static str>,
}

impl MoveResponse {
    fn new(board: Board, outcome: Outcome) -> Self {
        Self {
            board,
            winner: outcome.label(),
        }
    }
}

/// Request failures mapped to status codes.
#[derive(Debug)]
pub enum ApiError {
    /// The submitted board is not a valid position.
    BadRequest(String),
    /// The session failed while playing the step.
    Internal(OrchestratorError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(e) => {
                error!(error = %e, "Move request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Builds the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(usage))
        .route("/health", get(health))
        .route("/move", post(make_move))
        .with_state(state)
}

/// Binds `host:port` and serves until the process ends.
#[instrument(skip(state))]
pub async fn serve(host: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Listening on http://{}:{}/", host, port);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn usage() -> &'static str {
    USAGE
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip_all, fields(mv = req.mv))]
async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let board = Board::from_cells(req.board).map_err(|e| {
        warn!(error = %e, "Rejected board");
        ApiError::BadRequest(e.to_string())
    })?;

    let outcome = winner(&board);
    if outcome.is_terminal() {
        info!(?outcome, "Game already over, board unchanged");
        return Ok(Json(MoveResponse::new(board, outcome)));
    }

    let placements = if turn_owner(&board) == state.human_mark {
        2
    } else {
        debug!("Agent to move, request move ignored");
        1
    };
    // Negative indices are as illegal as out-of-range ones.
    let mv = usize::try_from(req.mv).unwrap_or(usize::MAX);

    let mut orchestrator = Orchestrator::from_state(
        GameState::from_board(board),
        Box::new(PayloadAgent::new("web", mv)),
        Box::new(RemoteAgent::new("agent", state.handler.clone())),
        Box::new(TracingSink),
    )
    .with_human_mark(state.human_mark);

    orchestrator.advance(placements).await.map_err(ApiError::Internal)?;

    let state = orchestrator.into_state();
    Ok(Json(MoveResponse::new(state.board().clone(), state.outcome())))
}
