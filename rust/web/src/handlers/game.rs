use crate::errors::IntoErrorResponse;
use crate::session::{GameConfig, SessionError, SessionId, SessionManager};
use hanabi_engine::rules::Move;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadyRequest {
    pub ready: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Creates a session in the lobby.
///
/// - **Method**: POST `/api/sessions`
/// - **Body**: `{"seed": 42}`, or empty for a random seed
/// - **Success**: 201 with the session info and snapshot
pub async fn create_session(
    sessions: Arc<SessionManager>,
    request: CreateSessionRequest,
) -> Response {
    let config = GameConfig { seed: request.seed };
    match sessions
        .create_session(config)
        .and_then(|id| sessions.info(&id))
    {
        Ok(info) => success_response(StatusCode::CREATED, info),
        Err(err) => session_error(err),
    }
}

/// Session seed, creation time and snapshot.
///
/// - **Method**: GET `/api/sessions/{session_id}`
/// - **Errors**: 404 `session_not_found`, 410 `session_expired`
pub async fn get_session(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.info(&session_id) {
        Ok(info) => success_response(StatusCode::OK, info),
        Err(err) => session_error(err),
    }
}

pub async fn get_session_state(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.state(&session_id) {
        Ok(state) => success_response(StatusCode::OK, state),
        Err(err) => session_error(err),
    }
}

/// Seats a player before the game starts.
///
/// - **Method**: POST `/api/sessions/{session_id}/players`
/// - **Body**: `{"name": "nick"}`
/// - **Errors**: 409 `player_exists`, `table_full` or `game_already_started`;
///   400 `invalid_request` for a blank name
pub async fn join_game(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    request: JoinRequest,
) -> Response {
    let name = request.name.trim();
    if name.is_empty() {
        return crate::errors::ErrorResponse::new("invalid_request", "Player name is empty")
            .into_response(StatusCode::BAD_REQUEST);
    }
    match sessions.join(&session_id, name) {
        Ok(state) => success_response(StatusCode::CREATED, state),
        Err(err) => session_error(err),
    }
}

pub async fn leave_game(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    name: String,
) -> Response {
    match sessions.leave(&session_id, &name) {
        Ok(state) => success_response(StatusCode::OK, state),
        Err(err) => session_error(err),
    }
}

pub async fn set_ready(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    name: String,
    request: ReadyRequest,
) -> Response {
    match sessions.set_ready(&session_id, &name, request.ready) {
        Ok(state) => success_response(StatusCode::OK, state),
        Err(err) => session_error(err),
    }
}

/// Deals the opening hands; the first player to join moves first.
///
/// - **Method**: POST `/api/sessions/{session_id}/start`
/// - **Errors**: 409 `game_already_started`, 400 `no_players`
pub async fn start_game(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.start(&session_id) {
        Ok(state) => success_response(StatusCode::OK, state),
        Err(err) => session_error(err),
    }
}

/// Applies a move for the player whose turn it is.
///
/// - **Method**: POST `/api/sessions/{session_id}/moves`
/// - **Body**: one of
///   `{"type": "play", "card_index": 0}`,
///   `{"type": "discard", "card_index": 0}`,
///   `{"type": "clue", "kind": "number", "target": "nick2", "card_index": 0}`
/// - **Success**: 200 with the move outcome
/// - **Errors**: 409 `game_not_started` or `game_over`; 400
///   `card_index_out_of_range`, `player_not_found`, `cannot_clue_self` or
///   `no_info_tokens`
pub async fn submit_move(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    mv: Move,
) -> Response {
    match sessions.apply_move(&session_id, mv) {
        Ok(outcome) => success_response(StatusCode::OK, outcome),
        Err(err) => session_error(err),
    }
}

/// Starts over with the same players, back in the lobby.
///
/// - **Method**: POST `/api/sessions/{session_id}/reset`
/// - **Body**: `{"seed": 7}`, or empty to reuse the current seed
pub async fn reset_game(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    request: ResetRequest,
) -> Response {
    match sessions.reset(&session_id, request.seed) {
        Ok(state) => success_response(StatusCode::OK, state),
        Err(err) => session_error(err),
    }
}

/// Terminates a session; subscribers get a `game_ended` event.
///
/// - **Method**: DELETE `/api/sessions/{session_id}`
/// - **Success**: 204 with no body
pub async fn delete_session(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.delete_session(&session_id) {
        Ok(()) => reply::with_status(reply::reply(), StatusCode::NO_CONTENT).into_response(),
        Err(err) => session_error(err),
    }
}

fn success_response<T>(status: StatusCode, body: T) -> Response
where
    T: Serialize,
{
    reply::with_status(reply::json(&body), status).into_response()
}

fn session_error(err: SessionError) -> Response {
    err.into_http_response()
}
