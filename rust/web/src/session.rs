use crate::events::{EventBus, GameEvent};
use chrono::{SecondsFormat, Utc};
use hanabi_engine::engine::Game;
use hanabi_engine::errors::GameError;
use hanabi_engine::game::{EndReason, GameState};
use hanabi_engine::rules::{Move, MoveOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

pub type SessionId = String;

/// Idle time after which a session is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Owns every live game and announces each change on the [`EventBus`].
///
/// Each session holds its own [`Game`] behind a mutex, so moves on one
/// session are serialized while separate sessions proceed independently.
#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<GameSession>>>,
    event_bus: Arc<EventBus>,
    session_ttl: Duration,
}

impl SessionManager {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self::with_ttl(event_bus, DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(event_bus: Arc<EventBus>, ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            event_bus,
            session_ttl: ttl,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Opens a lobby for a fresh game. A missing seed is drawn at random.
    pub fn create_session(&self, config: GameConfig) -> Result<SessionId, SessionError> {
        let id = Uuid::new_v4().to_string();
        let seed = config.seed.unwrap_or_else(rand::random);

        tracing::info!(session_id = %id, seed, "creating new game session");

        let session = Arc::new(GameSession::new(id.clone(), seed));
        let game = session
            .game
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)?;
        self.sessions
            .write()
            .map_err(|_| SessionError::StoragePoisoned)?
            .insert(id.clone(), Arc::clone(&session));

        self.event_bus.broadcast(
            &id,
            GameEvent::SessionCreated {
                session_id: id.clone(),
                seed,
            },
        );
        self.announce_state(GameStateResponse::from_game(&id, &game));
        drop(game);
        Ok(id)
    }

    pub fn get_session(&self, session_id: &SessionId) -> Result<Arc<GameSession>, SessionError> {
        let guard = self
            .sessions
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        guard
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))
    }

    pub fn state(&self, session_id: &SessionId) -> Result<GameStateResponse, SessionError> {
        let session = self.live_session(session_id)?;
        session.snapshot()
    }

    pub fn info(&self, session_id: &SessionId) -> Result<SessionInfo, SessionError> {
        let session = self.live_session(session_id)?;
        Ok(SessionInfo {
            session_id: session.id.clone(),
            seed: session.seed()?,
            created_at: session.created_at.clone(),
            state: session.snapshot()?,
        })
    }

    pub fn join(&self, session_id: &SessionId, name: &str) -> Result<GameStateResponse, SessionError> {
        let (_, snapshot) = self.mutate(
            session_id,
            |game| game.add_player(name),
            |_, _| {
                vec![GameEvent::PlayerJoined {
                    session_id: session_id.clone(),
                    name: name.to_string(),
                }]
            },
        )?;
        tracing::info!(session_id = %session_id, player = name, "player joined");
        Ok(snapshot)
    }

    pub fn leave(&self, session_id: &SessionId, name: &str) -> Result<GameStateResponse, SessionError> {
        let (_, snapshot) = self.mutate(
            session_id,
            |game| game.remove_player(name),
            |_, _| {
                vec![GameEvent::PlayerLeft {
                    session_id: session_id.clone(),
                    name: name.to_string(),
                }]
            },
        )?;
        tracing::info!(session_id = %session_id, player = name, "player left");
        Ok(snapshot)
    }

    pub fn set_ready(
        &self,
        session_id: &SessionId,
        name: &str,
        ready: bool,
    ) -> Result<GameStateResponse, SessionError> {
        let (_, snapshot) = self.mutate(
            session_id,
            |game| game.set_ready(name, ready),
            |_, _| {
                vec![GameEvent::PlayerReady {
                    session_id: session_id.clone(),
                    name: name.to_string(),
                    ready,
                }]
            },
        )?;
        Ok(snapshot)
    }

    pub fn start(&self, session_id: &SessionId) -> Result<GameStateResponse, SessionError> {
        let (_, snapshot) = self.mutate(session_id, Game::start, |_, snapshot| {
            vec![GameEvent::GameStarted {
                session_id: session_id.clone(),
                players: snapshot
                    .state
                    .players()
                    .iter()
                    .map(|p| p.name.clone())
                    .collect(),
                first_player: snapshot.state.current_player().map(str::to_string),
            }]
        })?;
        tracing::info!(
            session_id = %session_id,
            players = snapshot.state.players().len(),
            "game started"
        );
        Ok(snapshot)
    }

    /// Applies `mv` for whoever holds the turn. A rejected move changes
    /// nothing and broadcasts nothing.
    pub fn apply_move(&self, session_id: &SessionId, mv: Move) -> Result<MoveOutcome, SessionError> {
        let (outcome, snapshot) = self.mutate(
            session_id,
            |game| game.apply(mv),
            |outcome: &MoveOutcome, snapshot| {
                let mut events = vec![GameEvent::MoveApplied {
                    session_id: session_id.clone(),
                    outcome: outcome.clone(),
                }];
                if let Some(reason) = outcome.ended {
                    events.push(GameEvent::GameEnded {
                        session_id: session_id.clone(),
                        score: Some(snapshot.score),
                        reason: end_reason_code(reason).to_string(),
                    });
                }
                events
            },
        )?;
        tracing::debug!(
            session_id = %session_id,
            player = %outcome.player,
            "move applied"
        );
        if let Some(reason) = outcome.ended {
            tracing::info!(
                session_id = %session_id,
                score = snapshot.score,
                reason = end_reason_code(reason),
                "game over"
            );
        }
        Ok(outcome)
    }

    /// Rebuilds the session's game from `seed`, or from its current seed.
    /// Seated players are kept and the new game waits in the lobby.
    pub fn reset(
        &self,
        session_id: &SessionId,
        seed: Option<u64>,
    ) -> Result<GameStateResponse, SessionError> {
        let (seed, snapshot) = self.mutate(
            session_id,
            |game| {
                let seed = seed.unwrap_or_else(|| game.current().seed());
                let names: Vec<String> = game
                    .current()
                    .players()
                    .iter()
                    .map(|p| p.name.clone())
                    .collect();
                let mut fresh = Game::new(seed);
                for name in &names {
                    fresh.add_player(name)?;
                }
                *game = fresh;
                Ok(seed)
            },
            |&seed, _| {
                vec![GameEvent::GameReset {
                    session_id: session_id.clone(),
                    seed,
                }]
            },
        )?;
        tracing::info!(session_id = %session_id, seed, "game reset");
        Ok(snapshot)
    }

    pub fn delete_session(&self, session_id: &SessionId) -> Result<(), SessionError> {
        if self.end_session(session_id, "terminated_by_request")? {
            tracing::info!(session_id = %session_id, "session deleted");
            Ok(())
        } else {
            Err(SessionError::NotFound(session_id.clone()))
        }
    }

    pub fn cleanup_expired_sessions(&self) -> usize {
        let mut expired = Vec::new();
        {
            let mut guard = match self.sessions.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.retain(|id, session| {
                if session.is_expired(self.session_ttl) {
                    expired.push(id.clone());
                    false
                } else {
                    true
                }
            });
        }

        for id in &expired {
            tracing::info!(session_id = %id, "session expired");
            self.event_bus.broadcast(id, game_ended(id, "expired"));
            self.event_bus.drop_session(id);
        }
        expired.len()
    }

    pub fn active_sessions(&self) -> Vec<SessionId> {
        match self.sessions.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    fn live_session(&self, session_id: &SessionId) -> Result<Arc<GameSession>, SessionError> {
        let session = self.get_session(session_id)?;
        if session.is_expired(self.session_ttl) {
            self.end_session(session_id, "expired")?;
            return Err(SessionError::Expired(session_id.clone()));
        }
        session.touch();
        Ok(session)
    }

    /// Runs `apply` under the session's game lock and, if it succeeds,
    /// broadcasts the events from `announce` followed by the new snapshot
    /// before the lock is released. Subscribers therefore see mutations of
    /// one session in the order they were applied.
    fn mutate<T>(
        &self,
        session_id: &SessionId,
        apply: impl FnOnce(&mut Game) -> Result<T, GameError>,
        announce: impl FnOnce(&T, &GameStateResponse) -> Vec<GameEvent>,
    ) -> Result<(T, GameStateResponse), SessionError> {
        let session = self.live_session(session_id)?;
        let mut game = session
            .game
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)?;
        let value = apply(&mut game)?;
        let snapshot = GameStateResponse::from_game(session_id, &game);
        for event in announce(&value, &snapshot) {
            self.event_bus.broadcast(session_id, event);
        }
        self.announce_state(snapshot.clone());
        drop(game);
        Ok((value, snapshot))
    }

    fn announce_state(&self, snapshot: GameStateResponse) {
        let session_id = snapshot.session_id.clone();
        self.event_bus.broadcast(
            &session_id,
            GameEvent::StateUpdated {
                session_id: session_id.clone(),
                state: Box::new(snapshot),
            },
        );
    }

    /// Removes the session, tells its subscribers why and closes their
    /// streams. Returns whether there was anything to remove.
    fn end_session(&self, session_id: &SessionId, reason: &str) -> Result<bool, SessionError> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| SessionError::StoragePoisoned)?
            .remove(session_id);
        if removed.is_some() {
            self.event_bus
                .broadcast(session_id, game_ended(session_id, reason));
            self.event_bus.drop_session(session_id);
        }
        Ok(removed.is_some())
    }
}

fn game_ended(session_id: &SessionId, reason: &str) -> GameEvent {
    GameEvent::GameEnded {
        session_id: session_id.clone(),
        score: None,
        reason: reason.to_string(),
    }
}

/// Snake-case name of an end reason, as used in events and logs.
pub fn end_reason_code(reason: EndReason) -> &'static str {
    match reason {
        EndReason::UnwinnablePile { .. } => "unwinnable_pile",
        EndReason::OutOfLives => "out_of_lives",
        EndReason::AllPilesComplete => "all_piles_complete",
        EndReason::DeckExhausted => "deck_exhausted",
    }
}

pub struct GameSession {
    id: SessionId,
    game: Mutex<Game>,
    created_at: String,
    last_active: Mutex<Instant>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    fn new(id: SessionId, seed: u64) -> Self {
        Self {
            id,
            game: Mutex::new(Game::new(seed)),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            last_active: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    fn seed(&self) -> Result<u64, SessionError> {
        let game = self
            .game
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)?;
        Ok(game.current().seed())
    }

    fn snapshot(&self) -> Result<GameStateResponse, SessionError> {
        let game = self
            .game
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)?;
        Ok(GameStateResponse::from_game(&self.id, &game))
    }

    fn touch(&self) {
        if let Ok(mut guard) = self.last_active.lock() {
            *guard = Instant::now();
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        match self.last_active.lock() {
            Ok(last) => last.elapsed() >= ttl,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
impl GameSession {
    fn force_last_active(&self, instant: Instant) {
        if let Ok(mut guard) = self.last_active.lock() {
            *guard = instant;
        }
    }
}

/// Options for a new session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub seed: Option<u64>,
}

/// The full table as clients see it, plus derived figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateResponse {
    pub session_id: SessionId,
    pub score: u32,
    pub moves_made: usize,
    pub state: GameState,
}

impl GameStateResponse {
    fn from_game(session_id: &SessionId, game: &Game) -> Self {
        Self {
            session_id: session_id.clone(),
            score: game.score(),
            moves_made: game.history().len(),
            state: game.current().clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub seed: u64,
    /// RFC 3339 creation time
    pub created_at: String,
    pub state: GameStateResponse,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
    #[error("Session expired: {0}")]
    Expired(SessionId),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Session storage poisoned")]
    StoragePoisoned,
}

impl crate::errors::IntoErrorResponse for SessionError {
    fn status_code(&self) -> warp::http::StatusCode {
        use warp::http::StatusCode;
        match self {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::Expired(_) => StatusCode::GONE,
            SessionError::Game(err) => match err {
                GameError::NotStarted
                | GameError::AlreadyStarted
                | GameError::GameOver
                | GameError::PlayerExists(_)
                | GameError::TableFull { .. } => StatusCode::CONFLICT,
                GameError::NoPlayers
                | GameError::PlayerNotFound(_)
                | GameError::CardIndexOutOfRange { .. }
                | GameError::NoInfoTokens
                | GameError::CannotClueSelf
                | GameError::UnknownClueKind(_)
                | GameError::UnknownColour(_) => StatusCode::BAD_REQUEST,
            },
            SessionError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NotFound(_) => "session_not_found",
            SessionError::Expired(_) => "session_expired",
            SessionError::Game(err) => match err {
                GameError::NotStarted => "game_not_started",
                GameError::AlreadyStarted => "game_already_started",
                GameError::GameOver => "game_over",
                GameError::NoPlayers => "no_players",
                GameError::PlayerExists(_) => "player_exists",
                GameError::PlayerNotFound(_) => "player_not_found",
                GameError::TableFull { .. } => "table_full",
                GameError::CardIndexOutOfRange { .. } => "card_index_out_of_range",
                GameError::NoInfoTokens => "no_info_tokens",
                GameError::CannotClueSelf => "cannot_clue_self",
                GameError::UnknownClueKind(_) => "unknown_clue_kind",
                GameError::UnknownColour(_) => "unknown_colour",
            },
            SessionError::StoragePoisoned => "session_storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            SessionError::NotFound(id) => Some(serde_json::json!({
                "session_id": id
            })),
            SessionError::Expired(id) => Some(serde_json::json!({
                "session_id": id,
                "reason": "Session expired due to inactivity"
            })),
            SessionError::Game(GameError::CardIndexOutOfRange { index, hand_size }) => {
                Some(serde_json::json!({
                    "index": index,
                    "hand_size": hand_size
                }))
            }
            SessionError::Game(GameError::PlayerNotFound(name))
            | SessionError::Game(GameError::PlayerExists(name)) => Some(serde_json::json!({
                "player": name
            })),
            SessionError::Game(GameError::TableFull { max }) => Some(serde_json::json!({
                "max_players": max
            })),
            _ => None,
        }
    }

    fn severity(&self) -> crate::errors::ErrorSeverity {
        use crate::errors::ErrorSeverity;
        match self {
            SessionError::StoragePoisoned => ErrorSeverity::Critical,
            _ => ErrorSeverity::Client,
        }
    }
}
