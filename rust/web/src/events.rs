use crate::session::{GameStateResponse, SessionId};
use hanabi_engine::rules::MoveOutcome;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;

// Bounded so a stalled client cannot grow memory without limit; a full
// channel gets the subscriber pruned.
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<GameEvent>;
pub type EventReceiver = mpsc::Receiver<GameEvent>;

/// Receiving end of a session's event stream. Dropping it unsubscribes.
pub struct EventSubscription {
    bus: EventBus,
    session_id: SessionId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl Stream for EventSubscription {
    type Item = GameEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<GameEvent>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.session_id, self.subscriber_id);
    }
}

/// Per-session fan-out of [`GameEvent`]s to every connected client.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<SessionId, Vec<(usize, EventSender)>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, session_id: SessionId) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(session_id.clone());
        EventSubscription {
            bus: self.clone(),
            session_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, session_id: SessionId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.write()
            .entry(session_id.clone())
            .or_default()
            .push((id, tx));

        tracing::info!(
            session_id = %session_id,
            subscriber_id = id,
            "client subscribed to game events"
        );

        (id, rx)
    }

    pub fn broadcast(&self, session_id: &SessionId, event: GameEvent) {
        tracing::debug!(
            session_id = %session_id,
            event_type = event.kind(),
            "broadcasting game event"
        );

        let subscribers = self.read().get(session_id).cloned();

        let Some(list) = subscribers else {
            tracing::trace!(session_id = %session_id, "no subscribers for session");
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    session_id = %session_id,
                    subscriber_id = id,
                    error = %e,
                    "failed to send event to subscriber"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(session_id, &failed);
        }
    }

    pub fn unsubscribe(&self, session_id: &SessionId, subscriber_id: usize) {
        self.remove_subscribers(session_id, &[subscriber_id]);
    }

    /// Forgets every subscriber of `session_id`, closing their streams.
    pub fn drop_session(&self, session_id: &SessionId) {
        self.write().remove(session_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.read().values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, session_id: &SessionId, ids: &[usize]) {
        let mut guard = self.write();
        if let Some(list) = guard.get_mut(session_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(session_id);
            }
        }
    }

    // A panic while holding the lock leaves the map itself consistent, so
    // poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<SessionId, Vec<(usize, EventSender)>>> {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, Vec<(usize, EventSender)>>> {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Everything a client watching a session is told.
///
/// Every mutation emits its specific event followed by
/// [`GameEvent::StateUpdated`] with the full snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    SessionCreated {
        session_id: SessionId,
        seed: u64,
    },
    PlayerJoined {
        session_id: SessionId,
        name: String,
    },
    PlayerLeft {
        session_id: SessionId,
        name: String,
    },
    PlayerReady {
        session_id: SessionId,
        name: String,
        ready: bool,
    },
    GameStarted {
        session_id: SessionId,
        players: Vec<String>,
        first_player: Option<String>,
    },
    MoveApplied {
        session_id: SessionId,
        outcome: MoveOutcome,
    },
    GameEnded {
        session_id: SessionId,
        score: Option<u32>,
        reason: String,
    },
    GameReset {
        session_id: SessionId,
        seed: u64,
    },
    StateUpdated {
        session_id: SessionId,
        state: Box<GameStateResponse>,
    },
    Error {
        session_id: SessionId,
        message: String,
    },
}

impl GameEvent {
    /// The serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::SessionCreated { .. } => "session_created",
            GameEvent::PlayerJoined { .. } => "player_joined",
            GameEvent::PlayerLeft { .. } => "player_left",
            GameEvent::PlayerReady { .. } => "player_ready",
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::MoveApplied { .. } => "move_applied",
            GameEvent::GameEnded { .. } => "game_ended",
            GameEvent::GameReset { .. } => "game_reset",
            GameEvent::StateUpdated { .. } => "state_updated",
            GameEvent::Error { .. } => "error",
        }
    }
}
