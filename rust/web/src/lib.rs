//! HTTP session server for the hanabi engine.
//!
//! Each session wraps one [`hanabi_engine::engine::Game`]; clients mutate it
//! through JSON endpoints and follow it through a server-sent event stream.

pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod session;

pub use errors::{ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use events::{EventBus, EventSubscription, GameEvent};
pub use logging::{init_logging, init_test_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use middleware::{log_response, with_request_logging};
pub use server::{AppContext, ServerConfig, ServerError, ServerHandle, WebServer};
pub use session::{
    end_reason_code, GameConfig, GameStateResponse, SessionError, SessionId, SessionInfo,
    SessionManager, DEFAULT_SESSION_TTL,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_provides_shared_components() {
        let ctx = AppContext::new_for_tests();

        let event_bus = ctx.event_bus();
        let sessions = ctx.sessions();

        assert_eq!(event_bus.subscriber_count(), 0);
        assert!(sessions.active_sessions().is_empty());
        assert_eq!(sessions.session_ttl(), DEFAULT_SESSION_TTL);
    }

    #[test]
    fn context_shares_one_event_bus_with_its_sessions() {
        let ctx = AppContext::new_for_tests();
        let id = ctx
            .sessions()
            .create_session(GameConfig { seed: Some(1) })
            .expect("create session");

        let _sub = ctx.event_bus().subscribe(id);
        assert_eq!(ctx.sessions().event_bus().subscriber_count(), 1);
    }
}
