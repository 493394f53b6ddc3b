pub mod game;
pub mod health;
pub mod rejection;
pub mod sse;

pub use game::{
    create_session, delete_session, get_session, get_session_state, join_game, leave_game,
    reset_game, set_ready, start_game, submit_move, CreateSessionRequest, JoinRequest,
    ReadyRequest, ResetRequest,
};
pub use health::health;
pub use rejection::{handle_rejection, json_body, json_or_default, BodyTooLarge, InvalidBody};
pub use sse::stream_events;
