use crate::errors::IntoErrorResponse;
use crate::events::GameEvent;
use crate::session::{SessionId, SessionManager};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use warp::http;
use warp::reply::{self, Response};
use warp::sse;
use warp::Reply;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Streams a session's [`GameEvent`]s as server-sent events.
///
/// The stream opens with a `state_updated` event carrying the current
/// snapshot, then relays every broadcast until the session ends or the
/// client disconnects.
pub async fn stream_events(session_id: SessionId, sessions: Arc<SessionManager>) -> Response {
    let snapshot = match sessions.state(&session_id) {
        Ok(snapshot) => snapshot,
        Err(err) => return err.into_http_response(),
    };

    let subscription = sessions.event_bus().subscribe(session_id.clone());
    let initial = GameEvent::StateUpdated {
        session_id,
        state: Box::new(snapshot),
    };
    let stream = tokio_stream::once(initial)
        .chain(subscription)
        .map(|event| Ok::<_, Infallible>(render_event(event)));

    let keep_alive = sse::keep_alive()
        .interval(KEEP_ALIVE_INTERVAL)
        .text("keep-alive");

    let reply = sse::reply(keep_alive.stream(stream));
    reply::with_header(reply, http::header::CACHE_CONTROL, "no-cache").into_response()
}

fn render_event(event: GameEvent) -> sse::Event {
    let kind = event.kind();
    match serde_json::to_string(&event) {
        Ok(json) => sse::Event::default().event(kind).data(json),
        Err(err) => {
            tracing::error!(event_type = kind, error = %err, "failed to serialize game event");
            let fallback = serde_json::json!({
                "type": "error",
                "message": format!("failed to serialize game event: {err}")
            })
            .to_string();
            sse::Event::default().event("error").data(fallback)
        }
    }
}
