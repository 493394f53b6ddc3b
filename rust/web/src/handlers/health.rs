use crate::session::SessionManager;
use serde::Serialize;
use warp::reply::Json;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    version: &'static str,
    active_sessions: usize,
}

/// Liveness probe; also reports how many sessions are open.
pub fn health(sessions: &SessionManager) -> Json {
    warp::reply::json(&HealthBody {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_sessions: sessions.active_sessions().len(),
    })
}
