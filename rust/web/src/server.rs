use crate::events::EventBus;
use crate::handlers;
use crate::middleware::with_request_logging;
use crate::session::{SessionError, SessionId, SessionManager, DEFAULT_SESSION_TTL};
use hanabi_engine::rules::Move;
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::reply::{Reply, Response};
use warp::Filter;

const MAX_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    session_ttl: Duration,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Loopback on an ephemeral port.
    pub fn for_tests() -> Self {
        Self::new("127.0.0.1", 0)
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// How often idle sessions are swept: half the TTL, between one second
    /// and one minute.
    pub fn cleanup_interval(&self) -> Duration {
        (self.session_ttl / 2).clamp(Duration::from_secs(1), MAX_CLEANUP_INTERVAL)
    }
}

/// Shared state handed to every route.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: ServerConfig,
    event_bus: Arc<EventBus>,
    sessions: Arc<SessionManager>,
}

impl AppContext {
    pub fn new(config: ServerConfig) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let sessions = Arc::new(SessionManager::with_ttl(
            Arc::clone(&event_bus),
            config.session_ttl(),
        ));
        Self::new_with_dependencies(config, event_bus, sessions)
    }

    pub fn new_with_dependencies(
        config: ServerConfig,
        event_bus: Arc<EventBus>,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            config,
            event_bus,
            sessions,
        }
    }

    pub fn new_for_tests() -> Self {
        Self::new(ServerConfig::for_tests())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Session error: {0}")]
    SessionError(#[from] SessionError),
}

#[derive(Debug, Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            context: AppContext::new(config),
        }
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Binds, spawns the server and the idle-session sweeper, and returns
    /// a handle that stops both.
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let config = context.config().clone();
        let bind_addr = Self::bind_addr(&config)?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let routes = with_request_logging(Self::routes(&context));
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        tracing::info!(address = %addr, "web server listening");

        let task = tokio::spawn(server_future);
        let cleanup = Self::spawn_cleanup(context.sessions(), config.cleanup_interval());

        Ok(ServerHandle::new(addr, shutdown_tx, task, cleanup, context))
    }

    fn spawn_cleanup(sessions: Arc<SessionManager>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = sessions.cleanup_expired_sessions();
                if removed > 0 {
                    tracing::info!(removed, "swept expired sessions");
                }
            }
        })
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(io_err) = err
            .source()
            .and_then(|source| source.downcast_ref::<std::io::Error>())
        {
            return ServerError::BindError(std::io::Error::new(io_err.kind(), io_err.to_string()));
        }

        ServerError::ConfigError(err.to_string())
    }

    /// Every HTTP route, with rejections rendered as JSON errors.
    pub fn routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        Self::health_route(context)
            .or(Self::api_routes(context))
            .unify()
            .or(Self::player_routes(context))
            .unify()
            .or(Self::sse_routes(context))
            .unify()
            .recover(handlers::handle_rejection)
            .unify()
            .boxed()
    }

    fn health_route(context: &AppContext) -> BoxedFilter<(Response,)> {
        warp::path("health")
            .and(warp::get())
            .and(warp::path::end())
            .and(Self::with_session_manager(context.sessions()))
            .map(|sessions: Arc<SessionManager>| handlers::health(&sessions).into_response())
            .boxed()
    }

    fn api_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        let create = warp::path!("api" / "sessions")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and(handlers::json_or_default::<handlers::CreateSessionRequest>())
            .and_then(
                |sessions: Arc<SessionManager>,
                 request: handlers::CreateSessionRequest| async move {
                    let response = handlers::create_session(sessions, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let info = warp::path!("api" / "sessions" / SessionId)
            .and(warp::get())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: SessionId, sessions: Arc<SessionManager>| async move {
                    let response = handlers::get_session(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let state = warp::path!("api" / "sessions" / SessionId / "state")
            .and(warp::get())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: SessionId, sessions: Arc<SessionManager>| async move {
                    let response = handlers::get_session_state(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let start = warp::path!("api" / "sessions" / SessionId / "start")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: SessionId, sessions: Arc<SessionManager>| async move {
                    let response = handlers::start_game(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let moves = warp::path!("api" / "sessions" / SessionId / "moves")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and(handlers::json_body::<Move>())
            .and_then(
                |session_id: SessionId, sessions: Arc<SessionManager>, mv: Move| async move {
                    let response = handlers::submit_move(sessions, session_id, mv).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let reset = warp::path!("api" / "sessions" / SessionId / "reset")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and(handlers::json_or_default::<handlers::ResetRequest>())
            .and_then(
                |session_id: SessionId,
                 sessions: Arc<SessionManager>,
                 request: handlers::ResetRequest| async move {
                    let response = handlers::reset_game(sessions, session_id, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let delete = warp::path!("api" / "sessions" / SessionId)
            .and(warp::delete())
            .and(Self::with_session_manager(sessions))
            .and_then(
                |session_id: SessionId, sessions: Arc<SessionManager>| async move {
                    let response = handlers::delete_session(sessions, session_id).await;
                    Ok::<_, Infallible>(response)
                },
            );

        create
            .or(state)
            .unify()
            .or(start)
            .unify()
            .or(moves)
            .unify()
            .or(reset)
            .unify()
            .or(info)
            .unify()
            .or(delete)
            .unify()
            .boxed()
    }

    fn player_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        let sessions = context.sessions();

        let join = warp::path!("api" / "sessions" / SessionId / "players")
            .and(warp::post())
            .and(Self::with_session_manager(sessions.clone()))
            .and(handlers::json_body::<handlers::JoinRequest>())
            .and_then(
                |session_id: SessionId,
                 sessions: Arc<SessionManager>,
                 request: handlers::JoinRequest| async move {
                    let response = handlers::join_game(sessions, session_id, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let leave = warp::path!("api" / "sessions" / SessionId / "players" / String)
            .and(warp::delete())
            .and(Self::with_session_manager(sessions.clone()))
            .and_then(
                |session_id: SessionId, name: String, sessions: Arc<SessionManager>| async move {
                    let response = handlers::leave_game(sessions, session_id, name).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let ready = warp::path!("api" / "sessions" / SessionId / "players" / String / "ready")
            .and(warp::post())
            .and(Self::with_session_manager(sessions))
            .and(handlers::json_body::<handlers::ReadyRequest>())
            .and_then(
                |session_id: SessionId,
                 name: String,
                 sessions: Arc<SessionManager>,
                 request: handlers::ReadyRequest| async move {
                    let response = handlers::set_ready(sessions, session_id, name, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        join.or(leave).unify().or(ready).unify().boxed()
    }

    fn sse_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
        warp::path!("api" / "sessions" / SessionId / "events")
            .and(warp::get())
            .and(Self::with_session_manager(context.sessions()))
            .and_then(
                |session_id: SessionId, sessions: Arc<SessionManager>| async move {
                    let response = handlers::stream_events(session_id, sessions).await;
                    Ok::<_, Infallible>(response)
                },
            )
            .boxed()
    }

    fn with_session_manager(
        sessions: Arc<SessionManager>,
    ) -> impl Filter<Extract = (Arc<SessionManager>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&sessions))
    }
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    cleanup: JoinHandle<()>,
    context: AppContext,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<()>,
        cleanup: JoinHandle<()>,
        context: AppContext,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            cleanup,
            context,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        self.cleanup.abort();
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.await.map_err(|err| {
                ServerError::ConfigError(format!("server task join error: {err}"))
            })?;
        }

        tracing::info!(address = %self.addr, "web server stopped");
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.cleanup.abort();
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
