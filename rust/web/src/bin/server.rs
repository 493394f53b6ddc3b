//! Standalone session server.
//!
//! Usage: cargo run -p hanabi_web --bin hanabi-web-server -- --port 8080

use clap::Parser;
use hanabi_web::{LogFormat, ServerConfig, WebServer};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "hanabi-web-server", version, about = "Hanabi game session server")]
struct Args {
    /// Host or IP address to bind to
    #[arg(long, env = "HANABI_HOST", default_value = "127.0.0.1")]
    host: String,
    /// Port to bind to (0 picks a free one)
    #[arg(short, long, env = "HANABI_PORT", default_value_t = 8080)]
    port: u16,
    /// Seconds of inactivity before a session is dropped
    #[arg(long, env = "HANABI_SESSION_TTL_SECS", default_value_t = 1800)]
    session_ttl_secs: u64,
    /// Log output format
    #[arg(long, env = "HANABI_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.host.clone(), self.port)
            .with_session_ttl(Duration::from_secs(self.session_ttl_secs))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    hanabi_web::init_logging(args.log_format);

    let config = args.server_config();
    tracing::info!(
        host = config.host(),
        port = config.port(),
        session_ttl_secs = config.session_ttl().as_secs(),
        "starting hanabi web server"
    );

    let handle = WebServer::new(config).start().await?;
    println!("Server running at http://{}", handle.address());
    println!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down server");
    handle.shutdown().await?;
    println!("Server stopped cleanly");

    Ok(())
}
