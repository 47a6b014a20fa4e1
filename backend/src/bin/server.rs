//! openSenseMap Analytics HTTP Server
//!
//! Loads configuration, creates the measurement store, sets up the HTTP
//! router and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin osem-server
//!
//! # Custom port and a shorter query timeout
//! PORT=9000 OSEM_QUERY_TIMEOUT_SECS=10 cargo run --bin osem-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8000)
//! - `REPOSITORY_TYPE`: Store backend (default: local)
//! - `OSEM_QUERY_TIMEOUT_SECS`: Timeout for one engine call (default: 30)
//! - `OSEM_DEFAULT_LOOKBACK_DAYS`: Data window when `from-date` is omitted (default: 15)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use osem_rust::config::AppConfig;
use osem_rust::db::RepositoryFactory;
use osem_rust::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting openSenseMap analytics server");

    let config = AppConfig::load()?;
    config.validate()?;

    let repository = RepositoryFactory::create_from_name(&config.repository.repo_type)?;
    info!("Repository '{}' initialized", config.repository.repo_type);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState::new(repository, config)?;
    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
