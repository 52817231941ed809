//! HTTP server entry point.
//!
//! # Responsibility
//! - Read `ServerConfig`, start file logging and open the migrated database.
//! - Serve the `/api` router until the process is stopped.

use designflow_core::{init_logging, open_db, SystemClock};
use designflow_server::{router, AppState, ServerConfig};
use log::info;
use std::error::Error;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = ServerConfig::from_env()?;

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("designflow-server: file logging disabled: {err}");
        }
    }

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = open_db(&config.db_path)?;
    let state = AppState::new(conn, Arc::new(SystemClock));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        "event=server_start module=server status=ok bind={} db={}",
        config.bind,
        config.db_path.display()
    );
    println!("designflow-server listening on http://{}", config.bind);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
