use crate::error::{ApiError, ApiResult};
use designflow_core::{Clock, ServiceContext, ServiceError, SqliteRepositories};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Shared handler state: one migrated connection and the time source.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// `conn` must come from `open_db` / `open_db_in_memory`.
    pub fn new(conn: Connection, clock: Arc<dyn Clock>) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            clock,
        }
    }

    /// Runs `work` on the blocking pool with services bound to the connection.
    pub async fn run<T, F>(&self, work: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(ServiceContext<'_>) -> Result<T, ServiceError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let clock = Arc::clone(&self.clock);

        tokio::task::spawn_blocking(move || -> ApiResult<T> {
            let conn = conn
                .lock()
                .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))?;
            let repos = SqliteRepositories::try_new(&conn).map_err(ServiceError::from)?;
            Ok(work(repos.context(clock.as_ref()))?)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
    }
}
