//! Shared application state.

use crate::error::{ApiError, ApiResult};
use authgate_core::{AuthResult, AuthService, SqliteAccountRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// State handed to every handler.
///
/// Owns the single SQLite connection. Service calls run on the blocking
/// pool and hold the lock for one use case only.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs one auth use case against the shared connection.
    pub async fn with_auth<T, F>(&self, use_case: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&AuthService<SqliteAccountRepository<'_>>) -> AuthResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))?;
            let service = AuthService::new(SqliteAccountRepository::new(&conn));
            use_case(&service).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("auth task failed: {err}")))?
    }
}
