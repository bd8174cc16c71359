//! Core domain logic for authgate.
//! This crate owns the account record, the lockout rules and their storage.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod token;

pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogSink};
pub use model::account::{Account, AccountId, AccountValidationError, MIN_PASSWORD_CHARS};
pub use model::lockout::{LockoutState, MAX_FAILED_ATTEMPTS};
pub use model::national_id::{validate_national_id, NationalIdError};
pub use repo::account_repo::{AccountRepository, RepoError, RepoResult, SqliteAccountRepository};
pub use service::auth_service::{
    AuthError, AuthResult, AuthService, LoginRequest, LoginSuccess, RegisterRequest,
};
pub use token::PlaceholderToken;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
