//! Login and registration use-case service.
//!
//! # Responsibility
//! - Drive the lockout state machine for login attempts.
//! - Register new accounts with duplicate and format checks.
//! - Translate repository outcomes into user-facing `AuthError`s.
//!
//! # Invariants
//! - A locked account is rejected before any credential comparison.
//! - Counter changes go through the repository's lockout transitions only.
//! - Usernames are trimmed on both login and registration.
//! - Log lines carry account ids and outcomes, never usernames or secrets.

use crate::model::account::{Account, AccountId, AccountValidationError};
use crate::model::lockout::LockoutState;
use crate::repo::account_repo::{AccountRepository, RepoError};
use crate::token::PlaceholderToken;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AuthResult<T> = Result<T, AuthError>;

/// Outcome of a rejected login or registration.
///
/// `Display` yields the message returned to clients.
#[derive(Debug)]
pub enum AuthError {
    /// No account with the submitted username. Shares its message with a
    /// wrong password so usernames cannot be enumerated.
    UnknownAccount,
    /// Password or national ID did not match; the account is still active.
    InvalidCredentials { remaining_attempts: u32 },
    AccountLocked,
    UsernameTaken,
    EmailTaken,
    InvalidInput(AccountValidationError),
    Repo(RepoError),
}

impl AuthError {
    /// Whether the failure is caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAccount => write!(f, "Invalid credentials"),
            Self::InvalidCredentials { remaining_attempts } => write!(
                f,
                "Invalid credentials. {remaining_attempts} attempt(s) remaining."
            ),
            Self::AccountLocked => write!(
                f,
                "Account locked due to multiple failed login attempts. Please contact administrator."
            ),
            Self::UsernameTaken => write!(f, "Username already exists"),
            Self::EmailTaken => write!(f, "Email already exists"),
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidInput(err),
            RepoError::Duplicate { field: "username", .. } => Self::UsernameTaken,
            RepoError::Duplicate { field: "email", .. } => Self::EmailTaken,
            other => Self::Repo(other),
        }
    }
}

/// Login input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub national_id: Option<String>,
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub account_id: AccountId,
    pub username: String,
    pub token: PlaceholderToken,
}

/// Self-registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub national_id: Option<String>,
}

/// Use-case service for login and registration.
pub struct AuthService<R: AccountRepository> {
    repo: R,
}

impl<R: AccountRepository> AuthService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Authenticates one attempt and advances the lockout state machine.
    ///
    /// # Errors
    /// - `UnknownAccount` when no account has this username.
    /// - `AccountLocked` when the account was already locked, or this
    ///   failure locked it.
    /// - `InvalidCredentials` with the remaining budget otherwise.
    pub fn login(&self, request: &LoginRequest) -> AuthResult<LoginSuccess> {
        let Some(account) = self.repo.find_by_username(request.username.trim())? else {
            info!("event=login module=auth status=rejected reason=unknown_account");
            return Err(AuthError::UnknownAccount);
        };

        if account.lockout_state().is_locked() {
            warn!(
                "event=login module=auth status=rejected reason=locked account_id={}",
                account.id
            );
            return Err(AuthError::AccountLocked);
        }

        if !account.credentials_match(&request.password, request.national_id.as_deref()) {
            return Err(self.fail_attempt(&account)?);
        }

        match self.repo.reset_failed_attempts(account.id)? {
            LockoutState::Locked => {
                warn!(
                    "event=login module=auth status=rejected reason=locked_concurrently account_id={}",
                    account.id
                );
                Err(AuthError::AccountLocked)
            }
            LockoutState::Active { .. } => {
                info!("event=login module=auth status=ok account_id={}", account.id);
                Ok(LoginSuccess {
                    account_id: account.id,
                    username: account.username,
                    token: PlaceholderToken::issue(),
                })
            }
        }
    }

    /// Registers a new account.
    ///
    /// Blank optional fields are treated as absent. The national ID is
    /// stored in its trimmed form.
    pub fn register(&self, request: &RegisterRequest) -> AuthResult<AccountId> {
        let username = request.username.trim();
        if self.repo.exists_by_username(username)? {
            info!("event=register module=auth status=rejected reason=username_taken");
            return Err(AuthError::UsernameTaken);
        }

        let mut account = Account::new(username, request.password.as_str());
        if let Some(email) = non_blank(request.email.as_deref()) {
            account = account.with_email(email);
        }
        if let Some(national_id) = non_blank(request.national_id.as_deref()) {
            account = account.with_national_id(national_id);
        }

        if let Err(err) = account.validate_registration() {
            info!(
                "event=register module=auth status=rejected reason=invalid_input error={}",
                err
            );
            return Err(AuthError::InvalidInput(err));
        }

        match self.repo.create_account(&account) {
            Ok(id) => {
                info!("event=register module=auth status=ok account_id={}", id);
                Ok(id)
            }
            Err(err) => {
                let err = AuthError::from(err);
                if err.is_client_error() {
                    info!(
                        "event=register module=auth status=rejected reason=duplicate error={}",
                        err
                    );
                } else {
                    error!("event=register module=auth status=error error={}", err);
                }
                Err(err)
            }
        }
    }

    /// Returns the lockout state for `username`, or `None` if unknown.
    pub fn lockout_status(&self, username: &str) -> AuthResult<Option<LockoutState>> {
        Ok(self
            .repo
            .find_by_username(username.trim())?
            .map(|account| account.lockout_state()))
    }

    /// Lists accounts that can no longer log in.
    pub fn locked_accounts(&self) -> AuthResult<Vec<Account>> {
        Ok(self.repo.list_locked_accounts()?)
    }

    fn fail_attempt(&self, account: &Account) -> AuthResult<AuthError> {
        let state = self.repo.record_failed_attempt(account.id)?;
        match state {
            LockoutState::Locked => {
                warn!(
                    "event=login module=auth status=locked account_id={} failed_attempts={}",
                    account.id,
                    state.failed_attempts()
                );
                Ok(AuthError::AccountLocked)
            }
            LockoutState::Active { failed_attempts } => {
                info!(
                    "event=login module=auth status=rejected reason=bad_credentials account_id={} failed_attempts={}",
                    account.id, failed_attempts
                );
                Ok(AuthError::InvalidCredentials {
                    remaining_attempts: state.remaining_attempts(),
                })
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
