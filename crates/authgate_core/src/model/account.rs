//! Account domain model.
//!
//! # Responsibility
//! - Define the canonical account record persisted in `accounts`.
//! - Validate record shape before writes and after reads.
//! - Compare submitted credentials against the stored ones.
//!
//! # Invariants
//! - `id` is stable and never reused for another account.
//! - `failed_login_attempts` and `account_locked` always describe a valid
//!   `LockoutState`.
//! - Passwords are stored verbatim. There is no hashing at this layer.

use crate::model::lockout::LockoutState;
use crate::model::national_id::{validate_national_id, NationalIdError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier assigned to every account at creation.
pub type AccountId = Uuid;

pub const MAX_USERNAME_CHARS: usize = 64;
/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Validation error for account records and registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    NilId,
    EmptyUsername,
    UsernameTooLong { max_chars: usize },
    EmptyPassword,
    PasswordTooShort { min_chars: usize },
    InvalidEmail,
    InvalidNationalId(NationalIdError),
    InconsistentLockout { failed_attempts: u32, locked: bool },
}

impl Display for AccountValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "account id must not be nil"),
            Self::EmptyUsername => write!(f, "Username is required"),
            Self::UsernameTooLong { max_chars } => {
                write!(f, "Username must be at most {max_chars} characters")
            }
            Self::EmptyPassword => write!(f, "Password is required"),
            Self::PasswordTooShort { min_chars } => {
                write!(f, "Password must be at least {min_chars} characters")
            }
            Self::InvalidEmail => write!(f, "Invalid email address"),
            Self::InvalidNationalId(err) => write!(f, "{err}"),
            Self::InconsistentLockout {
                failed_attempts,
                locked,
            } => write!(
                f,
                "inconsistent lockout state: failed_attempts={failed_attempts} locked={locked}"
            ),
        }
    }
}

impl Error for AccountValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidNationalId(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NationalIdError> for AccountValidationError {
    fn from(value: NationalIdError) -> Self {
        Self::InvalidNationalId(value)
    }
}

/// Canonical account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: Option<String>,
    /// Stored and compared verbatim. Never serialized outward.
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Secondary identifier. When set, login must present the same value.
    #[serde(rename = "nic_number")]
    pub national_id: Option<String>,
    pub failed_login_attempts: u32,
    pub account_locked: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Account {
    /// Creates a fresh, unlocked account with a generated id.
    ///
    /// Does not apply registration-only rules such as password length; see
    /// [`Account::validate_registration`].
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: None,
            password: password.into(),
            national_id: None,
            failed_login_attempts: 0,
            account_locked: false,
            created_at: now_epoch_ms(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_national_id(mut self, national_id: impl Into<String>) -> Self {
        self.national_id = Some(national_id.into());
        self
    }

    /// Current position in the lockout state machine.
    ///
    /// Falls back to `Locked` for inconsistent columns so that a corrupt row
    /// can never authenticate.
    pub fn lockout_state(&self) -> LockoutState {
        LockoutState::from_persisted(self.failed_login_attempts, self.account_locked)
            .unwrap_or(LockoutState::Locked)
    }

    /// Returns whether `password` and `national_id` satisfy this account.
    ///
    /// The national ID is only checked when one is stored; a missing
    /// submitted value then counts as a mismatch.
    pub fn credentials_match(&self, password: &str, national_id: Option<&str>) -> bool {
        if self.password != password {
            return false;
        }
        match self.national_id.as_deref() {
            None => true,
            Some(stored) => national_id.map(str::trim) == Some(stored),
        }
    }

    /// Checks record-level invariants. Run before every write and after
    /// every read.
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.id.is_nil() {
            return Err(AccountValidationError::NilId);
        }
        if self.username.trim().is_empty() {
            return Err(AccountValidationError::EmptyUsername);
        }
        if self.username.chars().count() > MAX_USERNAME_CHARS {
            return Err(AccountValidationError::UsernameTooLong {
                max_chars: MAX_USERNAME_CHARS,
            });
        }
        if self.password.is_empty() {
            return Err(AccountValidationError::EmptyPassword);
        }
        if let Some(email) = self.email.as_deref() {
            validate_email(email)?;
        }
        if LockoutState::from_persisted(self.failed_login_attempts, self.account_locked).is_none()
        {
            return Err(AccountValidationError::InconsistentLockout {
                failed_attempts: self.failed_login_attempts,
                locked: self.account_locked,
            });
        }
        Ok(())
    }

    /// Record invariants plus the rules applied to self-registration input.
    pub fn validate_registration(&self) -> Result<(), AccountValidationError> {
        self.validate()?;
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AccountValidationError::PasswordTooShort {
                min_chars: MIN_PASSWORD_CHARS,
            });
        }
        if let Some(national_id) = self.national_id.as_deref() {
            validate_national_id(national_id)?;
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), AccountValidationError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(AccountValidationError::InvalidEmail),
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}
