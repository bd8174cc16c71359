//! Failed-attempt lockout state machine.
//!
//! ```text
//! Active(0) --fail--> Active(1) --fail--> Active(2) --fail--> Locked
//!     ^                   |                   |
//!     +------success------+-------------------+
//! ```
//!
//! `Locked` has no outgoing transition. Attempts against a locked account are
//! rejected before credentials are compared.

use serde::{Deserialize, Serialize};

/// Number of consecutive failures that locks an account.
pub const MAX_FAILED_ATTEMPTS: u32 = 3;

/// Authentication state of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LockoutState {
    /// Accepting attempts; `failed_attempts` is always below the threshold.
    Active { failed_attempts: u32 },
    /// Terminal. No credential check is performed.
    Locked,
}

impl Default for LockoutState {
    fn default() -> Self {
        Self::Active { failed_attempts: 0 }
    }
}

impl LockoutState {
    /// Rebuilds the state from persisted columns.
    ///
    /// Returns `None` when the columns describe an impossible state
    /// (counter at or above the threshold without the lock flag, or beyond it
    /// with the flag).
    pub fn from_persisted(failed_attempts: u32, locked: bool) -> Option<Self> {
        match (locked, failed_attempts) {
            (true, MAX_FAILED_ATTEMPTS) => Some(Self::Locked),
            (false, n) if n < MAX_FAILED_ATTEMPTS => Some(Self::Active { failed_attempts: n }),
            _ => None,
        }
    }

    /// Transition taken on a wrong password or mismatched national ID.
    #[must_use]
    pub fn after_failure(self) -> Self {
        match self {
            Self::Active { failed_attempts } if failed_attempts + 1 < MAX_FAILED_ATTEMPTS => {
                Self::Active {
                    failed_attempts: failed_attempts + 1,
                }
            }
            Self::Active { .. } | Self::Locked => Self::Locked,
        }
    }

    /// Transition taken on a full credential match.
    ///
    /// A locked account stays locked.
    #[must_use]
    pub fn after_success(self) -> Self {
        match self {
            Self::Active { .. } => Self::Active { failed_attempts: 0 },
            Self::Locked => Self::Locked,
        }
    }

    pub fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }

    /// Counter value to persist for this state.
    pub fn failed_attempts(self) -> u32 {
        match self {
            Self::Active { failed_attempts } => failed_attempts,
            Self::Locked => MAX_FAILED_ATTEMPTS,
        }
    }

    /// Failures still allowed before the account locks.
    pub fn remaining_attempts(self) -> u32 {
        MAX_FAILED_ATTEMPTS - self.failed_attempts()
    }
}
