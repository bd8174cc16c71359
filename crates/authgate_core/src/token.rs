//! Placeholder login token.
//!
//! The token is a timestamp string. It is not signed, not stored, and
//! grants nothing on its own; callers must not treat it as a credential.

use crate::model::account::now_epoch_ms;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const TOKEN_PREFIX: &str = "dummy-jwt-token-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceholderToken(String);

impl PlaceholderToken {
    /// Issues a token stamped with the current time.
    pub fn issue() -> Self {
        Self::issued_at(now_epoch_ms())
    }

    /// Issues a token stamped with `epoch_ms`.
    pub fn issued_at(epoch_ms: i64) -> Self {
        Self(format!("{TOKEN_PREFIX}{epoch_ms}"))
    }

    /// Epoch milliseconds embedded in the token, if it has the expected shape.
    pub fn issued_at_ms(&self) -> Option<i64> {
        self.0.strip_prefix(TOKEN_PREFIX)?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for PlaceholderToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
