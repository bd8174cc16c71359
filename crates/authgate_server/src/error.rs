//! HTTP error mapping.
//!
//! Client errors carry the auth error's message. System errors are logged
//! and replaced by a generic message.

use crate::dto::MessageResponse;
use authgate_core::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::UnknownAccount | AuthError::InvalidCredentials { .. } => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::AccountLocked => StatusCode::FORBIDDEN,
                AuthError::UsernameTaken | AuthError::EmailTaken | AuthError::InvalidInput(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth(err) => write!(f, "{err}"),
            Self::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Auth(err) => Some(err),
            Self::Internal(_) => None,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!(
                "event=http_error module=server status=error http_status={} error={}",
                status.as_u16(),
                self
            );
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        (status, Json(MessageResponse::new(message))).into_response()
    }
}
