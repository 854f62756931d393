//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::reminders::CalendarError;

// Errors

pub struct ApiError {
    status: StatusCode,
    error: anyhow::Error,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, anyhow::anyhow!("{} not found", what))
    }

    pub fn bad_request(error: impl Into<anyhow::Error>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            anyhow::anyhow!("Missing or invalid session"),
        )
    }

    /// A stale credential asks the user to sign in with Google again;
    /// anything else is the provider's fault.
    pub fn calendar(err: CalendarError) -> Self {
        let status = match err {
            CalendarError::StaleOrMissingCredential(_) => StatusCode::UNAUTHORIZED,
            CalendarError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err)
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{:#}", self.error);
            (
                self.status,
                format!("Something went wrong: {}", self.error),
            )
                .into_response()
        } else {
            tracing::debug!("{}: {:#}", self.status, self.error);
            (self.status, self.error.to_string()).into_response()
        }
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}

// Re-export public types from each route

pub mod auth {
    pub use crate::api::routes::auth::public::*;
}

pub mod calendar {
    pub use crate::api::routes::calendar::public::*;
}

pub mod groups {
    pub use crate::api::routes::groups::public::*;
}

pub mod people {
    pub use crate::api::routes::people::public::*;
}
