use lambda_http::http::StatusCode;
use std::time::Duration;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure talking to the identity pool or the profile table
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} not found in identity pool")]
    UserNotFound(String),
    #[error("profile document for user {0} does not exist")]
    ProfileNotFound(String),
    #[error("claims attribute of user {uid} is not a JSON object: {source}")]
    MalformedClaims {
        uid: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("identity pool request failed: {0}")]
    Identity(#[source] BoxError),
    #[error("profile table request failed: {0}")]
    Document(#[source] BoxError),
    #[error("store call did not finish within {0:?}")]
    Timeout(Duration),
}

/// Error returned to the caller of a callable.
///
/// The display text is the public message. `Internal` never carries the
/// underlying cause; that only goes to the logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallableError {
    #[error("Must be authenticated")]
    Unauthenticated,
    #[error("Must be admin to set admin claims")]
    PermissionDenied,
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Error setting admin claim")]
    Internal,
}

impl CallableError {
    pub fn code(&self) -> &'static str {
        match self {
            CallableError::Unauthenticated => "unauthenticated",
            CallableError::PermissionDenied => "permission-denied",
            CallableError::InvalidArgument(_) => "invalid-argument",
            CallableError::Internal => "internal",
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            CallableError::Unauthenticated => "UNAUTHENTICATED",
            CallableError::PermissionDenied => "PERMISSION_DENIED",
            CallableError::InvalidArgument(_) => "INVALID_ARGUMENT",
            CallableError::Internal => "INTERNAL",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            CallableError::Unauthenticated => StatusCode::UNAUTHORIZED,
            CallableError::PermissionDenied => StatusCode::FORBIDDEN,
            CallableError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CallableError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
