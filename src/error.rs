use thiserror::Error;

/// Errors produced by the backend gateways.
///
/// Only two user-facing categories exist: the session holds no token, or the
/// request failed. `Request` displays as the bare server message so it can be
/// shown to the user as-is.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Authentication required")]
    AuthRequired,
    #[error("{message}")]
    Request { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        ApiError::Request {
            status,
            message: message.into(),
        }
    }

    pub fn is_auth_required(&self) -> bool {
        matches!(self, ApiError::AuthRequired)
    }
}

/// Errors returned by [`crate::clients::CartClient`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
