//! Error types for cld-ui
//!
//! Every error is terminal for the operation that produced it and is shown
//! to the user verbatim. Nothing here triggers an automatic retry.

use thiserror::Error;

/// Client error taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Rejected before any network call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Detail fetch for an unknown ticker (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network failure, or non-2xx without a specific reason
    #[error("{0}")]
    Transport(String),

    /// Non-2xx carrying a `detail` message
    #[error("{0}")]
    Backend(String),
}

/// Input rejected client-side
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Organization name must not be empty")]
    EmptyName,

    #[error("{name} is already in portfolio")]
    AlreadyInPortfolio { name: String },

    #[error("An onboarding job for {target_name} is already in progress")]
    JobActive { target_name: String },

    #[error("Cannot dismiss while the analysis request for {target_name} is outstanding")]
    DismissWhileRunning { target_name: String },
}

impl ClientError {
    /// Generic transport message for a non-2xx response without a usable body
    pub fn http_status(status: u16) -> Self {
        ClientError::Transport(format!("HTTP error, status {}", status))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return ClientError::http_status(status.as_u16());
        }
        ClientError::Transport(format!("Network error: {}", err))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(
            ClientError::http_status(502).to_string(),
            "HTTP error, status 502"
        );
        assert_eq!(
            ClientError::Backend("Analysis failed".into()).to_string(),
            "Analysis failed"
        );
        let dup: ClientError = ValidationError::AlreadyInPortfolio {
            name: "Acme Co".into(),
        }
        .into();
        assert_eq!(dup.to_string(), "Acme Co is already in portfolio");
    }
}
