use thiserror::Error;

/// Failures reported by the storage gateway and the session provider.
///
/// Every variant is recoverable from the UI's point of view: the active
/// screen shows the message and keeps its previous state.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no AWS credentials were found in the environment")]
    MissingCredentials,
    #[error("access key and secret are both required")]
    EmptyCredentials,
    #[error("not signed in")]
    NoSession,
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },
}

impl GatewayError {
    pub fn service(operation: &'static str, message: impl Into<String>) -> Self {
        GatewayError::Service {
            operation,
            message: message.into(),
        }
    }
}
