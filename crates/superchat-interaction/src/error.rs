//! Error types for model invocation.

use thiserror::Error;

/// Phrases OpenRouter uses in error bodies when an account runs dry.
const QUOTA_PHRASES: [&str; 3] = [
    "insufficient credits",
    "requires more credits",
    "add more credits",
];

/// Errors from talking to a model through OpenRouter.
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// The account has no credits left. Recoverable: the round is skipped
    /// and the session continues.
    #[error("Insufficient OpenRouter credits: {0}")]
    QuotaExhausted(String),

    /// The API rejected the request or the server failed.
    #[error("{message}")]
    Process {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
    },

    /// The request never produced an HTTP response.
    #[error("Request failed: {0}")]
    Request(String),

    /// The response arrived but could not be interpreted.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// No agent exists at the given index.
    #[error("Unknown agent index: {0}")]
    UnknownAgent(usize),
}

impl AgentError {
    /// Classifies an HTTP failure, recognizing quota exhaustion by status
    /// code 402 or by known phrasing in the error body.
    pub fn from_http(status: u16, message: String) -> Self {
        if status == 402 || is_quota_message(&message) {
            return Self::QuotaExhausted(message);
        }

        let is_retryable = matches!(status, 429 | 500 | 502 | 503 | 504);
        Self::Process {
            status_code: Some(status),
            message,
            is_retryable,
        }
    }

    /// Whether this error means the account ran out of credits.
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExhausted(_))
    }
}

fn is_quota_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    QUOTA_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_402_is_quota_exhausted() {
        let err = AgentError::from_http(402, "Payment required".to_string());
        assert!(err.is_quota_exhausted());
    }

    #[test]
    fn test_quota_phrase_in_body_is_quota_exhausted() {
        let err = AgentError::from_http(403, "Insufficient credits for request".to_string());
        assert!(err.is_quota_exhausted());
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = AgentError::from_http(503, "overloaded".to_string());
        match err {
            AgentError::Process { is_retryable, .. } => assert!(is_retryable),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let err = AgentError::from_http(400, "bad request".to_string());
        match err {
            AgentError::Process {
                is_retryable,
                status_code,
                ..
            } => {
                assert!(!is_retryable);
                assert_eq!(status_code, Some(400));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
