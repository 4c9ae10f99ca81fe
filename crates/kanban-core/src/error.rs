use thiserror::Error;

#[derive(Error, Debug)]
pub enum KanbanError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl KanbanError {
    /// Classify a raw message coming back from the remote data service.
    ///
    /// The backend reports throttling and expired credentials only through
    /// free text, so the message signature decides the variant.
    pub fn from_remote_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("rate limit") || lower.contains("429") {
            Self::RateLimited(message)
        } else if message.contains("JWT") || lower.contains("session") || lower.contains("401") {
            Self::Unauthorized(message)
        } else {
            Self::Remote(message)
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Text suitable for showing to the person using the board.
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited(_) => "Too many requests. Wait a moment and try again.".to_string(),
            Self::Unauthorized(_) => "Your session is invalid or expired. Please sign in again.".to_string(),
            Self::NotFound(what) => format!("Not found: {}", what),
            Self::Validation(msg) => msg.clone(),
            Self::Remote(msg) => format!("Could not reach your data: {}", msg),
            Self::Io(e) => format!("Storage error: {}", e),
            Self::Serialization(msg) => format!("Invalid data: {}", msg),
            Self::Internal(msg) => format!("Unexpected error: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit_messages() {
        assert!(KanbanError::from_remote_message("rate limit exceeded").is_rate_limited());
        assert!(KanbanError::from_remote_message("HTTP 429 Too Many Requests").is_rate_limited());
        assert!(KanbanError::from_remote_message("Rate Limit reached").is_rate_limited());
    }

    #[test]
    fn test_classify_session_messages() {
        assert!(matches!(
            KanbanError::from_remote_message("JWT expired"),
            KanbanError::Unauthorized(_)
        ));
        assert!(matches!(
            KanbanError::from_remote_message("Session not found"),
            KanbanError::Unauthorized(_)
        ));
    }

    #[test]
    fn test_classify_other_messages() {
        let err = KanbanError::from_remote_message("connection reset by peer");
        assert!(matches!(err, KanbanError::Remote(_)));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_user_message_for_session_errors_mentions_sign_in() {
        let err = KanbanError::Unauthorized("JWT expired".to_string());
        assert!(err.user_message().contains("sign in"));
    }
}
