use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Refresh failed or no refresh token was stored. Credentials have been
    /// cleared and the session-expiry signal has been sent.
    #[error("Session expired - please sign in again")]
    SessionExpired,

    #[error("Request rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Failed to decode response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Token storage error: {0:#}")]
    Storage(#[source] anyhow::Error),

    #[error("Request cancelled")]
    Cancelled,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True when the user has to go back through login.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// Failures caused by the transport rather than by the server's answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::NetworkError(_) | ApiError::Decode(_) | ApiError::InvalidResponse(_)
        )
    }

    /// Short message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::SessionExpired | ApiError::Unauthorized => {
                "Your session has ended. Please sign in again.".to_string()
            }
            ApiError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Rejected { .. } => "The request could not be completed.".to_string(),
            ApiError::RateLimited => "Too many requests. Please try again shortly.".to_string(),
            ApiError::NotFound(_) => "The requested item no longer exists.".to_string(),
            ApiError::AccessDenied(_) => "You don't have access to that.".to_string(),
            ApiError::ServerError(_) => {
                "The server had a problem. Please try again later.".to_string()
            }
            ApiError::Storage(_) => "Could not access saved login data.".to_string(),
            ApiError::Cancelled => "The request was cancelled.".to_string(),
            ApiError::NetworkError(_) | ApiError::Decode(_) | ApiError::InvalidResponse(_) => {
                "Unable to reach FoodKeeper. Check your connection and try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "gone"),
            ApiError::NotFound(body) if body == "gone"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "short and stout"),
            ApiError::InvalidResponse(msg) if msg.contains("418")
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated"));
        assert!(truncated.contains(&format!("{} total bytes", long.len())));

        assert_eq!(ApiError::truncate_body("short"), "short");

        // Multi-byte characters straddling the cut must not panic
        let korean = "가".repeat(MAX_ERROR_BODY_LENGTH);
        assert!(ApiError::truncate_body(&korean).contains("truncated"));
    }

    #[test]
    fn test_user_message() {
        let rejected = ApiError::Rejected {
            code: "E1000".to_string(),
            message: "invalid input".to_string(),
        };
        assert_eq!(rejected.user_message(), "invalid input");
        assert!(ApiError::SessionExpired.user_message().contains("sign in"));
        assert!(ApiError::InvalidResponse("bad".to_string())
            .user_message()
            .contains("connection"));
        assert!(ApiError::SessionExpired.is_session_expired());
        assert!(ApiError::InvalidResponse(String::new()).is_transport());
        assert!(!rejected.is_transport());
    }
}
