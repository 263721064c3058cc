//! Client error types.

use thiserror::Error;

/// Errors that can occur when talking to the SkyWatch API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the request with 401.
    #[error("authentication required")]
    Unauthorized,

    /// The API returned 429 Too Many Requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Any other 4xx/5xx status.
    #[error("service unavailable ({status}): {message}")]
    Unavailable {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// A non-success status outside the 4xx/5xx ranges.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Short message suitable for showing to the user.
    ///
    /// 401 and every other 4xx/5xx get distinct wording; everything else is
    /// reported generically.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "authentication required".to_string(),
            Self::RateLimited { .. } | Self::Unavailable { .. } => {
                "service unavailable".to_string()
            }
            Self::Http(_) => "could not reach the service".to_string(),
            Self::Api { status, .. } => format!("request failed (status {status})"),
            Self::Parse(_) => "unexpected response from the service".to_string(),
        }
    }

    /// HTTP status, when the error came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::RateLimited { .. } => Some(429),
            Self::Unavailable { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_distinct_for_auth_and_unavailable() {
        assert_eq!(
            ClientError::Unauthorized.user_message(),
            "authentication required"
        );
        let unavailable = ClientError::Unavailable {
            status: 503,
            message: String::new(),
        };
        assert_eq!(unavailable.user_message(), "service unavailable");
        assert_eq!(
            ClientError::RateLimited {
                retry_after_secs: 5
            }
            .user_message(),
            "service unavailable"
        );
        let generic = ClientError::Api {
            status: 304,
            message: String::new(),
        };
        assert_eq!(generic.user_message(), "request failed (status 304)");
    }

    #[test]
    fn status_is_reported() {
        assert_eq!(ClientError::Unauthorized.status(), Some(401));
        assert_eq!(ClientError::Parse("x".into()).status(), None);
    }
}
