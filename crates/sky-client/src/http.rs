//! Shared HTTP response helpers.
//!
//! Centralizes status-code classification so the endpoint modules stay
//! focused on request construction and response mapping:
//! - **401** → [`ClientError::Unauthorized`]
//! - **429** → [`ClientError::RateLimited`] (`Retry-After` seconds, 60 s fallback)
//! - **other 4xx/5xx** → [`ClientError::Unavailable`]
//! - **other non-success** → [`ClientError::Api`]

use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Check an HTTP response for error statuses, returning it unchanged on success.
///
/// # Errors
///
/// Returns the [`ClientError`] variant matching the status class.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ClientError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    let code = status.as_u16();
    let message = resp.text().await.unwrap_or_default();
    if status.is_client_error() || status.is_server_error() {
        Err(ClientError::Unavailable {
            status: code,
            message,
        })
    } else {
        Err(ClientError::Api {
            status: code,
            message,
        })
    }
}

/// Read a successful response body and decode it as JSON.
///
/// # Errors
///
/// Returns [`ClientError::Http`] if the body cannot be read and
/// [`ClientError::Parse`] if it is not the expected JSON shape.
pub async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let body = resp.text().await?;
    decode(&body)
}

/// Decode a JSON body.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] with the serde message on failure.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn mock_response(status: u16) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body("")
                .unwrap(),
        )
    }

    fn mock_response_with_retry_after(status: u16, value: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .header("Retry-After", value)
                .body("")
                .unwrap(),
        )
    }

    #[test]
    fn parse_retry_after_from_header() {
        let resp = mock_response_with_retry_after(429, "120");
        assert_eq!(parse_retry_after(&resp), 120);
    }

    #[test]
    fn parse_retry_after_missing_or_garbage() {
        assert_eq!(parse_retry_after(&mock_response(429)), 60);
        let resp = mock_response_with_retry_after(429, "soon");
        assert_eq!(parse_retry_after(&resp), 60);
    }

    #[tokio::test]
    async fn unauthorized_is_distinct() {
        let err = check_response(mock_response(401)).await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
    }

    #[tokio::test]
    async fn rate_limited_reads_header() {
        let resp = mock_response_with_retry_after(429, "30");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::RateLimited {
                retry_after_secs: 30
            }
        ));
    }

    #[rstest]
    #[case(400)]
    #[case(403)]
    #[case(404)]
    #[case(500)]
    #[case(502)]
    #[case(503)]
    #[tokio::test]
    async fn error_statuses_are_unavailable(#[case] status: u16) {
        let err = check_response(mock_response(status)).await.unwrap_err();
        assert!(matches!(err, ClientError::Unavailable { status: s, .. } if s == status));
        assert_eq!(err.user_message(), "service unavailable");
    }

    #[tokio::test]
    async fn redirect_status_is_generic() {
        let err = check_response(mock_response(304)).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 304, .. }));
    }

    #[tokio::test]
    async fn success_passes_through() {
        assert!(check_response(mock_response(200)).await.is_ok());
        assert!(check_response(mock_response(204)).await.is_ok());
    }

    #[test]
    fn decode_reports_parse_errors() {
        let err = decode::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }
}
