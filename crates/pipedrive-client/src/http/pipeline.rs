/*
[INPUT]:  Raw transport response and remaining rate-limit retry budget
[OUTPUT]: Success envelope, retry decision with backoff, or API error
[POS]:    HTTP layer - response classification
[UPDATE]: When changing status handling or retry rules
*/

use std::time::Duration;

use reqwest::StatusCode;

use super::backoff::rate_limit_backoff;
use super::error::PipedriveError;
use super::headers::HeaderMap;
use super::transport::RawResponse;
use crate::types::Envelope;

/// What to do with one attempt's response
#[derive(Debug)]
pub enum Outcome {
    Success(Envelope),
    /// Rate limited with budget left: wait, then re-issue the same request
    Retry { backoff: Duration },
    Failure(PipedriveError),
}

/// Classify a response: 429 with budget -> retry, 4xx/5xx -> error, else success.
pub fn classify(response: &RawResponse, retries_left: u32, default_backoff: Duration) -> Outcome {
    let (head, body) = response.split();
    let headers = HeaderMap::parse(&head);
    let envelope = Envelope::from_body(&body);

    if response.status == StatusCode::TOO_MANY_REQUESTS.as_u16() && retries_left > 0 {
        return Outcome::Retry {
            backoff: rate_limit_backoff(&headers, default_backoff),
        };
    }

    if response.status >= 400 {
        // raw body only when it did not decode; decoded JSON without `error` gives ""
        let message = if envelope.is_null() {
            body.into_owned()
        } else {
            envelope.error().unwrap_or_default().to_string()
        };
        return Outcome::Failure(PipedriveError::Api {
            status: response.status,
            message,
        });
    }

    Outcome::Success(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEFAULT: Duration = Duration::from_secs(5);

    fn response(status: u16, head: &str, body: &str) -> RawResponse {
        RawResponse::new(status, head, body.as_bytes())
    }

    #[test]
    fn test_success_returns_envelope() {
        let raw = response(200, "HTTP/1.1 200 OK\r\n\r\n", r#"{"success":true,"data":[1]}"#);
        match classify(&raw, 3, DEFAULT) {
            Outcome::Success(envelope) => assert_eq!(envelope.data(), Some(&json!([1]))),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_redirect_status_is_success() {
        let raw = response(302, "HTTP/1.1 302 Found\r\n\r\n", "");
        assert!(matches!(classify(&raw, 3, DEFAULT), Outcome::Success(envelope) if envelope.is_null()));
    }

    #[test]
    fn test_rate_limited_uses_reset_header() {
        let raw = response(
            429,
            "HTTP/1.1 429 Too Many Requests\r\nx-ratelimit-reset: 2\r\n\r\n",
            "{}",
        );
        assert!(matches!(
            classify(&raw, 3, DEFAULT),
            Outcome::Retry { backoff } if backoff == Duration::from_secs(3)
        ));
    }

    #[test]
    fn test_rate_limited_without_budget_fails() {
        let raw = response(
            429,
            "HTTP/1.1 429 Too Many Requests\r\n\r\n",
            r#"{"success":false,"error":"Rate limit exceeded"}"#,
        );
        match classify(&raw, 0, DEFAULT) {
            Outcome::Failure(PipedriveError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit exceeded");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found_never_retries() {
        let raw = response(404, "HTTP/1.1 404 Not Found\r\n\r\n", r#"{"error":"Person not found"}"#);
        assert!(matches!(
            classify(&raw, 3, DEFAULT),
            Outcome::Failure(PipedriveError::Api { status: 404, .. })
        ));
    }

    #[test]
    fn test_error_without_json_uses_raw_body() {
        let raw = response(502, "HTTP/1.1 502 Bad Gateway\r\n\r\n", "upstream unavailable");
        match classify(&raw, 3, DEFAULT) {
            Outcome::Failure(PipedriveError::Api { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_json_without_message_is_empty() {
        let raw = response(400, "HTTP/1.1 400 Bad Request\r\n\r\n", r#"{"success":false}"#);
        match classify(&raw, 3, DEFAULT) {
            Outcome::Failure(PipedriveError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
