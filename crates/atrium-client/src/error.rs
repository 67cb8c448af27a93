// Client error taxonomy.
use serde::Deserialize;
use thiserror::Error;

/// Structured error body returned by the admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure: connection, timeout, malformed response.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a structured non-success status.
    #[error("api error ({status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// Client-side configuration problem.
    #[error("config error: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn from_body(status: u16, body: &[u8]) -> Self {
        // Fall back to an opaque code when the body is not the structured
        // error shape (proxies, panics, HTML error pages).
        match serde_json::from_slice::<ApiErrorBody>(body) {
            Ok(parsed) => ClientError::Api {
                status,
                code: parsed.code,
                message: parsed.message,
            },
            Err(_) => ClientError::Api {
                status,
                code: "unknown".to_string(),
                message: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }

    /// Whether the server rejected the call with 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }

    /// Whether the server rejected the call with 409.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Api { status: 409, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_bodies_parse_into_api_errors() {
        let err = ClientError::from_body(
            409,
            br#"{"code":"already_exists","message":"email already taken","request_id":null}"#,
        );
        match &err {
            ClientError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(*status, 409);
                assert_eq!(code, "already_exists");
                assert_eq!(message, "email already taken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
    }

    #[test]
    fn unstructured_bodies_fall_back_to_unknown() {
        let err = ClientError::from_body(502, b"<html>bad gateway</html>");
        match err {
            ClientError::Api { status, code, .. } => {
                assert_eq!(status, 502);
                assert_eq!(code, "unknown");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
