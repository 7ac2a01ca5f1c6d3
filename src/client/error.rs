use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Message used when an error body carries nothing readable
pub const GENERIC_UPLOAD_ERROR: &str = "Upload failed";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Text shown to the user in an error notification
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } | ClientError::Validation(message) => message.clone(),
            ClientError::Http(e) => format!("Network error: {}", e),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Pulls a message out of an error body: `detail`, then `message`, then `fallback`
pub fn error_message(body: &str, fallback: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.get("detail")
                .and_then(Value::as_str)
                .or_else(|| v.get("message").and_then(Value::as_str))
        })
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Decodes a 2xx body as `T`, otherwise fails with the extracted error message
pub(crate) async fn parse_response<T: DeserializeOwned>(
    response: Response,
    fallback: &str,
) -> ClientResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(&body, fallback),
        });
    }

    serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_detail() {
        let body = r#"{"detail": "File too large. Maximum size is 10MB", "message": "other"}"#;
        assert_eq!(
            error_message(body, GENERIC_UPLOAD_ERROR),
            "File too large. Maximum size is 10MB"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_message_field() {
        assert_eq!(
            error_message(r#"{"message": "Bucket unavailable"}"#, GENERIC_UPLOAD_ERROR),
            "Bucket unavailable"
        );
    }

    #[test]
    fn test_error_message_generic_fallback() {
        assert_eq!(error_message("<html>502</html>", GENERIC_UPLOAD_ERROR), "Upload failed");
        // Validation errors arrive as a list, not a string
        assert_eq!(
            error_message(r#"{"detail": [{"msg": "field required"}]}"#, GENERIC_UPLOAD_ERROR),
            "Upload failed"
        );
        assert_eq!(error_message(r#"{"detail": ""}"#, "fallback"), "fallback");
    }

    #[test]
    fn test_user_message() {
        let err = ClientError::Api {
            status: 413,
            message: "File too large. Maximum size is 10MB".to_string(),
        };
        assert_eq!(err.user_message(), "File too large. Maximum size is 10MB");
        assert_eq!(err.status(), Some(413));
        assert_eq!(
            ClientError::Validation("Title is required".to_string()).user_message(),
            "Title is required"
        );
    }
}
