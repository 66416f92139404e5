use serde::{Deserialize, Serialize};

/// Backend user identifiers are integers
pub type UserId = i64;

/// Error body returned by the backend
///
/// The backend is not consistent about the field name, so both the
/// `message` and the `detail` shapes are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// The human-readable message, if the server provided one
    pub fn user_message(&self) -> Option<String> {
        if let Some(message) = self.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            return Some(message.to_string());
        }

        match &self.detail {
            Some(serde_json::Value::String(detail)) if !detail.trim().is_empty() => {
                Some(detail.trim().to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_preferred_over_detail() {
        let body: ErrorResponse =
            serde_json::from_str(r#"{"message": "Invalid credentials", "detail": "other"}"#).unwrap();
        assert_eq!(body.user_message().as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_string_detail_used_when_no_message() {
        let body: ErrorResponse = serde_json::from_str(r#"{"detail": "Token expired"}"#).unwrap();
        assert_eq!(body.user_message().as_deref(), Some("Token expired"));
    }

    #[test]
    fn test_structured_detail_is_not_a_message() {
        let body: ErrorResponse =
            serde_json::from_str(r#"{"detail": [{"loc": ["body", "email"], "msg": "bad"}]}"#).unwrap();
        assert_eq!(body.user_message(), None);

        let body: ErrorResponse = serde_json::from_str(r#"{"message": "  "}"#).unwrap();
        assert_eq!(body.user_message(), None);
    }
}
