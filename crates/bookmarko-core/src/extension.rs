//! Message envelopes exchanged with the browser extension.
//!
//! Requests carry a `type` discriminator; responses use a boolean-success
//! envelope: `{success, message?, metadata?, error?}`.

use serde::{Deserialize, Serialize};

/// A request from the extension.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionMessage {
    Ping,
    ExtractMetadata { url: String },
    GetPageInfo { url: String },
}

impl ExtensionMessage {
    /// Parse a raw message. Unknown or malformed messages yield an error
    /// response ready to send back.
    pub fn parse(raw: serde_json::Value) -> std::result::Result<Self, ExtensionResponse> {
        let kind = raw
            .get("type")
            .and_then(|t| t.as_str())
            .map(str::to_owned);
        serde_json::from_value(raw).map_err(|e| match kind {
            Some(k) if !matches!(k.as_str(), "PING" | "EXTRACT_METADATA" | "GET_PAGE_INFO") => {
                ExtensionResponse::failure(format!("Unknown message type: {}", k))
            }
            Some(_) => ExtensionResponse::failure(format!("Invalid message: {}", e)),
            None => ExtensionResponse::failure("Message type is required"),
        })
    }
}

/// Response envelope returned to the extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtensionResponse {
    pub fn pong() -> Self {
        Self {
            success: true,
            message: Some("PONG".to_string()),
            ..Default::default()
        }
    }

    pub fn with_metadata(metadata: serde_json::Value) -> Self {
        Self {
            success: true,
            metadata: Some(metadata),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_ping() {
        assert_eq!(
            ExtensionMessage::parse(json!({"type": "PING"})).unwrap(),
            ExtensionMessage::Ping
        );
    }

    #[test]
    fn test_parse_extract_metadata() {
        let msg = ExtensionMessage::parse(json!({"type": "EXTRACT_METADATA", "url": "https://a.com"}))
            .unwrap();
        assert_eq!(
            msg,
            ExtensionMessage::ExtractMetadata {
                url: "https://a.com".into()
            }
        );
    }

    #[test]
    fn test_parse_unknown_type() {
        let resp = ExtensionMessage::parse(json!({"type": "SELF_DESTRUCT"})).unwrap_err();
        assert!(!resp.success);
        assert_eq!(resp.error.unwrap(), "Unknown message type: SELF_DESTRUCT");
    }

    #[test]
    fn test_parse_missing_url() {
        let resp = ExtensionMessage::parse(json!({"type": "GET_PAGE_INFO"})).unwrap_err();
        assert!(resp.error.unwrap().starts_with("Invalid message"));
    }

    #[test]
    fn test_parse_missing_type() {
        let resp = ExtensionMessage::parse(json!({"url": "x"})).unwrap_err();
        assert_eq!(resp.error.unwrap(), "Message type is required");
    }

    #[test]
    fn test_pong_serialization() {
        let json = serde_json::to_value(ExtensionResponse::pong()).unwrap();
        assert_eq!(json, json!({"success": true, "message": "PONG"}));
    }
}
