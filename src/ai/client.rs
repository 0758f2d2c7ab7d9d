//! HTTP client for the OpenAI-compatible chat completion endpoint.

use std::io::Read;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::config::schema::AiConfig;

/// Longest error-body excerpt quoted in a failure message.
const ERROR_BODY_EXCERPT: usize = 300;

// ---------------------------------------------------------------------------
// Message model
// ---------------------------------------------------------------------------

/// One chat message in the request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

/// Message content: a plain string, or multi-part when a photo rides
/// along as a data URL.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageRef },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageRef {
    pub url: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user".into(),
            content: MessageContent::Parts(parts),
        }
    }
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageRef { url: url.into() },
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the configured model endpoint.
#[derive(Debug, Clone)]
pub struct SilraClient {
    api_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f64,
}

impl SilraClient {
    pub fn from_config(ai: &AiConfig) -> Self {
        let api_key = Some(ai.api_key.trim().to_string()).filter(|k| !k.is_empty());
        Self {
            api_url: ai.api_url.trim().to_string(),
            api_key,
            model: ai.model.clone(),
            temperature: ai.temperature,
        }
    }

    /// Whether an API key is configured. Callers check this before
    /// building a request so a missing key never reaches the network.
    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// POST the chat body with `stream: true` and hand back the response
    /// body reader. No overall timeout: a generation is allowed to take
    /// as long as the stream keeps flowing.
    pub fn chat_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<Box<dyn Read + Send + Sync + 'static>> {
        let Some(key) = &self.api_key else {
            bail!("no AI API key configured");
        };

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
            "temperature": self.temperature,
        });

        match ureq::post(&self.api_url)
            .set("Authorization", &format!("Bearer {key}"))
            .send_json(body)
        {
            Ok(response) => Ok(response.into_reader()),
            Err(ureq::Error::Status(code, response)) => {
                let detail = response.into_string().unwrap_or_default();
                let detail = detail.trim();
                if detail.is_empty() {
                    bail!("model endpoint returned HTTP {code}");
                }
                bail!(
                    "model endpoint returned HTTP {code}: {}",
                    excerpt(detail, ERROR_BODY_EXCERPT)
                );
            }
            Err(err) => Err(err).context("connecting to the model endpoint"),
        }
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}…")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message_serializes_flat() {
        let msg = ChatMessage::user("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn multipart_message_serializes_with_type_tags() {
        let msg = ChatMessage::user_parts(vec![
            ContentPart::text("look"),
            ContentPart::image_url("data:image/jpeg;base64,AAAA"),
        ]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "look"},
                    {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,AAAA"}},
                ],
            })
        );
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = AiConfig {
            api_key: "   ".into(),
            ..AiConfig::default()
        };
        let client = SilraClient::from_config(&cfg);
        assert!(!client.has_key());
        let err = client.chat_stream(&[ChatMessage::user("x")]).err().unwrap();
        assert!(err.to_string().contains("no AI API key"));
    }

    #[test]
    fn error_excerpt_truncates_long_bodies() {
        let long = "x".repeat(400);
        let cut = excerpt(&long, ERROR_BODY_EXCERPT);
        assert_eq!(cut.chars().count(), ERROR_BODY_EXCERPT + 1);
        assert!(cut.ends_with('…'));
    }
}
