//! The generative-model seam and its Gemini implementation.
//!
//! Generators talk to a [`GenerativeModel`]: one async call that takes a
//! list of content parts plus a response schema and returns the raw text
//! answer. [`GeminiProvider`] implements it over the Gemini REST API;
//! tests and embedders inject their own implementation through
//! [`crate::config::GenerationConfigBuilder::provider`].

use crate::error::MindMapError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables checked for an API key, in order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["NODQRA_API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// One piece of request content.
///
/// Serialises to Gemini's wire form: `{"inlineData": {...}}` or `{"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    InlineData(InlineData),
    Text(String),
}

impl Part {
    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData(InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }
}

/// A base64 document embedded in the request.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Standard base64 without a data-URL prefix.
    pub data: String,
}

impl fmt::Debug for InlineData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineData")
            .field("mime_type", &self.mime_type)
            .field("data", &format_args!("<{} bytes base64>", self.data.len()))
            .finish()
    }
}

/// A single structured-output request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub parts: Vec<Part>,
    /// JSON schema the answer must follow (see [`crate::schema`]).
    pub response_schema: Value,
    pub temperature: Option<f32>,
}

/// The raw answer of a [`GenerativeModel`].
#[derive(Debug, Clone, Default)]
pub struct GenerateResponse {
    /// Concatenated answer text; `None` when the service produced nothing.
    pub text: Option<String>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// A hosted model able to answer a structured-output request.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Model identifier.
    fn model(&self) -> &str;

    /// Send one request. Transport and HTTP failures map to
    /// [`MindMapError::ServiceError`]; an empty answer is *not* an error here.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, MindMapError>;
}

// ── Gemini ───────────────────────────────────────────────────────────────

/// [`GenerativeModel`] backed by the Gemini `generateContent` endpoint.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiProvider {
    /// Create a provider. `timeout` of `None` means the call may wait indefinitely.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, MindMapError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| MindMapError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a provider from the first non-empty key in [`API_KEY_ENV_VARS`].
    pub fn from_env(model: &str, base_url: &str, timeout: Option<Duration>) -> Result<Self, MindMapError> {
        let key = api_key_from_env().ok_or_else(|| MindMapError::ProviderNotConfigured {
            hint: format!("Set one of {} or pass --api-key.", API_KEY_ENV_VARS.join(", ")),
        })?;
        Self::new(key, model, base_url, timeout)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

/// First non-empty API key found in the environment.
pub fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.trim().is_empty())
}

#[async_trait]
impl GenerativeModel for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, MindMapError> {
        let body = GeminiRequest::from(request);
        let url = self.endpoint();
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MindMapError::ServiceError {
                message: if e.is_timeout() {
                    format!("request timed out: {e}")
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| MindMapError::ServiceError {
                message: format!("failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            return Err(MindMapError::ServiceError {
                message: format!("HTTP {}: {}", status, api_error_message(&raw)),
            });
        }

        let parsed: GeminiResponse =
            serde_json::from_str(&raw).map_err(|e| MindMapError::ServiceError {
                message: format!("unreadable response envelope: {e}"),
            })?;
        Ok(parsed.into())
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl From<GenerateRequest> for GeminiRequest {
    fn from(r: GenerateRequest) -> Self {
        Self {
            contents: vec![GeminiContent { parts: r.parts }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json",
                response_schema: r.response_schema,
                temperature: r.temperature,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

impl From<GeminiResponse> for GenerateResponse {
    fn from(r: GeminiResponse) -> Self {
        let text: String = r
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();
        let usage = r.usage_metadata.unwrap_or_default();
        Self {
            text: (!text.is_empty()).then_some(text),
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
        }
    }
}

/// Extract `error.message` from a Gemini error body, falling back to the raw text.
fn api_error_message(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| raw.trim().chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_wire_format() {
        let req = GenerateRequest {
            parts: vec![Part::inline("application/pdf", "JVBERi0="), Part::text("Go")],
            response_schema: json!({"type": "OBJECT"}),
            temperature: None,
        };
        let body = serde_json::to_value(GeminiRequest::from(req)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        {"inlineData": {"mimeType": "application/pdf", "data": "JVBERi0="}},
                        {"text": "Go"}
                    ]
                }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {"type": "OBJECT"}
                }
            })
        );
    }

    #[test]
    fn temperature_is_sent_when_set() {
        let req = GenerateRequest {
            parts: vec![Part::text("x")],
            response_schema: json!({}),
            temperature: Some(0.2),
        };
        let body = serde_json::to_value(GeminiRequest::from(req)).unwrap();
        assert!(body["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn response_text_is_concatenated() {
        let raw = r#"{
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}], "role": "model"}}],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 30}
        }"#;
        let r: GenerateResponse = serde_json::from_str::<GeminiResponse>(raw).unwrap().into();
        assert_eq!(r.text.as_deref(), Some("{\"a\":1}"));
        assert_eq!(r.prompt_tokens, 120);
        assert_eq!(r.completion_tokens, 30);
    }

    #[test]
    fn blocked_response_has_no_text() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let r: GenerateResponse = serde_json::from_str::<GeminiResponse>(raw).unwrap().into();
        assert!(r.text.is_none());
    }

    #[test]
    fn api_error_message_prefers_structured_error() {
        let raw = r#"{"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(api_error_message(raw), "API key not valid");
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn debug_redacts_key_and_payload() {
        let p = GeminiProvider::new("secret-key", DEFAULT_MODEL, DEFAULT_BASE_URL, None).unwrap();
        let s = format!("{p:?}");
        assert!(!s.contains("secret-key"));
        assert_eq!(
            p.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let d = format!("{:?}", Part::inline("image/png", "AAAA"));
        assert!(d.contains("4 bytes base64"), "got: {d}");
    }
}
