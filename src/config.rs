//! Configuration for mind-map and summary generation.
//!
//! All behaviour is controlled through [`GenerationConfig`], built via its
//! [`GenerationConfigBuilder`]. Defaults reproduce the hosted service's
//! plain behaviour: `gemini-2.5-flash`, French output, no timeout.

use crate::error::MindMapError;
use crate::i18n::Language;
use crate::progress::ProgressCallback;
use crate::provider::{GenerativeModel, DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::fmt;
use std::sync::Arc;

/// Configuration for a generation run.
///
/// # Example
/// ```rust
/// use nodqra_mindmap::{GenerationConfig, Language};
///
/// let config = GenerationConfig::builder()
///     .language(Language::En)
///     .model("gemini-2.5-flash")
///     .build()
///     .unwrap();
/// assert_eq!(config.language, Language::En);
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Model identifier. Default: `gemini-2.5-flash`.
    pub model: String,

    /// API key. If None, read from `NODQRA_API_KEY`, `GEMINI_API_KEY` or `GOOGLE_API_KEY`.
    pub api_key: Option<String>,

    /// API endpoint root. Default: `https://generativelanguage.googleapis.com`.
    pub base_url: String,

    /// Output language. Default: French.
    pub language: Language,

    /// Sampling temperature. None leaves the service default.
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds. None (the default) waits indefinitely.
    pub request_timeout_secs: Option<u64>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Replacement for the built-in mind-map instruction; `{lang}` is substituted.
    pub instruction: Option<String>,

    /// Pre-constructed model. Takes precedence over `api_key`.
    pub provider: Option<Arc<dyn GenerativeModel>>,

    /// Stage notifications.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: Language::default(),
            temperature: None,
            request_timeout_secs: None,
            download_timeout_secs: 120,
            instruction: None,
            provider: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("instruction", &self.instruction.as_ref().map(|_| "<custom>"))
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn GenerationProgressCallback>"),
            )
            .finish()
    }
}

impl GenerationConfig {
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.config.language = language;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn instruction(mut self, template: impl Into<String>) -> Self {
        self.config.instruction = Some(template.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn GenerativeModel>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, MindMapError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(MindMapError::InvalidConfig("model must not be empty".into()));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(MindMapError::InvalidConfig(format!(
                "base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        if let Some(t) = c.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(MindMapError::InvalidConfig(format!(
                    "temperature must be 0.0–2.0, got {t}"
                )));
            }
        }
        if c.request_timeout_secs == Some(0) {
            return Err(MindMapError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
