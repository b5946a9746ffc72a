//! Generation entry points.
//!
//! [`generate_mind_map`] and [`generate_detailed_summary`] are the two
//! model calls. [`generate_mind_map_from_input`] runs the whole flow for a
//! path or URL: resolve → validate → encode → generate. Every function is
//! a single attempt; errors surface unchanged and nothing is cached.

use crate::config::GenerationConfig;
use crate::error::MindMapError;
use crate::i18n::Language;
use crate::output::{DetailedSummary, MindMapData};
use crate::pipeline::input::{self, Document};
use crate::pipeline::{encode, llm};
use crate::progress::Stage;
use crate::prompts;
use crate::provider::{GeminiProvider, GenerativeModel, Part};
use crate::schema;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Generate a mind map from an already-encoded document.
///
/// # Arguments
/// * `base64_data` — standard base64, without a data-URL prefix
/// * `mime_type`   — media type of the document as sent to the model
/// * `language`    — language of every generated string
///
/// # Errors
/// [`MindMapError::EmptyResponse`] when the service answers with no text,
/// [`MindMapError::MalformedResponse`] when the text is not a mind map,
/// [`MindMapError::SchemaViolation`] when it parses but is invalid (no
/// nodes, duplicate ids, …), [`MindMapError::ServiceError`] for failed calls.
pub async fn generate_mind_map(
    base64_data: &str,
    mime_type: &str,
    language: Language,
    config: &GenerationConfig,
) -> Result<MindMapData, MindMapError> {
    let provider = resolve_provider(config)?;
    mind_map_with(provider.as_ref(), base64_data, mime_type, language, config).await
}

/// Expand a mind map into an introduction, one section per card, and a conclusion.
pub async fn generate_detailed_summary(
    mind_map: &MindMapData,
    language: Language,
    config: &GenerationConfig,
) -> Result<DetailedSummary, MindMapError> {
    let provider = resolve_provider(config)?;
    staged(config, Stage::Summarizing, async {
        info!(
            "Generating detailed summary for '{}' (lang={})",
            mind_map.main_topic, language
        );
        let instruction = prompts::detailed_summary_instruction(mind_map, language)
            .map_err(|e| MindMapError::Internal(format!("serialise mind map: {e}")))?;
        let summary: DetailedSummary = llm::request_structured(
            provider.as_ref(),
            vec![Part::text(instruction)],
            schema::detailed_summary_schema(),
            config.temperature,
            "summary",
        )
        .await?;
        summary.validate()?;
        debug!("Summary ready: {} sections", summary.sections.len());
        Ok(summary)
    })
    .await
}

/// Resolve, validate, encode and summarise a local file or URL.
///
/// Uses `config.language` as the target language. The model is resolved
/// first, so a missing API key fails before anything is read.
pub async fn generate_mind_map_from_input(
    input_str: impl AsRef<str>,
    config: &GenerationConfig,
) -> Result<MindMapData, MindMapError> {
    let input_str = input_str.as_ref();
    info!("Starting generation: {}", input_str);
    let provider = resolve_provider(config)?;

    let doc = staged(
        config,
        Stage::Reading,
        input::resolve_input(input_str, config.download_timeout_secs),
    )
    .await?;
    document_with(provider.as_ref(), &doc, config).await
}

/// Validate, encode and summarise a resolved [`Document`].
pub async fn generate_mind_map_from_document(
    doc: &Document,
    config: &GenerationConfig,
) -> Result<MindMapData, MindMapError> {
    // Validation happens before the model is resolved or any byte is read.
    doc.kind()?;
    let provider = resolve_provider(config)?;
    document_with(provider.as_ref(), doc, config).await
}

async fn document_with(
    provider: &dyn GenerativeModel,
    doc: &Document,
    config: &GenerationConfig,
) -> Result<MindMapData, MindMapError> {
    let total_start = Instant::now();
    let kind = doc.kind()?;
    debug!("'{}' accepted as {:?}", doc.name, kind);

    let b64 = staged(config, Stage::Encoding, encode::encode_document(doc)).await?;
    let data = mind_map_with(provider, &b64, kind.mime_type(), config.language, config).await?;

    info!(
        "Generation complete for '{}' in {}ms",
        doc.name,
        total_start.elapsed().as_millis()
    );
    Ok(data)
}

/// Synchronous wrapper around [`generate_mind_map_from_input`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_mind_map_sync(
    input_str: impl AsRef<str>,
    config: &GenerationConfig,
) -> Result<MindMapData, MindMapError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MindMapError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_mind_map_from_input(input_str, config))
}

/// Write `value` as pretty JSON to `path` atomically.
///
/// The JSON goes to a temp file in the same directory which is then
/// renamed over `path`, so readers never see a partial file.
pub async fn write_json<T: Serialize>(
    value: &T,
    output_path: impl AsRef<Path>,
) -> Result<(), MindMapError> {
    let path = output_path.as_ref().to_path_buf();
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| MindMapError::Internal(format!("serialise output: {e}")))?;
    write_atomic(path, json).await
}

/// Write raw text to `path` atomically (used for Markdown output).
pub async fn write_text(text: String, output_path: impl AsRef<Path>) -> Result<(), MindMapError> {
    write_atomic(output_path.as_ref().to_path_buf(), text.into_bytes()).await
}

async fn write_atomic(path: std::path::PathBuf, bytes: Vec<u8>) -> Result<(), MindMapError> {
    tokio::task::spawn_blocking(move || {
        let fail = |source: std::io::Error| MindMapError::OutputWriteFailed {
            path: path.clone(),
            source,
        };
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(fail)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(fail)?;
        tmp.write_all(&bytes).map_err(fail)?;
        tmp.persist(&path).map_err(|e| fail(e.error))?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok::<(), MindMapError>(())
    })
    .await
    .map_err(|e| MindMapError::Internal(format!("write task panicked: {e}")))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the model, from most-specific to least-specific:
///
/// 1. **Injected provider** (`config.provider`) — used as-is.
/// 2. **Explicit key** (`config.api_key`) — Gemini with that key.
/// 3. **Environment** — first of `NODQRA_API_KEY`, `GEMINI_API_KEY`,
///    `GOOGLE_API_KEY`.
pub fn resolve_provider(config: &GenerationConfig) -> Result<Arc<dyn GenerativeModel>, MindMapError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let timeout = config.request_timeout_secs.map(Duration::from_secs);

    if let Some(ref key) = config.api_key {
        if key.trim().is_empty() {
            return Err(MindMapError::ProviderNotConfigured {
                hint: "The API key is empty.".into(),
            });
        }
        return Ok(Arc::new(GeminiProvider::new(
            key.clone(),
            config.model.clone(),
            config.base_url.clone(),
            timeout,
        )?));
    }

    Ok(Arc::new(GeminiProvider::from_env(
        &config.model,
        &config.base_url,
        timeout,
    )?))
}

async fn mind_map_with(
    provider: &dyn GenerativeModel,
    base64_data: &str,
    mime_type: &str,
    language: Language,
    config: &GenerationConfig,
) -> Result<MindMapData, MindMapError> {
    staged(config, Stage::Generating, async {
        info!(
            "Generating mind map ({}, {} bytes base64, lang={}) with {}",
            mime_type,
            base64_data.len(),
            language,
            provider.model()
        );
        let parts = vec![
            Part::inline(mime_type, encode::strip_data_url_prefix(base64_data)),
            Part::text(prompts::mind_map_instruction(
                language,
                config.instruction.as_deref(),
            )),
        ];
        let data: MindMapData = llm::request_structured(
            provider,
            parts,
            schema::mind_map_schema(),
            config.temperature,
            "mind map",
        )
        .await?;
        data.validate()?;
        info!(
            "Mind map ready: '{}' with {} cards",
            data.main_topic,
            data.nodes.len()
        );
        Ok(data)
    })
    .await
}

/// Run `fut` wrapped in progress-callback notifications for `stage`.
async fn staged<T, F>(config: &GenerationConfig, stage: Stage, fut: F) -> Result<T, MindMapError>
where
    F: std::future::Future<Output = Result<T, MindMapError>>,
{
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
    let result = fut.await;
    if let Some(ref cb) = config.progress_callback {
        match &result {
            Ok(_) => cb.on_stage_complete(stage),
            Err(e) => cb.on_error(stage, &e.to_string()),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{GenerateRequest, GenerateResponse};

    #[test]
    fn injected_provider_wins() {
        struct Fixed;
        #[async_trait::async_trait]
        impl GenerativeModel for Fixed {
            fn name(&self) -> &str {
                "fixed"
            }
            fn model(&self) -> &str {
                "fixed-1"
            }
            async fn generate(
                &self,
                _request: GenerateRequest,
            ) -> Result<GenerateResponse, MindMapError> {
                Ok(Default::default())
            }
        }

        let config = GenerationConfig::builder()
            .provider(Arc::new(Fixed))
            .api_key("ignored")
            .build()
            .unwrap();
        assert_eq!(resolve_provider(&config).unwrap().name(), "fixed");
    }

    #[test]
    fn explicit_key_builds_gemini() {
        let config = GenerationConfig::builder()
            .api_key("k")
            .model("gemini-2.0-flash")
            .build()
            .unwrap();
        let p = resolve_provider(&config).unwrap();
        assert_eq!(p.name(), "gemini");
        assert_eq!(p.model(), "gemini-2.0-flash");
    }

    #[test]
    fn blank_key_is_not_configured() {
        let config = GenerationConfig::builder().api_key(" ").build().unwrap();
        assert!(matches!(
            resolve_provider(&config),
            Err(MindMapError::ProviderNotConfigured { .. })
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_before_reading() {
        use crate::progress::GenerationProgressCallback;
        use std::sync::Mutex;

        #[derive(Default)]
        struct Stages(Mutex<Vec<Stage>>);
        impl GenerationProgressCallback for Stages {
            fn on_stage_start(&self, stage: Stage) {
                self.0.lock().unwrap().push(stage);
            }
        }

        let stages = Arc::new(Stages::default());
        let config = GenerationConfig::builder()
            .api_key("")
            .progress_callback(stages.clone())
            .build()
            .unwrap();

        // The path does not exist; the key check must win.
        let err = generate_mind_map_from_input("/no/such/file.pdf", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, MindMapError::ProviderNotConfigured { .. }));
        assert!(stages.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn write_json_is_atomic_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        write_json(&serde_json::json!({"mainTopic": "x"}), &path)
            .await
            .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"mainTopic\": \"x\""));
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
