//! End-to-end tests for nodqra-mindmap.
//!
//! Most tests drive the full pipeline against a scripted
//! [`GenerativeModel`] and need no network. The `live_*` tests call the
//! real Gemini API; they are gated behind `E2E_ENABLED` and an API key.
//!
//! Run the live tests with:
//!   E2E_ENABLED=1 GEMINI_API_KEY=... cargo test --test e2e live_ -- --nocapture

use async_trait::async_trait;
use nodqra_mindmap::pipeline::encode;
use nodqra_mindmap::{
    generate_detailed_summary, generate_mind_map, generate_mind_map_from_input,
    validate_document, AppState, Document, GenerateRequest, GenerateResponse, GenerationConfig,
    GenerationProgressCallback, GenerativeModel, IconType, Language, MindMapData, MindMapError,
    Part, SessionHandle, Stage, TutorialFlags, SUPPORTED_MIME_TYPES,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Replays canned answers and records every request it receives.
#[derive(Default)]
struct ScriptedModel {
    answers: Mutex<VecDeque<Result<Option<String>, String>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    fn answering(answers: Vec<Option<&str>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().map(|a| Ok(a.map(String::from))).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(VecDeque::from([Err(message.to_string())])),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, i: usize) -> GenerateRequest {
        self.requests.lock().unwrap()[i].clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, MindMapError> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted model ran out of answers");
        match next {
            Ok(text) => Ok(GenerateResponse {
                text,
                prompt_tokens: 100,
                completion_tokens: 50,
            }),
            Err(message) => Err(MindMapError::ServiceError { message }),
        }
    }
}

fn config_with(model: Arc<ScriptedModel>, language: Language) -> GenerationConfig {
    GenerationConfig::builder()
        .provider(model)
        .language(language)
        .build()
        .expect("valid config")
}

const MIND_MAP_JSON: &str = r#"{
  "mainTopic": "The Water Cycle",
  "nodes": [
    {"id": "evap", "title": "Evaporation", "summary": "Water turns into vapour.", "keyPoints": ["Sun heats water", "Oceans supply most vapour", "Rate rises with temperature"], "iconType": "concept"},
    {"id": "cond", "title": "Condensation", "summary": "Vapour forms clouds.", "keyPoints": ["Air cools with altitude", "Droplets form on particles", "Clouds appear"], "iconType": "fact"},
    {"id": "prec", "title": "Precipitation", "summary": "Water falls back.", "keyPoints": ["Rain", "Snow", "Hail", "Sleet"], "iconType": "example"},
    {"id": "coll", "title": "Collection", "summary": "Water gathers in bodies.", "keyPoints": ["Rivers", "Lakes", "Groundwater"], "iconType": "fact"},
    {"id": "bal", "title": "Water balance", "summary": "Inputs equal outputs.", "keyPoints": ["P = E + R + ΔS", "Long-term averages", "Basin scale"], "iconType": "formula"}
  ]
}"#;

const SUMMARY_JSON: &str = r#"{
  "introduction": "Water moves continuously between sea, air and land.",
  "sections": [
    {"title": "Evaporation", "content": "The sun heats surface water..."},
    {"title": "Condensation", "content": "Rising vapour cools..."}
  ],
  "conclusion": "The cycle redistributes water and energy."
}"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write_fixture(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

// ── Validator ───────────────────────────────────────────────────────────────

#[test]
fn test_validator_accepts_exactly_the_allow_list() {
    for mime in SUPPORTED_MIME_TYPES {
        assert!(validate_document("file.bin", mime).is_ok(), "{mime}");
    }
    for mime in ["text/html", "application/zip", "image/webp", "video/mp4"] {
        assert!(validate_document("file.bin", mime).is_err(), "{mime}");
    }
}

// ── Example scenario: pdf / en ──────────────────────────────────────────────

#[tokio::test]
async fn test_pdf_english_scenario() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let bytes = b"%PDF-1.7\n1 0 obj << >> endobj\n%%EOF";
    let path = write_fixture(&dir, "water.pdf", bytes);

    let model = ScriptedModel::answering(vec![Some(MIND_MAP_JSON)]);
    let config = config_with(model.clone(), Language::En);

    let map = generate_mind_map_from_input(path.to_str().unwrap(), &config)
        .await
        .expect("generation should succeed");

    assert_eq!(map.main_topic, "The Water Cycle");
    assert!((5..=10).contains(&map.nodes.len()));
    let ids: Vec<&str> = map.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["evap", "cond", "prec", "coll", "bal"], "order must be preserved");
    assert!(map.nodes.iter().all(|n| IconType::ALL.contains(&n.icon_type)));

    // One request: inline PDF first, English instruction second, schema attached.
    assert_eq!(model.request_count(), 1);
    let req = model.request(0);
    match &req.parts[0] {
        Part::InlineData(d) => {
            assert_eq!(d.mime_type, "application/pdf");
            assert_eq!(encode::decode(&d.data).unwrap(), bytes);
        }
        other => panic!("expected inline data first, got {other:?}"),
    }
    match &req.parts[1] {
        Part::Text(t) => assert!(t.contains("in English")),
        other => panic!("expected instruction second, got {other:?}"),
    }
    assert_eq!(req.response_schema["required"][0], "mainTopic");
}

#[tokio::test]
async fn test_unsupported_file_never_reaches_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "notes.docx", b"PK\x03\x04");

    let model = ScriptedModel::answering(vec![]);
    let config = config_with(model.clone(), Language::Fr);

    let err = generate_mind_map_from_input(path.to_str().unwrap(), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, MindMapError::UnsupportedFormat { .. }));
    assert_eq!(err.user_message(Language::Fr), "Format non supporté.");
    assert_eq!(model.request_count(), 0);
}

// ── Failure modes ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_text_is_no_response_error() {
    let model = ScriptedModel::answering(vec![None]);
    let config = config_with(model, Language::Fr);

    let err = generate_mind_map("JVBERg==", "application/pdf", Language::Fr, &config)
        .await
        .unwrap_err();
    assert!(matches!(err, MindMapError::EmptyResponse { .. }), "got {err:?}");
    assert!(err.to_string().contains("No response from AI"));
}

#[tokio::test]
async fn test_invalid_json_propagates_as_error() {
    let model = ScriptedModel::answering(vec![Some("{\"mainTopic\": \"Cut off")]);
    let config = config_with(model, Language::En);

    let err = generate_mind_map("JVBERg==", "application/pdf", Language::En, &config)
        .await
        .unwrap_err();
    assert!(matches!(err, MindMapError::MalformedResponse { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_schema_violation_is_caught_after_parsing() {
    let dup = r#"{"mainTopic":"T","nodes":[
        {"id":"a","title":"A","summary":"s","keyPoints":["1","2","3"],"iconType":"fact"},
        {"id":"a","title":"B","summary":"s","keyPoints":["1","2","3"],"iconType":"fact"}]}"#;
    let model = ScriptedModel::answering(vec![Some(dup)]);
    let config = config_with(model, Language::En);

    let err = generate_mind_map("AA==", "image/png", Language::En, &config)
        .await
        .unwrap_err();
    assert!(matches!(err, MindMapError::SchemaViolation { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_service_failure_is_single_attempt() {
    let model = ScriptedModel::failing("HTTP 503: overloaded");
    let config = config_with(model.clone(), Language::En);

    let err = generate_mind_map("AA==", "image/jpeg", Language::En, &config)
        .await
        .unwrap_err();
    assert!(matches!(err, MindMapError::ServiceError { .. }));
    assert_eq!(model.request_count(), 1, "no retry expected");
    assert_eq!(err.user_message(Language::En), "Analysis error.");
}

#[tokio::test]
async fn test_data_url_prefix_is_stripped_before_sending() {
    let model = ScriptedModel::answering(vec![Some(MIND_MAP_JSON)]);
    let config = config_with(model.clone(), Language::Ar);

    generate_mind_map("data:image/png;base64,AAEC", "image/png", Language::Ar, &config)
        .await
        .unwrap();
    match &model.request(0).parts[0] {
        Part::InlineData(d) => assert_eq!(d.data, "AAEC"),
        other => panic!("unexpected part {other:?}"),
    }
}

// ── Detailed summary ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_detailed_summary_from_mind_map() {
    let map: MindMapData = serde_json::from_str(MIND_MAP_JSON).unwrap();
    let model = ScriptedModel::answering(vec![Some(SUMMARY_JSON)]);
    let config = config_with(model.clone(), Language::Fr);

    let summary = generate_detailed_summary(&map, Language::Fr, &config)
        .await
        .unwrap();
    assert_eq!(summary.sections.len(), 2);
    assert_eq!(summary.sections[0].title, "Evaporation");

    let req = model.request(0);
    assert_eq!(req.parts.len(), 1, "summary request carries no document");
    match &req.parts[0] {
        Part::Text(t) => {
            assert!(t.contains("in French"));
            assert!(t.contains("\"mainTopic\":\"The Water Cycle\""));
        }
        other => panic!("unexpected part {other:?}"),
    }
    assert_eq!(req.response_schema["required"][2], "conclusion");
}

#[tokio::test]
async fn test_detailed_summary_empty_response() {
    let map: MindMapData = serde_json::from_str(MIND_MAP_JSON).unwrap();
    let model = ScriptedModel::answering(vec![Some("   ")]);
    let config = config_with(model, Language::En);

    let err = generate_detailed_summary(&map, Language::En, &config)
        .await
        .unwrap_err();
    assert!(matches!(err, MindMapError::EmptyResponse { stage: "summary" }));
}

// ── Progress callbacks ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_progress_callbacks_follow_stages() {
    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl GenerationProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.0.lock().unwrap().push(format!("+{stage}"));
        }
        fn on_stage_complete(&self, stage: Stage) {
            self.0.lock().unwrap().push(format!("-{stage}"));
        }
        fn on_error(&self, stage: Stage, _error: &str) {
            self.0.lock().unwrap().push(format!("!{stage}"));
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "scan.png", &[0x89, b'P', b'N', b'G']);
    let recorder = Arc::new(Recorder::default());
    let config = GenerationConfig::builder()
        .provider(ScriptedModel::answering(vec![None]))
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    let _ = generate_mind_map_from_input(path.to_str().unwrap(), &config).await;
    assert_eq!(
        *recorder.0.lock().unwrap(),
        vec!["+reading", "-reading", "+encoding", "-encoding", "+generating", "!generating"]
    );
}

// ── Session ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_upload_flow() {
    let session = SessionHandle::new(Language::En, TutorialFlags::default());
    let model = ScriptedModel::answering(vec![Some(MIND_MAP_JSON), Some("not json")]);
    // The config language is overridden by the session language.
    let config = config_with(model.clone(), Language::Fr);

    let doc = Document::from_bytes("deck.pptx", nodqra_mindmap::pipeline::input::MIME_PPTX, vec![1, 2, 3]);
    let map = session.process_upload(&doc, &config).await.unwrap();
    assert_eq!(map.nodes.len(), 5);

    let snap = session.snapshot().await;
    assert_eq!(snap.app_state, AppState::Viewing);
    assert!(snap.error.is_none());
    match &model.request(0).parts[1] {
        Part::Text(t) => assert!(t.contains("in English")),
        other => panic!("unexpected part {other:?}"),
    }

    // A failing second upload goes back to Idle but keeps the previous map.
    let err = session.process_upload(&doc, &config).await.unwrap_err();
    assert!(matches!(err, MindMapError::MalformedResponse { .. }));
    let snap = session.snapshot().await;
    assert_eq!(snap.app_state, AppState::Idle);
    assert_eq!(snap.error.as_deref(), Some("Analysis error."));
    assert_eq!(snap.mind_map.unwrap().main_topic, "The Water Cycle");
}

#[test]
fn test_block_on_generation() {
    let model = ScriptedModel::answering(vec![Some(MIND_MAP_JSON)]);
    let config = config_with(model, Language::En);
    let map = tokio_test::block_on(generate_mind_map("AA==", "image/png", Language::En, &config))
        .unwrap();
    assert_eq!(map.nodes[4].icon_type, IconType::Formula);
    assert_eq!(map.nodes[2].key_points.len(), 4);
}

#[test]
fn test_sync_wrapper_reports_missing_file() {
    let config = config_with(ScriptedModel::answering(vec![]), Language::En);
    let err = nodqra_mindmap::generate_mind_map_sync("/no/such/file.pdf", &config).unwrap_err();
    assert!(matches!(err, MindMapError::FileNotFound { .. }));
}

#[test]
fn test_callback_and_model_are_send_sync() {
    fn assert_send_sync<T: Send + Sync + ?Sized>() {}
    assert_send_sync::<dyn GenerativeModel>();
    assert_send_sync::<dyn GenerationProgressCallback>();
    assert_send_sync::<GenerationConfig>();
    assert_send_sync::<SessionHandle>();
}

// ── Live API (gated) ────────────────────────────────────────────────────────

/// Skip unless E2E_ENABLED is set and an API key is available.
macro_rules! live_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run live tests");
            return;
        }
        if nodqra_mindmap::provider::api_key_from_env().is_none() {
            println!("SKIP — no GEMINI_API_KEY / GOOGLE_API_KEY / NODQRA_API_KEY");
            return;
        }
    }};
}

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

#[tokio::test]
async fn live_mind_map_and_summary() {
    live_skip_unless_ready!();
    let path = test_cases_dir().join("sample.pdf");
    if !path.exists() {
        println!("SKIP — test file not found: {}", path.display());
        return;
    }

    let config = GenerationConfig::builder()
        .language(Language::En)
        .build()
        .unwrap();
    let map = generate_mind_map_from_input(path.to_str().unwrap(), &config)
        .await
        .expect("live generation should succeed");
    assert!(!map.nodes.is_empty());
    println!("{} — {} cards", map.main_topic, map.nodes.len());

    let summary = generate_detailed_summary(&map, Language::En, &config)
        .await
        .expect("live summary should succeed");
    assert!(!summary.introduction.is_empty());
}
