//! # nodqra-mindmap
//!
//! Turn a document (PDF, image or slide deck) into a swipeable "mind map"
//! of revision cards, and optionally into a longer detailed summary, using
//! a hosted generative model (Gemini) with a fixed JSON response schema.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document
//!  │
//!  ├─ 1. Input     resolve path/URL, accept by declared media type
//!  ├─ 2. Encode    bytes → base64 inline part
//!  ├─ 3. Generate  one structured request (mind-map schema)
//!  ├─ 4. Validate  parse + check ids, text and ordering
//!  └─ 5. Summary   optional second request (detailed-summary schema)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nodqra_mindmap::{generate_detailed_summary, generate_mind_map_from_input, GenerationConfig, Language};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from NODQRA_API_KEY / GEMINI_API_KEY / GOOGLE_API_KEY
//!     let config = GenerationConfig::builder().language(Language::En).build()?;
//!     let map = generate_mind_map_from_input("lecture.pdf", &config).await?;
//!     for node in &map.nodes {
//!         println!("[{}] {}", node.icon_type, node.title);
//!     }
//!     let summary = generate_detailed_summary(&map, Language::En, &config).await?;
//!     println!("{}", summary.introduction);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `nodqra` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod i18n;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod render;
pub mod schema;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use error::{ErrorKind, MindMapError};
pub use generate::{
    generate_detailed_summary, generate_mind_map, generate_mind_map_from_document,
    generate_mind_map_from_input, generate_mind_map_sync, write_json, write_text,
};
pub use i18n::Language;
pub use output::{DetailedSummary, IconType, MindMapData, MindMapNode, SummarySection};
pub use pipeline::input::{validate_document, Document, DocumentKind, SUPPORTED_MIME_TYPES};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
pub use provider::{GeminiProvider, GenerateRequest, GenerateResponse, GenerativeModel, Part};
pub use session::{AppState, SessionHandle, SessionState, TutorialFlags, TutorialStep};
