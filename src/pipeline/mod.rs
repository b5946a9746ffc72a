//! Pipeline stages for document-to-mind-map generation.
//!
//! Each submodule implements exactly one step, so each can be tested on
//! its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ llm ──▶ postprocess
//! (validate) (base64)  (model)  (unwrap JSON)
//! ```
//!
//! 1. [`input`]  — resolve a path or URL and accept/reject it by declared type
//! 2. [`encode`] — read the bytes and base64-wrap them for the inline part
//! 3. [`llm`]    — one structured request; the only stage with network I/O
//! 4. [`postprocess`] — strip fences/BOM from the answer before parsing

pub mod encode;
pub mod input;
pub mod llm;
pub mod postprocess;
