//! Response schemas sent with every generation request.
//!
//! Gemini's structured-output mode takes an OpenAPI-subset schema
//! (`OBJECT`, `ARRAY`, `STRING`, `enum`, `required`). The keys here must
//! stay in sync with the serde names in [`crate::output`].

use crate::output::IconType;
use serde_json::{json, Value};

/// Schema for [`crate::output::MindMapData`].
pub fn mind_map_schema() -> Value {
    let icon_types: Vec<&str> = IconType::ALL.iter().map(|t| t.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "mainTopic": { "type": "STRING" },
            "nodes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "title": { "type": "STRING" },
                        "summary": { "type": "STRING" },
                        "keyPoints": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" }
                        },
                        "iconType": {
                            "type": "STRING",
                            "enum": icon_types
                        }
                    },
                    "required": ["id", "title", "summary", "keyPoints", "iconType"]
                }
            }
        },
        "required": ["mainTopic", "nodes"]
    })
}

/// Schema for [`crate::output::DetailedSummary`].
pub fn detailed_summary_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "introduction": { "type": "STRING" },
            "sections": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "content": { "type": "STRING" }
                    },
                    "required": ["title", "content"]
                }
            },
            "conclusion": { "type": "STRING" }
        },
        "required": ["introduction", "sections", "conclusion"]
    })
}
