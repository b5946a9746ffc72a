//! Model interaction: send one structured request and parse the answer.
//!
//! Deliberately thin. Prompts live in [`crate::prompts`], schemas in
//! [`crate::schema`]. Each call is a single attempt: any failure is
//! returned to the caller as-is, with no retry and no partial result.

use crate::error::MindMapError;
use crate::pipeline::postprocess::clean_json_text;
use crate::provider::{GenerateRequest, GenerativeModel, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, warn};

/// Send `parts` under `schema` and deserialize the answer into `T`.
///
/// `stage` names the request in errors and logs ("mind map", "summary").
pub async fn request_structured<T: DeserializeOwned>(
    provider: &dyn GenerativeModel,
    parts: Vec<Part>,
    schema: Value,
    temperature: Option<f32>,
    stage: &'static str,
) -> Result<T, MindMapError> {
    let start = Instant::now();
    let request = GenerateRequest {
        parts,
        response_schema: schema,
        temperature,
    };

    let response = provider.generate(request).await.inspect_err(|e| {
        warn!("{} request to {} failed: {}", stage, provider.name(), e);
    })?;

    debug!(
        "{}: {} input tokens, {} output tokens, {:?}",
        stage,
        response.prompt_tokens,
        response.completion_tokens,
        start.elapsed()
    );

    parse_structured(response.text.as_deref(), stage)
}

/// Parse model text into `T`.
///
/// `None` or whitespace-only text is [`MindMapError::EmptyResponse`]; text
/// that is not JSON of the expected shape is [`MindMapError::MalformedResponse`].
pub fn parse_structured<T: DeserializeOwned>(
    text: Option<&str>,
    stage: &'static str,
) -> Result<T, MindMapError> {
    let text = match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(MindMapError::EmptyResponse { stage }),
    };

    let cleaned = clean_json_text(text);
    serde_json::from_str(&cleaned).map_err(|e| {
        warn!("{} response did not parse: {}", stage, e);
        MindMapError::MalformedResponse {
            stage,
            detail: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{DetailedSummary, MindMapData};

    #[test]
    fn none_and_blank_are_empty_responses() {
        for text in [None, Some(""), Some("  \n")] {
            let err = parse_structured::<MindMapData>(text, "mind map").unwrap_err();
            assert!(matches!(err, MindMapError::EmptyResponse { stage: "mind map" }));
        }
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_structured::<MindMapData>(Some("Sorry, I can't."), "mind map").unwrap_err();
        assert!(matches!(err, MindMapError::MalformedResponse { .. }));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = parse_structured::<DetailedSummary>(Some(r#"{"introduction": 3}"#), "summary")
            .unwrap_err();
        assert!(matches!(err, MindMapError::MalformedResponse { stage: "summary", .. }));
    }

    #[test]
    fn fenced_json_parses() {
        let text = "```json\n{\"introduction\":\"i\",\"sections\":[],\"conclusion\":\"c\"}\n```";
        let s: DetailedSummary = parse_structured(Some(text), "summary").unwrap();
        assert_eq!(s.introduction, "i");
        assert!(s.sections.is_empty());
    }

    #[test]
    fn zero_width_joiners_survive_parsing() {
        let text = "\u{FEFF}{\"mainTopic\":\"t\",\"nodes\":[{\"id\":\"a\",\"title\":\"می\u{200C}خواهم\",\
            \"summary\":\"s\",\"keyPoints\":[\"👨\u{200D}👩\u{200D}👧\"],\"iconType\":\"fact\"}]}";
        let data: MindMapData = parse_structured(Some(text), "mind map").unwrap();
        assert_eq!(data.nodes[0].title, "می\u{200C}خواهم");
        assert_eq!(data.nodes[0].key_points[0], "👨\u{200D}👩\u{200D}👧");
    }
}
