//! Instructions sent to the generative model.
//!
//! All prompt text lives here so it can be inspected by unit tests and
//! changed without touching request or parsing code. Callers can replace
//! the mind-map instruction via
//! [`crate::config::GenerationConfig::instruction`].

use crate::i18n::Language;
use crate::output::MindMapData;

/// Build the mind-map instruction for the given language.
///
/// `{lang}` placeholders in a custom template are replaced the same way.
pub fn mind_map_instruction(language: Language, template: Option<&str>) -> String {
    let lang = language.prompt_name();
    match template {
        Some(t) => t.replace("{lang}", lang),
        None => format!(
            "Analyze this document. Create a structured 'slideable mind map' summary in {lang}. \
Identify the main topic. Then break the content down into 5-10 logical sequential cards (nodes). \
For each node, generate a short, unique string id. Each node should have a title, a brief \
1-sentence summary, 3-4 distinct bullet points, and a category (concept, fact, formula, or \
example). Ensure all text is in {lang}."
        ),
    }
}

/// Build the detailed-summary instruction, embedding the mind map as JSON context.
pub fn detailed_summary_instruction(
    mind_map: &MindMapData,
    language: Language,
) -> Result<String, serde_json::Error> {
    let lang = language.prompt_name();
    let context = serde_json::to_string(mind_map)?;
    Ok(format!(
        "Based on the following mind map data, generate a detailed summary document in {lang}. \
The document should have a concise introduction, a detailed section for each node expanding on \
its key points in well-structured paragraphs, and a concluding summary. Ensure all text is in \
{lang}. Mind map data: {context}"
    ))
}
