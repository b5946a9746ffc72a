//! Plain-text renderings of generated content.
//!
//! The CLI prints either JSON or the Markdown produced here. Headings and
//! labels follow the output language.

use crate::i18n::Language;
use crate::output::{DetailedSummary, MindMapData, MindMapNode};
use std::fmt::Write as _;

/// Render a mind map as one Markdown section per card.
pub fn mind_map_markdown(data: &MindMapData, language: Language) -> String {
    let mut out = format!("# {}\n", data.main_topic.trim());
    let total = data.nodes.len();
    for (i, node) in data.nodes.iter().enumerate() {
        out.push('\n');
        out.push_str(&card_markdown(node, i + 1, total, language));
    }
    out
}

/// Render a single card, e.g. `## Slide 2 of 7 · Title  [fact]`.
pub fn card_markdown(node: &MindMapNode, position: usize, total: usize, language: Language) -> String {
    let m = language.messages();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "## {} {position} {} {total} · {}  [{}]",
        m.slide,
        m.of,
        node.title.trim(),
        node.icon_type
    );
    out.push('\n');
    let _ = writeln!(out, "{}", node.summary.trim());
    out.push('\n');
    let _ = writeln!(out, "**{}**", m.key_points);
    out.push('\n');
    for point in &node.key_points {
        let _ = writeln!(out, "- {}", point.trim());
    }
    out
}

/// Render a detailed summary as a Markdown document.
pub fn summary_markdown(title: &str, summary: &DetailedSummary, language: Language) -> String {
    let m = language.messages();
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", title.trim());
    let _ = writeln!(out, "## {}\n\n{}\n", m.introduction, summary.introduction.trim());
    for section in &summary.sections {
        let _ = writeln!(out, "## {}\n\n{}\n", section.title.trim(), section.content.trim());
    }
    let _ = write!(out, "## {}\n\n{}\n", m.conclusion, summary.conclusion.trim());
    out
}
