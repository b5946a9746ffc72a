//! Output types: the mind map and the detailed summary.
//!
//! Both structures are produced entirely by the hosted model. The client
//! requests a strict JSON schema (see [`crate::schema`]) but never trusts
//! it: after `serde` has checked the shape, [`MindMapData::validate`] and
//! [`DetailedSummary::validate`] check the invariants a schema cannot
//! express (unique ids, non-blank text, non-empty sequences).

use crate::error::MindMapError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// Recommended number of key points per card.
pub const KEY_POINTS_RANGE: std::ops::RangeInclusive<usize> = 3..=4;

/// Recommended number of cards per mind map.
pub const NODES_RANGE: std::ops::RangeInclusive<usize> = 5..=10;

/// Category of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconType {
    Concept,
    Fact,
    Formula,
    Example,
}

impl IconType {
    pub const ALL: [IconType; 4] = [
        IconType::Concept,
        IconType::Fact,
        IconType::Formula,
        IconType::Example,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IconType::Concept => "concept",
            IconType::Fact => "fact",
            IconType::Formula => "formula",
            IconType::Example => "example",
        }
    }
}

impl fmt::Display for IconType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One card of the mind map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapNode {
    /// Unique within its [`MindMapData`].
    pub id: String,
    pub title: String,
    /// One-sentence summary.
    pub summary: String,
    /// Bullet points, normally three or four.
    pub key_points: Vec<String>,
    pub icon_type: IconType,
}

/// The structured card-based summary of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapData {
    pub main_topic: String,
    /// Cards in reading order.
    pub nodes: Vec<MindMapNode>,
}

impl MindMapData {
    /// Check the invariants that the response schema cannot enforce.
    ///
    /// Hard failures: blank topic, no nodes, blank or duplicate ids, blank
    /// titles, a node without key points. Card and key-point counts outside
    /// the recommended ranges are only logged.
    pub fn validate(&self) -> Result<(), MindMapError> {
        let violation = |detail: String| MindMapError::SchemaViolation {
            stage: "mind map",
            detail,
        };

        if self.main_topic.trim().is_empty() {
            return Err(violation("mainTopic is empty".into()));
        }
        if self.nodes.is_empty() {
            return Err(violation("nodes is empty".into()));
        }
        if !NODES_RANGE.contains(&self.nodes.len()) {
            warn!(
                "Mind map has {} cards (expected {}–{})",
                self.nodes.len(),
                NODES_RANGE.start(),
                NODES_RANGE.end()
            );
        }

        let mut seen = HashSet::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if node.id.trim().is_empty() {
                return Err(violation(format!("node {} has an empty id", i + 1)));
            }
            if !seen.insert(node.id.as_str()) {
                return Err(violation(format!("duplicate node id '{}'", node.id)));
            }
            if node.title.trim().is_empty() {
                return Err(violation(format!("node '{}' has an empty title", node.id)));
            }
            if node.key_points.is_empty() {
                return Err(violation(format!("node '{}' has no key points", node.id)));
            }
            if !KEY_POINTS_RANGE.contains(&node.key_points.len()) {
                warn!(
                    "Card '{}' has {} key points (expected {}–{})",
                    node.id,
                    node.key_points.len(),
                    KEY_POINTS_RANGE.start(),
                    KEY_POINTS_RANGE.end()
                );
            }
        }
        Ok(())
    }

    /// Look up a card by id.
    pub fn node(&self, id: &str) -> Option<&MindMapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// One expanded section of a [`DetailedSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySection {
    pub title: String,
    pub content: String,
}

/// Long-form document derived from a [`MindMapData`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedSummary {
    pub introduction: String,
    pub sections: Vec<SummarySection>,
    pub conclusion: String,
}

impl DetailedSummary {
    pub fn validate(&self) -> Result<(), MindMapError> {
        let violation = |detail: String| MindMapError::SchemaViolation {
            stage: "summary",
            detail,
        };

        if self.introduction.trim().is_empty() {
            return Err(violation("introduction is empty".into()));
        }
        if self.conclusion.trim().is_empty() {
            return Err(violation("conclusion is empty".into()));
        }
        if let Some(i) = self.sections.iter().position(|s| s.title.trim().is_empty()) {
            return Err(violation(format!("section {} has an empty title", i + 1)));
        }
        Ok(())
    }
}
