//! Clean-up of model text before JSON parsing.
//!
//! Structured-output mode normally returns bare JSON, but some responses
//! still arrive wrapped in a ```` ```json ```` fence or prefixed with a BOM.
//! These rules only remove wrapping; they never repair the JSON itself, so
//! a malformed answer still fails to parse.
//!
//! Rules (applied in order):
//! 1. Trim whitespace and invisible Unicode (BOM, zero-width characters)
//!    from both ends; joiners inside string values are kept
//! 2. Strip one outer code fence (` ``` ` or ` ```json `)

use once_cell::sync::Lazy;
use regex::Regex;

pub fn clean_json_text(input: &str) -> String {
    trim_edges(strip_code_fence(trim_edges(input))).to_string()
}

// ── Rule 1: Trim invisible Unicode at the edges ──────────────────────────────

fn is_invisible(c: char) -> bool {
    matches!(c, '\u{FEFF}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}')
}

fn trim_edges(input: &str) -> &str {
    input.trim_matches(|c: char| c.is_whitespace() || is_invisible(c))
}

// ── Rule 2: Strip outer code fence ───────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*[ \t]*\r?\n(.*?)\r?\n?```$").unwrap());

fn strip_code_fence(input: &str) -> &str {
    match RE_OUTER_FENCE.captures(input).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_json_is_untouched() {
        assert_eq!(clean_json_text(r#"{"a":1}"#), r#"{"a":1}"#);
    }

    #[test]
    fn json_fence_is_stripped() {
        let raw = "```json\n{\"a\": [1, 2]}\n```";
        assert_eq!(clean_json_text(raw), "{\"a\": [1, 2]}");
    }

    #[test]
    fn plain_fence_and_whitespace() {
        let raw = "\n  ```\n{}\n```  \n";
        assert_eq!(clean_json_text(raw), "{}");
    }

    #[test]
    fn bom_is_removed() {
        assert_eq!(clean_json_text("\u{FEFF}{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn zero_width_around_fence_is_trimmed() {
        let raw = "\u{FEFF}\u{200B}```json\n{\"a\":1}\n```\u{2060}\n";
        assert_eq!(clean_json_text(raw), "{\"a\":1}");
    }

    #[test]
    fn joiners_inside_strings_are_kept() {
        let raw = "{\"t\":\"می\u{200C}خواهم\",\"e\":\"👨\u{200D}👩\u{200D}👧\"}";
        assert_eq!(clean_json_text(raw), raw);
    }

    #[test]
    fn inner_fences_are_kept() {
        let raw = r#"{"code":"```rust\nfn main(){}\n```"}"#;
        assert_eq!(clean_json_text(raw), raw);
    }

    #[test]
    fn broken_json_is_not_repaired() {
        assert_eq!(clean_json_text("{\"a\":"), "{\"a\":");
    }
}
