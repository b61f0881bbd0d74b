//! Frontmatter/body splitting.

use crate::convert::parse_meta;
use crate::{Error, Meta, Result};

const FENCE: &str = "---";
const BOM: char = '\u{feff}';

/// An override document split into metadata and body text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedOverride {
    /// Parsed frontmatter; empty when the document has none
    pub metadata: Meta,
    /// Everything after the closing fence (or the whole text)
    pub body: String,
}

/// Split an override document into frontmatter metadata and body.
///
/// A frontmatter block must open on the very first line (after an optional
/// UTF-8 BOM) with `---`, optionally tagged `yaml`, and close with a line
/// that is exactly `---`. One line ending after the closing fence belongs to
/// the fence, not the body.
///
/// # Errors
///
/// Returns an error if a block is opened but never closed, is tagged with
/// another language, or does not parse to a YAML mapping.
pub fn split(text: &str) -> Result<ParsedOverride> {
    let content = text.strip_prefix(BOM).unwrap_or(text);

    let first_end = content.find('\n').unwrap_or(content.len());
    let first_line = content[..first_end].trim_end_matches('\r');
    if !first_line.starts_with(FENCE) || first_line.starts_with("----") {
        return Ok(ParsedOverride {
            metadata: Meta::new(),
            body: text.to_string(),
        });
    }

    let language = first_line[FENCE.len()..].trim();
    if !language.is_empty() && !language.eq_ignore_ascii_case("yaml") {
        return Err(Error::UnsupportedLanguage {
            language: language.to_string(),
        });
    }

    let yaml_start = (first_end + 1).min(content.len());
    let mut line_start = yaml_start;
    while line_start < content.len() {
        let line_end = content[line_start..]
            .find('\n')
            .map_or(content.len(), |i| line_start + i);
        if content[line_start..line_end].trim_end() == FENCE {
            let metadata = parse_meta(&content[yaml_start..line_start])?;
            let body_start = (line_end + 1).min(content.len());
            return Ok(ParsedOverride {
                metadata,
                body: content[body_start..].to_string(),
            });
        }
        line_start = line_end + 1;
    }

    Err(Error::Unterminated { line: 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_frontmatter_keeps_text_unchanged() {
        let text = "Rate limited to 10/s.";
        let parsed = split(text).unwrap();
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, text);
    }

    #[test]
    fn test_frontmatter_and_body() {
        let parsed = split("---\ntitle: Get\n---\nBody text.\n").unwrap();
        assert_eq!(parsed.metadata.get("title"), Some(&json!("Get")));
        assert_eq!(parsed.body, "Body text.\n");
    }

    #[test]
    fn test_only_one_line_ending_is_consumed() {
        let parsed = split("---\na: 1\n---\n\nBody").unwrap();
        assert_eq!(parsed.body, "\nBody");
    }

    #[test]
    fn test_crlf_line_endings() {
        let parsed = split("---\r\ntitle: Get\r\n---\r\nBody\r\n").unwrap();
        assert_eq!(parsed.metadata.get("title"), Some(&json!("Get")));
        assert_eq!(parsed.body, "Body\r\n");
    }

    #[test]
    fn test_frontmatter_only() {
        let parsed = split("---\nhideTitle: true\n---\n").unwrap();
        assert_eq!(parsed.metadata.get("hideTitle"), Some(&json!(true)));
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn test_closing_fence_at_end_of_input() {
        let parsed = split("---\nid: x\n---").unwrap();
        assert_eq!(parsed.metadata.get("id"), Some(&json!("x")));
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn test_empty_frontmatter() {
        let parsed = split("---\n---\nBody").unwrap();
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, "Body");
    }

    #[test]
    fn test_bom_is_skipped() {
        let parsed = split("\u{feff}---\ntitle: Get\n---\nBody").unwrap();
        assert_eq!(parsed.metadata.get("title"), Some(&json!("Get")));
        assert_eq!(parsed.body, "Body");
    }

    #[test]
    fn test_yaml_language_tag() {
        let parsed = split("---yaml\ntitle: Get\n---\nBody").unwrap();
        assert_eq!(parsed.metadata.get("title"), Some(&json!("Get")));
    }

    #[test]
    fn test_other_language_tag_is_rejected() {
        let err = split("---toml\ntitle = 'x'\n---\n").unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedLanguage {
                language: "toml".to_string()
            }
        );
    }

    #[test]
    fn test_thematic_break_is_not_frontmatter() {
        let text = "-----\nNot metadata\n";
        let parsed = split(text).unwrap();
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, text);
    }

    #[test]
    fn test_fence_must_be_first_line() {
        let text = "Intro\n---\ntitle: x\n---\n";
        let parsed = split(text).unwrap();
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, text);
    }

    #[test]
    fn test_unterminated_frontmatter() {
        let err = split("---\ntitle: Get\nBody without a closing fence\n").unwrap_err();
        assert_eq!(err, Error::Unterminated { line: 1 });
    }

    #[test]
    fn test_lone_opening_fence_is_unterminated() {
        assert_eq!(split("---").unwrap_err(), Error::Unterminated { line: 1 });
    }

    #[test]
    fn test_invalid_yaml() {
        let err = split("---\ntitle: [unclosed\n---\nBody").unwrap_err();
        assert!(matches!(err, Error::InvalidYaml { .. }));
    }

    #[test]
    fn test_scalar_frontmatter_is_not_a_mapping() {
        let err = split("---\njust a string\n---\nBody").unwrap_err();
        assert_eq!(err, Error::NotAMapping { found: "a string" });
    }
}
