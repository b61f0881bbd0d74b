/*
 * callout.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Expansion of fenced divs and callouts into raw HTML wrappers.
 */

//! Fenced div and callout expansion.
//!
//! A callout in an override document looks like:
//!
//! ```markdown
//! ::: {.callout-warning}
//! ## Optional Title
//!
//! Body content here.
//! :::
//! ```
//!
//! The div is rewritten into raw HTML lines around the (still Markdown)
//! content, separated by blank lines so that comrak parses the content as
//! Markdown:
//!
//! ```text
//! div.callout.callout-{type}
//!   div.callout-header
//!     div.callout-icon-container
//!     div.callout-title-container.flex-fill
//!   div.callout-body-container.callout-body
//! ```
//!
//! The title comes from a `title="..."` attribute, else from a leading ATX
//! heading inside the div, else from the capitalized callout type.
//! Fenced divs without a `callout-*` class become plain `<div>` wrappers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::fence::FenceTracker;
use crate::{CompileError, Result};

/// Known callout types.
pub const CALLOUT_TYPES: &[&str] = &["note", "warning", "tip", "caution", "important"];

static DIV_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:{3,}[ \t]*(\{[^}]*\}|[A-Za-z][\w-]*)[ \t]*:*[ \t]*$")
        .expect("div open regex is valid")
});

static DIV_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:{3,}[ \t]*$").expect("div close regex is valid"));

static ATTR_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\.([\w-]+)|#([\w-]+)|([\w-]+)[ \t]*=[ \t]*(?:"([^"]*)"|'([^']*)'|([^\s}]+))"#)
        .expect("attribute regex is valid")
});

static ATX_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#{1,6}[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").expect("heading regex is valid")
});

/// Attributes of a fenced div: `{#id .class key="value"}` or a bare class.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct DivAttrs {
    id: Option<String>,
    classes: Vec<String>,
    pairs: Vec<(String, String)>,
}

impl DivAttrs {
    fn parse(raw: &str) -> Self {
        let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
            return Self {
                classes: vec![raw.to_string()],
                ..Default::default()
            };
        };

        let mut attrs = Self::default();
        for caps in ATTR_TOKEN.captures_iter(inner) {
            if let Some(class) = caps.get(1) {
                attrs.classes.push(class.as_str().to_string());
            } else if let Some(id) = caps.get(2) {
                attrs.id = Some(id.as_str().to_string());
            } else if let Some(key) = caps.get(3) {
                let value = caps
                    .get(4)
                    .or_else(|| caps.get(5))
                    .or_else(|| caps.get(6))
                    .map_or("", |m| m.as_str());
                attrs.pairs.push((key.as_str().to_string(), value.to_string()));
            }
        }
        attrs
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn id_attr(&self) -> String {
        self.id
            .as_ref()
            .map(|id| format!(" id=\"{}\"", escape_html(id)))
            .unwrap_or_default()
    }
}

/// An open fenced div.
#[derive(Debug)]
struct DivFrame {
    /// Line the div was opened on
    line: usize,
    /// Callout type, `None` for a plain div
    callout: Option<String>,
    /// Callout whose header has not been written yet (waiting for a title)
    header_pending: bool,
}

/// Rewrite fenced divs in `body` into raw HTML wrappers.
pub(crate) fn expand_fenced_divs(body: &str) -> Result<String> {
    let mut out = String::with_capacity(body.len());
    let mut fences = FenceTracker::new();
    let mut stack: Vec<DivFrame> = Vec::new();

    for (idx, raw) in body.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches(['\n', '\r']);

        let title_line = stack.last().is_some_and(|f| f.header_pending) && !line.trim().is_empty();
        if title_line {
            if let Some(frame) = stack.last_mut() {
                frame.header_pending = false;
            }
            if let Some(caps) = ATX_HEADING.captures(line) {
                write_callout_header(&mut out, &caps[1]);
                continue;
            }
            let kind = stack
                .last()
                .and_then(|f| f.callout.as_deref())
                .unwrap_or_default();
            write_callout_header(&mut out, &capitalize(kind));
        }

        if fences.is_code(raw) {
            out.push_str(raw);
            continue;
        }

        if let Some(caps) = DIV_OPEN.captures(line) {
            let attrs = DivAttrs::parse(&caps[1]);
            stack.push(open_div(&mut out, &attrs, line_no)?);
            continue;
        }

        if DIV_CLOSE.is_match(line) {
            if let Some(frame) = stack.pop() {
                close_div(&mut out, &frame);
                continue;
            }
        }

        if stack.last().is_some_and(|f| f.header_pending) {
            // Blank lines before the title are dropped.
            continue;
        }
        out.push_str(raw);
    }

    if let Some(frame) = stack.first() {
        return Err(CompileError::UnterminatedDiv { line: frame.line });
    }
    Ok(out)
}

fn open_div(out: &mut String, attrs: &DivAttrs, line: usize) -> Result<DivFrame> {
    let callout = attrs
        .classes
        .iter()
        .find_map(|c| c.strip_prefix("callout-"))
        .map(str::to_string);

    let Some(kind) = callout else {
        let class_attr = if attrs.classes.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}\"", escape_html(&attrs.classes.join(" ")))
        };
        out.push_str(&format!("\n<div{}{}>\n\n", class_attr, attrs.id_attr()));
        return Ok(DivFrame {
            line,
            callout: None,
            header_pending: false,
        });
    };

    if !CALLOUT_TYPES.contains(&kind.as_str()) {
        return Err(CompileError::UnknownCallout { kind, line });
    }

    let mut classes = vec!["callout".to_string(), format!("callout-{}", kind)];
    if let Some(appearance) = attrs.get("appearance") {
        classes.push(format!("callout-appearance-{}", appearance));
    }
    classes.extend(
        attrs
            .classes
            .iter()
            .filter(|c| !c.starts_with("callout"))
            .cloned(),
    );
    out.push_str(&format!(
        "\n<div class=\"{}\"{}>\n",
        escape_html(&classes.join(" ")),
        attrs.id_attr()
    ));

    let header_pending = match attrs.get("title") {
        Some(title) => {
            write_callout_header(out, title);
            false
        }
        None => true,
    };

    Ok(DivFrame {
        line,
        callout: Some(kind),
        header_pending,
    })
}

fn close_div(out: &mut String, frame: &DivFrame) {
    if frame.header_pending {
        let kind = frame.callout.as_deref().unwrap_or_default();
        write_callout_header(out, &capitalize(kind));
    }
    if frame.callout.is_some() {
        out.push_str("\n</div>\n</div>\n\n");
    } else {
        out.push_str("\n</div>\n\n");
    }
}

fn write_callout_header(out: &mut String, title: &str) {
    out.push_str("<div class=\"callout-header\">\n");
    out.push_str("<div class=\"callout-icon-container\"><i class=\"callout-icon\"></i></div>\n");
    out.push_str(&format!(
        "<div class=\"callout-title-container flex-fill\">{}</div>\n",
        escape_html(title)
    ));
    out.push_str("</div>\n");
    out.push_str("<div class=\"callout-body-container callout-body\">\n\n");
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape text for use in HTML content or a double-quoted attribute.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callout_with_heading_title() {
        let out = expand_fenced_divs("::: {.callout-warning}\n## Watch Out\nBe careful!\n:::\n")
            .unwrap();
        assert!(out.contains("<div class=\"callout callout-warning\">"));
        assert!(out.contains("flex-fill\">Watch Out</div>"));
        assert!(!out.contains("## Watch Out"));
        assert!(out.contains("\n\nBe careful!\n"));
        assert!(out.ends_with("</div>\n</div>\n\n"));
    }

    #[test]
    fn test_callout_title_attribute() {
        let out =
            expand_fenced_divs("::: {.callout-tip title=\"Rate limits\"}\nText\n:::\n").unwrap();
        assert!(out.contains("flex-fill\">Rate limits</div>"));
    }

    #[test]
    fn test_callout_default_title() {
        let out = expand_fenced_divs("::: {.callout-note}\nText\n:::\n").unwrap();
        assert!(out.contains("flex-fill\">Note</div>"));
        assert!(out.contains("Text\n"));
    }

    #[test]
    fn test_empty_callout_still_has_header() {
        let out = expand_fenced_divs("::: {.callout-caution}\n:::\n").unwrap();
        assert!(out.contains("flex-fill\">Caution</div>"));
    }

    #[test]
    fn test_bare_class_shorthand() {
        let out = expand_fenced_divs("::: callout-important\nText\n:::\n").unwrap();
        assert!(out.contains("callout callout-important"));
    }

    #[test]
    fn test_appearance_and_extra_classes() {
        let out = expand_fenced_divs(
            "::: {#limits .callout-note .wide appearance=\"simple\"}\nText\n:::\n",
        )
        .unwrap();
        assert!(out.contains(
            "<div class=\"callout callout-note callout-appearance-simple wide\" id=\"limits\">"
        ));
    }

    #[test]
    fn test_unknown_callout_type() {
        let err = expand_fenced_divs("Intro\n\n::: {.callout-danger}\nText\n:::\n").unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownCallout {
                kind: "danger".to_string(),
                line: 3
            }
        );
    }

    #[test]
    fn test_unterminated_div() {
        let err = expand_fenced_divs("::: {.callout-note}\nText\n").unwrap_err();
        assert_eq!(err, CompileError::UnterminatedDiv { line: 1 });
    }

    #[test]
    fn test_nested_divs() {
        let out =
            expand_fenced_divs(":::: {.outer}\n::: {.callout-note}\nInner\n:::\n::::\n").unwrap();
        assert!(out.contains("<div class=\"outer\">"));
        assert!(out.contains("callout callout-note"));
        assert_eq!(out.matches("</div>").count(), 6);
    }

    #[test]
    fn test_fences_inside_code_are_ignored() {
        let body = "```md\n::: {.callout-danger}\n```\n";
        assert_eq!(expand_fenced_divs(body).unwrap(), body);
    }

    #[test]
    fn test_code_block_as_first_callout_line() {
        let out = expand_fenced_divs("::: {.callout-note}\n```sh\n# not a title\n```\n:::\n")
            .unwrap();
        assert!(out.contains("flex-fill\">Note</div>"));
        assert!(out.contains("# not a title"));
    }

    #[test]
    fn test_stray_closing_fence_is_text() {
        assert_eq!(expand_fenced_divs(":::\n").unwrap(), ":::\n");
    }

    #[test]
    fn test_title_is_escaped() {
        let out =
            expand_fenced_divs("::: {.callout-note title=\"a < b\"}\nText\n:::\n").unwrap();
        assert!(out.contains("flex-fill\">a &lt; b</div>"));
    }
}
