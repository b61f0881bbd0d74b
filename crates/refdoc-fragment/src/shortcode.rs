/*
 * shortcode.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Inline directive (shortcode) resolution.
 */

//! Shortcode resolution.
//!
//! Shortcodes (`{{< name args... >}}`) are resolved in the body text before
//! Markdown parsing. Fenced and indented code, inline code spans and HTML
//! comments are left untouched, and `{{{< name >}}}` is emitted literally
//! as `{{< name >}}`.
//!
//! ## Built-in Shortcodes
//!
//! - `meta` - Insert a value from the section's frontmatter
//! - `kbd` - Render keyboard keys
//!
//! Unlike a document render, an unresolvable shortcode here is an error:
//! the override is rejected rather than published with placeholder text.

use refdoc_frontmatter::Meta;
use serde_json::Value;

use crate::callout::escape_html;
use crate::fence::{FenceTracker, IndentedCodeTracker};
use crate::{CompileError, Result};

/// A parsed shortcode invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcode {
    pub name: String,
    pub args: Vec<String>,
    /// 1-based line of the body the shortcode appears on
    pub line: usize,
}

/// Context passed to shortcode handlers.
pub struct ShortcodeContext<'a> {
    /// Frontmatter of the section being compiled
    pub metadata: &'a Meta,
}

/// Trait for shortcode handlers.
///
/// The returned text is spliced into the body before Markdown parsing, so it
/// may contain Markdown or raw HTML. An `Err` carries a human-readable reason.
pub trait ShortcodeHandler: Send + Sync {
    /// The shortcode name (e.g., "meta", "kbd")
    fn name(&self) -> &str;

    /// Resolve the shortcode to replacement text.
    fn resolve(
        &self,
        shortcode: &Shortcode,
        ctx: &ShortcodeContext,
    ) -> std::result::Result<String, String>;
}

/// Handler for the `meta` shortcode.
///
/// Usage: `{{< meta key >}}` or `{{< meta key.subkey >}}`
pub struct MetaShortcodeHandler;

impl ShortcodeHandler for MetaShortcodeHandler {
    fn name(&self) -> &str {
        "meta"
    }

    fn resolve(
        &self,
        shortcode: &Shortcode,
        ctx: &ShortcodeContext,
    ) -> std::result::Result<String, String> {
        let key = shortcode
            .args
            .first()
            .ok_or_else(|| "the `meta` shortcode requires a metadata key".to_string())?;
        let value = get_nested_metadata(ctx.metadata, key)
            .ok_or_else(|| format!("metadata key `{}` not found in frontmatter", key))?;
        value_to_text(value)
            .ok_or_else(|| format!("metadata key `{}` is a mapping, not a value", key))
    }
}

/// Handler for the `kbd` shortcode.
///
/// Usage: `{{< kbd Ctrl-C >}}`; each argument becomes one `<kbd>` element.
pub struct KbdShortcodeHandler;

impl ShortcodeHandler for KbdShortcodeHandler {
    fn name(&self) -> &str {
        "kbd"
    }

    fn resolve(
        &self,
        shortcode: &Shortcode,
        _ctx: &ShortcodeContext,
    ) -> std::result::Result<String, String> {
        if shortcode.args.is_empty() {
            return Err("the `kbd` shortcode requires at least one key".to_string());
        }
        Ok(shortcode
            .args
            .iter()
            .map(|key| format!("<kbd>{}</kbd>", escape_html(key)))
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// The handlers every compiler starts with.
pub(crate) fn builtin_handlers() -> Vec<Box<dyn ShortcodeHandler>> {
    vec![Box::new(MetaShortcodeHandler), Box::new(KbdShortcodeHandler)]
}

/// Navigate nested metadata using dot notation.
///
/// For metadata `{ author: { name: "Alice" } }`, `author.name` yields `"Alice"`.
fn get_nested_metadata<'a>(metadata: &'a Meta, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = metadata.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(", ")),
        Value::Object(_) => None,
    }
}

/// Resolves shortcodes in a body against a set of handlers.
pub(crate) struct ShortcodeResolver<'a> {
    handlers: &'a [Box<dyn ShortcodeHandler>],
    ctx: ShortcodeContext<'a>,
}

impl<'a> ShortcodeResolver<'a> {
    pub(crate) fn new(handlers: &'a [Box<dyn ShortcodeHandler>], metadata: &'a Meta) -> Self {
        Self {
            handlers,
            ctx: ShortcodeContext { metadata },
        }
    }

    pub(crate) fn resolve(&self, body: &str) -> Result<String> {
        let mut out = String::with_capacity(body.len());
        let mut fences = FenceTracker::new();
        let mut indented = IndentedCodeTracker::new();
        let mut in_comment = false;
        for (idx, raw) in body.split_inclusive('\n').enumerate() {
            if in_comment {
                match raw.find("-->") {
                    Some(end) => {
                        out.push_str(&raw[..end + 3]);
                        in_comment = self.resolve_line(&raw[end + 3..], idx + 1, &mut out)?;
                    }
                    None => out.push_str(raw),
                }
            } else if fences.is_code(raw) {
                indented.interrupt();
                out.push_str(raw);
            } else if indented.is_code(raw) {
                out.push_str(raw);
            } else {
                in_comment = self.resolve_line(raw, idx + 1, &mut out)?;
            }
        }
        Ok(out)
    }

    /// Resolve one line. Returns true if an HTML comment is still open at
    /// the end of it.
    fn resolve_line(&self, line: &str, line_no: usize, out: &mut String) -> Result<bool> {
        let mut rest = line;
        while let Some(pos) = rest.find(['`', '{', '<']) {
            out.push_str(&rest[..pos]);
            rest = &rest[pos..];

            if rest.starts_with('`') {
                let run = rest.len() - rest.trim_start_matches('`').len();
                let span_len = closing_backtick_run(&rest[run..], run)
                    .map_or(run, |end| run + end + run);
                out.push_str(&rest[..span_len]);
                rest = &rest[span_len..];
            } else if rest.starts_with("<!--") {
                let Some(end) = rest[4..].find("-->") else {
                    out.push_str(rest);
                    return Ok(true);
                };
                let len = 4 + end + 3;
                out.push_str(&rest[..len]);
                rest = &rest[len..];
            } else if rest.starts_with("{{{<") {
                let end = rest
                    .find(">}}}")
                    .ok_or(CompileError::MalformedShortcode { line: line_no })?;
                out.push_str(&rest[1..end + 3]);
                rest = &rest[end + 4..];
            } else if rest.starts_with("{{<") {
                let end = rest
                    .find(">}}")
                    .ok_or(CompileError::MalformedShortcode { line: line_no })?;
                let shortcode = parse_shortcode(&rest[3..end], line_no)?;
                out.push_str(&self.dispatch(&shortcode)?);
                rest = &rest[end + 3..];
            } else {
                out.push_str(&rest[..1]);
                rest = &rest[1..];
            }
        }
        out.push_str(rest);
        Ok(false)
    }

    fn dispatch(&self, shortcode: &Shortcode) -> Result<String> {
        let handler = self
            .handlers
            .iter()
            .find(|h| h.name() == shortcode.name)
            .ok_or_else(|| CompileError::UnknownShortcode {
                name: shortcode.name.clone(),
                line: shortcode.line,
            })?;
        handler
            .resolve(shortcode, &self.ctx)
            .map_err(|message| CompileError::ShortcodeFailed {
                name: shortcode.name.clone(),
                line: shortcode.line,
                message,
            })
    }
}

/// Offset of the next backtick run of exactly `len` characters.
fn closing_backtick_run(text: &str, len: usize) -> Option<usize> {
    let mut offset = 0;
    while let Some(found) = text[offset..].find('`') {
        let start = offset + found;
        let run = text[start..].len() - text[start..].trim_start_matches('`').len();
        if run == len {
            return Some(start);
        }
        offset = start + run;
    }
    None
}

/// Split the inside of `{{< ... >}}` into a name and arguments.
///
/// Arguments are whitespace-separated; double quotes group words.
fn parse_shortcode(inner: &str, line: usize) -> Result<Shortcode> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut has_token = false;
    for c in inner.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                has_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if quoted {
        return Err(CompileError::MalformedShortcode { line });
    }
    if has_token {
        tokens.push(current);
    }

    let mut tokens = tokens.into_iter();
    let name = tokens
        .next()
        .filter(|n| !n.is_empty())
        .ok_or(CompileError::MalformedShortcode { line })?;
    Ok(Shortcode {
        name,
        args: tokens.collect(),
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(value: Value) -> Meta {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn resolve(body: &str, metadata: &Meta) -> Result<String> {
        let handlers = builtin_handlers();
        ShortcodeResolver::new(&handlers, metadata).resolve(body)
    }

    #[test]
    fn test_meta_shortcode() {
        let m = meta(json!({"limit": 10, "plan": {"name": "Pro"}}));
        assert_eq!(
            resolve("Limit is {{< meta limit >}}/s on {{< meta plan.name >}}.", &m).unwrap(),
            "Limit is 10/s on Pro."
        );
    }

    #[test]
    fn test_meta_array_value() {
        let m = meta(json!({"methods": ["GET", "HEAD"]}));
        assert_eq!(resolve("{{< meta methods >}}", &m).unwrap(), "GET, HEAD");
        assert_eq!(resolve("{{< meta methods.1 >}}", &m).unwrap(), "HEAD");
    }

    #[test]
    fn test_missing_meta_key_is_an_error() {
        let err = resolve("a\n{{< meta nope >}}", &Meta::new()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::ShortcodeFailed { ref name, line: 2, .. } if name == "meta"
        ));
    }

    #[test]
    fn test_meta_mapping_is_an_error() {
        let m = meta(json!({"plan": {"name": "Pro"}}));
        let err = resolve("{{< meta plan >}}", &m).unwrap_err();
        assert!(matches!(err, CompileError::ShortcodeFailed { .. }));
    }

    #[test]
    fn test_kbd_shortcode() {
        assert_eq!(
            resolve("Press {{< kbd Ctrl-C >}}", &Meta::new()).unwrap(),
            "Press <kbd>Ctrl-C</kbd>"
        );
    }

    #[test]
    fn test_quoted_arguments() {
        let sc = parse_shortcode(r#" kbd "Shift Enter" Tab "#, 1).unwrap();
        assert_eq!(sc.name, "kbd");
        assert_eq!(sc.args, vec!["Shift Enter", "Tab"]);
    }

    #[test]
    fn test_unknown_shortcode() {
        let err = resolve("{{< video x.mp4 >}}", &Meta::new()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownShortcode {
                name: "video".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn test_unclosed_shortcode() {
        let err = resolve("{{< meta limit", &Meta::new()).unwrap_err();
        assert_eq!(err, CompileError::MalformedShortcode { line: 1 });
    }

    #[test]
    fn test_empty_shortcode() {
        let err = resolve("{{< >}}", &Meta::new()).unwrap_err();
        assert_eq!(err, CompileError::MalformedShortcode { line: 1 });
    }

    #[test]
    fn test_escaped_shortcode_is_literal() {
        assert_eq!(
            resolve("Write {{{< meta key >}}}.", &Meta::new()).unwrap(),
            "Write {{< meta key >}}."
        );
    }

    #[test]
    fn test_code_is_untouched() {
        let body = "Use `{{< meta x >}}` or\n```\n{{< meta y >}}\n```\n";
        assert_eq!(resolve(body, &Meta::new()).unwrap(), body);
    }

    #[test]
    fn test_indented_code_is_untouched() {
        let body = "Example:\n\n    {{< video x.mp4 >}}\n\nPress {{< kbd K >}}\n";
        assert_eq!(
            resolve(body, &Meta::new()).unwrap(),
            "Example:\n\n    {{< video x.mp4 >}}\n\nPress <kbd>K</kbd>\n"
        );
    }

    #[test]
    fn test_indented_list_content_is_resolved() {
        let body = "- Step one\n\n    Press {{< kbd K >}}\n";
        assert_eq!(
            resolve(body, &Meta::new()).unwrap(),
            "- Step one\n\n    Press <kbd>K</kbd>\n"
        );
    }

    #[test]
    fn test_html_comment_is_untouched() {
        assert_eq!(
            resolve("<!-- {{< video x.mp4 >}} --> {{< kbd K >}}", &Meta::new()).unwrap(),
            "<!-- {{< video x.mp4 >}} --> <kbd>K</kbd>"
        );
    }

    #[test]
    fn test_multiline_html_comment_is_untouched() {
        let body = "Intro <!-- draft:\n{{< meta missing >}}\n--> {{< kbd K >}}\n";
        assert_eq!(
            resolve(body, &Meta::new()).unwrap(),
            "Intro <!-- draft:\n{{< meta missing >}}\n--> <kbd>K</kbd>\n"
        );
    }

    #[test]
    fn test_angle_brackets_pass_through() {
        assert_eq!(
            resolve("a < b and <br> {{< kbd K >}}", &Meta::new()).unwrap(),
            "a < b and <br> <kbd>K</kbd>"
        );
    }

    #[test]
    fn test_plain_braces_pass_through() {
        assert_eq!(
            resolve("JSON {\"a\": {}} and ``` unmatched", &Meta::new()).unwrap(),
            "JSON {\"a\": {}} and ``` unmatched"
        );
    }
}
