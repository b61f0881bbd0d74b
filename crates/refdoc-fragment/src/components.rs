//! Embedded component discovery.
//!
//! Components are raw HTML tags whose name starts with an uppercase letter
//! (`<Admonition type="note">`, `<Badge />`). They are found in comrak's
//! `HtmlBlock` and `HtmlInline` nodes, so tags inside code are never seen.

use std::collections::BTreeSet;

use comrak::nodes::{AstNode, NodeValue};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{CompileError, Result};

static COMPONENT_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(/?)([A-Z][A-Za-z0-9_]*)((?:[^>"'{]|"[^"]*"|'[^']*'|\{[^}]*\})*?)(/?)>"#)
        .expect("component regex is valid")
});

/// Walk the document and return the sorted set of component names.
///
/// Opening and closing tags must balance across the whole document, since a
/// component may wrap Markdown content spread over several blocks.
pub(crate) fn collect_components<'a>(root: &'a AstNode<'a>) -> Result<Vec<String>> {
    let mut names = BTreeSet::new();
    let mut open: Vec<String> = Vec::new();

    for node in root.descendants() {
        let data = node.data.borrow();
        let html = match &data.value {
            NodeValue::HtmlBlock(block) => block.literal.as_str(),
            NodeValue::HtmlInline(literal) => literal.as_str(),
            _ => continue,
        };
        scan_tags(html, &mut names, &mut open)?;
    }

    if let Some(name) = open.pop() {
        return Err(CompileError::UnclosedComponent { name });
    }
    Ok(names.into_iter().collect())
}

fn scan_tags(html: &str, names: &mut BTreeSet<String>, open: &mut Vec<String>) -> Result<()> {
    for caps in COMPONENT_TAG.captures_iter(html) {
        let closing = !caps[1].is_empty();
        let self_closing = !caps[4].is_empty();
        let name = caps[2].to_string();

        if closing {
            match open.pop() {
                Some(top) if top == name => {}
                Some(top) => return Err(CompileError::UnclosedComponent { name: top }),
                None => return Err(CompileError::UnexpectedClosingTag { name }),
            }
        } else if !self_closing {
            open.push(name.clone());
        }
        names.insert(name);
    }
    Ok(())
}
