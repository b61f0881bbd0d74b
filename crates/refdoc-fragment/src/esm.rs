/*
 * esm.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Hoisting of MDX-style module statements out of a body.
 */

//! Module statement hoisting.
//!
//! An `import` or `export` line that starts a block (first line of the body,
//! or following a blank line or another module statement) and sits outside
//! fenced code is a module statement. An `export` line that is not one of
//! the ESM export forms is an error rather than prose. Hoisted lines are
//! replaced by an empty line so that later passes report the same line
//! numbers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::fence::FenceTracker;
use crate::fragment::EmbedImport;
use crate::{CompileError, Result};

static IMPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^import\s+(.+?)\s+from\s*(?:"([^"]+)"|'([^']+)')\s*;?\s*$"#)
        .expect("import regex is valid")
});

static IMPORT_SIDE_EFFECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^import\s*(?:"([^"]+)"|'([^']+)')\s*;?\s*$"#).expect("import regex is valid")
});

static EXPORT_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^export\s*(?:\{|\*|(?:const|let|var|class|default|function\*?|async\s+function\*?)(?:\s|[({*]|$))",
    )
    .expect("export regex is valid")
});

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex is valid"));

/// Body text with module statements removed.
#[derive(Debug, Default)]
pub(crate) struct Hoisted {
    pub(crate) body: String,
    pub(crate) imports: Vec<EmbedImport>,
    pub(crate) exports: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementKind {
    Import,
    Export,
}

impl StatementKind {
    fn of(line: &str) -> Option<Self> {
        let rest = line.strip_prefix("import").map(|r| (StatementKind::Import, r));
        let rest = rest.or_else(|| line.strip_prefix("export").map(|r| (StatementKind::Export, r)));
        let (kind, rest) = rest?;
        match rest.chars().next() {
            Some(c) if c.is_whitespace() => Some(kind),
            Some('{' | '"' | '\'' | '*') if kind == StatementKind::Import => Some(kind),
            Some('{') => Some(kind),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            StatementKind::Import => "import",
            StatementKind::Export => "export",
        }
    }
}

/// Remove module statements from `body`.
///
/// With `enabled == false` the first module statement is an error.
pub(crate) fn hoist_module_statements(body: &str, enabled: bool) -> Result<Hoisted> {
    let mut hoisted = Hoisted {
        body: String::with_capacity(body.len()),
        ..Default::default()
    };
    let mut fences = FenceTracker::new();
    let mut at_block_start = true;
    let mut lines = body.split_inclusive('\n').enumerate();

    while let Some((idx, raw)) = lines.next() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches(['\n', '\r']);

        if fences.is_code(raw) {
            hoisted.body.push_str(raw);
            at_block_start = !fences.is_open();
            continue;
        }

        let kind = if at_block_start {
            StatementKind::of(line)
        } else {
            None
        };
        let Some(kind) = kind else {
            at_block_start = line.trim().is_empty();
            hoisted.body.push_str(raw);
            continue;
        };

        if !enabled {
            return Err(CompileError::EmbeddingDisabled {
                construct: format!("an {} statement on line {}", kind.keyword(), line_no),
            });
        }

        hoisted.body.push_str(line_ending(raw));
        match kind {
            StatementKind::Import => hoisted.imports.push(parse_import(line, line_no)?),
            StatementKind::Export => {
                if !EXPORT_FORM.is_match(line) {
                    return Err(CompileError::MalformedExport { line: line_no });
                }
                let mut statement = line.to_string();
                let mut brackets = BracketScanner::default();
                brackets.feed(line);
                while brackets.is_open() {
                    let Some((_, next_raw)) = lines.next() else {
                        return Err(CompileError::MalformedExport { line: line_no });
                    };
                    let next = next_raw.trim_end_matches(['\n', '\r']);
                    statement.push('\n');
                    statement.push_str(next);
                    brackets.feed(next);
                    hoisted.body.push_str(line_ending(next_raw));
                }
                if brackets.depth < 0 {
                    return Err(CompileError::MalformedExport { line: line_no });
                }
                hoisted.exports.push(statement);
            }
        }
    }

    Ok(hoisted)
}

fn line_ending(raw: &str) -> &str {
    let trimmed = raw.trim_end_matches(['\n', '\r']);
    &raw[trimmed.len()..]
}

/// Bracket balance of a statement that may span several lines.
///
/// Quoted text is skipped. A template literal stays open across lines; `'`
/// and `"` strings end with their line unless the newline is escaped.
#[derive(Debug, Default)]
struct BracketScanner {
    depth: i32,
    quote: Option<char>,
    escaped: bool,
}

impl BracketScanner {
    fn feed(&mut self, line: &str) {
        for c in line.chars() {
            if let Some(q) = self.quote {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == q {
                    self.quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' | '`' => self.quote = Some(c),
                '{' | '(' | '[' => self.depth += 1,
                '}' | ')' | ']' => self.depth -= 1,
                _ => {}
            }
        }

        if self.escaped {
            self.escaped = false;
        } else if matches!(self.quote, Some('"' | '\'')) {
            self.quote = None;
        }
    }

    /// More lines belong to the statement.
    fn is_open(&self) -> bool {
        self.depth > 0 || self.quote.is_some()
    }
}

fn parse_import(line: &str, line_no: usize) -> Result<EmbedImport> {
    let malformed = || CompileError::MalformedImport {
        line: line_no,
        statement: line.to_string(),
    };

    if let Some(caps) = IMPORT_SIDE_EFFECT.captures(line) {
        let source = caps.get(1).or_else(|| caps.get(2)).ok_or_else(malformed)?;
        return Ok(EmbedImport {
            source: source.as_str().to_string(),
            specifiers: vec![],
            statement: line.to_string(),
        });
    }

    let caps = IMPORT_FROM.captures(line).ok_or_else(malformed)?;
    let source = caps.get(2).or_else(|| caps.get(3)).ok_or_else(malformed)?;
    let specifiers = parse_clause(&caps[1]).ok_or_else(malformed)?;
    Ok(EmbedImport {
        source: source.as_str().to_string(),
        specifiers,
        statement: line.to_string(),
    })
}

/// Local names bound by an import clause such as `A, { B as C }` or `* as NS`.
fn parse_clause(clause: &str) -> Option<Vec<String>> {
    let clause = clause.trim();
    let (leading, named) = match clause.find('{') {
        Some(open) => {
            let close = clause.rfind('}')?;
            if close < open || !clause[close + 1..].trim().is_empty() {
                return None;
            }
            let leading = clause[..open].trim().trim_end_matches(',').trim();
            (leading, Some(&clause[open + 1..close]))
        }
        None => (clause, None),
    };

    let mut names = Vec::new();
    if !leading.is_empty() {
        for part in leading.split(',') {
            let part = part.trim();
            let name = match part.strip_prefix('*') {
                Some(ns) => ns.trim().strip_prefix("as")?.trim(),
                None => part,
            };
            names.push(identifier(name)?);
        }
    }
    if let Some(named) = named {
        for part in named.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let local = match part.split_once(" as ") {
                Some((_, alias)) => alias.trim(),
                None => part,
            };
            names.push(identifier(local)?);
        }
    }

    if names.is_empty() { None } else { Some(names) }
}

fn identifier(name: &str) -> Option<String> {
    IDENTIFIER.is_match(name).then(|| name.to_string())
}
