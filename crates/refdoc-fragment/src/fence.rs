/*
 * fence.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Line-level tracking of fenced code blocks.
 */

//! The text passes that run before comrak (module hoisting, shortcodes,
//! fenced divs) must leave fenced code untouched. [`FenceTracker`] follows
//! CommonMark's fence rules closely enough for that purpose;
//! [`IndentedCodeTracker`] does the same for indented code blocks.

/// Tracks whether the current line is inside a fenced code block.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True while a fence has been opened and not yet closed.
    pub(crate) fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line. Returns true if the line belongs to a code block,
    /// including the opening and closing fence lines themselves.
    pub(crate) fn is_code(&mut self, line: &str) -> bool {
        let marker = fence_marker(line);
        match (self.open, marker) {
            (Some((ch, len)), Some((m_ch, m_len, rest))) => {
                if m_ch == ch && m_len >= len && rest.trim().is_empty() {
                    self.open = None;
                }
                true
            }
            (Some(_), None) => true,
            (None, Some((ch, len, rest))) => {
                // Backtick fences may not carry backticks in their info string.
                if ch == '`' && rest.contains('`') {
                    return false;
                }
                self.open = Some((ch, len));
                true
            }
            (None, None) => false,
        }
    }
}

/// Tracks whether the current line is inside an indented code block.
///
/// A line indented four or more columns is code when it follows a blank
/// line, a heading or another code line. It is not code when it continues
/// a paragraph or belongs to a list item.
#[derive(Debug)]
pub(crate) struct IndentedCodeTracker {
    after_break: bool,
    in_code: bool,
    in_list: bool,
}

impl Default for IndentedCodeTracker {
    fn default() -> Self {
        Self {
            after_break: true,
            in_code: false,
            in_list: false,
        }
    }
}

impl IndentedCodeTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a line that some other block (e.g. a fence) consumed.
    pub(crate) fn interrupt(&mut self) {
        self.after_break = true;
        self.in_code = false;
    }

    /// Feed the next line. Returns true if the line belongs to an indented
    /// code block.
    pub(crate) fn is_code(&mut self, line: &str) -> bool {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim().is_empty() {
            self.after_break = true;
            return self.in_code;
        }

        let indented = indent_columns(content) >= 4;
        let code = indented && !self.in_list && (self.in_code || self.after_break);
        if !indented {
            self.in_list = is_list_item(content) || (self.in_list && !self.after_break);
        }
        self.in_code = code;
        self.after_break = !indented && content.trim_start().starts_with('#');
        code
    }
}

/// Leading whitespace width, with tabs advancing to the next multiple of 4.
fn indent_columns(line: &str) -> usize {
    let mut columns = 0;
    for c in line.chars() {
        match c {
            ' ' => columns += 1,
            '\t' => columns += 4 - columns % 4,
            _ => break,
        }
    }
    columns
}

fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim_start_matches(' ');
    let marker_len = if trimmed.starts_with(['-', '*', '+']) {
        1
    } else {
        let digits = trimmed.len() - trimmed.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 || digits > 9 || !trimmed[digits..].starts_with(['.', ')']) {
            return false;
        }
        digits + 1
    };
    matches!(trimmed[marker_len..].chars().next(), None | Some(' ' | '\t'))
}

/// Returns the fence character, run length and the remainder of the line.
fn fence_marker(line: &str) -> Option<(char, usize, &str)> {
    let line = line.trim_end_matches(['\n', '\r']);
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let trimmed = &line[indent..];
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = trimmed.len() - trimmed.trim_start_matches(ch).len();
    if run < 3 {
        return None;
    }
    Some((ch, run, &trimmed[run..]))
}
