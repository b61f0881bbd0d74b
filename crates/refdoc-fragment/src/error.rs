//! Error types for fragment compilation.

use thiserror::Error;

/// Result type alias for refdoc-fragment operations.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors produced while building a compiler or compiling a body.
///
/// Line numbers are 1-based and relative to the body text handed to
/// [`FragmentCompiler::compile`](crate::FragmentCompiler::compile).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Unknown syntax theme `{name}`")]
    UnknownTheme { name: String },

    #[error("Malformed import statement on line {line}: `{statement}`")]
    MalformedImport { line: usize, statement: String },

    #[error("Unterminated export statement starting on line {line}")]
    MalformedExport { line: usize },

    #[error("Dynamic embedding is disabled, but the body contains {construct}")]
    EmbeddingDisabled { construct: String },

    #[error("Component <{name}> is never closed")]
    UnclosedComponent { name: String },

    #[error("Closing tag </{name}> has no matching opening tag")]
    UnexpectedClosingTag { name: String },

    #[error("Fenced div opened on line {line} is never closed")]
    UnterminatedDiv { line: usize },

    #[error("Unknown callout type `{kind}` on line {line}")]
    UnknownCallout { kind: String, line: usize },

    #[error("Malformed shortcode on line {line}")]
    MalformedShortcode { line: usize },

    #[error("Unknown shortcode `{name}` on line {line}")]
    UnknownShortcode { name: String, line: usize },

    #[error("Shortcode `{name}` on line {line} could not be resolved: {message}")]
    ShortcodeFailed {
        name: String,
        line: usize,
        message: String,
    },

    #[error("Failed to render HTML: {0}")]
    Render(String),
}
