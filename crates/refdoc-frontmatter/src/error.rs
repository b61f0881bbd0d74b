//! Error types for frontmatter splitting.

use thiserror::Error;

/// Result type alias for refdoc-frontmatter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while splitting an override document.
///
/// Every variant means a frontmatter block was present but unusable. A
/// document without frontmatter never produces an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Opening `---` fence with no closing fence
    #[error("Unterminated frontmatter: opening `---` on line {line} is never closed")]
    Unterminated { line: usize },

    /// Fence tagged with a language other than YAML (e.g. `---toml`)
    #[error("Unsupported frontmatter language `{language}` (only YAML is supported)")]
    UnsupportedLanguage { language: String },

    /// YAML syntax error
    #[error("Invalid YAML in frontmatter: {message}")]
    InvalidYaml { message: String },

    /// Frontmatter parsed, but the top-level value is not a mapping
    #[error("Frontmatter must be a mapping, found {found}")]
    NotAMapping { found: &'static str },

    /// Mapping key that cannot be represented as a string
    #[error("Unsupported frontmatter key {key}: keys must be scalars")]
    UnsupportedKey { key: String },
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        Error::InvalidYaml {
            message: err.to_string(),
        }
    }
}
