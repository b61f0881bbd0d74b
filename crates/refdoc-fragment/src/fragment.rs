//! The compiled, renderer-ready form of an override body.

use serde::{Deserialize, Serialize};

/// A body compiled for page rendering.
///
/// The renderer inserts `html` as-is, resolves `imports` before mounting it
/// and supplies an implementation for every name in `components`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledFragment {
    /// Rendered body HTML
    pub html: String,
    /// Module imports hoisted out of the body, in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<EmbedImport>,
    /// Export statements hoisted out of the body, verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
    /// Embedded component names, sorted and de-duplicated
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
}

/// One `import` statement from the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedImport {
    /// Module specifier, e.g. `~/components/Badge`
    pub source: String,
    /// Local bindings introduced by the statement
    pub specifiers: Vec<String>,
    /// Original statement text
    pub statement: String,
}
