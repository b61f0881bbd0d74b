/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compiler options shared by every section of a pipeline run.
 */

use serde::{Deserialize, Serialize};

/// Syntax theme used when none is configured.
pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

/// Options applied to every body compiled by one [`FragmentCompiler`].
///
/// These are fixed for a pipeline instance; they are never varied per
/// section.
///
/// [`FragmentCompiler`]: crate::FragmentCompiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CompilerOptions {
    /// Name of a bundled syntect theme used to highlight fenced code.
    pub syntax_theme: String,

    /// Enable the GFM extension set: tables, strikethrough, autolinks,
    /// task lists and footnotes.
    pub table_syntax: bool,

    /// Allow MDX-style module statements and embedded components.
    pub dynamic_embedding: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            syntax_theme: DEFAULT_SYNTAX_THEME.to_string(),
            table_syntax: true,
            dynamic_embedding: true,
        }
    }
}
