/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Pipeline configuration loaded from TOML.
 */

use std::path::{Path, PathBuf};

use refdoc_fragment::CompilerOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default directory holding the `ref<group>` override folders.
pub const DEFAULT_DOCS_ROOT: &str = "docs";

/// Default override file extension, without the dot.
pub const DEFAULT_EXTENSION: &str = "mdx";

/// Errors that can occur while loading a [`PipelineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pipeline config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for one pipeline instance.
///
/// ```toml
/// docs-root = "docs"
/// extension = "mdx"
///
/// [compiler]
/// syntax-theme = "base16-ocean.dark"
/// table-syntax = true
/// dynamic-embedding = true
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub docs_root: PathBuf,
    pub extension: String,
    pub compiler: CompilerOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            docs_root: PathBuf::from(DEFAULT_DOCS_ROOT),
            extension: DEFAULT_EXTENSION.to_string(),
            compiler: CompilerOptions::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Same configuration with a different docs root.
    pub fn with_docs_root(mut self, docs_root: impl Into<PathBuf>) -> Self {
        self.docs_root = docs_root.into();
        self
    }
}
