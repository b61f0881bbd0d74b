/*
 * traits.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Defines the SystemRuntime trait and its error types.
 *
 * The pipeline only ever reads override documents, so the trait is limited
 * to file reads. Implementations decide where the bytes come from:
 * - NativeRuntime: the local filesystem via tokio::fs
 * - InMemoryRuntime: a virtual file map (tests, embedders without a disk)
 */

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug)]
pub enum RuntimeError {
    /// Standard I/O error
    Io(io::Error),

    /// File exists but its contents are not valid UTF-8
    InvalidUtf8 {
        /// Path of the offending file
        path: PathBuf,
        /// Decoder message
        message: String,
    },
}

impl RuntimeError {
    /// True when the underlying failure is "file does not exist".
    ///
    /// This is the only error kind the loader treats as an absent override.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RuntimeError::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Io(e) => write!(f, "I/O error: {}", e),
            RuntimeError::InvalidUtf8 { path, message } => {
                write!(f, "Invalid UTF-8 in {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> Self {
        RuntimeError::Io(e)
    }
}

/// Trait defining the file operations the override pipeline needs.
///
/// All methods are async so that many sections can wait on I/O at once.
/// Implementations must be `Send + Sync`; one runtime is shared by every
/// per-section task of a batch.
#[async_trait]
pub trait SystemRuntime: Send + Sync {
    /// Read entire file contents as bytes.
    async fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Read file as string with UTF-8 encoding.
    ///
    /// Default implementation reads bytes and converts to string.
    async fn file_read_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.file_read(path).await?;
        String::from_utf8(bytes).map_err(|e| RuntimeError::InvalidUtf8 {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read a file that is allowed to be missing.
    ///
    /// Performs a single read attempt and classifies the outcome:
    /// `NotFound` becomes `Ok(None)`, every other failure is returned as-is.
    /// No existence check precedes the read.
    async fn file_read_optional(&self, path: &Path) -> RuntimeResult<Option<String>> {
        match self.file_read_string(path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.is_not_found() => {
                tracing::trace!(path = %path.display(), "File not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
