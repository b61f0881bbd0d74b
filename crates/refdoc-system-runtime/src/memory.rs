/*
 * memory.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * InMemoryRuntime: SystemRuntime backed by a virtual file map.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::traits::{RuntimeError, RuntimeResult, SystemRuntime};

/// A virtual file: either readable contents or an injected read failure.
#[derive(Debug, Clone)]
enum Entry {
    Contents(Vec<u8>),
    Failure(io::ErrorKind, String),
}

/// In-memory filesystem.
///
/// Paths are normalized lexically (`.` components dropped, `..` popped) so
/// `docs/./ref/x.mdx` and `docs/ref/x.mdx` name the same file.
///
/// Thread safety: uses RwLock to satisfy the Send + Sync trait bounds.
#[derive(Debug, Default)]
pub struct InMemoryRuntime {
    files: RwLock<HashMap<PathBuf, Entry>>,
    reads: AtomicUsize,
}

impl InMemoryRuntime {
    /// Create a new empty runtime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        self.insert(path.as_ref(), Entry::Contents(contents.into()));
    }

    /// Make every read of `path` fail with the given error kind.
    pub fn add_failure(&self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        let message = format!("injected failure: {:?}", kind);
        self.insert(path.as_ref(), Entry::Failure(kind, message));
    }

    /// Remove a file or failure. Returns true if anything was removed.
    pub fn remove_file(&self, path: impl AsRef<Path>) -> bool {
        let normalized = normalize_path(path.as_ref());
        self.files
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&normalized)
            .is_some()
    }

    /// Number of read attempts served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    fn insert(&self, path: &Path, entry: Entry) {
        let normalized = normalize_path(path);
        self.files
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(normalized, entry);
    }
}

#[async_trait]
impl SystemRuntime for InMemoryRuntime {
    async fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let normalized = normalize_path(path);
        let files = self
            .files
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match files.get(&normalized) {
            Some(Entry::Contents(bytes)) => Ok(bytes.clone()),
            Some(Entry::Failure(kind, message)) => {
                Err(RuntimeError::Io(io::Error::new(*kind, message.clone())))
            }
            None => Err(RuntimeError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Path not found: {}", normalized.display()),
            ))),
        }
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_added_file() {
        let runtime = InMemoryRuntime::new();
        runtime.add_file("docs/ref/rest/get.mdx", "hello");
        let text = runtime
            .file_read_optional(Path::new("docs/ref/rest/get.mdx"))
            .await
            .unwrap();
        assert_eq!(text.as_deref(), Some("hello"));
        assert_eq!(runtime.read_count(), 1);
    }

    #[tokio::test]
    async fn test_paths_are_normalized() {
        let runtime = InMemoryRuntime::new();
        runtime.add_file("docs/./ref/rest/../rest/get.mdx", "x");
        let text = runtime
            .file_read_optional(Path::new("docs/ref/rest/get.mdx"))
            .await
            .unwrap();
        assert!(text.is_some());
    }

    #[tokio::test]
    async fn test_unknown_path_is_absent() {
        let runtime = InMemoryRuntime::new();
        let text = runtime
            .file_read_optional(Path::new("docs/missing.mdx"))
            .await
            .unwrap();
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_injected_failure_is_not_absent() {
        let runtime = InMemoryRuntime::new();
        runtime.add_failure("docs/locked.mdx", io::ErrorKind::PermissionDenied);
        let err = runtime
            .file_read_optional(Path::new("docs/locked.mdx"))
            .await
            .unwrap_err();
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("PermissionDenied"));
    }

    #[tokio::test]
    async fn test_remove_file() {
        let runtime = InMemoryRuntime::new();
        runtime.add_file("a.mdx", "x");
        assert!(runtime.remove_file("a.mdx"));
        assert!(!runtime.remove_file("a.mdx"));
        let text = runtime.file_read_optional(Path::new("a.mdx")).await.unwrap();
        assert!(text.is_none());
    }
}
