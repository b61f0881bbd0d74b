/*
 * refdoc-system-runtime
 * Copyright (c) 2025 Posit, PBC
 *
 * Runtime abstraction layer for reading reference override documents.
 *
 * - NativeRuntime: local filesystem (default)
 * - InMemoryRuntime: virtual file map with injectable read failures
 */

mod memory;
mod native;
mod traits;

pub use traits::{RuntimeError, RuntimeResult, SystemRuntime};

pub use memory::InMemoryRuntime;
pub use native::NativeRuntime;

/// Create a default runtime for the current platform.
pub fn default_runtime() -> NativeRuntime {
    NativeRuntime::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[tokio::test]
    async fn test_default_runtime_reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("get.mdx");
        std::fs::write(&path, "Hello").unwrap();

        let runtime = default_runtime();
        assert_eq!(
            runtime.file_read_optional(&path).await.unwrap().as_deref(),
            Some("Hello")
        );
        assert_eq!(
            runtime
                .file_read_optional(Path::new("missing/override.mdx"))
                .await
                .unwrap(),
            None
        );
    }
}
