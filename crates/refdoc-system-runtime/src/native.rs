/*
 * native.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * NativeRuntime: SystemRuntime backed by the local filesystem.
 */

use async_trait::async_trait;
use std::path::Path;

use crate::traits::{RuntimeResult, SystemRuntime};

/// Runtime with direct access to the local filesystem.
///
/// Reads go through `tokio::fs`, so callers need a tokio runtime with the
/// blocking pool available (any default runtime has one).
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SystemRuntime for NativeRuntime {
    async fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        Ok(tokio::fs::read(path).await?)
    }
}
