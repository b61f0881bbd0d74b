/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-section and aggregate errors for reference assembly.
 */

use std::path::PathBuf;

use refdoc_fragment::CompileError;
use refdoc_frontmatter::FrontmatterError;
use refdoc_system_runtime::RuntimeError;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::section::ReferenceRecord;

/// What went wrong for one section.
///
/// A missing override file is not an error and never appears here.
#[derive(Debug, Error)]
pub enum SectionErrorKind {
    /// The override file exists but could not be read
    #[error(transparent)]
    Io(#[from] RuntimeError),

    /// The frontmatter block is malformed
    #[error(transparent)]
    Metadata(#[from] FrontmatterError),

    /// The body failed to compile
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The section's task panicked before producing a result
    #[error("Section task panicked: {0}")]
    TaskPanicked(String),
}

impl SectionErrorKind {
    /// Stable machine-readable name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            SectionErrorKind::Io(_) => "io",
            SectionErrorKind::Metadata(_) => "metadata",
            SectionErrorKind::Compile(_) => "compile",
            SectionErrorKind::TaskPanicked(_) => "task-panicked",
        }
    }
}

/// A failure confined to one reference section.
#[derive(Debug, Error)]
#[error("Section `{id}` ({}): {kind}", .path.display())]
pub struct SectionError {
    /// Id of the section descriptor
    pub id: String,
    /// Override path that was being processed
    pub path: PathBuf,
    pub kind: SectionErrorKind,
}

impl SectionError {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>, kind: SectionErrorKind) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            kind,
        }
    }

    /// Machine-readable form of the error.
    ///
    /// ```json
    /// {"id": "get", "path": "docs/ref/rest/get.mdx", "kind": "metadata", "message": "..."}
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "path": self.path.display().to_string(),
            "kind": self.kind.name(),
            "message": self.kind.to_string(),
        })
    }
}

impl Serialize for SectionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Returned by the strict assembly path when any section failed.
///
/// Carries every failure, in input order, plus the records that did load.
#[derive(Debug, Error)]
#[error("{} reference section(s) failed to load; first failure: {}", .failures.len(), first_failure(.failures))]
pub struct AssembleError {
    pub failures: Vec<SectionError>,
    pub records: Vec<ReferenceRecord>,
}

fn first_failure(failures: &[SectionError]) -> String {
    failures.first().map_or_else(String::new, ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_error() -> SectionError {
        SectionError::new(
            "get",
            "docs/ref/rest/get.mdx",
            SectionErrorKind::Metadata(FrontmatterError::Unterminated { line: 1 }),
        )
    }

    #[test]
    fn test_display_names_section_and_path() {
        let message = metadata_error().to_string();
        assert!(message.contains("`get`"));
        assert!(message.contains("docs/ref/rest/get.mdx"));
        assert!(message.contains("never closed"));
    }

    #[test]
    fn test_to_json() {
        let json = metadata_error().to_json();
        assert_eq!(json["id"], "get");
        assert_eq!(json["path"], "docs/ref/rest/get.mdx");
        assert_eq!(json["kind"], "metadata");
        assert!(json["message"].as_str().unwrap().contains("Unterminated"));
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let error = metadata_error();
        assert_eq!(serde_json::to_value(&error).unwrap(), error.to_json());
    }

    #[test]
    fn test_io_kind_from_runtime_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let kind: SectionErrorKind = RuntimeError::from(io).into();
        assert_eq!(kind.name(), "io");
    }

    #[test]
    fn test_aggregate_message() {
        let error = AssembleError {
            failures: vec![metadata_error()],
            records: vec![],
        };
        let message = error.to_string();
        assert!(message.starts_with("1 reference section(s) failed"));
        assert!(message.contains("`get`"));
    }
}
