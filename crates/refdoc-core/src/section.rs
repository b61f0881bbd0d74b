//! Section descriptors (input) and reference records (output).

use refdoc_fragment::CompiledFragment;
use refdoc_frontmatter::Meta;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One generated reference section, as supplied by the caller.
///
/// Only `id` and `title` are read. Any other fields survive a
/// serde round-trip in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SectionDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }
}

/// A section merged with its override document.
///
/// `content` is `None` exactly when the override body is blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub id: String,
    pub title: String,
    pub meta: Meta,
    pub content: Option<CompiledFragment>,
}
