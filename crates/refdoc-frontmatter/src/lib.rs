//! # refdoc-frontmatter
//!
//! Splits an override document into YAML frontmatter and body text.
//!
//! The frontmatter is parsed with `yaml-rust2` and converted into an
//! insertion-ordered JSON mapping ([`Meta`]) so that it can be handed to a
//! renderer unchanged.
//!
//! ## Example
//!
//! ```rust
//! use refdoc_frontmatter::split;
//!
//! let parsed = split("---\ntitle: GET /x\n---\nRate limited.").unwrap();
//! assert_eq!(parsed.metadata["title"], "GET /x");
//! assert_eq!(parsed.body, "Rate limited.");
//! ```

mod convert;
mod error;
mod split;

pub use error::{Error, Result};
/// Alias used by crates that also have their own `Error` type in scope.
pub use error::Error as FrontmatterError;
pub use split::{ParsedOverride, split};

/// Frontmatter metadata: string keys to arbitrary structured values.
pub type Meta = serde_json::Map<String, serde_json::Value>;
