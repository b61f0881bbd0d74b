/*
 * refdoc-core
 * Copyright (c) 2025 Posit, PBC
 *
 * Merge hand-written override documents into generated API reference
 * sections.
 */

//! # refdoc-core
//!
//! For each generated reference section, look for an optional override
//! document at `<docs-root>/ref<group>/<id>.<ext>`, split its YAML
//! frontmatter from its body, compile the body and return the merged
//! records in input order. Sections without an override are skipped;
//! sections whose override is broken are reported without affecting the
//! others.
//!
//! ```no_run
//! use std::sync::Arc;
//! use refdoc_core::{PipelineConfig, ReferenceAssembler, SectionDescriptor};
//! use refdoc_system_runtime::NativeRuntime;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_file("refdoc.toml")?;
//! let assembler = ReferenceAssembler::new(Arc::new(NativeRuntime::new()), config)?;
//! let sections = vec![
//!     SectionDescriptor::new("get", "GET /items"),
//!     SectionDescriptor::new("post", "POST /items"),
//! ];
//! let records = assembler.assemble_records(&sections, "/rest").await?;
//! println!("{}", serde_json::to_string_pretty(&records)?);
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod config;
pub mod error;
pub mod report;
pub mod resolve;
pub mod section;

pub use assemble::ReferenceAssembler;
pub use config::{ConfigError, PipelineConfig};
pub use error::{AssembleError, SectionError, SectionErrorKind};
pub use report::{ReferenceReport, ReportSummary, SectionOutcome};
pub use resolve::override_path;
pub use section::{ReferenceRecord, SectionDescriptor};

pub use refdoc_fragment::{CompiledFragment, CompilerOptions};
pub use refdoc_frontmatter::Meta;
