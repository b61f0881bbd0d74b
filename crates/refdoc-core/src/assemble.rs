/*
 * assemble.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Concurrent per-section load -> split -> compile.
 */

//! Reference assembly.
//!
//! Every descriptor becomes one task on a [`JoinSet`]. A task resolves the
//! override path, reads it through the [`SystemRuntime`], splits frontmatter
//! from body and compiles the body. Tasks share the runtime, compiler and
//! config read-only; results land in slots indexed by input position, so the
//! report order never depends on completion order.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use refdoc_fragment::{CompileError, FragmentCompiler};
use refdoc_frontmatter::ParsedOverride;
use refdoc_system_runtime::{SystemRuntime, default_runtime};
use tokio::task::{self, JoinSet};

use crate::config::PipelineConfig;
use crate::error::{AssembleError, SectionError, SectionErrorKind};
use crate::report::{ReferenceReport, SectionOutcome};
use crate::resolve::override_path;
use crate::section::{ReferenceRecord, SectionDescriptor};

/// Merges override documents into reference sections.
///
/// Construct once per configuration and reuse across groups; the compiler
/// (and its loaded syntax sets) is built in [`ReferenceAssembler::new`].
#[derive(Clone)]
pub struct ReferenceAssembler {
    runtime: Arc<dyn SystemRuntime>,
    compiler: Arc<FragmentCompiler>,
    config: Arc<PipelineConfig>,
}

impl std::fmt::Debug for ReferenceAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceAssembler")
            .field("compiler", &self.compiler)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReferenceAssembler {
    /// Create an assembler over `runtime`.
    ///
    /// # Errors
    ///
    /// Fails if the configured syntax theme does not exist.
    pub fn new(runtime: Arc<dyn SystemRuntime>, config: PipelineConfig) -> Result<Self, CompileError> {
        let compiler = FragmentCompiler::new(config.compiler.clone())?;
        Ok(Self::with_compiler(runtime, compiler, config))
    }

    /// Create an assembler that reads from the local filesystem.
    pub fn native(config: PipelineConfig) -> Result<Self, CompileError> {
        Self::new(Arc::new(default_runtime()), config)
    }

    /// Use a pre-built compiler, e.g. one with extra shortcode handlers.
    ///
    /// `config.compiler` is not consulted; the compiler's own options apply.
    pub fn with_compiler(
        runtime: Arc<dyn SystemRuntime>,
        compiler: FragmentCompiler,
        config: PipelineConfig,
    ) -> Self {
        Self {
            runtime,
            compiler: Arc::new(compiler),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every descriptor and report one outcome per descriptor.
    ///
    /// Failures are confined to their section. This never fails as a whole;
    /// use [`ReferenceReport::into_result`] or [`Self::assemble_records`] for
    /// all-or-nothing semantics.
    pub async fn assemble(&self, descriptors: &[SectionDescriptor], group_slug: &str) -> ReferenceReport {
        let mut tasks = JoinSet::new();
        let mut task_index: HashMap<task::Id, usize> = HashMap::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            let runtime = Arc::clone(&self.runtime);
            let compiler = Arc::clone(&self.compiler);
            let path = override_path(&self.config, group_slug, &descriptor.id);
            let descriptor = descriptor.clone();
            let handle = tasks.spawn(async move {
                let outcome = process_section(runtime.as_ref(), &compiler, descriptor, &path).await;
                (index, outcome)
            });
            task_index.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<SectionOutcome>> = descriptors.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(err) => {
                    let Some(&index) = task_index.get(&err.id()) else {
                        tracing::error!(error = %err, "Join error for an unknown section task");
                        continue;
                    };
                    let descriptor = &descriptors[index];
                    let error = SectionError::new(
                        descriptor.id.clone(),
                        override_path(&self.config, group_slug, &descriptor.id),
                        SectionErrorKind::TaskPanicked(panic_message(err)),
                    );
                    tracing::warn!(section = %error.id, error = %error, "Section failed");
                    slots[index] = Some(SectionOutcome::Failed(error));
                }
            }
        }

        // Every spawned task yields exactly once, so each slot is filled.
        let outcomes: Vec<SectionOutcome> = slots
            .into_iter()
            .zip(descriptors)
            .map(|(slot, descriptor)| {
                slot.unwrap_or_else(|| {
                    SectionOutcome::Failed(SectionError::new(
                        descriptor.id.clone(),
                        override_path(&self.config, group_slug, &descriptor.id),
                        SectionErrorKind::TaskPanicked("task result missing".to_string()),
                    ))
                })
            })
            .collect();

        let report = ReferenceReport::new(outcomes);
        let summary = report.summary();
        tracing::info!(
            group = group_slug,
            loaded = summary.loaded,
            absent = summary.absent,
            failed = summary.failed,
            "Assembled reference sections"
        );
        report
    }

    /// Like [`Self::assemble`], but fails if any section failed.
    pub async fn assemble_records(
        &self,
        descriptors: &[SectionDescriptor],
        group_slug: &str,
    ) -> Result<Vec<ReferenceRecord>, AssembleError> {
        self.assemble(descriptors, group_slug).await.into_result()
    }
}

async fn process_section(
    runtime: &dyn SystemRuntime,
    compiler: &FragmentCompiler,
    descriptor: SectionDescriptor,
    path: &Path,
) -> SectionOutcome {
    tracing::debug!(section = %descriptor.id, path = %path.display(), "Loading override");

    match load_record(runtime, compiler, &descriptor, path).await {
        Ok(Some(record)) => {
            tracing::debug!(
                section = %descriptor.id,
                has_content = record.content.is_some(),
                "Override loaded"
            );
            SectionOutcome::Loaded(record)
        }
        Ok(None) => {
            tracing::debug!(section = %descriptor.id, "No override");
            SectionOutcome::Absent
        }
        Err(kind) => {
            let error = SectionError::new(descriptor.id, path, kind);
            tracing::warn!(section = %error.id, error = %error, "Section failed");
            SectionOutcome::Failed(error)
        }
    }
}

async fn load_record(
    runtime: &dyn SystemRuntime,
    compiler: &FragmentCompiler,
    descriptor: &SectionDescriptor,
    path: &Path,
) -> Result<Option<ReferenceRecord>, SectionErrorKind> {
    let Some(text) = runtime.file_read_optional(path).await? else {
        return Ok(None);
    };
    let ParsedOverride { metadata, body } = refdoc_frontmatter::split(&text)?;
    let content = compiler.compile(&body, &metadata)?;

    Ok(Some(ReferenceRecord {
        id: descriptor.id.clone(),
        title: descriptor.title.clone(),
        meta: metadata,
        content,
    }))
}

fn panic_message(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdoc_system_runtime::InMemoryRuntime;

    fn assembler(runtime: InMemoryRuntime) -> ReferenceAssembler {
        ReferenceAssembler::new(Arc::new(runtime), PipelineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = assembler(InMemoryRuntime::new()).assemble(&[], "/rest").await;
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_absent_override_produces_no_record() {
        let report = assembler(InMemoryRuntime::new())
            .assemble(&[SectionDescriptor::new("get", "GET")], "/rest")
            .await;
        assert!(matches!(report.outcomes()[0], SectionOutcome::Absent));
        assert_eq!(report.records().count(), 0);
    }

    #[tokio::test]
    async fn test_loaded_record_mirrors_descriptor() {
        let runtime = InMemoryRuntime::new();
        runtime.add_file("docs/ref/rest/get.mdx", "---\nauth: required\n---\nHello.");
        let report = assembler(runtime)
            .assemble(&[SectionDescriptor::new("get", "GET /items")], "/rest")
            .await;
        let record = report.records().next().unwrap();
        assert_eq!(record.id, "get");
        assert_eq!(record.title, "GET /items");
        assert_eq!(record.meta["auth"], "required");
        assert_eq!(record.content.as_ref().unwrap().html, "<p>Hello.</p>\n");
    }

    #[tokio::test]
    async fn test_unknown_theme_rejected_at_construction() {
        let mut config = PipelineConfig::default();
        config.compiler.syntax_theme = "missing".to_string();
        let err = ReferenceAssembler::new(Arc::new(InMemoryRuntime::new()), config).unwrap_err();
        assert!(matches!(err, CompileError::UnknownTheme { .. }));
    }

    #[test]
    fn test_config_is_the_one_supplied() {
        let config = PipelineConfig::default().with_docs_root("site");
        let assembler =
            ReferenceAssembler::new(Arc::new(InMemoryRuntime::new()), config.clone()).unwrap();
        assert_eq!(assembler.config(), &config);
        assert_eq!(assembler.clone().config().docs_root, Path::new("site"));
    }

    #[test]
    fn test_panic_message_from_str_payload() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let err = rt
            .block_on(async { tokio::spawn(async { panic!("boom") }).await })
            .unwrap_err();
        assert_eq!(panic_message(err), "boom");
    }
}
