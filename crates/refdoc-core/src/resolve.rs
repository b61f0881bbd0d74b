//! Section id -> override path.

use std::path::PathBuf;

use crate::config::PipelineConfig;

/// Where the override document for `section_id` lives.
///
/// `<docs_root>/ref<group_slug>/<section_id>.<extension>`. The group slug
/// carries its own leading slash (`/rest`), so it is glued to `ref` rather
/// than joined as a separate component. No I/O, no validation.
pub fn override_path(config: &PipelineConfig, group_slug: &str, section_id: &str) -> PathBuf {
    config
        .docs_root
        .join(format!("ref{}", group_slug))
        .join(format!("{}.{}", section_id, config.extension))
}
