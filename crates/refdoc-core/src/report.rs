//! Batch results.

use serde::Serialize;

use crate::error::{AssembleError, SectionError};
use crate::section::ReferenceRecord;

/// What happened to one section.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SectionOutcome {
    /// No override file; the section contributes nothing
    Absent,
    Loaded(ReferenceRecord),
    Failed(SectionError),
}

impl SectionOutcome {
    pub fn record(&self) -> Option<&ReferenceRecord> {
        match self {
            SectionOutcome::Loaded(record) => Some(record),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SectionError> {
        match self {
            SectionOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub loaded: usize,
    pub absent: usize,
    pub failed: usize,
}

/// One outcome per input descriptor, in input order.
#[derive(Debug, Serialize)]
pub struct ReferenceReport {
    outcomes: Vec<SectionOutcome>,
}

impl ReferenceReport {
    pub(crate) fn new(outcomes: Vec<SectionOutcome>) -> Self {
        Self { outcomes }
    }

    /// All outcomes, index-aligned with the descriptors.
    pub fn outcomes(&self) -> &[SectionOutcome] {
        &self.outcomes
    }

    /// Loaded records in input order. Absent and failed sections are skipped.
    pub fn records(&self) -> impl Iterator<Item = &ReferenceRecord> {
        self.outcomes.iter().filter_map(SectionOutcome::record)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SectionError> {
        self.outcomes.iter().filter_map(SectionOutcome::error)
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for outcome in &self.outcomes {
            match outcome {
                SectionOutcome::Absent => summary.absent += 1,
                SectionOutcome::Loaded(_) => summary.loaded += 1,
                SectionOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// True when no section failed.
    pub fn is_ok(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Collapse into the loaded records, or every failure if there was one.
    pub fn into_result(self) -> Result<Vec<ReferenceRecord>, AssembleError> {
        let mut records = Vec::new();
        let mut failures = Vec::new();
        for outcome in self.outcomes {
            match outcome {
                SectionOutcome::Absent => {}
                SectionOutcome::Loaded(record) => records.push(record),
                SectionOutcome::Failed(error) => failures.push(error),
            }
        }

        if failures.is_empty() {
            Ok(records)
        } else {
            Err(AssembleError { failures, records })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SectionErrorKind;
    use refdoc_frontmatter::{FrontmatterError, Meta};

    fn record(id: &str) -> ReferenceRecord {
        ReferenceRecord {
            id: id.to_string(),
            title: id.to_uppercase(),
            meta: Meta::new(),
            content: None,
        }
    }

    fn failure(id: &str) -> SectionError {
        SectionError::new(
            id,
            format!("docs/ref/rest/{}.mdx", id),
            SectionErrorKind::Metadata(FrontmatterError::Unterminated { line: 1 }),
        )
    }

    fn mixed() -> ReferenceReport {
        ReferenceReport::new(vec![
            SectionOutcome::Loaded(record("get")),
            SectionOutcome::Absent,
            SectionOutcome::Failed(failure("put")),
            SectionOutcome::Loaded(record("post")),
        ])
    }

    #[test]
    fn test_records_skip_absent_and_failed() {
        let report = mixed();
        let ids: Vec<_> = report.records().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["get", "post"]);
        assert_eq!(report.len(), 4);
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            mixed().summary(),
            ReportSummary {
                loaded: 2,
                absent: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn test_into_result_reports_all_failures_and_partial_records() {
        let report = mixed();
        assert!(!report.is_ok());
        let err = report.into_result().unwrap_err();
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].id, "put");
        let ids: Vec<_> = err.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["get", "post"]);
    }

    #[test]
    fn test_into_result_ok_without_failures() {
        let report = ReferenceReport::new(vec![
            SectionOutcome::Absent,
            SectionOutcome::Loaded(record("get")),
        ]);
        assert!(report.is_ok());
        let records = report.into_result().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_empty_report() {
        let report = ReferenceReport::new(vec![]);
        assert!(report.is_empty());
        assert!(report.is_ok());
        assert!(report.into_result().unwrap().is_empty());
    }

    #[test]
    fn test_serialized_outcomes_are_tagged() {
        let json = serde_json::to_value(mixed()).unwrap();
        let outcomes = json["outcomes"].as_array().unwrap();
        assert_eq!(outcomes[0]["status"], "loaded");
        assert_eq!(outcomes[0]["id"], "get");
        assert_eq!(outcomes[1], serde_json::json!({"status": "absent"}));
        assert_eq!(outcomes[2]["status"], "failed");
        assert_eq!(outcomes[2]["kind"], "metadata");
    }
}
