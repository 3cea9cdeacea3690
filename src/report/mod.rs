//! Test-result aggregation and report generation
//!
//! A run fills a [`ResultCollector`] keyed by [`Identity`]. Finishing the run
//! builds a [`Report`]:
//!
//! 1. [`merge`] broadcasts dataset-level results onto the series rows
//! 2. [`Summary`] counts outcomes per check over the merged rows
//! 3. [`TestMetadata`] describes every column of the merged table
//!
//! [`Report::write`] renders the three sheets into an `.xlsx` workbook.

mod collector;
pub mod frame;
mod identity;
mod merge;
mod metadata;
mod summary;
mod table;
mod value;
pub mod writer;

pub use collector::{id_column, CollectedResults, Recorder, ResultCollector};
pub use identity::{resolve, Identity, Invocation};
pub use merge::merge;
pub use metadata::TestMetadata;
pub use summary::{Summary, TOTAL};
pub use table::{ResultRow, ResultTable};
pub use value::{CellValue, Outcome};

use crate::checks::Check;
use crate::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Finalized results of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    results: ResultTable,
    summary: Summary,
    metadata: TestMetadata,
    generated_at: DateTime<Utc>,
}

impl Report {
    /// Merge the collected rows and derive the summary and column
    /// descriptions.
    #[must_use]
    pub fn build(collected: CollectedResults, registry: &[&dyn Check]) -> Self {
        let CollectedResults { table, annotations } = collected;
        let results = merge(table);
        let summary = Summary::from_table(&results);
        let metadata = TestMetadata::assemble(&results, &annotations, registry);
        Self {
            results,
            summary,
            metadata,
            generated_at: Utc::now(),
        }
    }

    /// Merged result table.
    #[must_use]
    pub const fn results(&self) -> &ResultTable {
        &self.results
    }

    /// Outcome counts.
    #[must_use]
    pub const fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Column descriptions.
    #[must_use]
    pub const fn metadata(&self) -> &TestMetadata {
        &self.metadata
    }

    /// Time the report was built.
    #[must_use]
    pub const fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Write the workbook to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns error if the workbook cannot be rendered or written.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        writer::write_report(self, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::registry;

    #[test]
    fn test_build_merges_and_summarizes() {
        let mut collector = ResultCollector::new();
        let general = Identity::dataset("LakeX");
        let series = Identity::series("LakeX", "TS1");
        collector.record(&general, "chronology present", true);
        collector.record_outcome(
            &general,
            "chronology_points",
            Outcome::Passed,
            "chronology_points[LakeX]",
        );
        collector.record(&series, "latValid", false);
        collector.record_outcome(&series, "latlon", Outcome::Failed, "latlon[LakeX.TS1]");

        let report = Report::build(collector.finish(), registry());

        assert_eq!(report.results().len(), 1);
        assert_eq!(
            report.results().get(&series, "chronology present"),
            Some(&CellValue::Bool(true))
        );
        assert_eq!(report.summary().count("latlon", Outcome::Failed), 1);
        assert_eq!(report.summary().count("chronology_points", Outcome::Passed), 1);
        assert!(report.metadata().get("latValid").is_some());
    }

    #[test]
    fn test_write_unwritable_path() {
        let report = Report::build(CollectedResults::default(), registry());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("results.xlsx");

        assert!(report.write(&path).is_err());
        assert!(!path.exists());
    }
}
