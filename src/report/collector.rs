//! Result collection during a run
//!
//! The collector is created at the start of a run, owned by the runner, and
//! consumed by [`ResultCollector::finish`]; it is never shared across runs.

use super::{CellValue, Identity, Outcome, ResultRow, ResultTable};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

/// Everything collected during one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedResults {
    /// Collected rows, unmerged.
    pub table: ResultTable,
    /// Column descriptions recorded while checks ran.
    pub annotations: FxHashMap<String, String>,
}

/// Accumulates result rows keyed by [`Identity`].
#[derive(Debug, Default)]
pub struct ResultCollector {
    rows: BTreeMap<Identity, ResultRow>,
    columns: Vec<String>,
    known_columns: FxHashSet<String>,
    checks: Vec<String>,
    annotations: FxHashMap<String, String>,
}

impl ResultCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value` in the row of `identity`. Last write wins.
    pub fn record(&mut self, identity: &Identity, key: &str, value: impl Into<CellValue>) {
        if self.known_columns.insert(key.to_string()) {
            self.columns.push(key.to_string());
        }
        self.rows
            .entry(identity.clone())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Record the outcome of `check` and its invocation id (`<check>-id`).
    pub fn record_outcome(
        &mut self,
        identity: &Identity,
        check: &str,
        outcome: Outcome,
        invocation_id: &str,
    ) {
        if !self.checks.iter().any(|c| c == check) {
            self.checks.push(check.to_string());
        }
        self.record(identity, check, outcome);
        self.record(identity, &id_column(check), invocation_id);
    }

    /// Record a description for `column`, overriding the static one.
    pub fn annotate(&mut self, column: &str, description: &str) {
        self.annotations
            .insert(column.to_string(), description.to_string());
    }

    /// Recording handle bound to one identity.
    pub fn recorder<'a>(&'a mut self, identity: &'a Identity) -> Recorder<'a> {
        Recorder {
            collector: self,
            identity,
        }
    }

    /// Number of identities with at least one value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row of `identity`, if any value was recorded for it.
    #[must_use]
    pub fn row(&self, identity: &Identity) -> Option<&ResultRow> {
        self.rows.get(identity)
    }

    /// Finalize the run's results.
    #[must_use]
    pub fn finish(self) -> CollectedResults {
        CollectedResults {
            table: ResultTable::from_parts(self.columns, self.checks, self.rows.into_iter().collect()),
            annotations: self.annotations,
        }
    }
}

/// Name of the invocation-id column of `check`.
#[must_use]
pub fn id_column(check: &str) -> String {
    format!("{check}-id")
}

/// Handle through which a check records metrics for its identity.
#[derive(Debug)]
pub struct Recorder<'a> {
    collector: &'a mut ResultCollector,
    identity: &'a Identity,
}

impl Recorder<'_> {
    /// Record a metric for the bound identity.
    pub fn record(&mut self, key: &str, value: impl Into<CellValue>) {
        self.collector.record(self.identity, key, value);
    }

    /// Record a column description.
    pub fn annotate(&mut self, column: &str, description: &str) {
        self.collector.annotate(column, description);
    }

    /// The identity this recorder writes to.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        self.identity
    }
}
