//! Run driver: catalog → fixtures → checks → report
//!
//! Checks run sequentially in registry order. Every check is invoked on every
//! fixture of its kind:
//!
//! - file checks on each `.lpd` file of the data directory
//! - dataset checks on each loaded dataset
//! - series checks on each Temp12k series
//! - series+country checks on each Temp12k series after the country lookup
//!   wrote `geo_natEarth`
//!
//! A failing check never stops the run; only loading errors and report
//! writing errors are fatal.

use crate::accepted::AcceptedFailures;
use crate::cache::DatasetCache;
use crate::catalog::Catalog;
use crate::checks::{
    self, inject_countries, BoundingBoxes, Check, CountryLookup, Fixture, FixtureKind, Verdict,
};
use crate::config::RunConfig;
use crate::lipd::temp12k_series;
use crate::report::{resolve, Outcome, Report, ResultCollector};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Executes the checks of one run and builds its report.
pub struct Runner {
    catalog: Catalog,
    accepted: AcceptedFailures,
    countries: Option<Box<dyn CountryLookup>>,
    registry: &'static [&'static dyn Check],
    output: PathBuf,
}

impl Runner {
    /// Prepare a run: list the data directory and read the accepted-failures
    /// list and country table.
    ///
    /// # Errors
    ///
    /// Returns error if the data directory is missing or an input file cannot
    /// be read.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let mut catalog = Catalog::open(config.data_dir())?.with_skip_invalid(config.skip_invalid());
        if let Some(path) = config.cache() {
            catalog = catalog.with_cache(DatasetCache::new(path));
        }

        let accepted = config
            .accepted()
            .map(AcceptedFailures::from_file)
            .transpose()?
            .unwrap_or_default();
        let countries = config
            .countries()
            .map(BoundingBoxes::from_csv)
            .transpose()?
            .map(|boxes| Box::new(boxes) as Box<dyn CountryLookup>);

        info!(
            data = %config.data_dir().display(),
            files = catalog.files().len(),
            accepted = accepted.len(),
            countries = countries.is_some(),
            "run configured"
        );

        Ok(Self {
            catalog,
            accepted,
            countries,
            registry: checks::registry(),
            output: config.output_path(),
        })
    }

    /// Use `lookup` for the country check instead of the configured table.
    #[must_use]
    pub fn with_country_lookup(mut self, lookup: impl CountryLookup + 'static) -> Self {
        self.countries = Some(Box::new(lookup));
        self
    }

    /// Report destination.
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Run every check and build the report without writing it.
    ///
    /// # Errors
    ///
    /// Returns error if the datasets cannot be loaded.
    pub fn collect(&mut self) -> Result<Report> {
        let files = self.catalog.files().to_vec();
        let datasets = self.catalog.datasets()?;
        let mut series = temp12k_series(datasets)?;
        if let Some(lookup) = &self.countries {
            inject_countries(&mut series, lookup.as_ref());
        }
        info!(
            files = files.len(),
            datasets = datasets.len(),
            series = series.len(),
            "running checks"
        );

        let mut collector = ResultCollector::new();
        for &check in self.registry {
            match check.fixture() {
                FixtureKind::File => {
                    for file in &files {
                        invoke(&mut collector, &self.accepted, check, &Fixture::File(file));
                    }
                }
                FixtureKind::Dataset => {
                    for dataset in datasets {
                        invoke(&mut collector, &self.accepted, check, &Fixture::Dataset(dataset));
                    }
                }
                FixtureKind::Series => {
                    for record in &series {
                        invoke(&mut collector, &self.accepted, check, &Fixture::Series(record));
                    }
                }
                FixtureKind::SeriesCountry => {
                    for record in &series {
                        let fixture = Fixture::SeriesCountry(record);
                        invoke(&mut collector, &self.accepted, check, &fixture);
                    }
                }
            }
        }

        let report = Report::build(collector.finish(), self.registry);
        info!(
            rows = report.results().len(),
            failed = report.summary().outcome_total(Outcome::Failed),
            "checks finished"
        );
        Ok(report)
    }

    /// Run every check and write the report.
    ///
    /// # Errors
    ///
    /// Returns error if the datasets cannot be loaded or the report cannot
    /// be written.
    pub fn run(&mut self) -> Result<Report> {
        let report = self.collect()?;
        report.write(&self.output)?;
        Ok(report)
    }
}

/// Run `check` on `fixture` and record its outcome.
fn invoke(
    collector: &mut ResultCollector,
    accepted: &AcceptedFailures,
    check: &dyn Check,
    fixture: &Fixture<'_>,
) {
    let Some(invocation) = resolve(check.name(), fixture) else {
        warn!(
            check = check.name(),
            fixture = ?fixture.kind(),
            "fixture without dataSetName or TSid left out of the report"
        );
        return;
    };

    let verdict = check.run(fixture, &mut collector.recorder(&invocation.identity));
    let outcome = match verdict {
        Ok(Verdict::Passed) => Outcome::Passed,
        Ok(Verdict::Failed(reason)) if accepted.contains(&invocation.id) => {
            debug!(id = %invocation.id, %reason, "accepted failure");
            Outcome::Passed
        }
        Ok(Verdict::Failed(reason)) => {
            debug!(id = %invocation.id, %reason, "failed");
            Outcome::Failed
        }
        Ok(Verdict::Skipped(reason)) => {
            debug!(id = %invocation.id, %reason, "skipped");
            Outcome::Skipped
        }
        Err(err) => {
            warn!(id = %invocation.id, error = %err, "check raised an error");
            Outcome::Failed
        }
    };
    collector.record_outcome(&invocation.identity, check.name(), outcome, &invocation.id);
}
