//! File- and dataset-level checks

use super::{Check, Fixture, FixtureKind, Verdict};
use crate::lipd::{self, Mode};
use crate::report::Recorder;
use crate::{Error, Result};

/// Load the LiPD file.
pub struct LipdValidity;

impl Check for LipdValidity {
    fn name(&self) -> &'static str {
        "lipd_validity"
    }

    fn description(&self) -> &'static str {
        "Test to load the lipd files.\n\n\
         The archive must contain a JSON-LD metadata document and every \
         measurement table it references."
    }

    fn fixture(&self) -> FixtureKind {
        FixtureKind::File
    }

    fn metrics(&self) -> &'static [(&'static str, &'static str)] {
        &[("valid file", "Whether the file could be read as a LiPD archive")]
    }

    fn run(&self, fixture: &Fixture<'_>, recorder: &mut Recorder<'_>) -> Result<Verdict> {
        let Fixture::File(path) = *fixture else {
            return Err(Error::Other(format!("{} expects a file fixture", self.name())));
        };
        recorder.record("valid file", false);
        match lipd::read_lipd(path) {
            Ok(_) => {
                recorder.record("valid file", true);
                Ok(Verdict::Passed)
            }
            Err(err) => Ok(Verdict::Failed(err.to_string())),
        }
    }
}

/// Test the existence of chronological points.
pub struct ChronologyPoints;

impl Check for ChronologyPoints {
    fn name(&self) -> &'static str {
        "chronology_points"
    }

    fn description(&self) -> &'static str {
        "Test the existence of chronological points.\n\n\
         The dataset needs a chronology table with an age14C column holding \
         at least one value."
    }

    fn fixture(&self) -> FixtureKind {
        FixtureKind::Dataset
    }

    fn metrics(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("chronology present", "Whether the dataset has any chronology data"),
            ("nchronpoints", "Number of radiocarbon (age14C) dates"),
        ]
    }

    fn run(&self, fixture: &Fixture<'_>, recorder: &mut Recorder<'_>) -> Result<Verdict> {
        let Fixture::Dataset(dataset) = *fixture else {
            return Err(Error::Other(format!("{} expects a dataset fixture", self.name())));
        };
        recorder.record("nchronpoints", 0_i64);

        let chron = lipd::extract_dataset(dataset, Mode::Chron);
        recorder.record("chronology present", !chron.is_empty());
        if chron.is_empty() {
            return Ok(Verdict::Failed("No chronological information found!".into()));
        }

        let Some(age14c) = chron
            .iter()
            .find(|series| series.get_str("chronData_variableName") == Some("age14C"))
        else {
            return Ok(Verdict::Failed("No age14C series found!".into()));
        };

        let points = age14c
            .numeric_values("chronData_values")
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .count();
        recorder.record("nchronpoints", points);
        if points == 0 {
            return Ok(Verdict::Failed("All age14C values are missing".into()));
        }
        Ok(Verdict::Passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lipd::Dataset;
    use crate::report::{CellValue, Identity, ResultCollector};
    use serde_json::{json, Value};

    fn dataset(value: Value) -> Dataset {
        let Value::Object(map) = value else {
            unreachable!()
        };
        Dataset::from_metadata(map).unwrap()
    }

    fn run(check: &dyn Check, fixture: &Fixture<'_>) -> (Verdict, ResultCollector) {
        let mut collector = ResultCollector::new();
        let id = Identity::dataset("LakeX");
        let verdict = check.run(fixture, &mut collector.recorder(&id)).unwrap();
        (verdict, collector)
    }

    #[test]
    fn test_chronology_present() {
        let lake = dataset(json!({
            "dataSetName": "LakeX",
            "chronData": [{"measurementTable": [{"columns": [
                {"variableName": "age14C", "values": [900, null, 1200]}
            ]}]}]
        }));
        let (verdict, collector) = run(&ChronologyPoints, &Fixture::Dataset(&lake));

        assert_eq!(verdict, Verdict::Passed);
        let row = collector.row(&Identity::dataset("LakeX")).unwrap();
        assert_eq!(row["chronology present"], CellValue::Bool(true));
        assert_eq!(row["nchronpoints"], CellValue::Int(2));
    }

    #[test]
    fn test_chronology_missing() {
        let lake = dataset(json!({"dataSetName": "LakeX"}));
        let (verdict, collector) = run(&ChronologyPoints, &Fixture::Dataset(&lake));

        assert!(matches!(verdict, Verdict::Failed(msg) if msg.contains("No chronological")));
        let row = collector.row(&Identity::dataset("LakeX")).unwrap();
        assert_eq!(row["chronology present"], CellValue::Bool(false));
        assert_eq!(row["nchronpoints"], CellValue::Int(0));
    }

    #[test]
    fn test_chronology_without_age14c() {
        let lake = dataset(json!({
            "dataSetName": "LakeX",
            "chronData": [{"measurementTable": [{"columns": [
                {"variableName": "depth", "values": [1, 2]}
            ]}]}]
        }));
        let (verdict, _) = run(&ChronologyPoints, &Fixture::Dataset(&lake));
        assert_eq!(verdict, Verdict::Failed("No age14C series found!".into()));
    }

    #[test]
    fn test_lipd_validity_on_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LakeX.lpd");
        std::fs::write(&path, b"not a zip").unwrap();

        let (verdict, collector) = run(&LipdValidity, &Fixture::File(&path));
        assert!(matches!(verdict, Verdict::Failed(_)));
        let row = collector.row(&Identity::dataset("LakeX")).unwrap();
        assert_eq!(row["valid file"], CellValue::Bool(false));
    }

    #[test]
    fn test_wrong_fixture_is_an_error() {
        let mut collector = ResultCollector::new();
        let id = Identity::dataset("LakeX");
        let series = crate::lipd::SeriesRecord::new();
        let result = ChronologyPoints.run(&Fixture::Series(&series), &mut collector.recorder(&id));
        assert!(result.is_err());
    }
}
