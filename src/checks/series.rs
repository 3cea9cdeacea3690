//! Series-level checks

use super::{expect_series, Check, Fixture, FixtureKind, Verdict};
use crate::lipd::SeriesRecord;
use crate::report::Recorder;
use crate::Result;
use rustc_hash::FxHashMap;

/// Lowest plausible temperature (°C), exclusive.
pub const MIN_TEMPERATURE: f64 = -40.0;
/// Highest plausible temperature (°C), exclusive.
pub const MAX_TEMPERATURE: f64 = 50.0;
/// Youngest plausible age (years BP), exclusive.
pub const MIN_AGE: f64 = -70.0;
/// Robust z-score above which a value is an outlier.
pub const OUTLIER_THRESHOLD: f64 = 5.0;
/// Scales the median absolute deviation to a standard deviation.
const MAD_SCALE: f64 = 1.4826;

/// Temperature values indexed by age.
///
/// Samples without a valid age are dropped; values may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    ages: Vec<f64>,
    values: Vec<Option<f64>>,
}

impl Samples {
    /// Pair `age` with `paleoData_values`.
    ///
    /// # Errors
    ///
    /// Returns the [`Verdict::Skipped`] to report when either sequence is
    /// absent or their lengths differ.
    pub fn from_series(series: &SeriesRecord) -> std::result::Result<Self, Verdict> {
        let (Some(ages), Some(values)) = (
            series.numeric_values("age"),
            series.numeric_values("paleoData_values"),
        ) else {
            return Err(no_samples());
        };
        if ages.len() != values.len() {
            return Err(Verdict::Skipped(format!(
                "{} ages for {} paleoData_values",
                ages.len(),
                values.len()
            )));
        }
        let (ages, values): (Vec<f64>, Vec<Option<f64>>) = ages
            .into_iter()
            .zip(values)
            .filter_map(|(age, value)| Some((age?, value)))
            .unzip();
        Ok(Self { ages, values })
    }

    /// Ages of the samples.
    #[must_use]
    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    /// Values of the samples.
    #[must_use]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Non-missing values.
    pub fn present_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ages.len()
    }

    /// Whether there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn no_samples() -> Verdict {
    Verdict::Skipped("no paleoData_values/age samples".into())
}

/// Test the validity of the temperature values.
pub struct TemperatureValues;

impl Check for TemperatureValues {
    fn name(&self) -> &'static str {
        "temperature_values"
    }

    fn description(&self) -> &'static str {
        "Test the validity of the temperature values.\n\n\
         Every value must be present and lie strictly between -40 and 50 degC."
    }

    fn fixture(&self) -> FixtureKind {
        FixtureKind::Series
    }

    fn metrics(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("invalid_temperatures", "Number of missing temperature values"),
            ("min", "Minimum temperature"),
            ("max", "Maximum temperature"),
        ]
    }

    fn run(&self, fixture: &Fixture<'_>, recorder: &mut Recorder<'_>) -> Result<Verdict> {
        let series = expect_series(self, fixture)?;
        let samples = match Samples::from_series(series) {
            Ok(samples) => samples,
            Err(skip) => return Ok(skip),
        };
        let missing = samples.values().iter().filter(|v| v.is_none()).count();
        let range = min_max(samples.present_values());
        recorder.record("invalid_temperatures", missing);
        recorder.record("min", range.map(|(lo, _)| lo));
        recorder.record("max", range.map(|(_, hi)| hi));

        if missing > 0 {
            return Ok(Verdict::Failed(format!("{missing} missing temperature values")));
        }
        match range {
            Some((lo, _)) if lo <= MIN_TEMPERATURE => {
                Ok(Verdict::Failed("Too low temperatures!".into()))
            }
            Some((_, hi)) if hi >= MAX_TEMPERATURE => {
                Ok(Verdict::Failed("Too high temperatures!".into()))
            }
            _ => Ok(Verdict::Passed),
        }
    }
}

/// Test the coordinate ranges of the site.
pub struct LatLon;

impl Check for LatLon {
    fn name(&self) -> &'static str {
        "latlon"
    }

    fn description(&self) -> &'static str {
        "Test the validity of the site coordinates.\n\n\
         Latitude must lie in [-90, 90] and longitude in [-180, 360]."
    }

    fn fixture(&self) -> FixtureKind {
        FixtureKind::Series
    }

    fn metrics(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("latValid", "Whether geo_meanLat lies in [-90, 90]"),
            ("lonValid", "Whether geo_meanLon lies in [-180, 360]"),
        ]
    }

    fn run(&self, fixture: &Fixture<'_>, recorder: &mut Recorder<'_>) -> Result<Verdict> {
        let series = expect_series(self, fixture)?;
        let (Some(lat), Some(lon)) = (series.get_f64("geo_meanLat"), series.get_f64("geo_meanLon"))
        else {
            return Ok(Verdict::Skipped("no geo_meanLat/geo_meanLon".into()));
        };
        let lat_valid = (-90.0..=90.0).contains(&lat);
        let lon_valid = (-180.0..=360.0).contains(&lon);
        recorder.record("latValid", lat_valid);
        recorder.record("lonValid", lon_valid);

        if !lat_valid {
            return Ok(Verdict::Failed("Invalid latitudes".into()));
        }
        if !lon_valid {
            return Ok(Verdict::Failed("Invalid longitudes".into()));
        }
        Ok(Verdict::Passed)
    }
}

/// Test the age range of the series.
pub struct Ages;

impl Check for Ages {
    fn name(&self) -> &'static str {
        "ages"
    }

    fn description(&self) -> &'static str {
        "Test the age range of the series.\n\n\
         The youngest sample must be older than -70 BP (1950 + 70 = 2020 CE)."
    }

    fn fixture(&self) -> FixtureKind {
        FixtureKind::Series
    }

    fn metrics(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("min_age", "Youngest sample age (BP)"),
            ("max_age", "Oldest sample age (BP)"),
        ]
    }

    fn run(&self, fixture: &Fixture<'_>, recorder: &mut Recorder<'_>) -> Result<Verdict> {
        let series = expect_series(self, fixture)?;
        let samples = match Samples::from_series(series) {
            Ok(samples) => samples,
            Err(skip) => return Ok(skip),
        };
        let Some((min_age, max_age)) = min_max(samples.ages().iter().copied()) else {
            return Ok(no_samples());
        };
        recorder.record("min_age", min_age);
        recorder.record("max_age", max_age);

        if min_age <= MIN_AGE {
            return Ok(Verdict::Failed("Invalid modern age".into()));
        }
        Ok(Verdict::Passed)
    }
}

/// Test for samples sharing the same age.
pub struct DuplicatedAges;

impl Check for DuplicatedAges {
    fn name(&self) -> &'static str {
        "duplicated_ages"
    }

    fn description(&self) -> &'static str {
        "Test for duplicated ages.\n\n\
         No two samples of a series may have the same age."
    }

    fn fixture(&self) -> FixtureKind {
        FixtureKind::Series
    }

    fn metrics(&self) -> &'static [(&'static str, &'static str)] {
        &[(
            "duplicatedAges",
            "Number of samples whose age occurs more than once (all duplicates counted)",
        )]
    }

    fn run(&self, fixture: &Fixture<'_>, recorder: &mut Recorder<'_>) -> Result<Verdict> {
        let series = expect_series(self, fixture)?;
        let samples = match Samples::from_series(series) {
            Ok(samples) => samples,
            Err(skip) => return Ok(skip),
        };

        let mut occurrences: FxHashMap<u64, usize> = FxHashMap::default();
        for age in samples.ages() {
            // -0.0 and 0.0 are the same age
            *occurrences.entry((age + 0.0).to_bits()).or_default() += 1;
        }
        let duplicated: usize = occurrences.values().filter(|&&n| n > 1).sum();
        recorder.record("duplicatedAges", duplicated);

        if duplicated > 0 {
            return Ok(Verdict::Failed(format!("{duplicated} samples share an age")));
        }
        Ok(Verdict::Passed)
    }
}

/// Test for anomalous temperature values.
pub struct TemperatureOutliers;

impl Check for TemperatureOutliers {
    fn name(&self) -> &'static str {
        "temperature_outliers"
    }

    fn description(&self) -> &'static str {
        "Test for anomalous temperature values.\n\n\
         A value is an outlier if it lies more than 5 scaled median absolute \
         deviations from the median of the series."
    }

    fn fixture(&self) -> FixtureKind {
        FixtureKind::Series
    }

    fn metrics(&self) -> &'static [(&'static str, &'static str)] {
        &[("outliers", "Number of values beyond 5 scaled MADs from the median")]
    }

    fn run(&self, fixture: &Fixture<'_>, recorder: &mut Recorder<'_>) -> Result<Verdict> {
        let series = expect_series(self, fixture)?;
        let samples = match Samples::from_series(series) {
            Ok(samples) => samples,
            Err(skip) => return Ok(skip),
        };
        let values: Vec<f64> = samples.present_values().collect();
        let Some(center) = median(values.clone()) else {
            return Ok(Verdict::Skipped("no temperature values".into()));
        };
        let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
        let scale = median(deviations.clone()).unwrap_or(0.0) * MAD_SCALE;

        let outliers = if scale > 0.0 {
            deviations
                .iter()
                .filter(|&&d| d / scale > OUTLIER_THRESHOLD)
                .count()
        } else {
            0
        };
        recorder.record("outliers", outliers);

        if outliers > 0 {
            return Ok(Verdict::Failed(format!("{outliers} anomalous temperature values")));
        }
        Ok(Verdict::Passed)
    }
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Test the elevation of marine sites.
pub struct Elevation;

impl Check for Elevation {
    fn name(&self) -> &'static str {
        "elevation"
    }

    fn description(&self) -> &'static str {
        "Test the elevation of marine sites.\n\n\
         Sites whose archive type mentions marine must not lie above sea level."
    }

    fn fixture(&self) -> FixtureKind {
        FixtureKind::Series
    }

    fn metrics(&self) -> &'static [(&'static str, &'static str)] {
        &[("Elevation", "Site elevation (geo_meanElev, m)")]
    }

    fn run(&self, fixture: &Fixture<'_>, recorder: &mut Recorder<'_>) -> Result<Verdict> {
        let series = expect_series(self, fixture)?;
        let elevation = series.get_f64("geo_meanElev");
        recorder.record("Elevation", elevation);

        let Some(archive) = series.get_str("archiveType") else {
            return Ok(Verdict::Skipped("no archiveType".into()));
        };
        if !archive.to_lowercase().contains("marine") {
            return Ok(Verdict::Passed);
        }
        match elevation {
            None => Ok(Verdict::Skipped("no geo_meanElev".into())),
            Some(elev) if elev > 0.0 => Ok(Verdict::Failed(format!(
                "Marine site above sea level ({elev} m)"
            ))),
            Some(_) => Ok(Verdict::Passed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CellValue, Identity, ResultCollector};
    use serde_json::json;

    fn series(ages: serde_json::Value, values: serde_json::Value) -> SeriesRecord {
        let mut series = SeriesRecord::new();
        series.insert("dataSetName", "LakeX");
        series.insert("paleoData_TSid", "TS1");
        series.insert("age", ages);
        series.insert("paleoData_values", values);
        series
    }

    fn run(check: &dyn Check, series: &SeriesRecord) -> (Verdict, ResultCollector) {
        let mut collector = ResultCollector::new();
        let id = Identity::series("LakeX", "TS1");
        let verdict = check
            .run(&Fixture::Series(series), &mut collector.recorder(&id))
            .unwrap();
        (verdict, collector)
    }

    fn cell(collector: &ResultCollector, key: &str) -> CellValue {
        collector.row(&Identity::series("LakeX", "TS1")).unwrap()[key].clone()
    }

    #[test]
    fn test_samples_drop_missing_ages() {
        let s = series(json!([100, null, 300]), json!([1.0, 2.0, null]));
        let samples = Samples::from_series(&s).unwrap();
        assert_eq!(samples.ages(), [100.0, 300.0]);
        assert_eq!(samples.values(), [Some(1.0), None]);
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_samples_length_mismatch_skips() {
        let s = series(json!([100, 200, 300]), json!([1.0, 2.0]));
        assert_eq!(
            Samples::from_series(&s),
            Err(Verdict::Skipped("3 ages for 2 paleoData_values".into()))
        );

        let (verdict, _) = run(&TemperatureValues, &s);
        assert!(matches!(verdict, Verdict::Skipped(_)));
        let (verdict, _) = run(&TemperatureOutliers, &s);
        assert!(matches!(verdict, Verdict::Skipped(_)));
    }

    #[test]
    fn test_temperature_values() {
        let (verdict, collector) = run(&TemperatureValues, &series(json!([1, 2]), json!([5.0, 12.0])));
        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(cell(&collector, "min"), CellValue::Float(5.0));
        assert_eq!(cell(&collector, "max"), CellValue::Float(12.0));
        assert_eq!(cell(&collector, "invalid_temperatures"), CellValue::Int(0));

        let (verdict, _) = run(&TemperatureValues, &series(json!([1, 2]), json!([5.0, 55.0])));
        assert_eq!(verdict, Verdict::Failed("Too high temperatures!".into()));

        let (verdict, _) = run(&TemperatureValues, &series(json!([1, 2]), json!([-40.0, 1.0])));
        assert_eq!(verdict, Verdict::Failed("Too low temperatures!".into()));

        let (verdict, collector) = run(&TemperatureValues, &series(json!([1, 2]), json!([5.0, null])));
        assert!(matches!(verdict, Verdict::Failed(_)));
        assert_eq!(cell(&collector, "invalid_temperatures"), CellValue::Int(1));
    }

    #[test]
    fn test_latlon_out_of_range() {
        let mut s = series(json!([1]), json!([1.0]));
        s.insert("geo_meanLat", 95.0);
        s.insert("geo_meanLon", 10.0);

        let (verdict, collector) = run(&LatLon, &s);
        assert_eq!(verdict, Verdict::Failed("Invalid latitudes".into()));
        assert_eq!(cell(&collector, "latValid"), CellValue::Bool(false));
        assert_eq!(cell(&collector, "lonValid"), CellValue::Bool(true));
    }

    #[test]
    fn test_latlon_missing_coordinates_skips() {
        let (verdict, _) = run(&LatLon, &series(json!([1]), json!([1.0])));
        assert!(matches!(verdict, Verdict::Skipped(_)));
    }

    #[test]
    fn test_ages() {
        let (verdict, collector) = run(&Ages, &series(json!([-50, 8000]), json!([1.0, 2.0])));
        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(cell(&collector, "min_age"), CellValue::Float(-50.0));
        assert_eq!(cell(&collector, "max_age"), CellValue::Float(8000.0));

        let (verdict, _) = run(&Ages, &series(json!([-70, 100]), json!([1.0, 2.0])));
        assert_eq!(verdict, Verdict::Failed("Invalid modern age".into()));
    }

    #[test]
    fn test_duplicated_ages_counts_every_duplicate() {
        let (verdict, collector) =
            run(&DuplicatedAges, &series(json!([100, 100, 200]), json!([1.0, 2.0, 3.0])));
        assert!(matches!(verdict, Verdict::Failed(_)));
        assert_eq!(cell(&collector, "duplicatedAges"), CellValue::Int(2));

        let (verdict, collector) =
            run(&DuplicatedAges, &series(json!([100, 200]), json!([1.0, 2.0])));
        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(cell(&collector, "duplicatedAges"), CellValue::Int(0));
    }

    #[test]
    fn test_temperature_outliers() {
        let values = json!([10.0, 10.5, 9.5, 10.2, 9.8, 10.1, 30.0]);
        let (verdict, collector) =
            run(&TemperatureOutliers, &series(json!([1, 2, 3, 4, 5, 6, 7]), values));
        assert!(matches!(verdict, Verdict::Failed(_)));
        assert_eq!(cell(&collector, "outliers"), CellValue::Int(1));

        let (verdict, collector) =
            run(&TemperatureOutliers, &series(json!([1, 2, 3]), json!([4.0, 4.0, 4.0])));
        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(cell(&collector, "outliers"), CellValue::Int(0));
    }

    #[test]
    fn test_marine_elevation() {
        let mut s = series(json!([1]), json!([1.0]));
        s.insert("archiveType", "Marine sediment");
        s.insert("geo_meanElev", 150.0);
        let (verdict, collector) = run(&Elevation, &s);
        assert!(matches!(verdict, Verdict::Failed(_)));
        assert_eq!(cell(&collector, "Elevation"), CellValue::Float(150.0));

        s.insert("geo_meanElev", 0.0);
        let (verdict, _) = run(&Elevation, &s);
        assert_eq!(verdict, Verdict::Passed);

        s.insert("archiveType", "LakeSediment");
        s.insert("geo_meanElev", 150.0);
        let (verdict, _) = run(&Elevation, &s);
        assert_eq!(verdict, Verdict::Passed);
    }

    #[test]
    fn test_elevation_without_archive_type_skips() {
        let mut s = series(json!([1]), json!([1.0]));
        s.insert("geo_meanElev", 150.0);
        let (verdict, collector) = run(&Elevation, &s);
        assert_eq!(verdict, Verdict::Skipped("no archiveType".into()));
        assert_eq!(cell(&collector, "Elevation"), CellValue::Float(150.0));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![]), None);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }
}
