//! Synthetic LiPD archives for integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// One Temp12k temperature series.
pub struct SeriesSpec {
    pub ts_id: String,
    pub ages: Vec<Option<f64>>,
    pub temperatures: Vec<Option<f64>>,
}

impl SeriesSpec {
    pub fn new(ts_id: &str, ages: &[f64], temperatures: &[f64]) -> Self {
        Self {
            ts_id: ts_id.to_string(),
            ages: ages.iter().copied().map(Some).collect(),
            temperatures: temperatures.iter().copied().map(Some).collect(),
        }
    }
}

/// One site (dataset) with its series and chronology.
pub struct SiteSpec {
    pub name: String,
    pub archive_type: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
    pub country: Option<String>,
    pub series: Vec<SeriesSpec>,
    pub age14c: Option<Vec<Option<f64>>>,
}

impl SiteSpec {
    /// A well-behaved lake site with one series and a chronology.
    pub fn lake(name: &str) -> Self {
        Self {
            name: name.to_string(),
            archive_type: "LakeSediment".to_string(),
            lat: 45.0,
            lon: 10.0,
            elevation: Some(300.0),
            country: None,
            series: vec![SeriesSpec::new(
                "TS1",
                &[100.0, 200.0, 300.0, 400.0, 500.0],
                &[10.0, 10.5, 11.0, 10.2, 10.8],
            )],
            age14c: Some(vec![Some(1000.0), Some(2000.0), Some(3000.0)]),
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.lat = lat;
        self.lon = lon;
        self
    }

    pub fn with_archive(mut self, archive_type: &str, elevation: Option<f64>) -> Self {
        self.archive_type = archive_type.to_string();
        self.elevation = elevation;
        self
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    pub fn with_series(mut self, series: Vec<SeriesSpec>) -> Self {
        self.series = series;
        self
    }

    pub fn without_chronology(mut self) -> Self {
        self.age14c = None;
        self
    }

    fn metadata(&self) -> Value {
        let paleo_tables: Vec<Value> = self
            .series
            .iter()
            .enumerate()
            .map(|(i, series)| {
                json!({
                    "filename": format!("{}.paleo1measurement{}.csv", self.name, i + 1),
                    "columns": [
                        {
                            "number": 1,
                            "variableName": "age",
                            "units": "BP",
                            "TSid": format!("{}-age", series.ts_id),
                        },
                        {
                            "number": 2,
                            "variableName": "temperature",
                            "units": "degC",
                            "TSid": series.ts_id,
                            "inCompilation": "Temp12k",
                            "useInGlobalTemperatureAnalysis": "TRUE",
                        },
                    ],
                })
            })
            .collect();

        let mut coordinates = vec![json!(self.lon), json!(self.lat)];
        if let Some(elevation) = self.elevation {
            coordinates.push(json!(elevation));
        }
        let mut properties = serde_json::Map::new();
        if let Some(country) = &self.country {
            properties.insert("country".to_string(), json!(country));
        }

        let mut metadata = json!({
            "dataSetName": self.name,
            "archiveType": self.archive_type,
            "geo": {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": coordinates },
                "properties": properties,
            },
            "paleoData": [{ "measurementTable": paleo_tables }],
        });
        if self.age14c.is_some() {
            metadata["chronData"] = json!([{
                "measurementTable": [{
                    "filename": format!("{}.chron1measurement1.csv", self.name),
                    "columns": [
                        { "number": 1, "variableName": "age14C", "units": "BP" },
                    ],
                }],
            }]);
        }
        metadata
    }

    /// Write `<dir>/<name>.lpd`.
    pub fn write(&self, dir: &Path) -> PathBuf {
        let path = dir.join(format!("{}.lpd", self.name));
        let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        let base = format!("{}/data", self.name);

        zip.start_file(format!("{base}/metadata.jsonld"), options).unwrap();
        zip.write_all(self.metadata().to_string().as_bytes()).unwrap();

        for (i, series) in self.series.iter().enumerate() {
            zip.start_file(
                format!("{base}/{}.paleo1measurement{}.csv", self.name, i + 1),
                options,
            )
            .unwrap();
            for (age, temperature) in series.ages.iter().zip(&series.temperatures) {
                writeln!(zip, "{},{}", cell(*age), cell(*temperature)).unwrap();
            }
        }

        if let Some(age14c) = &self.age14c {
            zip.start_file(
                format!("{base}/{}.chron1measurement1.csv", self.name),
                options,
            )
            .unwrap();
            for value in age14c {
                writeln!(zip, "{}", cell(*value)).unwrap();
            }
        }
        zip.finish().unwrap();
        path
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "nan".to_string(), |v| v.to_string())
}

/// Write a file that is not a LiPD archive.
pub fn write_broken(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(format!("{name}.lpd"));
    std::fs::write(&path, b"this is not a zip archive").unwrap();
    path
}
