//! Time-series extraction: one flat record per measurement-table column

use super::{Dataset, Mode, SeriesRecord};
use serde_json::{Map, Value};

/// Sections of the metadata document that are never copied onto series.
const NESTED_SECTIONS: [&str; 6] = ["paleoData", "chronData", "geo", "pub", "funding", "changelog"];

/// Extract the series of every dataset, in dataset order.
#[must_use]
pub fn extract_ts(datasets: &[Dataset], mode: Mode) -> Vec<SeriesRecord> {
    datasets
        .iter()
        .flat_map(|dataset| extract_dataset(dataset, mode))
        .collect()
}

/// Extract the series of one dataset.
///
/// Each record carries the dataset's scalar root attributes, the site location
/// (`geo_meanLon`, `geo_meanLat`, `geo_meanElev`, `geo_<property>`), the
/// table's and column's fields prefixed with the section key
/// (`paleoData_TSid`, `paleoData_values`, ...), and the values of the sibling
/// columns of the same table under their `variableName` (`age`, `age14C`).
#[must_use]
pub fn extract_dataset(dataset: &Dataset, mode: Mode) -> Vec<SeriesRecord> {
    let metadata = dataset.metadata();
    let root = root_attributes(metadata);
    let prefix = mode.section_key();

    let tables = metadata
        .get(prefix)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|section| section.get("measurementTable").and_then(Value::as_array))
        .flatten();

    let mut series = Vec::new();
    for table in tables {
        let Some(table) = table.as_object() else {
            continue;
        };
        let columns = table
            .get("columns")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice);

        for (index, column) in columns.iter().enumerate() {
            let Some(column) = column.as_object() else {
                continue;
            };
            let mut record = root.clone();
            for (key, value) in table {
                if key != "columns" && is_scalar(value) {
                    record.insert(format!("{prefix}_{key}"), value.clone());
                }
            }
            for (key, value) in column {
                record.insert(format!("{prefix}_{key}"), value.clone());
            }
            for (sibling_index, sibling) in columns.iter().enumerate() {
                if sibling_index != index {
                    add_sibling(&mut record, sibling);
                }
            }
            series.push(SeriesRecord::from(record));
        }
    }
    series
}

fn add_sibling(record: &mut Map<String, Value>, sibling: &Value) {
    let Some(name) = sibling.get("variableName").and_then(Value::as_str) else {
        return;
    };
    if let Some(values) = sibling.get("values") {
        record
            .entry(name.to_string())
            .or_insert_with(|| values.clone());
    }
    if let Some(units) = sibling.get("units") {
        record
            .entry(format!("{name}Units"))
            .or_insert_with(|| units.clone());
    }
}

fn root_attributes(metadata: &Map<String, Value>) -> Map<String, Value> {
    let mut root: Map<String, Value> = metadata
        .iter()
        .filter(|(key, value)| !NESTED_SECTIONS.contains(&key.as_str()) && is_scalar(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let Some(geo) = metadata.get("geo").and_then(Value::as_object) else {
        return root;
    };
    // GeoJSON order: [longitude, latitude, elevation]
    if let Some(coordinates) = geo
        .get("geometry")
        .and_then(|g| g.get("coordinates"))
        .and_then(Value::as_array)
    {
        for (key, value) in ["geo_meanLon", "geo_meanLat", "geo_meanElev"]
            .into_iter()
            .zip(coordinates)
        {
            root.insert(key.to_string(), value.clone());
        }
    }
    let properties = geo.get("properties").and_then(Value::as_object);
    for (key, value) in geo.iter().chain(properties.into_iter().flatten()) {
        if is_scalar(value) && key != "type" {
            root.entry(format!("geo_{key}"))
                .or_insert_with(|| value.clone());
        }
    }
    root
}

const fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}
