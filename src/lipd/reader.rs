//! LiPD archive reader (zip + JSON-LD + CSV)

use super::{Dataset, Mode};
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Read a `.lpd` archive into a [`Dataset`].
///
/// The CSV table referenced by every `measurementTable` is parsed and each
/// column's `values` attribute is filled from its 1-based `number`.
/// `nan`, `NaN` and empty cells become `null`.
///
/// # Errors
///
/// Returns [`Error::InvalidLipd`] if the archive, its metadata or one of its
/// tables is malformed, and [`Error::Io`] if the file cannot be opened.
pub fn read_lipd<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let invalid = |reason: String| Error::InvalidLipd {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| invalid(format!("not a zip archive: {e}")))?;

    let jsonld = archive
        .file_names()
        .find(|name| name.ends_with(".jsonld"))
        .map(str::to_owned)
        .ok_or_else(|| invalid("no .jsonld metadata entry".to_string()))?;
    let base_dir = jsonld.rsplit_once('/').map_or("", |(dir, _)| dir).to_string();

    let metadata: Value = {
        let entry = archive
            .by_name(&jsonld)
            .map_err(|e| invalid(format!("cannot open {jsonld}: {e}")))?;
        serde_json::from_reader(entry).map_err(|e| invalid(format!("malformed {jsonld}: {e}")))?
    };
    let Value::Object(mut metadata) = metadata else {
        return Err(invalid("metadata is not a JSON object".to_string()));
    };

    for mode in [Mode::Paleo, Mode::Chron] {
        attach_section_values(&mut archive, &base_dir, &mut metadata, mode).map_err(invalid)?;
    }

    Dataset::from_metadata(metadata).ok_or_else(|| invalid("missing dataSetName".to_string()))
}

fn attach_section_values<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    base_dir: &str,
    metadata: &mut Map<String, Value>,
    mode: Mode,
) -> std::result::Result<(), String> {
    let Some(Value::Array(sections)) = metadata.get_mut(mode.section_key()) else {
        return Ok(());
    };
    for section in sections {
        let Some(Value::Array(tables)) = section.get_mut("measurementTable") else {
            continue;
        };
        for table in tables {
            attach_table_values(archive, base_dir, table)?;
        }
    }
    Ok(())
}

fn attach_table_values<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    base_dir: &str,
    table: &mut Value,
) -> std::result::Result<(), String> {
    // Tables without a data file carry no values
    let Some(filename) = table.get("filename").and_then(Value::as_str).map(str::to_owned) else {
        return Ok(());
    };
    let entry_name = if base_dir.is_empty() {
        filename.clone()
    } else {
        format!("{base_dir}/{filename}")
    };
    let rows = read_table(archive, &entry_name)?;

    let Some(Value::Array(columns)) = table.get_mut("columns") else {
        return Ok(());
    };
    for column in columns {
        let Some(number) = column_number(column) else {
            continue;
        };
        let index = number
            .checked_sub(1)
            .ok_or_else(|| format!("column number 0 in {filename}"))?;
        if rows.iter().any(|row| index >= row.len()) {
            return Err(format!("column {number} out of range in {filename}"));
        }
        let values = rows.iter().map(|row| row[index].clone()).collect();
        if let Value::Object(column) = column {
            column.insert("values".to_string(), Value::Array(values));
        }
    }
    Ok(())
}

fn read_table<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    entry_name: &str,
) -> std::result::Result<Vec<Vec<Value>>, String> {
    let entry = archive
        .by_name(entry_name)
        .map_err(|e| format!("missing table {entry_name}: {e}"))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(entry);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("malformed table {entry_name}: {e}"))?;
        rows.push(record.iter().map(parse_cell).collect());
    }
    Ok(rows)
}

fn column_number(column: &Value) -> Option<usize> {
    match column.get("number")? {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        // Ensemble columns span several CSV columns; not used by any check
        _ => None,
    }
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Value::Null;
    }
    cell.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(cell.to_string()), Value::Number)
}
