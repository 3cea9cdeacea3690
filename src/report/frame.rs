//! Columnar view of the report tables
//!
//! Result rows hold loosely typed cells. Before writing, every column is given
//! one Arrow type so the workbook gets typed cells:
//!
//! | Non-missing cells | Arrow type |
//! |-------------------|------------|
//! | only booleans | `Boolean` |
//! | only integers | `Int64` |
//! | integers and floats | `Float64` |
//! | anything else, or none | `Utf8` |

use super::summary::TOTAL;
use super::{CellValue, Outcome, ResultTable, Summary};
use crate::Result;
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Leading index columns of the Test Results sheet.
pub const INDEX_COLUMNS: [&str; 2] = ["dataSetName", "TSid"];

/// Header of the outcome column of the Summary sheet.
pub const OUTCOME_COLUMN: &str = "outcome";

/// Infer the Arrow type of a column from its cells.
#[must_use]
pub fn infer_type<'a>(cells: impl IntoIterator<Item = &'a CellValue>) -> DataType {
    let (mut bools, mut ints, mut floats, mut texts) = (false, false, false, false);
    for cell in cells {
        if cell.is_missing() {
            continue;
        }
        match cell {
            CellValue::Bool(_) => bools = true,
            CellValue::Int(_) => ints = true,
            CellValue::Float(_) => floats = true,
            CellValue::Text(_) | CellValue::Missing => texts = true,
        }
    }
    match (bools, ints, floats, texts) {
        (true, false, false, false) => DataType::Boolean,
        (false, true, false, false) => DataType::Int64,
        (false, _, true, false) => DataType::Float64,
        _ => DataType::Utf8,
    }
}

#[allow(clippy::cast_precision_loss)]
fn build_column(cells: &[Option<&CellValue>], data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Boolean => Arc::new(BooleanArray::from(
            cells
                .iter()
                .map(|cell| match present(*cell) {
                    Some(CellValue::Bool(b)) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        DataType::Int64 => Arc::new(Int64Array::from(
            cells
                .iter()
                .map(|cell| match present(*cell) {
                    Some(CellValue::Int(i)) => Some(*i),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        DataType::Float64 => Arc::new(Float64Array::from(
            cells
                .iter()
                .map(|cell| match present(*cell) {
                    Some(CellValue::Int(i)) => Some(*i as f64),
                    Some(CellValue::Float(f)) => Some(*f),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        _ => Arc::new(StringArray::from(
            cells
                .iter()
                .map(|cell| present(*cell).map(ToString::to_string))
                .collect::<Vec<_>>(),
        )),
    }
}

fn present(cell: Option<&CellValue>) -> Option<&CellValue> {
    cell.filter(|c| !c.is_missing())
}

/// The Test Results sheet: index columns followed by every table column.
///
/// # Errors
///
/// Returns error if the batch cannot be assembled.
pub fn results_batch(table: &ResultTable) -> Result<RecordBatch> {
    let mut fields = vec![
        Field::new(INDEX_COLUMNS[0], DataType::Utf8, false),
        Field::new(INDEX_COLUMNS[1], DataType::Utf8, true),
    ];
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            table.rows().iter().map(|(id, _)| id.dataset_name()),
        )),
        Arc::new(StringArray::from(
            table
                .rows()
                .iter()
                .map(|(id, _)| id.series_id())
                .collect::<Vec<_>>(),
        )),
    ];

    for column in table.columns() {
        let cells: Vec<Option<&CellValue>> = table
            .rows()
            .iter()
            .map(|(_, row)| row.get(column))
            .collect();
        let data_type = infer_type(cells.iter().flatten().copied());
        arrays.push(build_column(&cells, &data_type));
        fields.push(Field::new(column.as_str(), data_type, true));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// The Summary sheet: one row per outcome plus `Total`, one column per check
/// plus `Total`.
///
/// # Errors
///
/// Returns error if the batch cannot be assembled.
pub fn summary_batch(summary: &Summary) -> Result<RecordBatch> {
    let labels: Vec<&str> = Outcome::ALL
        .iter()
        .map(|o| o.as_str())
        .chain(std::iter::once(TOTAL))
        .collect();
    let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);

    let mut fields = vec![Field::new(OUTCOME_COLUMN, DataType::Utf8, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from(labels))];

    for check in summary.checks() {
        let values: Vec<i64> = Outcome::ALL
            .iter()
            .map(|&o| count(summary.count(check, o)))
            .chain(std::iter::once(count(summary.check_total(check))))
            .collect();
        fields.push(Field::new(check.as_str(), DataType::Int64, false));
        arrays.push(Arc::new(Int64Array::from(values)));
    }

    let totals: Vec<i64> = Outcome::ALL
        .iter()
        .map(|&o| count(summary.outcome_total(o)))
        .chain(std::iter::once(count(summary.total())))
        .collect();
    fields.push(Field::new(TOTAL, DataType::Int64, false));
    arrays.push(Arc::new(Int64Array::from(totals)));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Identity, ResultRow};
    use arrow::array::Array;

    #[test]
    fn test_infer_type() {
        let cells = [CellValue::Bool(true), CellValue::Missing];
        assert_eq!(infer_type(&cells), DataType::Boolean);
        let cells = [CellValue::Int(1), CellValue::Float(f64::NAN)];
        assert_eq!(infer_type(&cells), DataType::Int64);
        let cells = [CellValue::Int(1), CellValue::Float(2.5)];
        assert_eq!(infer_type(&cells), DataType::Float64);
        let cells = [CellValue::Bool(true), CellValue::Int(1)];
        assert_eq!(infer_type(&cells), DataType::Utf8);
        assert_eq!(infer_type(&[]), DataType::Utf8);
    }

    #[test]
    fn test_results_batch_layout() {
        let mut row = ResultRow::default();
        row.insert("min".into(), CellValue::Float(1.5));
        let table = ResultTable::from_parts(
            vec!["min".into()],
            vec![],
            vec![
                (Identity::series("LakeX", "TS1"), row),
                (Identity::dataset("LakeY"), ResultRow::default()),
            ],
        );
        let batch = results_batch(&table).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 3);
        assert_eq!(batch.schema().field(0).name(), "dataSetName");
        assert_eq!(batch.schema().field(2).data_type(), &DataType::Float64);
        let ts = batch.column(1).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(ts.value(0), "TS1");
        assert!(ts.is_null(1));
        let min = batch.column(2).as_any().downcast_ref::<Float64Array>().unwrap();
        assert!((min.value(0) - 1.5).abs() < f64::EPSILON);
        assert!(min.is_null(1));
    }

    #[test]
    fn test_summary_batch_layout() {
        let mut row = ResultRow::default();
        row.insert("latlon".into(), CellValue::from(Outcome::Passed));
        let table = ResultTable::from_parts(
            vec!["latlon".into()],
            vec!["latlon".into()],
            vec![(Identity::series("LakeX", "TS1"), row)],
        );
        let batch = summary_batch(&Summary::from_table(&table)).unwrap();

        assert_eq!(batch.num_rows(), 4);
        assert_eq!(batch.num_columns(), 3);
        let latlon = batch.column(1).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(latlon.values().to_vec(), vec![1, 0, 0, 1]);
        let total = batch.column(2).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(total.value(3), 1);
    }
}
