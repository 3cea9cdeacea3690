//! Workbook writer
//!
//! Sheets, in order: `Help`, `Test Results`, `Summary`. The workbook is
//! rendered in memory and written through [`crate::atomic::write_atomic`], so
//! a failed run never leaves a partial report behind.

use super::frame::{results_batch, summary_batch};
use super::Report;
use crate::atomic::write_atomic;
use crate::{Error, Result};
use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

/// Name of the help sheet.
pub const HELP_SHEET: &str = "Help";
/// Name of the results sheet.
pub const RESULTS_SHEET: &str = "Test Results";
/// Name of the summary sheet.
pub const SUMMARY_SHEET: &str = "Summary";

/// Onboarding text at the top of the Help sheet.
pub const HELP_TEXT: [&str; 7] = [
    "Quality control of the Temp12k LiPD collection",
    "The 'Test Results' sheet has one row per time series (dataSetName, TSid). Results of \
     dataset-level checks are copied onto every series of the dataset.",
    "Every check adds a column with its outcome (passed, failed or skipped), a '-id' column \
     with the invocation id, and columns with the values it inspected.",
    "Use the filter buttons of the header row to narrow the table, e.g. to the rows where a \
     check failed.",
    "A reviewed failure can be accepted by listing its invocation id (the '-id' column) in a \
     text file passed with --accepted. It is then reported as passed; its values stay visible.",
    "The 'Summary' sheet counts the outcomes of every check. Rows without an outcome for a \
     check are counted as failed.",
    "The columns of the 'Test Results' sheet are described below.",
];

/// Render `report` and write it to `path`.
///
/// # Errors
///
/// Returns error if the workbook cannot be rendered or `path` cannot be
/// written. Nothing is left at `path` in that case.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    write_help(workbook.add_worksheet(), report)?;
    write_batch(
        workbook.add_worksheet(),
        RESULTS_SHEET,
        &results_batch(report.results())?,
        2,
    )?;
    write_batch(
        workbook.add_worksheet(),
        SUMMARY_SHEET,
        &summary_batch(report.summary())?,
        1,
    )?;

    let buffer = workbook.save_to_buffer()?;
    write_atomic(path, &buffer)?;
    info!(path = %path.display(), rows = report.results().len(), "report written");
    Ok(())
}

fn write_help(sheet: &mut Worksheet, report: &Report) -> Result<()> {
    let bold = Format::new().set_bold();
    sheet.set_name(HELP_SHEET)?;
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 100)?;

    let mut row: u32 = 0;
    for (index, line) in HELP_TEXT.iter().enumerate() {
        if index == 0 {
            sheet.write_string_with_format(row, 0, *line, &bold)?;
        } else {
            sheet.write_string(row, 0, *line)?;
        }
        row += 1;
    }

    row += 1;
    sheet.write_string_with_format(row, 0, "Column", &bold)?;
    sheet.write_string_with_format(row, 1, "Description", &bold)?;
    for (column, description) in report.metadata().entries() {
        row += 1;
        sheet.write_string(row, 0, column)?;
        sheet.write_string(row, 1, description)?;
    }

    row += 2;
    sheet.write_string(
        row,
        0,
        format!("Generated on {}", report.generated_at().to_rfc3339()),
    )?;
    Ok(())
}

fn write_batch(
    sheet: &mut Worksheet,
    name: &str,
    batch: &RecordBatch,
    frozen_columns: u16,
) -> Result<()> {
    let bold = Format::new().set_bold();
    sheet.set_name(name)?;

    let schema = batch.schema();
    for (index, (field, column)) in schema.fields().iter().zip(batch.columns()).enumerate() {
        let col = sheet_column(index)?;
        sheet.write_string_with_format(0, col, field.name(), &bold)?;

        match field.data_type() {
            DataType::Boolean => {
                let array = downcast::<BooleanArray>(column.as_ref(), field.name())?;
                for i in (0..array.len()).filter(|&i| array.is_valid(i)) {
                    sheet.write_boolean(sheet_row(i)?, col, array.value(i))?;
                }
            }
            DataType::Int64 => {
                let array = downcast::<Int64Array>(column.as_ref(), field.name())?;
                for i in (0..array.len()).filter(|&i| array.is_valid(i)) {
                    #[allow(clippy::cast_precision_loss)]
                    sheet.write_number(sheet_row(i)?, col, array.value(i) as f64)?;
                }
            }
            DataType::Float64 => {
                let array = downcast::<Float64Array>(column.as_ref(), field.name())?;
                for i in (0..array.len()).filter(|&i| array.is_valid(i)) {
                    sheet.write_number(sheet_row(i)?, col, array.value(i))?;
                }
            }
            DataType::Utf8 => {
                let array = downcast::<StringArray>(column.as_ref(), field.name())?;
                for i in (0..array.len()).filter(|&i| array.is_valid(i)) {
                    sheet.write_string(sheet_row(i)?, col, array.value(i))?;
                }
            }
            other => {
                return Err(Error::Report(format!(
                    "Unsupported column type {other:?} for {}",
                    field.name()
                )));
            }
        }
    }

    if batch.num_columns() > 0 {
        let last_col = sheet_column(batch.num_columns() - 1)?;
        sheet.autofilter(0, 0, sheet_row(batch.num_rows().saturating_sub(1))?, last_col)?;
        sheet.set_freeze_panes(1, frozen_columns)?;
    }
    Ok(())
}

fn downcast<'a, T: 'static>(column: &'a dyn Array, name: &str) -> Result<&'a T> {
    column
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::Report(format!("Column {name} does not match its declared type")))
}

/// Worksheet row of data row `index` (row 0 is the header).
fn sheet_row(index: usize) -> Result<u32> {
    u32::try_from(index + 1).map_err(|_| Error::Report(format!("Too many rows: {index}")))
}

fn sheet_column(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| Error::Report(format!("Too many columns: {index}")))
}
