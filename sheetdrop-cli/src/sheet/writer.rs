//! Serialize a table back to upload-ready bytes.
//!
//! Only needed when duplicate rows were dropped: the upload then carries
//! the rewritten sheet instead of the original buffer.

use anyhow::{anyhow, Context, Result};
use rust_xlsxwriter::Workbook;
use serde_json::Value;

use super::table::SheetTable;

/// Write the table as CSV, header row first.
pub fn to_csv_bytes(table: &SheetTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.columns)
        .context("failed to write the CSV header")?;
    for row in &table.rows {
        let record: Vec<String> = row.iter().map(scalar_to_field).collect();
        writer
            .write_record(&record)
            .context("failed to write a CSV row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow!("failed to flush the CSV writer: {}", e))
}

/// Write the table as a single-sheet Excel workbook.
pub fn to_xlsx_bytes(table: &SheetTable) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(&table.name)
        .context("invalid sheet name")?;

    for (col, header) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, header)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row_idx = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let col_idx = c as u16;
            match cell {
                Value::Null => {}
                Value::Bool(b) => {
                    worksheet.write_boolean(row_idx, col_idx, *b)?;
                }
                Value::Number(n) => {
                    worksheet.write_number(row_idx, col_idx, n.as_f64().unwrap_or(0.0))?;
                }
                Value::String(s) => {
                    worksheet.write_string(row_idx, col_idx, s)?;
                }
                other => {
                    worksheet.write_string(row_idx, col_idx, other.to_string())?;
                }
            }
        }
    }

    workbook
        .save_to_buffer()
        .context("failed to serialize the Excel workbook")
}

fn scalar_to_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
