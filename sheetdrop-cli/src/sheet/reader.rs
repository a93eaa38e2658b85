//! Parse uploaded CSV/Excel bytes into tables.
//!
//! The UI hands us a byte buffer, never a path, so everything here reads
//! from memory. Excel workbooks keep all their sheets; the caller picks
//! one.

use std::io::Cursor;
use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{Data, Reader, Xls, Xlsx};
use serde_json::{json, Value};

use super::table::SheetTable;

/// A parsed upload: one or more named sheets.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub sheets: Vec<SheetTable>,
}

impl Workbook {
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Pick a sheet by name, or the first one when no name is given.
    pub fn pick(&self, name: Option<&str>) -> Result<&SheetTable> {
        match name {
            Some(wanted) => self
                .sheets
                .iter()
                .find(|s| s.name == wanted)
                .with_context(|| {
                    format!(
                        "no sheet named '{}', available: {}",
                        wanted,
                        self.sheet_names().join(", ")
                    )
                }),
            None => self.sheets.first().context("the workbook has no sheets"),
        }
    }
}

/// Parse uploaded bytes according to the file extension.
pub fn read_bytes(file_name: &str, bytes: &[u8]) -> Result<Workbook> {
    match extension(file_name).as_deref() {
        Some("csv") => Ok(Workbook {
            sheets: vec![read_csv(bytes)?],
        }),
        Some("xlsx") => {
            let cursor = Cursor::new(bytes.to_vec());
            let mut workbook =
                Xlsx::new(cursor).context("failed to open the Excel workbook")?;
            read_sheets(&mut workbook)
        }
        Some("xls") => {
            let cursor = Cursor::new(bytes.to_vec());
            let mut workbook =
                Xls::new(cursor).context("failed to open the legacy Excel workbook")?;
            read_sheets(&mut workbook)
        }
        _ => bail!("unsupported file type: {}", file_name),
    }
}

pub fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

fn read_csv(bytes: &[u8]) -> Result<SheetTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .context("failed to read the CSV header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to read a CSV record")?;
        let mut row: Vec<Value> = record.iter().map(infer_scalar).collect();
        row.resize(columns.len(), Value::Null);
        if row.iter().all(Value::is_null) {
            continue;
        }
        rows.push(row);
    }

    Ok(SheetTable {
        name: "Sheet1".to_string(),
        columns,
        rows,
    })
}

/// Map a raw CSV field to the same loose scalars Excel cells produce.
fn infer_scalar(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match trimmed.to_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return json!(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return json!(f);
    }
    Value::String(trimmed.to_string())
}

fn read_sheets<RS, WB>(workbook: &mut WB) -> Result<Workbook>
where
    RS: std::io::Read + std::io::Seek,
    WB: Reader<RS>,
    WB::Error: std::error::Error + Send + Sync + 'static,
{
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::new();

    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("failed to read sheet: {}", sheet_name))?;

        let mut cell_rows = range.rows();
        let columns: Vec<String> = match cell_rows.next() {
            Some(header) => header.iter().map(header_name).collect(),
            None => {
                sheets.push(SheetTable {
                    name: sheet_name,
                    columns: Vec::new(),
                    rows: Vec::new(),
                });
                continue;
            }
        };

        let mut rows = Vec::new();
        for cells in cell_rows {
            let mut row: Vec<Value> = cells.iter().map(cell_to_value).collect();
            row.resize(columns.len(), Value::Null);
            if row.iter().all(Value::is_null) {
                continue;
            }
            rows.push(row);
        }

        sheets.push(SheetTable {
            name: sheet_name,
            columns,
            rows,
        });
    }

    if sheets.is_empty() {
        bail!("the workbook has no sheets");
    }

    Ok(Workbook { sheets })
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Convert an Excel cell to a loose JSON scalar.
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => json!(*i),
        Data::Float(f) => {
            // Whole floats become integers, matching what CSV inference does
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                json!(*f as i64)
            } else {
                json!(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::String(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_headers_and_scalars() {
        let data = b"Produto,Quantidade,Valor Total,Ativo\nCaneta,12,30.5,true\nLapis,,15,false\n";
        let workbook = read_bytes("vendas.csv", data).unwrap();
        let table = workbook.pick(None).unwrap();

        assert_eq!(
            table.columns,
            vec!["Produto", "Quantidade", "Valor Total", "Ativo"]
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][0], json!("Caneta"));
        assert_eq!(table.rows[0][1], json!(12));
        assert_eq!(table.rows[0][2], json!(30.5));
        assert_eq!(table.rows[0][3], json!(true));
        assert_eq!(table.rows[1][1], Value::Null);
    }

    #[test]
    fn short_csv_rows_are_padded_with_nulls() {
        let data = b"a,b,c\n1,2\n";
        let workbook = read_bytes("t.csv", data).unwrap();
        let table = workbook.pick(None).unwrap();
        assert_eq!(table.rows[0], vec![json!(1), json!(2), Value::Null]);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(read_bytes("notes.txt", b"hello").is_err());
    }

    #[test]
    fn picking_a_missing_sheet_names_the_alternatives() {
        let workbook = read_bytes("t.csv", b"a\n1\n").unwrap();
        let err = workbook.pick(Some("Plan2")).unwrap_err();
        assert!(err.to_string().contains("Sheet1"));
    }

    #[test]
    fn xlsx_bytes_round_trip_through_the_writer() {
        let table = SheetTable {
            name: "Plan1".to_string(),
            columns: vec!["Produto".to_string(), "Quantidade".to_string()],
            rows: vec![
                vec![json!("Caneta"), json!(12)],
                vec![json!("Lapis"), Value::Null],
            ],
        };
        let bytes = crate::sheet::writer::to_xlsx_bytes(&table).unwrap();

        let workbook = read_bytes("vendas.xlsx", &bytes).unwrap();
        let parsed = workbook.pick(Some("Plan1")).unwrap();
        assert_eq!(parsed.columns, table.columns);
        assert_eq!(parsed.rows, table.rows);
    }
}
