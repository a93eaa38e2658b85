//! Descriptive data-quality metrics for a parsed sheet.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use super::table::{row_key, SheetTable};

/// Read-only snapshot of table health. Recomputed on demand from the
/// table, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Rows that exactly repeat an earlier row, all columns compared.
    pub duplicate_rows: usize,
    /// Columns holding at least one empty cell.
    pub null_columns: Vec<String>,
    /// Column names that break the naming convention.
    pub invalid_columns: Vec<String>,
    /// Rough in-memory footprint of the table.
    pub memory_bytes: usize,
}

/// Compute the quality report. Pure: the table is not touched.
pub fn analyze(table: &SheetTable) -> QualityReport {
    let mut seen = HashSet::new();
    let mut duplicate_rows = 0;
    for row in &table.rows {
        if !seen.insert(row_key(row)) {
            duplicate_rows += 1;
        }
    }

    let mut null_columns = Vec::new();
    for (idx, column) in table.columns.iter().enumerate() {
        let has_null = table
            .rows
            .iter()
            .any(|row| row.get(idx).map(Value::is_null).unwrap_or(true));
        if !table.rows.is_empty() && has_null {
            null_columns.push(column.clone());
        }
    }

    let invalid_columns = table
        .columns
        .iter()
        .filter(|c| !is_valid_column_name(c))
        .cloned()
        .collect();

    QualityReport {
        total_rows: table.row_count(),
        total_columns: table.column_count(),
        duplicate_rows,
        null_columns,
        invalid_columns,
        memory_bytes: estimate_memory(table),
    }
}

/// A column name passes when, with diacritics folded to their base ASCII
/// letter, it contains only alphanumerics, underscores and spaces. This
/// is a naming-convention check, not a data-type check.
pub fn is_valid_column_name(name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }
    fold_diacritics(name)
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ')
}

/// Fold accented latin letters to their unaccented base letter.
fn fold_diacritics(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// String lengths plus a fixed per-cell cost.
fn estimate_memory(table: &SheetTable) -> usize {
    let cell_overhead = std::mem::size_of::<Value>();
    let header: usize = table.columns.iter().map(|c| c.len()).sum();
    let cells: usize = table
        .rows
        .iter()
        .flatten()
        .map(|v| {
            cell_overhead
                + match v {
                    Value::String(s) => s.len(),
                    _ => 0,
                }
        })
        .sum();
    header + cells
}
