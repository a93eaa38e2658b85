//! In-memory tabular form of an uploaded spreadsheet.

use std::collections::HashSet;

use serde_json::Value;

/// One parsed sheet: ordered named columns and loosely typed rows.
///
/// Ephemeral: built from uploaded bytes, replaced (never mutated in
/// place) by a deduplicated copy, dropped when the action finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl SheetTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Copy of the table with rows that exactly repeat an earlier row
    /// removed, plus the number of rows dropped. Equality is whole-row,
    /// column-order sensitive.
    pub fn deduplicated(&self) -> (SheetTable, usize) {
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if seen.insert(row_key(row)) {
                rows.push(row.clone());
            }
        }
        let removed = self.rows.len() - rows.len();
        (
            SheetTable {
                name: self.name.clone(),
                columns: self.columns.clone(),
                rows,
            },
            removed,
        )
    }
}

/// Serialized form used for whole-row equality.
pub(crate) fn row_key(row: &[Value]) -> String {
    serde_json::to_string(row).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(rows: Vec<Vec<Value>>) -> SheetTable {
        SheetTable {
            name: "Sheet1".to_string(),
            columns: vec!["a".to_string(), "b".to_string()],
            rows,
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence_and_order() {
        let t = table(vec![
            vec![json!(1), json!("x")],
            vec![json!(2), json!("y")],
            vec![json!(1), json!("x")],
            vec![json!(3), json!("z")],
            vec![json!(2), json!("y")],
        ]);

        let (deduped, removed) = t.deduplicated();
        assert_eq!(removed, 2);
        assert_eq!(
            deduped.rows,
            vec![
                vec![json!(1), json!("x")],
                vec![json!(2), json!("y")],
                vec![json!(3), json!("z")],
            ]
        );
        // the original table is untouched
        assert_eq!(t.row_count(), 5);
    }

    #[test]
    fn dedup_on_unique_rows_is_a_noop() {
        let t = table(vec![vec![json!(1), json!(2)], vec![json!(2), json!(1)]]);
        let (deduped, removed) = t.deduplicated();
        assert_eq!(removed, 0);
        assert_eq!(deduped.rows, t.rows);
    }
}
