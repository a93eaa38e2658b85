//! Pre-upload schema gate: expected column lists per report file.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::table::SheetTable;

/// How the expected/current column comparison is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Every expected column must be present; new columns are accepted
    /// and reported informationally. The default policy.
    #[default]
    Relaxed,
    /// Exact set match: unknown columns fail too. Superseded by
    /// `Relaxed`, kept for callers that want the old gate.
    Strict,
}

/// Outcome of checking a table against a configured column list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaResult {
    /// Which configured schema applied, if any.
    pub matched_schema: Option<String>,
    pub expected_columns: Vec<String>,
    pub current_columns: Vec<String>,
    pub missing_columns: Vec<String>,
    pub extra_columns: Vec<String>,
    pub is_valid: bool,
}

/// Static registry of expected column lists keyed by report file name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Vec<String>>,
}

impl SchemaRegistry {
    pub fn new(schemas: BTreeMap<String, Vec<String>>) -> Self {
        Self { schemas }
    }

    /// Find the schema for a file: exact name match (case-insensitive)
    /// first, then a registered base name contained in the file name.
    fn lookup(&self, file_name: &str) -> Option<(&str, &[String])> {
        let lowered = file_name.to_lowercase();
        for (key, columns) in &self.schemas {
            if key.to_lowercase() == lowered {
                return Some((key.as_str(), columns.as_slice()));
            }
        }
        for (key, columns) in &self.schemas {
            let base = key.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(key);
            if !base.is_empty() && lowered.contains(&base.to_lowercase()) {
                return Some((key.as_str(), columns.as_slice()));
            }
        }
        None
    }

    /// Check the table's columns against the schema configured for the
    /// file name. Pure function of its inputs and the registry: no
    /// configured schema means the check trivially passes.
    pub fn validate(
        &self,
        table: &SheetTable,
        file_name: &str,
        mode: ValidationMode,
    ) -> SchemaResult {
        let current = table.columns.clone();
        let Some((name, expected)) = self.lookup(file_name) else {
            return SchemaResult {
                matched_schema: None,
                expected_columns: Vec::new(),
                current_columns: current,
                missing_columns: Vec::new(),
                extra_columns: Vec::new(),
                is_valid: true,
            };
        };

        let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();
        let expected_set: HashSet<&str> = expected.iter().map(String::as_str).collect();

        let missing_columns: Vec<String> = expected
            .iter()
            .filter(|c| !current_set.contains(c.as_str()))
            .cloned()
            .collect();
        let extra_columns: Vec<String> = current
            .iter()
            .filter(|c| !expected_set.contains(c.as_str()))
            .cloned()
            .collect();

        let is_valid = match mode {
            ValidationMode::Relaxed => missing_columns.is_empty(),
            ValidationMode::Strict => missing_columns.is_empty() && extra_columns.is_empty(),
        };

        SchemaResult {
            matched_schema: Some(name.to_string()),
            expected_columns: expected.to_vec(),
            current_columns: current,
            missing_columns,
            extra_columns,
            is_valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn registry() -> SchemaRegistry {
        let mut schemas = BTreeMap::new();
        schemas.insert(
            "vendas_mensal.xlsx".to_string(),
            vec![
                "Data".to_string(),
                "Produto".to_string(),
                "Quantidade".to_string(),
            ],
        );
        SchemaRegistry::new(schemas)
    }

    fn table(columns: &[&str]) -> SheetTable {
        SheetTable {
            name: "Plan1".to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::<Vec<Value>>::new(),
        }
    }

    #[test]
    fn extra_column_passes_relaxed_and_is_reported() {
        let t = table(&["Data", "Produto", "Quantidade", "NEW"]);
        let result = registry().validate(&t, "vendas_mensal.xlsx", ValidationMode::Relaxed);

        assert!(result.is_valid);
        assert_eq!(result.extra_columns, vec!["NEW"]);
        assert!(result.missing_columns.is_empty());
    }

    #[test]
    fn extra_column_fails_strict() {
        let t = table(&["Data", "Produto", "Quantidade", "NEW"]);
        let result = registry().validate(&t, "vendas_mensal.xlsx", ValidationMode::Strict);
        assert!(!result.is_valid);
    }

    #[test]
    fn missing_column_fails_both_modes() {
        let t = table(&["Data", "Produto"]);
        for mode in [ValidationMode::Relaxed, ValidationMode::Strict] {
            let result = registry().validate(&t, "vendas_mensal.xlsx", mode);
            assert!(!result.is_valid);
            assert_eq!(result.missing_columns, vec!["Quantidade"]);
        }
    }

    #[test]
    fn lookup_is_case_insensitive_then_by_base_name() {
        let t = table(&["Data", "Produto", "Quantidade"]);
        let reg = registry();

        let exact = reg.validate(&t, "VENDAS_MENSAL.XLSX", ValidationMode::Relaxed);
        assert_eq!(
            exact.matched_schema.as_deref(),
            Some("vendas_mensal.xlsx")
        );

        let by_base = reg.validate(&t, "vendas_mensal_2024_v2.xlsx", ValidationMode::Relaxed);
        assert_eq!(
            by_base.matched_schema.as_deref(),
            Some("vendas_mensal.xlsx")
        );
    }

    #[test]
    fn unconfigured_file_trivially_passes() {
        let t = table(&["whatever"]);
        let result = registry().validate(&t, "outro_relatorio.xlsx", ValidationMode::Strict);
        assert!(result.is_valid);
        assert!(result.matched_schema.is_none());
    }

    #[test]
    fn validation_is_deterministic() {
        let t = table(&["Data", "Produto", "Quantidade", "NEW"]);
        let reg = registry();
        let a = reg.validate(&t, "vendas_mensal.xlsx", ValidationMode::Relaxed);
        let b = reg.validate(&t, "vendas_mensal.xlsx", ValidationMode::Relaxed);
        assert_eq!(a, b);
    }
}
