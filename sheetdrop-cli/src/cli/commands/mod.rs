//! Command handlers.

pub mod auth;
pub mod files;
pub mod inspect;
pub mod upload;

use colored::*;

use crate::sheet::{QualityReport, SchemaResult, ValidationMode};

pub(crate) fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

pub(crate) fn print_quality(report: &QualityReport) {
    println!(
        "{} rows x {} columns (~{} in memory)",
        report.total_rows,
        report.total_columns,
        format_size(report.memory_bytes as u64)
    );

    if report.duplicate_rows > 0 {
        println!(
            "Duplicate rows: {}",
            report.duplicate_rows.to_string().yellow()
        );
    } else {
        println!("Duplicate rows: 0");
    }

    if report.null_columns.is_empty() {
        println!("Columns with empty cells: (none)");
    } else {
        println!(
            "Columns with empty cells: {}",
            report.null_columns.join(", ").yellow()
        );
    }

    if !report.invalid_columns.is_empty() {
        println!(
            "Badly named columns: {}",
            report.invalid_columns.join(", ").red()
        );
    }
}

pub(crate) fn print_schema(result: &SchemaResult, mode: ValidationMode) {
    let Some(schema) = &result.matched_schema else {
        println!("No column check configured for this file.");
        return;
    };

    let mode_name = match mode {
        ValidationMode::Relaxed => "relaxed",
        ValidationMode::Strict => "strict",
    };
    println!("Column check against '{}' ({}):", schema, mode_name);

    if !result.missing_columns.is_empty() {
        println!(
            "  missing: {}",
            result.missing_columns.join(", ").red().bold()
        );
    }
    if !result.extra_columns.is_empty() {
        println!("  new: {}", result.extra_columns.join(", ").yellow());
    }
    if result.is_valid {
        println!("  {}", "OK".green().bold());
    } else {
        println!("  {}", "FAILED".red().bold());
    }
}
