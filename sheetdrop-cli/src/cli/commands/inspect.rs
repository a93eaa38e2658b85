//! `inspect`: offline quality and column report for a local file.

use std::fs;

use anyhow::{bail, Context, Result};
use colored::*;

use super::{print_quality, print_schema};
use crate::cli::InspectArgs;
use crate::config::Settings;
use crate::sheet::{analyze, read_bytes, SchemaRegistry, ValidationMode};

pub fn handle_inspect(settings: &Settings, args: InspectArgs) -> Result<()> {
    let file_name = local_file_name(&args.file)?;

    let bytes = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let workbook = read_bytes(&file_name, &bytes)?;

    if workbook.sheets.len() > 1 {
        println!("Sheets: {}", workbook.sheet_names().join(", "));
    }
    let table = workbook.pick(args.sheet.as_deref())?;
    println!("{} {}", "Sheet:".bold(), table.name);

    print_quality(&analyze(table));

    let mode = if args.strict {
        ValidationMode::Strict
    } else {
        ValidationMode::Relaxed
    };
    let registry = SchemaRegistry::new(settings.schemas.clone());
    print_schema(&registry.validate(table, &file_name, mode), mode);

    Ok(())
}

pub(crate) fn local_file_name(path: &std::path::Path) -> Result<String> {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => Ok(name.to_string()),
        None => bail!("invalid file name: {}", path.display()),
    }
}
