//! `upload`: the full validate / dedup / backup / PUT workflow.

use std::fs;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use colored::*;
use dialoguer::Confirm;

use super::inspect::local_file_name;
use super::{format_size, print_quality, print_schema};
use crate::api::GraphDriveClient;
use crate::cli::UploadArgs;
use crate::config::{Config, Settings};
use crate::services::uploader::{ensure_size_within_limit, upload_with_backup};
use crate::services::{Session, UploadRecord};
use crate::sheet::{analyze, read_bytes, reader, writer, SchemaRegistry, ValidationMode};

pub async fn handle_upload(config: &Config, session: &mut Session, args: UploadArgs) -> Result<()> {
    let settings = &config.settings;
    let file_name = local_file_name(&args.file)?;

    // Every gate below runs before the first network call.
    let extension = reader::extension(&file_name).unwrap_or_default();
    if !settings
        .supported_extensions
        .iter()
        .any(|e| e.eq_ignore_ascii_case(&extension))
    {
        bail!(
            "unsupported file type '{}', accepted: {}",
            extension,
            settings.supported_extensions.join(", ")
        );
    }

    let metadata = fs::metadata(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    ensure_size_within_limit(&file_name, metadata.len(), settings.max_file_size_mb)?;

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
    let schema = registry.validate(table, &file_name, mode);
    print_schema(&schema, mode);
    if !schema.is_valid {
        bail!("column check failed for {}; fix the file and try again", file_name);
    }

    let mut remote_name = args.remote_name.clone().unwrap_or_else(|| file_name.clone());
    let mut upload_bytes = bytes;
    let mut rows = table.row_count();
    let mut removed_duplicates = 0;

    if args.dedup {
        let (deduped, removed) = table.deduplicated();
        removed_duplicates = removed;
        if removed > 0 {
            println!("Removed {} duplicate row(s).", removed);
            if workbook.sheets.len() > 1 {
                println!(
                    "{}",
                    "Note: the deduplicated upload carries only the selected sheet.".yellow()
                );
            }
            rows = deduped.row_count();
            upload_bytes = match reader::extension(&remote_name).as_deref() {
                Some("csv") => writer::to_csv_bytes(&deduped)?,
                Some("xlsx") => writer::to_xlsx_bytes(&deduped)?,
                _ => {
                    // Rewritten .xls content comes out as .xlsx
                    let stem = remote_name
                        .rsplit_once('.')
                        .map(|(stem, _)| stem.to_string())
                        .unwrap_or_else(|| remote_name.clone());
                    remote_name = format!("{}.xlsx", stem);
                    log::warn!("deduplicated legacy workbook will be stored as {}", remote_name);
                    writer::to_xlsx_bytes(&deduped)?
                }
            };
        } else {
            println!("No duplicate rows found.");
        }
    }

    if !args.yes {
        let proceed = Confirm::new()
            .with_prompt(format!(
                "Upload {} ({} rows, {}) to '{}'?",
                remote_name,
                rows,
                format_size(upload_bytes.len() as u64),
                settings.folder_path
            ))
            .default(false)
            .interact()?;
        if !proceed {
            println!("Upload cancelled.");
            return Ok(());
        }
    }

    let token = session.auth.get_token().await?;
    let client = GraphDriveClient::new(config.drive.clone());
    let outcome = upload_with_backup(
        &client,
        &token,
        &settings.folder_path,
        &remote_name,
        upload_bytes.clone(),
        !args.no_backup,
    )
    .await?;

    if !outcome.success {
        println!("{} HTTP {}", "Upload failed:".red().bold(), outcome.status_code);
        if !outcome.body.is_empty() {
            println!("{}", outcome.body);
        }
        bail!("the drive rejected the upload with HTTP {}", outcome.status_code);
    }

    println!(
        "{} {} stored in '{}' (HTTP {})",
        "Uploaded:".green().bold(),
        remote_name,
        settings.folder_path,
        outcome.status_code
    );

    session.record_upload(UploadRecord {
        file_name,
        remote_name: remote_name.clone(),
        rows,
        removed_duplicates,
        status_code: outcome.status_code,
        uploaded_at: Utc::now(),
    });
    print_history(session);

    if settings.keep_local_copies {
        if let Err(err) = save_local_copy(settings, &remote_name, &upload_bytes) {
            log::warn!("could not keep a local copy: {:#}", err);
        }
    }

    Ok(())
}

fn print_history(session: &Session) {
    println!();
    println!("{}", "Uploads this session:".bold());
    for record in &session.history {
        let dedup_note = if record.removed_duplicates > 0 {
            format!(", {} duplicates dropped", record.removed_duplicates)
        } else {
            String::new()
        };
        println!(
            "  {} -> {} ({} rows{}, HTTP {}, {})",
            record.file_name,
            record.remote_name,
            record.rows,
            dedup_note,
            record.status_code,
            record.uploaded_at.format("%H:%M:%S")
        );
    }
}

/// Side log of the exact bytes that went out, nothing authoritative.
fn save_local_copy(settings: &Settings, name: &str, bytes: &[u8]) -> Result<()> {
    let dir = settings
        .resolved_uploads_dir()
        .context("no uploads directory available")?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("kept a local copy at {}", path.display());
    Ok(())
}
