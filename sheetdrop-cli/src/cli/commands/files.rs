//! `files list` and `files delete`: the operator cleanup screen.

use anyhow::{bail, Result};
use colored::*;
use dialoguer::Confirm;

use super::format_size;
use crate::api::GraphDriveClient;
use crate::config::Config;
use crate::services::files::{delete_file, list_files};
use crate::services::Session;

pub async fn handle_list(config: &Config, session: &mut Session) -> Result<()> {
    let token = session.auth.get_token().await?;
    let client = GraphDriveClient::new(config.drive.clone());

    let files = list_files(
        &client,
        &token,
        &config.settings.folder_path,
        &config.settings.supported_extensions,
    )
    .await?;

    if files.is_empty() {
        println!(
            "No spreadsheet files in '{}'.",
            config.settings.folder_path
        );
        return Ok(());
    }

    println!(
        "{} file(s) in '{}':",
        files.len(),
        config.settings.folder_path
    );
    for file in &files {
        let modified = file.last_modified.as_deref().unwrap_or("-");
        println!(
            "  {:<40} {:>10}  {}",
            file.name,
            format_size(file.size),
            modified.dimmed()
        );
    }

    Ok(())
}

pub async fn handle_delete(
    config: &Config,
    session: &mut Session,
    name: &str,
    yes: bool,
) -> Result<()> {
    let token = session.auth.get_token().await?;
    let client = GraphDriveClient::new(config.drive.clone());

    let files = list_files(
        &client,
        &token,
        &config.settings.folder_path,
        &config.settings.supported_extensions,
    )
    .await?;

    let Some(target) = files.iter().find(|f| f.name.eq_ignore_ascii_case(name)) else {
        bail!(
            "no file named '{}' in '{}'",
            name,
            config.settings.folder_path
        );
    };

    if !yes {
        let proceed = Confirm::new()
            .with_prompt(format!(
                "Delete {} ({}) from '{}'?",
                target.name,
                format_size(target.size),
                config.settings.folder_path
            ))
            .default(false)
            .interact()?;
        if !proceed {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    if delete_file(&client, &token, &target.id).await? {
        println!("{} {}", "Deleted:".green().bold(), target.name);
        Ok(())
    } else {
        bail!("the drive refused to delete {}", target.name);
    }
}
