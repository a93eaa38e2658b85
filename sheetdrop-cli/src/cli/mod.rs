//! Command-line surface.

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sheetdrop-cli",
    about = "Validate spreadsheet reports and push them to a Microsoft Graph drive",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Credential and connectivity checks
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Parse a spreadsheet and print its quality and column report
    Inspect(InspectArgs),
    /// Validate a spreadsheet and upload it to the destination folder
    Upload(UploadArgs),
    /// Manage files already at the destination folder
    Files {
        #[command(subcommand)]
        command: FileCommands,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Acquire a token and probe the destination folder once
    Check,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Spreadsheet to inspect (.xlsx, .xls or .csv)
    pub file: PathBuf,

    /// Sheet to analyze when the workbook has several
    #[arg(long)]
    pub sheet: Option<String>,

    /// Fail the column check on extra columns too, not only missing ones
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct UploadArgs {
    /// Spreadsheet to upload (.xlsx, .xls or .csv)
    pub file: PathBuf,

    /// Sheet to validate when the workbook has several
    #[arg(long)]
    pub sheet: Option<String>,

    /// Name to store the file under, defaults to the local file name
    #[arg(long)]
    pub remote_name: Option<String>,

    /// Drop exact duplicate rows before uploading
    #[arg(long)]
    pub dedup: bool,

    /// Skip the rename-based backup of an existing remote file
    #[arg(long)]
    pub no_backup: bool,

    /// Fail the column check on extra columns too, not only missing ones
    #[arg(long)]
    pub strict: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum FileCommands {
    /// List spreadsheet files at the destination folder
    List,
    /// Delete a file at the destination folder by name
    Delete {
        /// Remote file name as shown by `files list`
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
