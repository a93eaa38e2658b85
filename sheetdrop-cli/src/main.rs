//! sheetdrop-cli entry point.

mod api;
mod cli;
mod config;
mod services;
mod sheet;

use anyhow::Result;
use clap::Parser;
use colored::*;

use api::AuthManager;
use cli::{AuthCommands, Cli, Commands, FileCommands};
use config::{Config, Settings};
use services::Session;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(err) = run().await {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Inspect stays offline and only needs the settings file.
        Commands::Inspect(args) => {
            let settings = Settings::load()?;
            cli::commands::inspect::handle_inspect(&settings, args)
        }
        command => {
            let config = Config::load()?;
            let mut session = Session::new(AuthManager::new(config.credentials.clone()));

            match command {
                Commands::Auth {
                    command: AuthCommands::Check,
                } => cli::commands::auth::handle_auth_check(&config, &mut session).await,
                Commands::Upload(args) => {
                    cli::commands::upload::handle_upload(&config, &mut session, args).await
                }
                Commands::Files { command } => match command {
                    FileCommands::List => {
                        cli::commands::files::handle_list(&config, &mut session).await
                    }
                    FileCommands::Delete { name, yes } => {
                        cli::commands::files::handle_delete(&config, &mut session, &name, yes)
                            .await
                    }
                },
                Commands::Inspect(_) => unreachable!("handled above"),
            }
        }
    }
}
