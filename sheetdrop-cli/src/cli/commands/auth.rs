//! `auth check`: token acquisition and drive connectivity probe.

use anyhow::Result;
use colored::*;

use crate::api::client::DriveStore;
use crate::api::GraphDriveClient;
use crate::config::Config;
use crate::services::Session;

pub async fn handle_auth_check(config: &Config, session: &mut Session) -> Result<()> {
    println!(
        "Requesting access token for tenant {}...",
        config.credentials.tenant_id
    );
    let token = session.auth.get_token().await?;
    println!("{}", "Token acquired.".green());

    let client = GraphDriveClient::new(config.drive.clone());
    match client
        .list_children(&token, &config.settings.folder_path)
        .await
    {
        Ok(children) => {
            println!(
                "Drive reachable, '{}' holds {} item(s).",
                config.settings.folder_path,
                children.len()
            );
        }
        Err(err) => {
            println!("{} {}", "Drive probe failed:".red().bold(), err);
        }
    }

    Ok(())
}
