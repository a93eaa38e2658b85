//! Startup configuration: environment secrets plus TOML settings.
//!
//! Everything is resolved eagerly, before any network call, and every
//! missing required value is reported in one message.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::api::models::{CredentialSet, DriveScope};

/// Fully resolved configuration for one process run.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: CredentialSet,
    pub drive: DriveScope,
    pub settings: Settings,
}

impl Config {
    pub fn load() -> Result<Config> {
        let (credentials, drive) = load_credentials(|name| std::env::var(name).ok())?;
        let settings = Settings::load()?;
        Ok(Config {
            credentials,
            drive,
            settings,
        })
    }
}

/// Read the secret values from the environment. The drive target falls
/// back from an explicit drive id to a site, then to a user mailbox.
fn load_credentials<F>(get: F) -> Result<(CredentialSet, DriveScope)>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing: Vec<&str> = Vec::new();

    let client_id = required(&get, "GRAPH_CLIENT_ID", &mut missing);
    let client_secret = required(&get, "GRAPH_CLIENT_SECRET", &mut missing);
    let tenant_id = required(&get, "GRAPH_TENANT_ID", &mut missing);

    let drive = if let Some(id) = present(&get, "GRAPH_DRIVE_ID") {
        Some(DriveScope::Drive(id))
    } else if let Some(id) = present(&get, "GRAPH_SITE_ID") {
        Some(DriveScope::Site(id))
    } else if let Some(id) = present(&get, "GRAPH_USER_ID") {
        Some(DriveScope::User(id))
    } else {
        missing.push("GRAPH_DRIVE_ID (or GRAPH_SITE_ID / GRAPH_USER_ID)");
        None
    };

    if !missing.is_empty() {
        bail!("missing required configuration: {}", missing.join(", "));
    }

    let drive = drive.context("no drive target configured")?;
    Ok((
        CredentialSet {
            client_id,
            client_secret,
            tenant_id,
        },
        drive,
    ))
}

fn present<F: Fn(&str) -> Option<String>>(get: &F, name: &str) -> Option<String> {
    get(name).filter(|value| !value.trim().is_empty())
}

fn required<'a, F: Fn(&str) -> Option<String>>(
    get: &F,
    name: &'a str,
    missing: &mut Vec<&'a str>,
) -> String {
    match present(get, name) {
        Some(value) => value,
        None => {
            missing.push(name);
            String::new()
        }
    }
}

/// Non-secret settings, all defaulted so the tool runs without a file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub folder_path: String,
    pub max_file_size_mb: u64,
    pub supported_extensions: Vec<String>,
    /// Keep a local copy of every uploaded payload under `uploads_dir`.
    pub keep_local_copies: bool,
    pub uploads_dir: Option<PathBuf>,
    /// Expected column lists keyed by report file name.
    pub schemas: BTreeMap<String, Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            folder_path: "reports".to_string(),
            max_file_size_mb: 25,
            supported_extensions: vec![
                "xlsx".to_string(),
                "xls".to_string(),
                "csv".to_string(),
            ],
            keep_local_copies: false,
            uploads_dir: None,
            schemas: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load the settings file, falling back to defaults when absent.
    /// Built-in schemas stay available underneath user-configured ones.
    pub fn load() -> Result<Settings> {
        let path = settings_path();
        let mut settings = match &path {
            Some(p) if p.exists() => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("failed to read {}", p.display()))?;
                let parsed: Settings = toml::from_str(&text)
                    .with_context(|| format!("invalid settings file {}", p.display()))?;
                log::debug!("loaded settings from {}", p.display());
                parsed
            }
            _ => Settings::default(),
        };

        let mut schemas = builtin_schemas();
        schemas.extend(std::mem::take(&mut settings.schemas));
        settings.schemas = schemas;
        Ok(settings)
    }

    /// Directory for local copies of uploaded payloads.
    pub fn resolved_uploads_dir(&self) -> Option<PathBuf> {
        self.uploads_dir.clone().or_else(|| {
            dirs::data_local_dir().map(|d| d.join("sheetdrop").join("uploads"))
        })
    }
}

/// `SHEETDROP_CONFIG` wins over the platform config dir.
fn settings_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SHEETDROP_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("sheetdrop").join("config.toml"))
}

/// Expected columns for the one report validated since the first
/// revision of this tool.
fn builtin_schemas() -> BTreeMap<String, Vec<String>> {
    let mut schemas = BTreeMap::new();
    schemas.insert(
        "vendas_mensal.xlsx".to_string(),
        [
            "Data",
            "Produto",
            "Quantidade",
            "Valor Unitario",
            "Valor Total",
            "Regiao",
            "Vendedor",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    );
    schemas
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn all_missing_secrets_are_reported_at_once() {
        let vars = env(&[]);
        let err = load_credentials(|name| vars.get(name).cloned()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("GRAPH_CLIENT_ID"));
        assert!(message.contains("GRAPH_CLIENT_SECRET"));
        assert!(message.contains("GRAPH_TENANT_ID"));
        assert!(message.contains("GRAPH_DRIVE_ID"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let vars = env(&[
            ("GRAPH_CLIENT_ID", "app"),
            ("GRAPH_CLIENT_SECRET", "  "),
            ("GRAPH_TENANT_ID", "tenant"),
            ("GRAPH_DRIVE_ID", "d1"),
        ]);
        let err = load_credentials(|name| vars.get(name).cloned()).unwrap_err();
        assert!(err.to_string().contains("GRAPH_CLIENT_SECRET"));
    }

    #[test]
    fn drive_target_falls_back_to_site_then_user() {
        let base = [
            ("GRAPH_CLIENT_ID", "app"),
            ("GRAPH_CLIENT_SECRET", "secret"),
            ("GRAPH_TENANT_ID", "tenant"),
        ];

        let mut with_site = base.to_vec();
        with_site.push(("GRAPH_SITE_ID", "s1"));
        let vars = env(&with_site);
        let (_, drive) = load_credentials(|name| vars.get(name).cloned()).unwrap();
        assert!(matches!(drive, DriveScope::Site(id) if id == "s1"));

        let mut with_user = base.to_vec();
        with_user.push(("GRAPH_USER_ID", "u@example.com"));
        let vars = env(&with_user);
        let (_, drive) = load_credentials(|name| vars.get(name).cloned()).unwrap();
        assert!(matches!(drive, DriveScope::User(id) if id == "u@example.com"));
    }

    #[test]
    fn settings_parse_with_custom_schema() {
        let text = r#"
            folder_path = "relatorios"
            max_file_size_mb = 10

            [schemas]
            "estoque.xlsx" = ["Produto", "Quantidade"]
        "#;
        let settings: Settings = toml::from_str(text).unwrap();
        assert_eq!(settings.folder_path, "relatorios");
        assert_eq!(settings.max_file_size_mb, 10);
        assert_eq!(
            settings.schemas.get("estoque.xlsx").unwrap(),
            &vec!["Produto".to_string(), "Quantidade".to_string()]
        );
        // untouched fields keep their defaults
        assert_eq!(settings.supported_extensions, vec!["xlsx", "xls", "csv"]);
    }

    #[test]
    fn builtin_schema_covers_the_known_report() {
        let schemas = builtin_schemas();
        let columns = schemas.get("vendas_mensal.xlsx").unwrap();
        assert!(columns.contains(&"Produto".to_string()));
        assert_eq!(columns.len(), 7);
    }
}
