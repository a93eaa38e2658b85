//! Shared types for the Graph drive API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::constants::GRAPH_BASE_URL;

/// Application credentials for the client-credentials grant.
#[derive(Debug, Clone)]
pub struct CredentialSet {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
}

/// A bearer token together with its local expiry instant.
///
/// Superseded, never mutated: renewal replaces the whole value.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenInfo {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Addressing scheme for the target drive.
#[derive(Debug, Clone)]
pub enum DriveScope {
    /// A drive addressed directly by id.
    Drive(String),
    /// The default drive of a SharePoint site.
    Site(String),
    /// The default drive of a user mailbox.
    User(String),
}

impl DriveScope {
    /// Base URL for all item paths under this drive.
    pub fn base_url(&self) -> String {
        match self {
            DriveScope::Drive(id) => format!("{}/drives/{}", GRAPH_BASE_URL, id),
            DriveScope::Site(id) => format!("{}/sites/{}/drive", GRAPH_BASE_URL, id),
            DriveScope::User(id) => format!("{}/users/{}/drive", GRAPH_BASE_URL, id),
        }
    }
}

/// A file at the destination folder, as reported by the drive API.
///
/// Never owned locally: this tool only reads these and issues rename or
/// delete commands against their ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "lastModifiedDateTime", default)]
    pub last_modified: Option<String>,
    #[serde(rename = "@microsoft.graph.downloadUrl", default)]
    pub download_url: Option<String>,
}

/// Existence-check result for a single drive item.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveItem {
    pub id: String,
    pub name: String,
}

/// Raw outcome of a content upload, carried verbatim to the caller.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub success: bool,
    pub status_code: u16,
    pub body: String,
}
