//! Microsoft Graph drive API module
//!
//! Token acquisition via the OAuth client-credentials grant plus the
//! handful of drive calls the upload workflow needs: existence check,
//! rename, content upload, children listing and deletion.

pub mod auth;
pub mod client;
pub mod constants;
pub mod error;
pub mod models;

pub use auth::{AuthManager, TokenSource};
pub use client::{DriveStore, GraphDriveClient};
pub use error::ApiError;
pub use models::{CredentialSet, DriveItem, DriveScope, RemoteFile, TokenInfo, UploadOutcome};
