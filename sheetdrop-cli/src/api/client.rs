//! Drive operations over the Graph REST API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::constants::{DEFAULT_TIMEOUT, EXISTENCE_CHECK_TIMEOUT, UPLOAD_TIMEOUT};
use super::error::ApiError;
use super::models::{DriveItem, DriveScope, RemoteFile, UploadOutcome};

/// The five drive operations the workflows need.
///
/// A trait so the upload and file-management services can run against an
/// in-memory drive in tests.
#[async_trait]
pub trait DriveStore: Send + Sync {
    /// Existence check: `Some` with the item on 200, `None` on 404.
    async fn get_item(
        &self,
        token: &str,
        folder: &str,
        name: &str,
    ) -> Result<Option<DriveItem>, ApiError>;

    /// Rename an item in place.
    async fn rename_item(
        &self,
        token: &str,
        item_id: &str,
        new_name: &str,
    ) -> Result<(), ApiError>;

    /// Store raw bytes at `folder/name`. The outcome carries the status
    /// and body verbatim; only transport failures surface as errors.
    async fn upload(
        &self,
        token: &str,
        folder: &str,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadOutcome, ApiError>;

    /// List the folder's children. Single page: the destination folder is
    /// assumed to fit in one API page.
    async fn list_children(&self, token: &str, folder: &str) -> Result<Vec<RemoteFile>, ApiError>;

    /// Delete an item. Returns the raw status code; the caller decides
    /// what counts as success.
    async fn delete_item(&self, token: &str, item_id: &str) -> Result<u16, ApiError>;
}

/// Percent-encode each segment of a slash-separated drive path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of an item under the drive root, e.g. `reports/vendas.xlsx`.
fn item_path(folder: &str, name: &str) -> String {
    let encoded_name = urlencoding::encode(name).into_owned();
    let encoded_folder = encode_path(folder);
    if encoded_folder.is_empty() {
        encoded_name
    } else {
        format!("{}/{}", encoded_folder, encoded_name)
    }
}

#[derive(Deserialize)]
struct ListChildrenResponse {
    value: Vec<RemoteFile>,
}

/// Live [`DriveStore`] over reqwest.
pub struct GraphDriveClient {
    http: reqwest::Client,
    scope: DriveScope,
}

impl GraphDriveClient {
    pub fn new(scope: DriveScope) -> Self {
        Self {
            http: reqwest::Client::new(),
            scope,
        }
    }
}

#[async_trait]
impl DriveStore for GraphDriveClient {
    async fn get_item(
        &self,
        token: &str,
        folder: &str,
        name: &str,
    ) -> Result<Option<DriveItem>, ApiError> {
        let url = format!("{}/root:/{}", self.scope.base_url(), item_path(folder, name));
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .timeout(EXISTENCE_CHECK_TIMEOUT)
            .send()
            .await
            .map_err(|e| ApiError::from_transport("existence check", e))?;

        let status = response.status();
        if status.is_success() {
            let item = response
                .json::<DriveItem>()
                .await
                .map_err(|e| ApiError::Network(format!("malformed item response: {}", e)))?;
            Ok(Some(item))
        } else if status.as_u16() == 404 {
            Ok(None)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn rename_item(
        &self,
        token: &str,
        item_id: &str,
        new_name: &str,
    ) -> Result<(), ApiError> {
        let url = format!("{}/items/{}", self.scope.base_url(), item_id);
        log::debug!("PATCH {}", url);

        let response = self
            .http
            .patch(&url)
            .bearer_auth(token)
            .timeout(DEFAULT_TIMEOUT)
            .json(&json!({ "name": new_name }))
            .send()
            .await
            .map_err(|e| ApiError::from_transport("rename", e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn upload(
        &self,
        token: &str,
        folder: &str,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadOutcome, ApiError> {
        let url = format!(
            "{}/root:/{}:/content",
            self.scope.base_url(),
            item_path(folder, name)
        );
        log::debug!("PUT {} ({} bytes)", url, bytes.len());

        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .timeout(UPLOAD_TIMEOUT)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| ApiError::from_transport("upload", e))?;

        let status_code = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(UploadOutcome {
            success: status_code == 200 || status_code == 201,
            status_code,
            body,
        })
    }

    async fn list_children(&self, token: &str, folder: &str) -> Result<Vec<RemoteFile>, ApiError> {
        let encoded_folder = encode_path(folder);
        let url = if encoded_folder.is_empty() {
            format!("{}/root/children", self.scope.base_url())
        } else {
            format!("{}/root:/{}:/children", self.scope.base_url(), encoded_folder)
        };
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await
            .map_err(|e| ApiError::from_transport("listing", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let listing = response
            .json::<ListChildrenResponse>()
            .await
            .map_err(|e| ApiError::Network(format!("malformed listing response: {}", e)))?;
        Ok(listing.value)
    }

    async fn delete_item(&self, token: &str, item_id: &str) -> Result<u16, ApiError> {
        let url = format!("{}/items/{}", self.scope.base_url(), item_id);
        log::debug!("DELETE {}", url);

        let response = self
            .http
            .delete(&url)
            .bearer_auth(token)
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await
            .map_err(|e| ApiError::from_transport("delete", e))?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_paths_are_percent_encoded_per_segment() {
        assert_eq!(
            item_path("reports/2024", "vendas mensal.xlsx"),
            "reports/2024/vendas%20mensal.xlsx"
        );
        assert_eq!(item_path("", "a.csv"), "a.csv");
        assert_eq!(item_path("/reports/", "a.csv"), "reports/a.csv");
    }

    #[test]
    fn scope_base_urls() {
        assert_eq!(
            DriveScope::Drive("d1".to_string()).base_url(),
            "https://graph.microsoft.com/v1.0/drives/d1"
        );
        assert_eq!(
            DriveScope::Site("s1".to_string()).base_url(),
            "https://graph.microsoft.com/v1.0/sites/s1/drive"
        );
        assert_eq!(
            DriveScope::User("u@example.com".to_string()).base_url(),
            "https://graph.microsoft.com/v1.0/users/u@example.com/drive"
        );
    }
}
