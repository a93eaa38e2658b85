//! In-memory drive for exercising the workflows without a network.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::client::DriveStore;
use crate::api::error::ApiError;
use crate::api::models::{DriveItem, RemoteFile, UploadOutcome};

/// Operations the mock saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveCall {
    Get(String),
    Rename { id: String, new_name: String },
    Put(String),
    List,
    Delete(String),
}

/// Fake drive backed by a name -> bytes map. Item ids are derived from
/// the name so tests can address files without a listing round-trip.
pub struct MockDrive {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    calls: Mutex<Vec<DriveCall>>,
    pub fail_existence_check: bool,
    pub delete_status: u16,
}

impl Default for MockDrive {
    fn default() -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_existence_check: false,
            delete_status: 204,
        }
    }
}

impl MockDrive {
    pub fn seed(&self, name: &str, bytes: Vec<u8>) {
        self.files.lock().unwrap().insert(name.to_string(), bytes);
    }

    pub fn files(&self) -> BTreeMap<String, Vec<u8>> {
        self.files.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<DriveCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn item_id(&self, name: &str) -> String {
        format!("item-{}", name)
    }

    fn name_for_id(&self, item_id: &str) -> Option<String> {
        item_id.strip_prefix("item-").map(str::to_string)
    }

    fn record(&self, call: DriveCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DriveStore for MockDrive {
    async fn get_item(
        &self,
        _token: &str,
        _folder: &str,
        name: &str,
    ) -> Result<Option<DriveItem>, ApiError> {
        self.record(DriveCall::Get(name.to_string()));
        if self.fail_existence_check {
            return Err(ApiError::Timeout("existence check".to_string()));
        }
        Ok(self.files.lock().unwrap().get(name).map(|_| DriveItem {
            id: self.item_id(name),
            name: name.to_string(),
        }))
    }

    async fn rename_item(
        &self,
        _token: &str,
        item_id: &str,
        new_name: &str,
    ) -> Result<(), ApiError> {
        self.record(DriveCall::Rename {
            id: item_id.to_string(),
            new_name: new_name.to_string(),
        });
        let name = self.name_for_id(item_id).ok_or(ApiError::UnexpectedStatus {
            status: 404,
            body: "unknown item".to_string(),
        })?;
        let mut files = self.files.lock().unwrap();
        match files.remove(&name) {
            Some(bytes) => {
                files.insert(new_name.to_string(), bytes);
                Ok(())
            }
            None => Err(ApiError::UnexpectedStatus {
                status: 404,
                body: "unknown item".to_string(),
            }),
        }
    }

    async fn upload(
        &self,
        _token: &str,
        _folder: &str,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadOutcome, ApiError> {
        self.record(DriveCall::Put(name.to_string()));
        let created = self
            .files
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes)
            .is_none();
        Ok(UploadOutcome {
            success: true,
            status_code: if created { 201 } else { 200 },
            body: String::new(),
        })
    }

    async fn list_children(
        &self,
        _token: &str,
        _folder: &str,
    ) -> Result<Vec<RemoteFile>, ApiError> {
        self.record(DriveCall::List);
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .map(|(name, bytes)| RemoteFile {
                id: self.item_id(name),
                name: name.clone(),
                size: bytes.len() as u64,
                last_modified: None,
                download_url: None,
            })
            .collect())
    }

    async fn delete_item(&self, _token: &str, item_id: &str) -> Result<u16, ApiError> {
        self.record(DriveCall::Delete(item_id.to_string()));
        if self.delete_status == 204 {
            if let Some(name) = self.name_for_id(item_id) {
                self.files.lock().unwrap().remove(&name);
            }
        }
        Ok(self.delete_status)
    }
}
