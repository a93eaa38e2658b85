//! Session-scoped mutable state.
//!
//! The token cache and the upload history live here, created at process
//! start and dropped at exit. Operations borrow the session instead of
//! reaching for globals.

use chrono::{DateTime, Utc};

use crate::api::auth::AuthManager;

pub struct Session {
    pub auth: AuthManager,
    pub history: Vec<UploadRecord>,
}

/// One completed upload within this session.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub file_name: String,
    pub remote_name: String,
    pub rows: usize,
    pub removed_duplicates: usize,
    pub status_code: u16,
    pub uploaded_at: DateTime<Utc>,
}

impl Session {
    pub fn new(auth: AuthManager) -> Self {
        Self {
            auth,
            history: Vec::new(),
        }
    }

    pub fn record_upload(&mut self, record: UploadRecord) {
        self.history.push(record);
    }
}
