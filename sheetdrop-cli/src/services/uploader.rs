//! Backup-then-upload workflow against the drive.

use anyhow::{bail, Result};
use chrono::Local;

use crate::api::client::DriveStore;
use crate::api::error::ApiError;
use crate::api::models::UploadOutcome;

/// Size gate, checked before anything touches the network. An oversized
/// file never reaches the upload step.
pub fn ensure_size_within_limit(name: &str, size_bytes: u64, max_mb: u64) -> Result<()> {
    let limit = max_mb * 1024 * 1024;
    if size_bytes > limit {
        bail!(
            "{} is {:.1} MB, above the configured limit of {} MB",
            name,
            size_bytes as f64 / (1024.0 * 1024.0),
            max_mb
        );
    }
    Ok(())
}

/// Insert a timestamp between file stem and extension:
/// `report.xlsx` becomes `report_20240131_094512.xlsx`.
pub fn timestamped_name(name: &str, timestamp: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, timestamp, ext),
        None => format!("{}_{}", name, timestamp),
    }
}

/// Upload `bytes` as `name` under `folder`, renaming any file already at
/// that path out of the way first.
///
/// The rename is best-effort: a failed backup is logged as a warning and
/// the upload still runs, so a flaky existence check never loses the new
/// file. Only one timestamped copy is made per upload; two backups within
/// the same second would collide on the backup name.
pub async fn upload_with_backup(
    store: &dyn DriveStore,
    token: &str,
    folder: &str,
    name: &str,
    bytes: Vec<u8>,
    do_backup: bool,
) -> Result<UploadOutcome, ApiError> {
    if do_backup {
        backup_existing(store, token, folder, name).await;
    }
    store.upload(token, folder, name, bytes).await
}

/// Rename a pre-existing `name` to a timestamped copy. Never fails the
/// caller.
async fn backup_existing(store: &dyn DriveStore, token: &str, folder: &str, name: &str) {
    match store.get_item(token, folder, name).await {
        Ok(Some(item)) => {
            let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
            let backup_name = timestamped_name(name, &stamp);
            match store.rename_item(token, &item.id, &backup_name).await {
                Ok(()) => log::info!("backed up existing {} as {}", name, backup_name),
                Err(err) => log::warn!("could not rename existing {}: {}", name, err),
            }
        }
        Ok(None) => log::debug!("no existing {} at the destination, no backup needed", name),
        Err(err) => log::warn!("existence check for {} failed: {}", name, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{DriveCall, MockDrive};

    #[test]
    fn oversized_files_are_rejected_before_any_network_call() {
        let limit_mb = 25;
        assert!(ensure_size_within_limit("ok.xlsx", 25 * 1024 * 1024, limit_mb).is_ok());

        let err =
            ensure_size_within_limit("big.xlsx", 26 * 1024 * 1024, limit_mb).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("big.xlsx"));
        assert!(message.contains("limit of 25 MB"));
    }

    #[test]
    fn timestamp_lands_before_the_extension() {
        assert_eq!(
            timestamped_name("report.xlsx", "20240131_094512"),
            "report_20240131_094512.xlsx"
        );
        assert_eq!(
            timestamped_name("dados.v2.csv", "20240131_094512"),
            "dados.v2_20240131_094512.csv"
        );
        assert_eq!(timestamped_name("README", "20240131_094512"), "README_20240131_094512");
    }

    #[tokio::test]
    async fn existing_file_is_renamed_once_then_overwritten() {
        let drive = MockDrive::default();
        drive.seed("report.xlsx", b"old".to_vec());

        let outcome = upload_with_backup(&drive, "t", "reports", "report.xlsx", b"new".to_vec(), true)
            .await
            .unwrap();

        assert!(outcome.success);
        let calls = drive.calls();
        assert!(matches!(calls[0], DriveCall::Get(ref n) if n == "report.xlsx"));
        assert!(matches!(calls[1], DriveCall::Rename { .. }));
        assert!(matches!(calls[2], DriveCall::Put(ref n) if n == "report.xlsx"));
        assert_eq!(calls.len(), 3);

        // the old content survives under the timestamped name
        let files = drive.files();
        assert_eq!(files.len(), 2);
        assert_eq!(files.get("report.xlsx"), Some(&b"new".to_vec()));
        let backup_name = files.keys().find(|k| *k != "report.xlsx").unwrap();
        assert!(backup_name.starts_with("report_"));
        assert!(backup_name.ends_with(".xlsx"));
        assert_eq!(files.get(backup_name), Some(&b"old".to_vec()));
    }

    #[tokio::test]
    async fn absent_file_skips_the_rename() {
        let drive = MockDrive::default();

        upload_with_backup(&drive, "t", "reports", "report.xlsx", b"new".to_vec(), true)
            .await
            .unwrap();

        let calls = drive.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], DriveCall::Get(_)));
        assert!(matches!(calls[1], DriveCall::Put(_)));
        assert_eq!(drive.files().len(), 1);
    }

    #[tokio::test]
    async fn backup_disabled_goes_straight_to_put() {
        let drive = MockDrive::default();
        drive.seed("report.xlsx", b"old".to_vec());

        upload_with_backup(&drive, "t", "reports", "report.xlsx", b"new".to_vec(), false)
            .await
            .unwrap();

        let calls = drive.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], DriveCall::Put(_)));
        assert_eq!(drive.files().len(), 1);
    }

    #[tokio::test]
    async fn failed_existence_check_does_not_block_the_upload() {
        let mut drive = MockDrive::default();
        drive.fail_existence_check = true;
        drive.seed("report.xlsx", b"old".to_vec());

        let outcome = upload_with_backup(&drive, "t", "reports", "report.xlsx", b"new".to_vec(), true)
            .await
            .unwrap();

        assert!(outcome.success);
        let calls = drive.calls();
        assert!(matches!(calls.last(), Some(DriveCall::Put(_))));
        // no rename was attempted
        assert!(!calls.iter().any(|c| matches!(c, DriveCall::Rename { .. })));
    }
}
