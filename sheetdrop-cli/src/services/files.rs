//! Remote file listing and deletion for the cleanup screen.

use crate::api::client::DriveStore;
use crate::api::error::ApiError;
use crate::api::models::RemoteFile;

/// List destination-folder files, keeping only supported spreadsheets.
pub async fn list_files(
    store: &dyn DriveStore,
    token: &str,
    folder: &str,
    extensions: &[String],
) -> Result<Vec<RemoteFile>, ApiError> {
    let children = store.list_children(token, folder).await?;
    Ok(children
        .into_iter()
        .filter(|f| has_supported_extension(&f.name, extensions))
        .collect())
}

pub fn has_supported_extension(name: &str, extensions: &[String]) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Delete by item id. True only on HTTP 204; any other status leaves the
/// remote state alone as far as this tool is concerned.
pub async fn delete_file(
    store: &dyn DriveStore,
    token: &str,
    item_id: &str,
) -> Result<bool, ApiError> {
    let status = store.delete_item(token, item_id).await?;
    if status != 204 {
        log::warn!("delete of {} returned status {}", item_id, status);
    }
    Ok(status == 204)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::MockDrive;

    fn extensions() -> Vec<String> {
        vec!["xlsx".to_string(), "xls".to_string(), "csv".to_string()]
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        let exts = extensions();
        assert!(has_supported_extension("a.XLSX", &exts));
        assert!(has_supported_extension("b.csv", &exts));
        assert!(!has_supported_extension("c.pdf", &exts));
        assert!(!has_supported_extension("no_extension", &exts));
    }

    #[tokio::test]
    async fn listing_drops_unsupported_files() {
        let drive = MockDrive::default();
        drive.seed("vendas.xlsx", b"x".to_vec());
        drive.seed("notas.txt", b"y".to_vec());
        drive.seed("dados.csv", b"z".to_vec());

        let files = list_files(&drive, "t", "reports", &extensions()).await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["dados.csv", "vendas.xlsx"]);
    }

    #[tokio::test]
    async fn delete_succeeds_only_on_204() {
        let drive = MockDrive::default();
        drive.seed("vendas.xlsx", b"x".to_vec());

        let id = drive.item_id("vendas.xlsx");
        assert!(delete_file(&drive, "t", &id).await.unwrap());
        assert!(drive.files().is_empty());
    }

    #[tokio::test]
    async fn delete_with_other_status_reports_false_and_keeps_the_file() {
        let mut drive = MockDrive::default();
        drive.delete_status = 403;
        drive.seed("vendas.xlsx", b"x".to_vec());

        let id = drive.item_id("vendas.xlsx");
        assert!(!delete_file(&drive, "t", &id).await.unwrap());
        assert_eq!(drive.files().len(), 1);
    }
}
