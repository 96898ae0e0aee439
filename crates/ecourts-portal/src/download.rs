//! Fetch a document and write it under the output directory.
//!
//! Files land via a temporary file in the same directory that is renamed
//! into place, so a failed download never leaves a partial file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ecourts_core::DownloadTarget;
use tempfile::NamedTempFile;
use tracing::info;

use crate::client::{Document, PortalClient};
use crate::error::PortalError;

/// Download `target` into `output_dir` and return the written path.
///
/// The directory is created if missing and probed for writability before
/// any request is made.
pub async fn download(
    client: &PortalClient,
    target: &DownloadTarget,
    output_dir: &Path,
) -> Result<PathBuf, PortalError> {
    ensure_writable(output_dir)?;

    let document = match target {
        DownloadTarget::CasePdf {
            court, document, ..
        } => client.fetch_case_pdf(court, document).await?,
        DownloadTarget::CauseList { court, date } => client.fetch_cause_list(court, *date).await?,
    };

    let file_name = format!("{}.{}", target.file_stem(), document.kind.extension());
    let path = write_atomically(output_dir, &file_name, &document)?;
    info!(path = %path.display(), bytes = document.bytes.len(), "document saved");
    Ok(path)
}

pub(crate) fn ensure_writable(dir: &Path) -> Result<(), PortalError> {
    let not_writable = |source| PortalError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };
    fs::create_dir_all(dir).map_err(not_writable)?;
    tempfile::tempfile_in(dir).map_err(not_writable)?;
    Ok(())
}

fn write_atomically(dir: &Path, file_name: &str, document: &Document) -> Result<PathBuf, PortalError> {
    let not_writable = |source| PortalError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };
    let dest = dir.join(file_name);

    let mut tmp = NamedTempFile::new_in(dir).map_err(not_writable)?;
    tmp.write_all(&document.bytes).map_err(not_writable)?;
    tmp.as_file().sync_all().map_err(not_writable)?;
    tmp.persist(&dest).map_err(|e| not_writable(e.error))?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PortalConfig;
    use crate::fake_portal::{self, FakePortal};
    use chrono::NaiveDate;
    use ecourts_core::{CaseRecord, CourtLocation, DocumentRef};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn delhi() -> CourtLocation {
        CourtLocation::new("DL", "1").unwrap()
    }

    async fn setup() -> (FakePortal, PortalClient, tempfile::TempDir) {
        let portal = FakePortal::spawn(today()).await.unwrap();
        let client = PortalClient::connect(&PortalConfig {
            base_url: portal.base_url.clone(),
            ..Default::default()
        })
        .await
        .unwrap();
        (portal, client, tempfile::tempdir().unwrap())
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn writes_case_pdf() {
        let (_portal, client, dir) = setup().await;
        let record = CaseRecord {
            cnr: Some(fake_portal::KNOWN_CNR.into()),
            case_id: Some(fake_portal::KNOWN_CASE_ID.into()),
            ..Default::default()
        };
        let target = DownloadTarget::case_pdf(&record, delhi()).unwrap();

        let path = download(&client, &target, dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("case_DLNC010012342024.pdf"));
        assert_eq!(fs::read(&path).unwrap(), fake_portal::CASE_PDF_BYTES);
        assert_eq!(entries(dir.path()), vec!["case_DLNC010012342024.pdf"]);
    }

    #[tokio::test]
    async fn html_instead_of_pdf_leaves_nothing() {
        let (_portal, client, dir) = setup().await;
        let target = DownloadTarget::CasePdf {
            court: delhi(),
            document: DocumentRef::CaseId("404404".into()),
            file_stem: "case_404404".into(),
        };
        let err = download(&client, &target, dir.path()).await.unwrap_err();
        assert!(matches!(err, PortalError::DocumentNotFound(_)));
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn empty_pdf_is_not_a_document() {
        let (_portal, client, dir) = setup().await;
        let target = DownloadTarget::CasePdf {
            court: delhi(),
            document: DocumentRef::Url("/orders/empty.pdf".into()),
            file_stem: "case_empty".into(),
        };
        let err = download(&client, &target, dir.path()).await.unwrap_err();
        assert!(matches!(err, PortalError::DocumentNotFound(_)));
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn unknown_case_id_is_not_found() {
        let (_portal, client, dir) = setup().await;
        let target = DownloadTarget::CasePdf {
            court: delhi(),
            document: DocumentRef::CaseId("1".into()),
            file_stem: "case_1".into(),
        };
        let err = download(&client, &target, dir.path()).await.unwrap_err();
        assert!(matches!(err, PortalError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn cause_list_json_and_pdf() {
        let (_portal, client, dir) = setup().await;

        let target = DownloadTarget::cause_list(delhi(), today());
        let path = download(&client, &target, dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("cause_list_DL_1_20261019.json"));
        let saved: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved["cases"].as_array().unwrap().len(), 2);

        let tomorrow = today().succ_opt().unwrap();
        let target = DownloadTarget::cause_list(delhi(), tomorrow);
        let path = download(&client, &target, dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("cause_list_DL_1_20261020.pdf"));
        assert_eq!(fs::read(&path).unwrap(), fake_portal::CAUSE_LIST_PDF_BYTES);
    }

    #[tokio::test]
    async fn empty_cause_list_is_not_found() {
        let (_portal, client, dir) = setup().await;
        let court = CourtLocation::new("MH", "3").unwrap();
        let target = DownloadTarget::cause_list(court, today());
        let err = download(&client, &target, dir.path()).await.unwrap_err();
        assert!(matches!(err, PortalError::DocumentNotFound(_)));
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn unwritable_output_dir_fails_before_request() {
        let (portal, client, dir) = setup().await;
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();
        let before = portal.hits();

        let target = DownloadTarget::cause_list(delhi(), today());
        let err = download(&client, &target, &blocker.join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::OutputDir { .. }));
        assert_eq!(portal.hits(), before);
    }

    #[test]
    fn creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_writable(&nested).unwrap();
        assert!(nested.is_dir());
        assert!(entries(&nested).is_empty());
    }
}
