//! JSON summary of a run, saved next to the downloads.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use ecourts_core::{CaseQuery, CaseRecord, ListingStatus};
use serde::Serialize;
use tempfile::NamedTempFile;

#[derive(Serialize)]
struct Summary<'a> {
    timestamp: String,
    search_params: &'a CaseQuery,
    case_details: &'a CaseRecord,
    listings: &'a [ListingStatus],
}

pub fn summary_file_name(at: DateTime<Local>) -> String {
    format!("case_search_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Write the summary into `output_dir` and return its path.
///
/// The file appears complete or not at all.
pub fn save_summary(
    output_dir: &Path,
    query: &CaseQuery,
    record: &CaseRecord,
    listings: &[ListingStatus],
) -> anyhow::Result<PathBuf> {
    let now = Local::now();
    let summary = Summary {
        timestamp: now.to_rfc3339(),
        search_params: query,
        case_details: record,
        listings,
    };

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    let path = output_dir.join(summary_file_name(now));
    let json = serde_json::to_vec_pretty(&summary)?;

    let mut tmp = NamedTempFile::new_in(output_dir)
        .with_context(|| format!("creating temporary file in {}", output_dir.display()))?;
    tmp.write_all(&json)
        .and_then(|()| tmp.as_file().sync_all())
        .with_context(|| format!("writing {}", path.display()))?;
    tmp.persist(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ecourts_core::CourtLocation;

    #[test]
    fn file_name_uses_local_timestamp() {
        let at = Local.with_ymd_and_hms(2026, 10, 19, 9, 5, 3).unwrap();
        assert_eq!(summary_file_name(at), "case_search_20261019_090503.json");
    }

    #[test]
    fn summary_carries_full_payload() {
        let dir = tempfile::tempdir().unwrap();
        let court = CourtLocation::new("DL", "1").unwrap();
        let query = CaseQuery::by_cnr(court, "DLNC010012342024").unwrap();
        let mut record = CaseRecord {
            cnr: Some("DLNC010012342024".into()),
            ..Default::default()
        };
        record
            .extra
            .insert("stage".into(), serde_json::json!("Evidence"));

        let path = save_summary(&dir.path().join("out"), &query, &record, &[]).unwrap();
        let saved: serde_json::Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(saved["case_details"]["cnr"], "DLNC010012342024");
        assert_eq!(saved["case_details"]["stage"], "Evidence");
        assert_eq!(saved["search_params"]["key"]["mode"], "cnr");
        assert!(saved["listings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn leaves_only_the_summary_behind() {
        let dir = tempfile::tempdir().unwrap();
        let court = CourtLocation::new("DL", "1").unwrap();
        let query = CaseQuery::by_cnr(court, "DLNC010012342024").unwrap();
        let path = save_summary(dir.path(), &query, &CaseRecord::default(), &[]).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(names, vec![path]);
    }

    #[test]
    fn unwritable_output_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let court = CourtLocation::new("DL", "1").unwrap();
        let query = CaseQuery::by_cnr(court, "DLNC010012342024").unwrap();

        let err = save_summary(&blocker.join("out"), &query, &CaseRecord::default(), &[]);
        assert!(err.is_err());
    }
}
