//! Download targets and their deterministic file names.

use chrono::NaiveDate;

use crate::date;
use crate::query::CourtLocation;
use crate::record::CaseRecord;

/// How the portal addresses a case document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRef {
    /// Direct link taken from the case record.
    Url(String),
    /// Fetched through the portal's PDF endpoint by case id.
    CaseId(String),
}

/// One document to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    CasePdf {
        court: CourtLocation,
        document: DocumentRef,
        file_stem: String,
    },
    CauseList {
        court: CourtLocation,
        date: NaiveDate,
    },
}

impl DownloadTarget {
    /// Target for a case's PDF, or `None` when the record carries neither a
    /// document link nor a case id to ask the portal with.
    pub fn case_pdf(record: &CaseRecord, court: CourtLocation) -> Option<Self> {
        let document = match (&record.pdf_url, &record.case_id) {
            (Some(url), _) => DocumentRef::Url(url.clone()),
            (None, Some(id)) => DocumentRef::CaseId(id.clone()),
            (None, None) => return None,
        };
        let id = record.display_id().unwrap_or("unknown");
        Some(DownloadTarget::CasePdf {
            court,
            document,
            file_stem: format!("case_{}", sanitize(id)),
        })
    }

    pub fn cause_list(court: CourtLocation, date: NaiveDate) -> Self {
        DownloadTarget::CauseList { court, date }
    }

    /// File name without extension; the extension follows the content type
    /// the portal answers with.
    pub fn file_stem(&self) -> String {
        match self {
            DownloadTarget::CasePdf { file_stem, .. } => file_stem.clone(),
            DownloadTarget::CauseList { court, date } => format!(
                "cause_list_{}_{}_{}",
                sanitize(&court.state_code),
                sanitize(&court.district_code),
                date::to_compact(*date)
            ),
        }
    }
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delhi() -> CourtLocation {
        CourtLocation::new("DL", "1").unwrap()
    }

    #[test]
    fn case_pdf_prefers_document_link() {
        let rec = CaseRecord {
            cnr: Some("DLNC010012342024".into()),
            case_id: Some("9".into()),
            pdf_url: Some("orders/9.pdf".into()),
            ..Default::default()
        };
        let target = DownloadTarget::case_pdf(&rec, delhi()).unwrap();
        assert_eq!(
            target,
            DownloadTarget::CasePdf {
                court: delhi(),
                document: DocumentRef::Url("orders/9.pdf".into()),
                file_stem: "case_DLNC010012342024".into(),
            }
        );
    }

    #[test]
    fn case_pdf_falls_back_to_case_id() {
        let rec = CaseRecord {
            case_id: Some("204/311".into()),
            ..Default::default()
        };
        let target = DownloadTarget::case_pdf(&rec, delhi()).unwrap();
        assert_eq!(target.file_stem(), "case_204_311");
        assert!(matches!(
            target,
            DownloadTarget::CasePdf {
                document: DocumentRef::CaseId(ref id),
                ..
            } if id == "204/311"
        ));
    }

    #[test]
    fn case_pdf_needs_a_reference() {
        let rec = CaseRecord {
            cnr: Some("DLNC01".into()),
            ..Default::default()
        };
        assert!(DownloadTarget::case_pdf(&rec, delhi()).is_none());
    }

    #[test]
    fn cause_list_name_is_deterministic() {
        let court = delhi();
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let a = DownloadTarget::cause_list(court.clone(), date);
        let b = DownloadTarget::cause_list(court, date);
        assert_eq!(a.file_stem(), "cause_list_DL_1_20261020");
        assert_eq!(a.file_stem(), b.file_stem());
    }
}
