//! Case queries: what the portal is asked to look up.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("CNR must be alphanumeric, got {0:?}")]
    InvalidCnr(String),
    #[error("case number must be numeric, got {0:?}")]
    InvalidCaseNumber(String),
    #[error("case year must be a four-digit year, got {0:?}")]
    InvalidCaseYear(String),
}

/// State and district codes that select a court establishment on the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourtLocation {
    pub state_code: String,
    pub district_code: String,
}

impl CourtLocation {
    pub fn new(state_code: &str, district_code: &str) -> Result<Self, QueryError> {
        let state_code = state_code.trim();
        let district_code = district_code.trim();
        if state_code.is_empty() {
            return Err(QueryError::Empty("state code"));
        }
        if district_code.is_empty() {
            return Err(QueryError::Empty("district code"));
        }
        Ok(Self {
            state_code: state_code.to_ascii_uppercase(),
            district_code: district_code.to_string(),
        })
    }
}

/// How a single case is identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CaseKey {
    Cnr {
        cnr: String,
    },
    Registration {
        case_type: String,
        case_number: String,
        case_year: u16,
    },
}

/// A validated lookup for exactly one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseQuery {
    pub court: CourtLocation,
    pub key: CaseKey,
}

impl CaseQuery {
    /// Query by CNR. The number is trimmed and upper-cased.
    pub fn by_cnr(court: CourtLocation, cnr: &str) -> Result<Self, QueryError> {
        let cnr = cnr.trim();
        if cnr.is_empty() {
            return Err(QueryError::Empty("CNR"));
        }
        if !cnr.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(QueryError::InvalidCnr(cnr.to_string()));
        }
        Ok(Self {
            court,
            key: CaseKey::Cnr {
                cnr: cnr.to_ascii_uppercase(),
            },
        })
    }

    /// Query by case type, registration number and year.
    pub fn by_registration(
        court: CourtLocation,
        case_type: &str,
        case_number: &str,
        case_year: &str,
    ) -> Result<Self, QueryError> {
        let case_type = case_type.trim();
        let case_number = case_number.trim();
        let case_year = case_year.trim();

        if case_type.is_empty() {
            return Err(QueryError::Empty("case type"));
        }
        if case_number.is_empty() {
            return Err(QueryError::Empty("case number"));
        }
        if !case_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(QueryError::InvalidCaseNumber(case_number.to_string()));
        }
        let year = match case_year.parse::<u16>() {
            Ok(y) if case_year.len() == 4 && (1900..=2100).contains(&y) => y,
            _ => return Err(QueryError::InvalidCaseYear(case_year.to_string())),
        };

        Ok(Self {
            court,
            key: CaseKey::Registration {
                case_type: case_type.to_ascii_uppercase(),
                case_number: case_number.to_string(),
                case_year: year,
            },
        })
    }
}

impl fmt::Display for CaseQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            CaseKey::Cnr { cnr } => write!(f, "CNR {cnr}")?,
            CaseKey::Registration {
                case_type,
                case_number,
                case_year,
            } => write!(f, "{case_type}/{case_number}/{case_year}")?,
        }
        write!(
            f,
            " ({}, district {})",
            self.court.state_code, self.court.district_code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delhi() -> CourtLocation {
        CourtLocation::new("DL", "1").unwrap()
    }

    #[test]
    fn cnr_is_normalised() {
        let q = CaseQuery::by_cnr(delhi(), "  dlnc010012342024 ").unwrap();
        assert_eq!(
            q.key,
            CaseKey::Cnr {
                cnr: "DLNC010012342024".into()
            }
        );
    }

    #[test]
    fn cnr_rejects_separators() {
        assert_eq!(
            CaseQuery::by_cnr(delhi(), "DLNC-0100"),
            Err(QueryError::InvalidCnr("DLNC-0100".into()))
        );
        assert_eq!(
            CaseQuery::by_cnr(delhi(), "   "),
            Err(QueryError::Empty("CNR"))
        );
    }

    #[test]
    fn registration_parses_year() {
        let q = CaseQuery::by_registration(delhi(), "cs", "123", "2024").unwrap();
        assert_eq!(
            q.key,
            CaseKey::Registration {
                case_type: "CS".into(),
                case_number: "123".into(),
                case_year: 2024,
            }
        );
        assert_eq!(q.to_string(), "CS/123/2024 (DL, district 1)");
    }

    #[test]
    fn registration_rejects_bad_fields() {
        assert_eq!(
            CaseQuery::by_registration(delhi(), "CS", "12a", "2024"),
            Err(QueryError::InvalidCaseNumber("12a".into()))
        );
        assert_eq!(
            CaseQuery::by_registration(delhi(), "CS", "12", "24"),
            Err(QueryError::InvalidCaseYear("24".into()))
        );
        assert_eq!(
            CaseQuery::by_registration(delhi(), "", "12", "2024"),
            Err(QueryError::Empty("case type"))
        );
    }

    #[test]
    fn location_requires_both_codes() {
        assert_eq!(
            CourtLocation::new("", "1"),
            Err(QueryError::Empty("state code"))
        );
        assert_eq!(
            CourtLocation::new("dl", " "),
            Err(QueryError::Empty("district code"))
        );
        assert_eq!(CourtLocation::new("dl", "4").unwrap().state_code, "DL");
    }
}
