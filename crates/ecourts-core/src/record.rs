//! Case records as returned by the portal's case-status endpoints.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Portal response for a single case.
///
/// Fields the client does not interpret are kept in `extra` so the saved
/// run summary carries the full payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub case_id: Option<String>,
    #[serde(alias = "cnr_number", deserialize_with = "lenient_string")]
    pub cnr: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub case_type: Option<String>,
    #[serde(alias = "case_no", deserialize_with = "lenient_string")]
    pub case_number: Option<String>,
    #[serde(alias = "case_year", deserialize_with = "lenient_string")]
    pub filing_year: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub petitioner_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub respondent_name: Option<String>,
    #[serde(with = "crate::date::optional")]
    pub next_hearing_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_string")]
    pub court_name: Option<String>,
    #[serde(alias = "bench", deserialize_with = "lenient_string")]
    pub court_hall: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub hearings: Vec<Hearing>,
    /// Link to the case document (order/judgment PDF), absolute or relative
    /// to the portal base URL.
    #[serde(alias = "document_url", deserialize_with = "lenient_string")]
    pub pdf_url: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One entry of the case's hearing history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hearing {
    #[serde(alias = "hearing_date", with = "crate::date::optional")]
    pub date: Option<NaiveDate>,
    #[serde(alias = "judge", deserialize_with = "lenient_string")]
    pub court_name: Option<String>,
    #[serde(alias = "bench", deserialize_with = "lenient_string")]
    pub court_hall: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub purpose: Option<String>,
}

impl CaseRecord {
    /// True when the payload identifies no case at all.
    pub fn is_empty(&self) -> bool {
        self.cnr.is_none() && self.case_id.is_none()
    }

    /// Identifier to show users and to name files by: CNR, else case id.
    pub fn display_id(&self) -> Option<&str> {
        self.cnr.as_deref().or(self.case_id.as_deref())
    }

    /// Every known hearing date: the next hearing first, then history.
    pub fn hearing_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.next_hearing_date
            .into_iter()
            .chain(self.hearings.iter().filter_map(|h| h.date))
    }
}

/// Accept strings, numbers or null; blank strings become `None`.
///
/// The portal is inconsistent about quoting numeric fields such as case
/// numbers and years.
pub fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value: Option<serde_json::Value> = Option::deserialize(d)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Accept booleans, `0`/`1` and `"true"`/`"yes"` strings; anything else is `false`.
pub fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value: Option<serde_json::Value> = Option::deserialize(d)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(serde_json::Value::String(s)) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "y")
        }
        _ => false,
    })
}

/// A missing or `null` list deserializes to an empty one.
pub fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}
