//! Portal date handling.
//!
//! The portal writes dates as `dd-mm-yyyy` in both form fields and JSON
//! payloads. Some responses carry ISO `yyyy-mm-dd` instead, so parsing
//! accepts either; formatting always produces the portal form.

use chrono::NaiveDate;

const PORTAL_FORMAT: &str = "%d-%m-%Y";
const ISO_FORMAT: &str = "%Y-%m-%d";

/// Format a date the way the portal expects it in form fields.
pub fn to_portal(date: NaiveDate) -> String {
    date.format(PORTAL_FORMAT).to_string()
}

/// Compact `YYYYMMDD` form used in output file names.
pub fn to_compact(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse a portal date, accepting `dd-mm-yyyy`, `dd/mm/yyyy` or `yyyy-mm-dd`.
pub fn parse(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, PORTAL_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(s, ISO_FORMAT))
        .ok()
}

/// Serde adapter for `Option<NaiveDate>` fields in portal JSON.
///
/// Empty strings, unparseable text and non-string values deserialize to
/// `None` rather than failing the whole record; the portal fills unknown
/// dates with `""`, `null` or placeholder text.
pub mod optional {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&super::to_portal(*d)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<serde_json::Value> = Option::deserialize(d)?;
        Ok(match raw {
            Some(serde_json::Value::String(s)) => super::parse(&s),
            _ => None,
        })
    }
}

/// Serde adapter for required `NaiveDate` fields in portal JSON.
pub mod required {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::to_portal(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid portal date: {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn portal_format() {
        assert_eq!(to_portal(ymd(2024, 3, 7)), "07-03-2024");
        assert_eq!(to_compact(ymd(2024, 3, 7)), "20240307");
    }

    #[test]
    fn parses_all_accepted_forms() {
        assert_eq!(parse("07-03-2024"), Some(ymd(2024, 3, 7)));
        assert_eq!(parse("07/03/2024"), Some(ymd(2024, 3, 7)));
        assert_eq!(parse("2024-03-07"), Some(ymd(2024, 3, 7)));
        assert_eq!(parse("  07-03-2024 "), Some(ymd(2024, 3, 7)));
    }

    #[derive(serde::Deserialize)]
    struct Dated {
        #[serde(default, with = "optional")]
        on: Option<NaiveDate>,
    }

    #[test]
    fn optional_dates_never_fail() {
        let on = |json: &str| serde_json::from_str::<Dated>(json).unwrap().on;
        assert_eq!(on(r#"{"on": "21-10-2026"}"#), Some(ymd(2026, 10, 21)));
        assert_eq!(on(r#"{"on": 20261021}"#), None);
        assert_eq!(on(r#"{"on": null}"#), None);
        assert_eq!(on(r#"{"on": ["x"]}"#), None);
        assert_eq!(on("{}"), None);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("Not Available"), None);
        assert_eq!(parse("31-02-2024"), None);
    }
}
