//! Listing check: is a case on the board for a given day?
//!
//! The check is a pure function of a [`CaseRecord`] and a target calendar
//! date. A case counts as listed when its next hearing date, or any date in
//! its hearing history, equals the target date. Bench and court-room detail
//! come from the matching hearing entry when there is one, otherwise from
//! the record's own court fields.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::CaseRecord;

/// Day to check, relative to a reference date (normally the local today).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingDay {
    Today,
    Tomorrow,
}

impl ListingDay {
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            ListingDay::Today => today,
            ListingDay::Tomorrow => today.checked_add_days(Days::new(1)).unwrap_or(today),
        }
    }
}

impl fmt::Display for ListingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ListingDay::Today => "today",
            ListingDay::Tomorrow => "tomorrow",
        })
    }
}

/// Where and when a listed case is heard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtDetail {
    pub court_name: Option<String>,
    pub court_hall: Option<String>,
    pub serial_number: Option<String>,
    pub hearing_time: Option<String>,
}

impl CourtDetail {
    pub fn is_empty(&self) -> bool {
        self.court_name.is_none()
            && self.court_hall.is_none()
            && self.serial_number.is_none()
            && self.hearing_time.is_none()
    }
}

/// Outcome of checking one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingStatus {
    pub day: ListingDay,
    #[serde(with = "crate::date::required")]
    pub date: NaiveDate,
    pub listed: bool,
    pub detail: Option<CourtDetail>,
}

impl ListingStatus {
    /// Replace this status with a positive cause-list answer from the portal.
    pub fn with_portal_listing(self, detail: CourtDetail) -> Self {
        Self {
            listed: true,
            detail: (!detail.is_empty()).then_some(detail),
            ..self
        }
    }
}

/// Check whether `record` is listed on `day`, resolved against `today`.
pub fn check_listing(record: &CaseRecord, day: ListingDay, today: NaiveDate) -> ListingStatus {
    let date = day.resolve(today);

    let from_history = record
        .hearings
        .iter()
        .find(|h| h.date == Some(date))
        .map(|h| CourtDetail {
            court_name: h.court_name.clone().or_else(|| record.court_name.clone()),
            court_hall: h.court_hall.clone().or_else(|| record.court_hall.clone()),
            ..Default::default()
        });

    let by_next_hearing = record.next_hearing_date == Some(date);
    let listed = by_next_hearing || from_history.is_some();
    debug!(
        case = record.display_id().unwrap_or("-"),
        %date,
        by_next_hearing,
        by_history = from_history.is_some(),
        "listing checked against record"
    );

    let detail = if listed {
        from_history
            .or_else(|| {
                Some(CourtDetail {
                    court_name: record.court_name.clone(),
                    court_hall: record.court_hall.clone(),
                    ..Default::default()
                })
            })
            .filter(|d| !d.is_empty())
    } else {
        None
    };

    ListingStatus {
        day,
        date,
        listed,
        detail,
    }
}
