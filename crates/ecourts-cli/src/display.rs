//! Vertical card display for case records.
//!
//! Renders a single case as a grouped, human-readable card: identity and
//! parties, hearing schedule, then one line per checked listing day.

use std::fmt::Write;

use ecourts_core::{CaseRecord, CourtDetail, ListingStatus, date};

const MAX_HISTORY_ITEMS: usize = 5;

// ── Public API ──

/// Print a case record and its listing statuses to stdout.
pub fn print_case_card(record: &CaseRecord, listings: &[ListingStatus]) {
    print!("{}", case_card(record, listings));
}

pub fn case_card(record: &CaseRecord, listings: &[ListingStatus]) -> String {
    let mut out = String::new();

    let id = record.display_id().unwrap_or("unknown case");
    let _ = writeln!(out, "=== {id} ===");
    if let Some(title) = registration(record) {
        let _ = writeln!(out, "{title}");
    }
    let _ = writeln!(out);

    section(
        &mut out,
        "Case",
        &[
            ("CNR", record.cnr.clone()),
            ("Case type", record.case_type.clone()),
            ("Case number", record.case_number.clone()),
            ("Filing year", record.filing_year.clone()),
            ("Petitioner", record.petitioner_name.clone()),
            ("Respondent", record.respondent_name.clone()),
        ],
    );
    section(
        &mut out,
        "Hearing",
        &[
            ("Next hearing", record.next_hearing_date.map(date::to_portal)),
            ("Court", record.court_name.clone()),
            ("Court hall", record.court_hall.clone()),
        ],
    );
    history(&mut out, record);

    if !listings.is_empty() {
        let _ = writeln!(out, "Listing");
        for status in listings {
            let label = format!("{} ({})", status.day, date::to_portal(status.date));
            let line = if status.listed {
                match status.detail.as_ref().map(describe) {
                    Some(detail) if !detail.is_empty() => format!("LISTED  {detail}"),
                    _ => "LISTED".to_string(),
                }
            } else {
                "not listed".to_string()
            };
            let _ = writeln!(out, "  {:<26} {}", label, line);
        }
        let _ = writeln!(out);
    }

    out
}

// ── Section rendering ──

fn section(out: &mut String, header: &str, rows: &[(&str, Option<String>)]) {
    if rows.iter().all(|(_, v)| v.is_none()) {
        return;
    }
    let _ = writeln!(out, "{header}");
    for (name, value) in rows {
        if let Some(value) = value {
            let _ = writeln!(out, "  {:<26} {}", name, value);
        }
    }
    let _ = writeln!(out);
}

fn history(out: &mut String, record: &CaseRecord) {
    let len = record.hearings.len();
    if len == 0 {
        return;
    }
    let _ = writeln!(out, "History ({len}):");
    for hearing in record.hearings.iter().take(MAX_HISTORY_ITEMS) {
        let when = hearing.date.map(date::to_portal).unwrap_or_else(|| "-".into());
        let _ = write!(out, "    {:<12}", when);
        if let Some(court) = &hearing.court_name {
            let _ = write!(out, "  {court}");
        }
        if let Some(purpose) = &hearing.purpose {
            let _ = write!(out, "  ({purpose})");
        }
        let _ = writeln!(out);
    }
    if len > MAX_HISTORY_ITEMS {
        let _ = writeln!(out, "    ... and {} more", len - MAX_HISTORY_ITEMS);
    }
    let _ = writeln!(out);
}

// ── Helpers ──

fn registration(record: &CaseRecord) -> Option<String> {
    match (&record.case_type, &record.case_number, &record.filing_year) {
        (Some(t), Some(n), Some(y)) => Some(format!("{t}/{n}/{y}")),
        _ => None,
    }
}

fn describe(detail: &CourtDetail) -> String {
    let mut parts = Vec::new();
    if let Some(serial) = &detail.serial_number {
        parts.push(format!("serial {serial}"));
    }
    parts.extend(detail.court_name.clone());
    parts.extend(detail.court_hall.clone());
    parts.extend(detail.hearing_time.clone());
    parts.join(", ")
}
