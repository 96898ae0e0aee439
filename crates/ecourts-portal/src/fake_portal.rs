//! In-process stand-in for the portal, serving recorded responses.
//!
//! Mirrors the endpoints [`PortalClient`](crate::PortalClient) talks to,
//! including the session cookie and a CAPTCHA page. Dates in the fixtures
//! are relative to the `today` the server is spawned with.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Days, NaiveDate};
use ecourts_core::date;
use serde_json::{Value, json};

/// Case on file: listed tomorrow by its record, and today by the cause-list index.
pub const KNOWN_CNR: &str = "DLNC010012342024";
pub const KNOWN_CASE_ID: &str = "204311";
/// Answers with a human-verification page.
pub const CAPTCHA_CNR: &str = "CAPTCHA000000001";
/// Matches two cases.
pub const DUPLICATE_CNR: &str = "DLNC010000002024";
/// Case on file whose PDF endpoint answers with an HTML page.
pub const NO_PDF_CNR: &str = "DLNC010055552024";

pub const CASE_PDF_BYTES: &[u8] = b"%PDF-1.4\n% case order 204311\n%%EOF\n";
pub const CAUSE_LIST_PDF_BYTES: &[u8] = b"%PDF-1.4\n% daily cause list\n%%EOF\n";

const SESSION_COOKIE: &str = "PHPSESSID";

struct Shared {
    today: NaiveDate,
    hits: AtomicUsize,
}

impl Shared {
    fn tomorrow(&self) -> NaiveDate {
        self.today.checked_add_days(Days::new(1)).unwrap_or(self.today)
    }
}

pub struct FakePortal {
    pub base_url: String,
    shared: Arc<Shared>,
}

impl FakePortal {
    /// Bind to an ephemeral local port and serve on the current tokio runtime.
    pub async fn spawn(today: NaiveDate) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            today,
            hits: AtomicUsize::new(0),
        });
        let app = router(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "fake portal stopped");
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            shared,
        })
    }

    /// Requests served so far, session handshake included.
    pub fn hits(&self) -> usize {
        self.shared.hits.load(Ordering::SeqCst)
    }
}

fn router(shared: Arc<Shared>) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/case_status/cnr_search.php", post(cnr_search))
        .route("/case_status/case_number_search.php", post(case_search))
        .route("/case_status/download_case_pdf.php", get(case_pdf))
        .route("/cause_list/listing_by_date.php", post(listing_by_date))
        .route("/cause_list/daily_cause_list.php", post(daily_cause_list))
        .route("/orders/empty.pdf", get(empty_pdf))
        .with_state(shared)
}

type Fields = HashMap<String, String>;

fn field<'a>(form: &'a Fields, name: &str) -> &'a str {
    form.get(name).map(String::as_str).unwrap_or("")
}

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains(SESSION_COOKIE))
}

fn session_expired() -> Response {
    (
        StatusCode::FORBIDDEN,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body>Session expired</body></html>",
    )
        .into_response()
}

fn html(body: &'static str) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/html")], body).into_response()
}

fn pdf(bytes: &'static [u8]) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/pdf")], bytes).into_response()
}

fn known_case(shared: &Shared) -> Value {
    let earlier = shared
        .today
        .checked_sub_days(Days::new(30))
        .unwrap_or(shared.today);
    json!({
        "case_id": KNOWN_CASE_ID.parse::<u64>().unwrap_or_default(),
        "cnr": KNOWN_CNR,
        "case_type": "CS",
        "case_no": "123",
        "filing_year": 2024,
        "petitioner_name": "Ram Kumar",
        "respondent_name": "Delhi Development Authority",
        "next_hearing_date": date::to_portal(shared.tomorrow()),
        "court_name": "ADJ-02, Tis Hazari",
        "bench": "Court No. 4",
        "hearings": [
            {"hearing_date": date::to_portal(earlier), "judge": "ADJ-02", "purpose": "Evidence"}
        ],
        "stage": "Evidence"
    })
}

async fn landing(State(shared): State<Arc<Shared>>) -> Response {
    shared.hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, "PHPSESSID=fake-session; Path=/")],
        "<html><body>eCourts Services</body></html>",
    )
        .into_response()
}

async fn cnr_search(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    Form(form): Form<Fields>,
) -> Response {
    shared.hits.fetch_add(1, Ordering::SeqCst);
    if !has_session(&headers) {
        return session_expired();
    }
    match field(&form, "cnr_number") {
        KNOWN_CNR => Json(known_case(&shared)).into_response(),
        CAPTCHA_CNR => html("<html><body>Enter captcha <img id=\"captcha_image\"></body></html>"),
        DUPLICATE_CNR => Json(json!([known_case(&shared), known_case(&shared)])).into_response(),
        NO_PDF_CNR => Json(json!({
            "case_id": "404404",
            "cnr": NO_PDF_CNR,
            "case_type": "CRL",
            "case_no": "55",
            "filing_year": "2024"
        }))
        .into_response(),
        _ => Json(json!({})).into_response(),
    }
}

async fn case_search(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    Form(form): Form<Fields>,
) -> Response {
    shared.hits.fetch_add(1, Ordering::SeqCst);
    if !has_session(&headers) {
        return session_expired();
    }
    let key = (
        field(&form, "case_type"),
        field(&form, "case_no"),
        field(&form, "case_year"),
    );
    if key == ("CS", "123", "2024") {
        Json(json!([known_case(&shared)])).into_response()
    } else {
        Json(json!([])).into_response()
    }
}

async fn listing_by_date(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    Form(form): Form<Fields>,
) -> Response {
    shared.hits.fetch_add(1, Ordering::SeqCst);
    if !has_session(&headers) {
        return session_expired();
    }
    if field(&form, "case_id") == KNOWN_CASE_ID
        && field(&form, "date") == date::to_portal(shared.today)
    {
        Json(json!({
            "is_listed": true,
            "serial_no": 14,
            "court_name": "ADJ-02, Tis Hazari",
            "court_hall": "Court No. 4",
            "hearing_time": "10:30 AM"
        }))
        .into_response()
    } else {
        Json(json!({"is_listed": false})).into_response()
    }
}

async fn daily_cause_list(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    Form(form): Form<Fields>,
) -> Response {
    shared.hits.fetch_add(1, Ordering::SeqCst);
    if !has_session(&headers) {
        return session_expired();
    }
    if field(&form, "state_code") != "DL" {
        return Json(json!([])).into_response();
    }
    let requested = field(&form, "date");
    if requested == date::to_portal(shared.today) {
        Json(json!({
            "court_name": "ADJ-02, Tis Hazari",
            "date": requested,
            "cases": [
                {"serial_no": 14, "cnr": KNOWN_CNR, "case": "CS/123/2024", "parties": "Ram Kumar vs Delhi Development Authority"},
                {"serial_no": 15, "cnr": "DLNC010077772023", "case": "CS/77/2023", "parties": "Sita Devi vs Mohan Lal"}
            ]
        }))
        .into_response()
    } else if requested == date::to_portal(shared.tomorrow()) {
        pdf(CAUSE_LIST_PDF_BYTES)
    } else {
        Json(json!([])).into_response()
    }
}

async fn case_pdf(State(shared): State<Arc<Shared>>, Query(query): Query<Fields>) -> Response {
    shared.hits.fetch_add(1, Ordering::SeqCst);
    match field(&query, "case_id") {
        KNOWN_CASE_ID => pdf(CASE_PDF_BYTES),
        "404404" => html("<html><body>No documents uploaded</body></html>"),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn empty_pdf(State(shared): State<Arc<Shared>>) -> Response {
    shared.hits.fetch_add(1, Ordering::SeqCst);
    pdf(b"")
}
