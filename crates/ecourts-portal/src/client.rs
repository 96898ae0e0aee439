//! HTTP client for the eCourts portal's case-status and cause-list endpoints.
//!
//! The portal is a PHP application behind a session cookie. A client opens
//! the session with a plain GET of the landing page, then submits
//! form-encoded POSTs that answer with JSON. Human-verification pages are
//! detected and surfaced as [`PortalError::CaptchaRequired`] instead of
//! being retried.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::NaiveDate;
use ecourts_core::record::{lenient_bool, lenient_string};
use ecourts_core::{
    CaseKey, CaseQuery, CaseRecord, CourtDetail, CourtLocation, DocumentRef, ListingDay,
    ListingStatus, check_listing, date,
};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::PortalError;

pub const DEFAULT_BASE_URL: &str = "https://services.ecourts.gov.in/ecourtindia_v6";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

const CNR_SEARCH: &str = "case_status/cnr_search.php";
const CASE_SEARCH: &str = "case_status/case_number_search.php";
const LISTING_BY_DATE: &str = "cause_list/listing_by_date.php";
const DAILY_CAUSE_LIST: &str = "cause_list/daily_cause_list.php";
const CASE_PDF: &str = "case_status/download_case_pdf.php";

/// Error bodies are echoed into messages; keep them short.
const MAX_BODY_IN_ERROR: usize = 200;

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Json,
}

impl DocumentKind {
    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Json => "json",
        }
    }
}

/// A fetched document, ready to be written to disk.
#[derive(Debug, Clone)]
pub struct Document {
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

/// One portal session.
pub struct PortalClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ListingResponse {
    #[serde(deserialize_with = "lenient_bool")]
    is_listed: bool,
    #[serde(deserialize_with = "lenient_string")]
    serial_no: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    court_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    court_hall: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    hearing_time: Option<String>,
}

impl PortalClient {
    /// Build a client for `config.base_url` and open a portal session.
    ///
    /// `base_url` should look like `https://services.ecourts.gov.in/ecourtindia_v6`;
    /// a trailing slash is ignored.
    pub async fn connect(config: &PortalConfig) -> Result<Self, PortalError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| PortalError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        let referer = HeaderValue::from_str(&format!("{base_url}/"))
            .map_err(|e| PortalError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        headers.insert(header::REFERER, referer);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;

        let portal = Self { client, base_url };
        portal.open_session().await?;
        Ok(portal)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn open_session(&self) -> Result<(), PortalError> {
        let url = format!("{}/", self.base_url);
        debug!(url = %url, "opening portal session");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(error_for_status("session", status, &body));
        }
        Ok(())
    }

    /// Look up a single case. `Ok(None)` means the portal has no such case.
    pub async fn find_case(&self, query: &CaseQuery) -> Result<Option<CaseRecord>, PortalError> {
        let mut form = court_form(&query.court);
        let endpoint = match &query.key {
            CaseKey::Cnr { cnr } => {
                form.push(("cnr_number", cnr.clone()));
                CNR_SEARCH
            }
            CaseKey::Registration {
                case_type,
                case_number,
                case_year,
            } => {
                form.push(("case_type", case_type.clone()));
                form.push(("case_no", case_number.clone()));
                form.push(("case_year", case_year.to_string()));
                CASE_SEARCH
            }
        };

        info!(%query, endpoint, "searching portal");
        let request = self.client.post(self.url(endpoint)).form(&form);
        let Some(resp) = self.send(endpoint, request).await? else {
            info!(%query, "portal has no such case");
            return Ok(None);
        };

        let record = parse_case(endpoint, json_body(endpoint, resp).await?)?;
        match &record {
            Some(rec) => info!(case = rec.display_id().unwrap_or("-"), "case found"),
            None => info!(%query, "portal has no such case"),
        }
        Ok(record)
    }

    /// Ask the portal's cause-list index whether `record` is listed on `on`.
    ///
    /// Returns `Ok(None)` without a request when the record has no case id.
    pub async fn lookup_listing(
        &self,
        court: &CourtLocation,
        record: &CaseRecord,
        on: NaiveDate,
    ) -> Result<Option<CourtDetail>, PortalError> {
        let Some(case_id) = record.case_id.as_deref() else {
            debug!("record has no case id, skipping listing lookup");
            return Ok(None);
        };

        let mut form = court_form(court);
        form.push(("date", date::to_portal(on)));
        form.push(("case_id", case_id.to_string()));

        debug!(case_id, date = %on, "looking up listing");
        let request = self.client.post(self.url(LISTING_BY_DATE)).form(&form);
        let Some(resp) = self.send(LISTING_BY_DATE, request).await? else {
            return Ok(None);
        };
        parse_listing(json_body(LISTING_BY_DATE, resp).await?)
    }

    /// Listing status for one day: the record's own hearing dates first, then
    /// the portal's cause-list index when the record does not show a listing.
    pub async fn listing_status(
        &self,
        court: &CourtLocation,
        record: &CaseRecord,
        day: ListingDay,
        today: NaiveDate,
    ) -> Result<ListingStatus, PortalError> {
        let status = check_listing(record, day, today);
        if status.listed {
            return Ok(status);
        }
        Ok(match self.lookup_listing(court, record, status.date).await? {
            Some(detail) => status.with_portal_listing(detail),
            None => status,
        })
    }

    /// Fetch the daily cause list of a court establishment.
    pub async fn fetch_cause_list(
        &self,
        court: &CourtLocation,
        on: NaiveDate,
    ) -> Result<Document, PortalError> {
        let missing = || {
            PortalError::DocumentNotFound(format!(
                "cause list for {}/{} on {}",
                court.state_code,
                court.district_code,
                date::to_portal(on)
            ))
        };

        let mut form = court_form(court);
        form.push(("date", date::to_portal(on)));

        info!(state = %court.state_code, district = %court.district_code, date = %on, "fetching cause list");
        let request = self.client.post(self.url(DAILY_CAUSE_LIST)).form(&form);
        let Some(resp) = self.send(DAILY_CAUSE_LIST, request).await? else {
            return Err(missing());
        };

        if is_pdf(&resp) {
            let bytes = resp.bytes().await?;
            if bytes.is_empty() {
                return Err(missing());
            }
            return Ok(Document {
                kind: DocumentKind::Pdf,
                bytes: bytes.to_vec(),
            });
        }

        let value = json_body(DAILY_CAUSE_LIST, resp).await?;
        if is_blank(&value) {
            return Err(missing());
        }
        Ok(Document {
            kind: DocumentKind::Json,
            bytes: serde_json::to_vec_pretty(&value)?,
        })
    }

    /// Fetch a case document. Anything but a non-empty PDF is "not found".
    pub async fn fetch_case_pdf(
        &self,
        court: &CourtLocation,
        document: &DocumentRef,
    ) -> Result<Document, PortalError> {
        let (request, label) = match document {
            DocumentRef::Url(link) => (self.client.get(self.resolve(link)), link.as_str()),
            DocumentRef::CaseId(case_id) => (
                self.client.get(self.url(CASE_PDF)).query(&[
                    ("case_id", case_id.as_str()),
                    ("state_code", court.state_code.as_str()),
                ]),
                case_id.as_str(),
            ),
        };
        let missing = || PortalError::DocumentNotFound(format!("case PDF for {label}"));

        info!(document = label, "fetching case PDF");
        let Some(resp) = self.send(CASE_PDF, request).await? else {
            return Err(missing());
        };

        if !is_pdf(&resp) {
            let body = resp.text().await.unwrap_or_default();
            if is_captcha_page(&body) {
                return Err(PortalError::CaptchaRequired {
                    endpoint: CASE_PDF.to_string(),
                });
            }
            warn!(document = label, "portal answered without a PDF");
            return Err(missing());
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(missing());
        }
        Ok(Document {
            kind: DocumentKind::Pdf,
            bytes: bytes.to_vec(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn resolve(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            self.url(link.trim_start_matches('/'))
        }
    }

    /// Send a request; `Ok(None)` on 404, error on any other non-success status.
    async fn send(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<Option<Response>, PortalError> {
        let resp = request.send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!(endpoint, "portal returned 404");
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(error_for_status(endpoint, status, &body));
        }
        Ok(Some(resp))
    }
}

fn court_form(court: &CourtLocation) -> Vec<(&'static str, String)> {
    vec![
        ("state_code", court.state_code.clone()),
        ("dist_code", court.district_code.clone()),
    ]
}

fn error_for_status(endpoint: &str, status: StatusCode, body: &str) -> PortalError {
    if is_captcha_page(body) {
        return PortalError::CaptchaRequired {
            endpoint: endpoint.to_string(),
        };
    }
    PortalError::Server {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body: body.chars().take(MAX_BODY_IN_ERROR).collect(),
    }
}

async fn json_body(endpoint: &str, resp: Response) -> Result<Value, PortalError> {
    let text = resp.text().await?;
    classify_body(endpoint, &text)
}

/// Turn a response body into JSON, recognising CAPTCHA and HTML pages.
fn classify_body(endpoint: &str, text: &str) -> Result<Value, PortalError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Value::Null);
    }
    if text.starts_with('<') {
        if is_captcha_page(text) {
            return Err(PortalError::CaptchaRequired {
                endpoint: endpoint.to_string(),
            });
        }
        return Err(PortalError::unexpected(endpoint, "HTML page instead of JSON"));
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| PortalError::unexpected(endpoint, format!("invalid JSON: {e}")))?;
    if value.get("captcha_required").and_then(Value::as_bool) == Some(true) {
        return Err(PortalError::CaptchaRequired {
            endpoint: endpoint.to_string(),
        });
    }
    Ok(value)
}

/// A query must resolve to at most one case.
fn parse_case(endpoint: &str, value: Value) -> Result<Option<CaseRecord>, PortalError> {
    match value {
        Value::Null => Ok(None),
        Value::Array(mut items) => match items.len() {
            0 => Ok(None),
            1 => parse_case(endpoint, items.remove(0)),
            n => Err(PortalError::Ambiguous(n)),
        },
        Value::Object(_) => {
            let record: CaseRecord = serde_json::from_value(value)?;
            Ok((!record.is_empty()).then_some(record))
        }
        other => Err(PortalError::unexpected(
            endpoint,
            format!("expected a case object, got {other}"),
        )),
    }
}

fn parse_listing(value: Value) -> Result<Option<CourtDetail>, PortalError> {
    if !value.is_object() {
        return Ok(None);
    }
    let listing: ListingResponse = serde_json::from_value(value)?;
    if !listing.is_listed {
        return Ok(None);
    }
    Ok(Some(CourtDetail {
        court_name: listing.court_name,
        court_hall: listing.court_hall,
        serial_number: listing.serial_no,
        hearing_time: listing.hearing_time,
    }))
}

fn is_pdf(resp: &Response) -> bool {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().starts_with("application/pdf"))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Elements the portal renders on its human-verification form. A bare
/// mention of "captcha" (for example a script include on an error page) is
/// not enough.
const CAPTCHA_ELEMENTS: &str = "#captcha_image, #captcha, img[src*=\"captcha\"], \
     input[name*=\"captcha\"], input[id*=\"captcha\"]";

static CAPTCHA_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| {
    Selector::parse(CAPTCHA_ELEMENTS)
        .map_err(|e| warn!(error = ?e, "invalid CAPTCHA selector"))
        .ok()
});

fn is_captcha_page(body: &str) -> bool {
    let Some(selector) = CAPTCHA_SELECTOR.as_ref() else {
        return false;
    };
    Html::parse_document(body).select(selector).next().is_some()
}
