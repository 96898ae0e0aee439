//! JSON HTTP API exposing case search, listing check and cause lists.
//!
//! Every request opens its own portal session; the server holds no state
//! beyond its configuration.

mod error;

use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use ecourts_core::record::{lenient_bool, lenient_string};
use ecourts_core::{CaseQuery, CaseRecord, CourtLocation, ListingDay};
use ecourts_portal::{DocumentKind, PortalClient, PortalConfig};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Server configuration; request bodies may override the court codes.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub portal: PortalConfig,
    pub state_code: String,
    pub district_code: String,
}

impl ApiState {
    fn court(&self, state: Option<&str>, district: Option<&str>) -> Result<CourtLocation, ApiError> {
        Ok(CourtLocation::new(
            state.unwrap_or(&self.state_code),
            district.unwrap_or(&self.district_code),
        )?)
    }
}

type Shared = State<Arc<ApiState>>;

// Request bodies accept numbers where strings are expected; clients often
// send case numbers and years unquoted.

#[derive(Debug, Deserialize)]
struct CnrSearch {
    #[serde(default, deserialize_with = "lenient_string")]
    cnr: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    state_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    district_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaseSearch {
    #[serde(default, deserialize_with = "lenient_string")]
    case_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    case_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    case_year: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    state_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    district_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingCheck {
    #[serde(default, deserialize_with = "lenient_string")]
    cnr: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    case_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    case_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    case_year: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    check_today: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    check_tomorrow: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    state_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    district_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CauseListParams {
    date: Option<String>,
    state_code: Option<String>,
    district_code: Option<String>,
}

/// JSON body extraction that reports malformed bodies as `{"error": ...}`.
type Body<T> = Result<Json<T>, JsonRejection>;

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/docs", get(docs))
        .route("/api/search/cnr", post(search_cnr))
        .route("/api/search/case", post(search_case))
        .route("/api/listing/check", post(listing_check))
        .route("/api/causelist", get(cause_list))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

pub async fn serve(bind_addr: &str, state: ApiState) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("API server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn timestamp() -> String {
    Local::now().to_rfc3339()
}

fn success(data: Value) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
        "timestamp": timestamp(),
    }))
}

async fn find(state: &ApiState, query: &CaseQuery) -> Result<(PortalClient, CaseRecord), ApiError> {
    let client = PortalClient::connect(&state.portal).await?;
    match client.find_case(query).await? {
        Some(record) => Ok((client, record)),
        None => Err(ApiError::NotFound("Case not found".into())),
    }
}

async fn index() -> Json<Value> {
    Json(json!({
        "name": "eCourts India case listing API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/api/search/cnr": "POST - search by CNR number",
            "/api/search/case": "POST - search by case type, number and year",
            "/api/listing/check": "POST - check listing for today and/or tomorrow",
            "/api/causelist": "GET - cause list for today or tomorrow",
            "/health": "GET - health check",
        },
        "documentation": "/docs",
    }))
}

async fn docs(headers: HeaderMap) -> Json<Value> {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    Json(json!({
        "title": "eCourts India case listing API",
        "version": env!("CARGO_PKG_VERSION"),
        "base_url": format!("http://{host}/"),
        "endpoints": [
            {
                "path": "/api/search/cnr",
                "method": "POST",
                "description": "Search a case by CNR number",
                "request_body": {
                    "cnr": "string (required)",
                    "state_code": "string (optional)",
                    "district_code": "string (optional)",
                },
                "example": { "cnr": "DLNC010012342024", "state_code": "DL", "district_code": "1" },
            },
            {
                "path": "/api/search/case",
                "method": "POST",
                "description": "Search a case by type, number and year",
                "request_body": {
                    "case_type": "string (required)",
                    "case_number": "string (required)",
                    "case_year": "string (required)",
                    "state_code": "string (optional)",
                    "district_code": "string (optional)",
                },
                "example": { "case_type": "CS", "case_number": "123", "case_year": "2024", "state_code": "DL" },
            },
            {
                "path": "/api/listing/check",
                "method": "POST",
                "description": "Check whether a case is listed today and/or tomorrow",
                "request_body": {
                    "cnr": "string (required if no case details)",
                    "case_type": "string (required if no CNR)",
                    "case_number": "string (required if no CNR)",
                    "case_year": "string (required if no CNR)",
                    "check_today": "boolean (optional)",
                    "check_tomorrow": "boolean (optional)",
                    "state_code": "string (optional)",
                    "district_code": "string (optional)",
                },
                "example": { "cnr": "DLNC010012342024", "check_today": true, "check_tomorrow": true },
            },
            {
                "path": "/api/causelist",
                "method": "GET",
                "description": "Cause list of the court for a date",
                "query_params": {
                    "date": "today or tomorrow (default: today)",
                    "state_code": "string (optional)",
                    "district_code": "string (optional)",
                },
                "example": "/api/causelist?date=today&state_code=DL",
            },
        ],
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "timestamp": timestamp() }))
}

async fn search_cnr(State(state): Shared, body: Body<CnrSearch>) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let cnr = body
        .cnr
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("CNR number is required".into()))?;
    let court = state.court(body.state_code.as_deref(), body.district_code.as_deref())?;
    let query = CaseQuery::by_cnr(court, cnr)?;

    let (_, record) = find(&state, &query).await?;
    Ok(success(json!(record)))
}

async fn search_case(State(state): Shared, body: Body<CaseSearch>) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let missing: Vec<&str> = [
        ("case_type", &body.case_type),
        ("case_number", &body.case_number),
        ("case_year", &body.case_year),
    ]
    .into_iter()
    .filter(|(_, v)| v.is_none())
    .map(|(k, _)| k)
    .collect();
    if !missing.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let court = state.court(body.state_code.as_deref(), body.district_code.as_deref())?;
    let query = CaseQuery::by_registration(
        court,
        body.case_type.as_deref().unwrap_or_default(),
        body.case_number.as_deref().unwrap_or_default(),
        body.case_year.as_deref().unwrap_or_default(),
    )?;

    let (_, record) = find(&state, &query).await?;
    Ok(success(json!(record)))
}

async fn listing_check(State(state): Shared, body: Body<ListingCheck>) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let court = state.court(body.state_code.as_deref(), body.district_code.as_deref())?;
    let query = match (&body.cnr, &body.case_type, &body.case_number, &body.case_year) {
        (Some(cnr), ..) => CaseQuery::by_cnr(court.clone(), cnr)?,
        (None, Some(t), Some(n), Some(y)) => CaseQuery::by_registration(court.clone(), t, n, y)?,
        _ => {
            return Err(ApiError::BadRequest(
                "Provide either CNR or case details (type, number, year)".into(),
            ));
        }
    };

    let (client, record) = find(&state, &query).await?;

    let today = Local::now().date_naive();
    let days = [
        (body.check_today, ListingDay::Today),
        (body.check_tomorrow, ListingDay::Tomorrow),
    ];
    let mut listings = Vec::new();
    for (_, day) in days.into_iter().filter(|(wanted, _)| *wanted) {
        listings.push(client.listing_status(&court, &record, day, today).await?);
    }
    let is_listed = listings.iter().any(|l| l.listed);

    Ok(Json(json!({
        "success": true,
        "data": { "case_details": record, "listings": listings },
        "is_listed": is_listed,
        "timestamp": timestamp(),
    })))
}

async fn cause_list(State(state): Shared, Query(params): Query<CauseListParams>) -> Result<Response, ApiError> {
    let day = match params.date.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("today") => ListingDay::Today,
        Some("tomorrow") => ListingDay::Tomorrow,
        Some(_) => {
            return Err(ApiError::BadRequest(
                "Invalid date parameter. Use \"today\" or \"tomorrow\"".into(),
            ));
        }
    };
    let court = state.court(params.state_code.as_deref(), params.district_code.as_deref())?;
    let date = day.resolve(Local::now().date_naive());

    let client = PortalClient::connect(&state.portal).await?;
    let document = client.fetch_cause_list(&court, date).await?;

    match document.kind {
        DocumentKind::Pdf => {
            Ok(([(header::CONTENT_TYPE, "application/pdf")], document.bytes).into_response())
        }
        DocumentKind::Json => {
            let data: Value = serde_json::from_slice(&document.bytes)
                .map_err(|e| ApiError::Internal(format!("cause list is not valid JSON: {e}")))?;
            Ok(Json(json!({
                "success": true,
                "data": data,
                "date": date.format("%Y-%m-%d").to_string(),
                "timestamp": timestamp(),
            }))
            .into_response())
        }
    }
}
