use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("invalid portal base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("portal returned {status} for {endpoint}: {body}")]
    Server {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("portal requires human verification (CAPTCHA) at {endpoint}; cannot continue automatically")]
    CaptchaRequired { endpoint: String },

    #[error("unexpected response from {endpoint}: {detail}")]
    UnexpectedResponse { endpoint: String, detail: String },

    #[error("portal returned {0} cases for a query that must match at most one")]
    Ambiguous(usize),

    #[error("no document available: {0}")]
    DocumentNotFound(String),

    #[error("output directory {path} is not writable: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PortalError {
    pub(crate) fn unexpected(endpoint: &str, detail: impl Into<String>) -> Self {
        PortalError::UnexpectedResponse {
            endpoint: endpoint.to_string(),
            detail: detail.into(),
        }
    }
}
