//! Portal access: session-aware HTTP client and document downloader.

pub mod client;
pub mod download;
mod error;

#[cfg(any(test, feature = "fake-portal"))]
pub mod fake_portal;

pub use client::{DEFAULT_BASE_URL, Document, DocumentKind, PortalClient, PortalConfig};
pub use download::download;
pub use error::PortalError;
