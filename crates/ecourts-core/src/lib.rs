pub mod date;
pub mod listing;
pub mod query;
pub mod record;
pub mod target;

pub use listing::{CourtDetail, ListingDay, ListingStatus, check_listing};
pub use query::{CaseKey, CaseQuery, CourtLocation, QueryError};
pub use record::{CaseRecord, Hearing};
pub use target::{DocumentRef, DownloadTarget};
