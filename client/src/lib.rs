//! Client library for the mela events API: configuration resolution,
//! the search service, and page-level search state.

pub mod config;
pub mod error;
pub mod filters;
pub mod pager;
pub mod search;

pub use config::{ClientConfig, ConfigClient, DEFAULT_API_BASE_URL};
pub use error::ClientError;
pub use filters::{DateRange, Event, EventFilters, PageMeta, SearchPage};
pub use pager::{EventPager, PagerPhase, RequestToken};
pub use search::{EventSearch, SearchClient, SearchFilterOptions};
