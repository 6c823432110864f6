//! The event search pipeline: filter validation, SQL construction, and
//! execution with pagination metadata.

pub mod executor;
pub mod filters;
pub mod query;

pub use executor::{PageMeta, SearchResults};
pub use filters::{EventFilters, SearchRequest, SortField, SortOrder};
