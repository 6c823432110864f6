//! The client-side search service.
//!
//! Configuration resolves before any search goes out: `search_events`
//! awaits the [`ConfigClient`] for its API base URL, so the first search
//! cannot race an unresolved configuration.

use serde::Deserialize;
use std::sync::Arc;

use crate::config::ConfigClient;
use crate::error::ClientError;
use crate::filters::{EventFilters, SearchPage};

pub const DEFAULT_SEARCH_FIELDS: [&str; 5] =
    ["title", "description", "location", "category", "date"];
pub const DEFAULT_SORT_OPTIONS: [&str; 3] = ["date", "title", "price"];

/// Searchable fields and accepted sort keys, as advertised by the server
/// configuration (or the static defaults).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilterOptions {
    pub fields: Vec<String>,
    pub sort_options: Vec<String>,
}

impl Default for SearchFilterOptions {
    fn default() -> Self {
        SearchFilterOptions {
            fields: DEFAULT_SEARCH_FIELDS.iter().map(|s| s.to_string()).collect(),
            sort_options: DEFAULT_SORT_OPTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Seam for consumers that drive searches (the pager); lets tests swap in
/// a scripted implementation.
pub trait EventSearch {
    fn search(
        &self,
        filters: &EventFilters,
    ) -> impl std::future::Future<Output = Result<SearchPage, ClientError>> + Send;
}

pub struct SearchClient {
    http: reqwest::Client,
    config: Arc<ConfigClient>,
    auth_token: Option<String>,
}

impl SearchClient {
    pub fn new(config: Arc<ConfigClient>) -> Self {
        SearchClient {
            http: reqwest::Client::new(),
            config,
            auth_token: None,
        }
    }

    /// Attach a bearer token so results carry the viewer's star flags.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Issue a search. Zero matches come back as `Ok` with an empty page;
    /// only transport and endpoint failures are `Err`.
    pub async fn search_events(
        &self,
        filters: &EventFilters,
    ) -> Result<SearchPage, ClientError> {
        let config = self.config.fetch_config().await;
        let url = format!("{}/events/search", config.api_base_url.trim_end_matches('/'));

        let mut request = self.http.post(&url).json(&filters.to_request());
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Endpoint {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }

    /// Degrading variant: any failure resolves to the empty page at the
    /// requested limit instead of propagating. Callers that must tell
    /// "no matches" from "search failed" use [`Self::search_events`].
    pub async fn search_events_or_empty(&self, filters: &EventFilters) -> SearchPage {
        match self.search_events(filters).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(error = %e, "search failed, returning empty result set");
                SearchPage::empty(filters.limit_or_default())
            }
        }
    }

    /// Search field and sort option enumeration from configuration, with
    /// structural validation: a missing or malformed `searchFilters`
    /// section yields the defaults rather than an error.
    pub async fn search_filters(&self) -> SearchFilterOptions {
        let config = self.config.fetch_config().await;
        let Some(raw) = &config.search_filters else {
            return SearchFilterOptions::default();
        };
        match serde_json::from_value::<SearchFilterOptions>(raw.clone()) {
            Ok(options) if !options.fields.is_empty() && !options.sort_options.is_empty() => {
                options
            }
            _ => {
                tracing::warn!("invalid search filter configuration, using defaults");
                SearchFilterOptions::default()
            }
        }
    }
}

impl EventSearch for SearchClient {
    async fn search(&self, filters: &EventFilters) -> Result<SearchPage, ClientError> {
        self.search_events(filters).await
    }
}
