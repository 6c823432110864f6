//! Runtime configuration resolution.
//!
//! The configuration document is fetched lazily, at most once in flight,
//! and cached for the life of the client. A fetch failure falls back to a
//! static default instead of propagating; callers are never blocked on a
//! missing configuration.

use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::ClientError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

/// The subset of the configuration document the client consumes. Unknown
/// fields are ignored; missing ones take defaults, so a partially rolled
/// out server stays usable.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub event_categories: Vec<String>,
    pub event_statuses: Vec<String>,
    pub default_page_size: u32,
    pub currency_symbol: String,
    pub default_location: String,
    /// Kept untyped: structural validation happens where it is consumed
    /// (see `SearchClient::search_filters`), with defaults on bad shapes.
    pub search_filters: Option<serde_json::Value>,
    pub version: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            event_categories: vec![
                "music".to_string(),
                "dance".to_string(),
                "theater".to_string(),
                "workshop".to_string(),
                "other".to_string(),
            ],
            event_statuses: vec![
                "upcoming".to_string(),
                "ongoing".to_string(),
                "completed".to_string(),
                "cancelled".to_string(),
            ],
            default_page_size: 10,
            currency_symbol: "€".to_string(),
            default_location: "Berlin".to_string(),
            search_filters: None,
            version: "1.0.0".to_string(),
        }
    }
}

/// Dependency-injected configuration resolver with an internal cache and
/// explicit invalidation. Construct one per API origin and share it.
pub struct ConfigClient {
    http: reqwest::Client,
    base_url: String,
    cache: RwLock<Option<Arc<ClientConfig>>>,
    // Serializes fetches so concurrent first callers share one request.
    fetch_gate: Mutex<()>,
}

impl ConfigClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ConfigClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: RwLock::new(None),
            fetch_gate: Mutex::new(()),
        }
    }

    /// Base URL from `MELA_API_URL`, falling back to the local default.
    pub fn from_env() -> Self {
        let base = std::env::var("MELA_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        Self::new(base)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve the configuration: cached value, or one shared fetch, or
    /// the static fallback. Never fails.
    pub async fn fetch_config(&self) -> Arc<ClientConfig> {
        if let Some(cached) = self.cache.read().await.clone() {
            return cached;
        }

        let _gate = self.fetch_gate.lock().await;
        // A concurrent caller may have filled the cache while this one
        // waited on the gate.
        if let Some(cached) = self.cache.read().await.clone() {
            return cached;
        }

        let config = match self.fetch_remote().await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "config fetch failed, using defaults");
                self.fallback()
            }
        };

        let config = Arc::new(config);
        *self.cache.write().await = Some(Arc::clone(&config));
        config
    }

    async fn fetch_remote(&self) -> Result<ClientConfig, ClientError> {
        let url = format!("{}/config", self.base_url);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Endpoint {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }

    /// Static fallback, anchored to the origin this client was built for.
    fn fallback(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: self.base_url.clone(),
            ..ClientConfig::default()
        }
    }

    /// Cached value, if any, without triggering a fetch.
    pub async fn get_config(&self) -> Option<Arc<ClientConfig>> {
        self.cache.read().await.clone()
    }

    /// Drop the cache; the next `fetch_config` hits the network again.
    pub async fn clear(&self) {
        *self.cache.write().await = None;
    }
}
