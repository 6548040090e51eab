//! Remote watchlist store
//!
//! Whole-collection save/load against the REST backend. There is no
//! request sequencing: if two saves race, whichever lands last wins.

use crate::api::types::{
    DbInfoResponse, ErrorBody, LoadWatchlistResponse, SaveWatchlistRequest,
    SaveWatchlistResponse,
};
use crate::config::ClientConfig;
use crate::error::{AppError, Result};
use crate::watchlist::row::Row;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

const SAVE_FALLBACK: &str = "Failed to save to database";
const LOAD_FALLBACK: &str = "Failed to load from database";
const INFO_FALLBACK: &str = "Failed to get database info";

/// Remote persistence contract
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Store the full collection as a new snapshot
    async fn save(&self, rows: &[Row]) -> Result<SaveWatchlistResponse>;

    /// Rows of the latest snapshot; empty when none exists
    async fn load(&self) -> Result<Vec<Row>>;

    async fn db_info(&self) -> Result<DbInfoResponse>;
}

/// reqwest-backed client for the watchlist server
pub struct HttpRemoteStore {
    client: Client,
    base_url: Url,
}

impl HttpRemoteStore {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut raw = config.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }

        let base_url = Url::parse(&raw)
            .map_err(|e| AppError::Config(format!("Invalid API base URL {}: {}", config.base_url, e)))?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Config(format!("Invalid endpoint {}: {}", path, e)))
    }

    /// The request never got a response
    fn transport_error(e: reqwest::Error) -> AppError {
        tracing::error!("Watchlist API unreachable: {}", e);
        AppError::Network(format!("Could not reach watchlist server: {}", e))
    }

    /// Decode a 2xx body, or turn a failure into the server's message
    async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            let message = body.error.unwrap_or_else(|| fallback.to_string());
            tracing::error!("Watchlist API returned {}: {}", status, message);
            return Err(AppError::Network(message));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn save(&self, rows: &[Row]) -> Result<SaveWatchlistResponse> {
        let response = self
            .client
            .post(self.endpoint("save-watchlist")?)
            .json(&SaveWatchlistRequest { data: rows })
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::decode(response, SAVE_FALLBACK).await
    }

    async fn load(&self) -> Result<Vec<Row>> {
        let response = self
            .client
            .get(self.endpoint("load-watchlist")?)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let body: LoadWatchlistResponse = Self::decode(response, LOAD_FALLBACK).await?;
        Ok(body.data)
    }

    async fn db_info(&self) -> Result<DbInfoResponse> {
        let response = self
            .client
            .get(self.endpoint("db-info")?)
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode(response, INFO_FALLBACK).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_endpoints_keep_api_prefix() {
        let config = ClientConfig {
            base_url: "http://localhost:3000/api".to_string(),
            timeout: Duration::from_secs(5),
        };
        let store = HttpRemoteStore::new(&config).unwrap();

        assert_eq!(
            store.endpoint("save-watchlist").unwrap().as_str(),
            "http://localhost:3000/api/save-watchlist"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert!(matches!(HttpRemoteStore::new(&config), Err(AppError::Config(_))));
    }
}
