// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP client for the Cosm v2 API.
//!
//! # Endpoints
//!
//! - `GET    /v2/feeds/{id}`
//! - `POST   /v2/feeds`
//! - `PUT    /v2/feeds/{id}`
//! - `DELETE /v2/feeds/{id}`
//! - `POST   /v2/feeds/{id}/datastreams/{stream}/datapoints`
//!
//! Every request carries the `X-ApiKey` header.

use reqwest::header::LOCATION;
use reqwest::{Client, Method, RequestBuilder, Response};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ConstructionError, Result, TransportError};
use crate::feed::Feed;
use crate::point::DataPoint;
use crate::publisher::{DatapointsBody, PublishOutcome, Publisher, StreamAddress};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-ApiKey";

/// Response details of a feed create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub status: u16,
    /// `Location` header, set by the service on create.
    pub location: Option<String>,
}

/// Client for one API key against one server.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct CosmClient {
    server: String,
    api_key: String,
    http: Client,
}

impl CosmClient {
    /// Client for the default server.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig::new(api_key))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            server: config.server.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "cosm request");
        self.http
            .request(method, format!("{}{}", self.server, path))
            .header(API_KEY_HEADER, &self.api_key)
    }

    /// Send a request, turning non-2xx answers into [`TransportError::Status`].
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(TransportError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let raw = response.text().await.unwrap_or_default();
        Err(TransportError::from_status(status.as_u16(), raw).into())
    }

    /// Fetch a feed by id.
    pub async fn get_feed(&self, id: u64) -> Result<Feed> {
        let request = self.request(Method::GET, &feed_path(id));
        let response = self.execute(request).await?;
        let body = response.text().await.map_err(TransportError::from)?;
        let feed = serde_json::from_str(&body).map_err(TransportError::from)?;
        Ok(feed)
    }

    /// Create the feed if it has no id, update it otherwise.
    ///
    /// On create, the id at the end of the returned `Location` is assigned
    /// to `feed`.
    pub async fn save_feed(&self, feed: &mut Feed) -> Result<SaveOutcome> {
        let request = match feed.id() {
            Some(id) => self.request(Method::PUT, &feed_path(id)),
            None => self.request(Method::POST, "/v2/feeds"),
        }
        .json(&*feed);

        let response = self.execute(request).await?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if feed.id().is_none() {
            if let Some(id) = location.as_deref().and_then(id_from_location) {
                feed.set_id(id);
            }
        }

        Ok(SaveOutcome {
            status: response.status().as_u16(),
            location,
        })
    }

    /// Delete a saved feed.
    pub async fn delete_feed(&self, feed: &Feed) -> Result<u16> {
        let id = feed.id().ok_or(ConstructionError::FeedWithoutId)?;
        self.delete_feed_by_id(id).await
    }

    pub async fn delete_feed_by_id(&self, id: u64) -> Result<u16> {
        let request = self.request(Method::DELETE, &feed_path(id));
        let response = self.execute(request).await?;
        Ok(response.status().as_u16())
    }
}

impl Publisher for CosmClient {
    async fn publish(&self, address: &StreamAddress, batch: &[DataPoint]) -> Result<PublishOutcome> {
        let request = self
            .request(Method::POST, &address.datapoints_path())
            .json(&DatapointsBody { datapoints: batch });
        let response = self.execute(request).await?;
        Ok(PublishOutcome {
            status: response.status().as_u16(),
            points: batch.len(),
        })
    }
}

impl fmt::Debug for CosmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CosmClient")
            .field("server", &self.server)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn feed_path(id: u64) -> String {
    format!("/v2/feeds/{}", id)
}

/// Last path segment of a `Location` header, if numeric.
fn id_from_location(location: &str) -> Option<u64> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_location() {
        assert_eq!(id_from_location("http://api.cosm.com/feeds/12345"), Some(12345));
        assert_eq!(id_from_location("http://api.cosm.com/v2/feeds/7021/"), Some(7021));
        assert_eq!(id_from_location("http://api.cosm.com/feeds/new"), None);
        assert_eq!(id_from_location(""), None);
    }

    #[test]
    fn test_server_trailing_slash_trimmed() {
        let config = ClientConfig::new("key").with_server("http://localhost:8080/");
        let client = CosmClient::from_config(&config).unwrap();
        assert_eq!(client.server(), "http://localhost:8080");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = CosmClient::new("secret-key").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("http://api.cosm.com"));
        assert!(!debug.contains("secret-key"));
    }
}
