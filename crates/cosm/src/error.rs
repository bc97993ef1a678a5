// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.
//!
//! Every failure is returned to the caller of the operation that detected it.
//! Nothing here is retried or logged by the library itself.

use serde::Deserialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::queue::MAX_CAPACITY;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// An object could not be constructed; nothing was created.
    #[error("construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// Enqueue attempted on a full queue.
    #[error("queue size {0} exceeded")]
    CapacityExceeded(usize),

    /// The HTTP call failed or the service answered with a non-2xx status.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Fatal errors raised while building a feed, datastream or queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("must provide a feed for this datastream")]
    MissingFeed,

    #[error("must provide a client for this datastream")]
    MissingClient,

    #[error("must provide a stream id for this datastream")]
    MissingStreamId,

    #[error("must provide a title or id")]
    MissingIdentity,

    #[error("feed has no id; save it before addressing it")]
    FeedWithoutId,

    #[error("queue must be between 1 and {max} (got {0})", max = MAX_CAPACITY)]
    QueueSize(usize),
}

/// Failures of the HTTP layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or other client-side fault.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("service returned {status}: {}", describe_body(.body.as_ref(), .raw))]
    Status {
        status: u16,
        body: Option<ApiErrorBody>,
        raw: String,
    },

    /// A 2xx response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    /// Build a status error, keeping the parsed error body when the service sent one.
    pub fn from_status(status: u16, raw: String) -> Self {
        let body = serde_json::from_str::<ApiErrorBody>(&raw).ok();
        TransportError::Status { status, body, raw }
    }

    /// HTTP status of the failed call, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Decode(_) => None,
        }
    }
}

/// Error representation returned by the service, e.g.
/// `{"title": "Not found", "errors": "I'm sorry ..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    pub title: String,
    #[serde(default)]
    pub errors: Option<String>,
}

fn describe_body(body: Option<&ApiErrorBody>, raw: &str) -> String {
    match body {
        Some(ApiErrorBody {
            title,
            errors: Some(errors),
        }) => format!("{} ({})", title, errors),
        Some(ApiErrorBody { title, errors: None }) => title.clone(),
        None if raw.trim().is_empty() => "<empty body>".to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_parses_api_body() {
        let raw = r#"{"title": "Not found", "errors": "I'm sorry we are unable to find the resource you are looking for."}"#;
        let err = TransportError::from_status(404, raw.to_string());

        assert_eq!(err.status(), Some(404));
        match &err {
            TransportError::Status { body: Some(body), .. } => {
                assert_eq!(body.title, "Not found");
                assert_eq!(
                    body.errors.as_deref(),
                    Some("I'm sorry we are unable to find the resource you are looking for.")
                );
            }
            other => panic!("expected parsed body, got: {:?}", other),
        }
        assert!(err.to_string().starts_with("service returned 404: Not found ("));
    }

    #[test]
    fn test_status_error_keeps_unparsed_body() {
        let err = TransportError::from_status(502, "Bad Gateway".to_string());
        match &err {
            TransportError::Status { body, raw, .. } => {
                assert!(body.is_none());
                assert_eq!(raw, "Bad Gateway");
            }
            other => panic!("expected status error, got: {:?}", other),
        }
        assert_eq!(err.to_string(), "service returned 502: Bad Gateway");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(Error::CapacityExceeded(3).to_string(), "queue size 3 exceeded");
        assert_eq!(
            ConstructionError::QueueSize(501).to_string(),
            "queue must be between 1 and 500 (got 501)"
        );
        assert_eq!(
            ConstructionError::MissingIdentity.to_string(),
            "must provide a title or id"
        );
    }
}
