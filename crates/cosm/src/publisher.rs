// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Outbound submission of datapoint batches.
//!
//! # Architecture
//!
//! ```text
//! Publisher Trait
//! +-- CosmClient   (HTTP POST to /v2/feeds/{feed}/datastreams/{stream}/datapoints)
//! +-- test doubles (record batches in memory)
//! ```

use serde::Serialize;
use std::fmt;

use crate::error::Error;
use crate::point::DataPoint;

/// Where a datastream's batches are published.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamAddress {
    pub feed_id: u64,
    pub stream_id: String,
}

impl StreamAddress {
    pub fn new(feed_id: u64, stream_id: impl Into<String>) -> Self {
        Self {
            feed_id,
            stream_id: stream_id.into(),
        }
    }

    /// Path of the datapoints resource, relative to the server root.
    pub fn datapoints_path(&self) -> String {
        format!(
            "/v2/feeds/{}/datastreams/{}/datapoints",
            self.feed_id, self.stream_id
        )
    }
}

impl fmt::Display for StreamAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feed {} / stream {}", self.feed_id, self.stream_id)
    }
}

/// Wire body of a publish call: `{"datapoints": [...]}` in batch order.
#[derive(Debug, Serialize)]
pub struct DatapointsBody<'a> {
    pub datapoints: &'a [DataPoint],
}

/// Result of a successful publish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOutcome {
    /// HTTP status returned by the service.
    pub status: u16,
    /// Number of points carried by the batch.
    pub points: usize,
}

/// Performs the network submission of one batch.
///
/// Implementations own timeouts and cancellation; the outcome is handed back
/// to the datastream unchanged.
pub trait Publisher: Send + Sync {
    fn publish(
        &self,
        address: &StreamAddress,
        batch: &[DataPoint],
    ) -> impl std::future::Future<Output = Result<PublishOutcome, Error>> + Send;
}
