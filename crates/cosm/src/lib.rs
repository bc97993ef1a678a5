// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cosm feed client
//!
//! Represents remote feeds and their datastreams, and publishes timestamped
//! values to the service over HTTP.
//!
//! This crate provides:
//! - Feed entity with an explicit serialization schema and tag management
//! - Feed CRUD over the v2 HTTP API
//! - Datastream writers that buffer points in a bounded queue and publish
//!   them as one batch once the queue is full
//! - YAML configuration for the client and its datastreams
//!
//! # Overview
//!
//! ```text
//! add_point --> BoundedQueue<DataPoint> --[full]--> drain --> Publisher --> service
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use cosm::{CosmClient, Datastream, Feed, FeedOptions};
//!
//! # async fn run() -> cosm::Result<()> {
//! let client = CosmClient::new("YOUR_API_KEY")?;
//! let feed = Feed::new(FeedOptions::with_id(12345))?;
//!
//! let mut stream = Datastream::builder("temperature")
//!     .feed(&feed)
//!     .publisher(client)
//!     .queue_size(20)
//!     .build()?;
//!
//! // Buffered; the 20th call publishes all 20 points in one request.
//! stream.add_point(21.5, None).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod datastream;
pub mod error;
pub mod feed;
pub mod point;
pub mod publisher;
pub mod queue;

pub use client::{CosmClient, SaveOutcome};
pub use config::{ClientConfig, ConfigError, PushConfig, StreamConfig};
pub use datastream::{Datastream, DatastreamBuilder, SharedDatastream};
pub use error::{ApiErrorBody, ConstructionError, Error, Result, TransportError};
pub use feed::{Feed, FeedOptions};
pub use point::{Clock, DataPoint, FixedClock, SystemClock};
pub use publisher::{PublishOutcome, Publisher, StreamAddress};
pub use queue::BoundedQueue;
