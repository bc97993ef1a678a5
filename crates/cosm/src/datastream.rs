// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Datastream writer with buffered, batch-flushed publishing.
//!
//! Each datastream owns one [`BoundedQueue`] of points. Points are buffered
//! until the queue is full; the call that fills it drains the whole queue
//! and submits it as a single batch through the [`Publisher`].
//!
//! ```text
//! add_point --> BoundedQueue --[full]--> drain --> Publisher::publish --> service
//! ```
//!
//! A batch whose publish call fails is not put back: once drained, its points
//! are gone from the datastream and the error is returned to the caller.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{ConstructionError, Result};
use crate::feed::Feed;
use crate::point::{Clock, DataPoint, SystemClock};
use crate::publisher::{PublishOutcome, Publisher, StreamAddress};
use crate::queue::BoundedQueue;

/// Default queue size: every point is published immediately.
pub const DEFAULT_QUEUE_SIZE: usize = 1;

/// A datastream shared between tasks. The mutex makes each
/// enqueue/drain/submit sequence atomic per datastream.
pub type SharedDatastream<P> = Arc<tokio::sync::Mutex<Datastream<P>>>;

/// One time-series within a feed.
pub struct Datastream<P> {
    address: StreamAddress,
    publisher: P,
    queue: BoundedQueue<DataPoint>,
    clock: Arc<dyn Clock>,
    points_accepted: u64,
    batches_published: u64,
    batches_failed: u64,
}

/// Builder for [`Datastream`].
pub struct DatastreamBuilder<P> {
    stream_id: String,
    feed_id: Option<Option<u64>>,
    publisher: Option<P>,
    queue_size: usize,
    clock: Arc<dyn Clock>,
}

impl<P: Publisher> DatastreamBuilder<P> {
    /// Feed the datastream belongs to. The feed must already have an id.
    pub fn feed(mut self, feed: &Feed) -> Self {
        self.feed_id = Some(feed.id());
        self
    }

    /// Address the datastream by feed id directly.
    pub fn feed_id(mut self, feed_id: u64) -> Self {
        self.feed_id = Some(Some(feed_id));
        self
    }

    /// Client used to publish batches.
    pub fn publisher(mut self, publisher: P) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Number of points buffered before a flush (1..=500, default 1).
    pub fn queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    /// Clock used for points added without a timestamp.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn build(self) -> Result<Datastream<P>> {
        if self.stream_id.is_empty() {
            return Err(ConstructionError::MissingStreamId.into());
        }
        let feed_id = match self.feed_id {
            None => return Err(ConstructionError::MissingFeed.into()),
            Some(None) => return Err(ConstructionError::FeedWithoutId.into()),
            Some(Some(id)) => id,
        };
        let publisher = self.publisher.ok_or(ConstructionError::MissingClient)?;
        let queue = BoundedQueue::new(self.queue_size)?;

        Ok(Datastream {
            address: StreamAddress::new(feed_id, self.stream_id),
            publisher,
            queue,
            clock: self.clock,
            points_accepted: 0,
            batches_published: 0,
            batches_failed: 0,
        })
    }
}

impl<P: Publisher> Datastream<P> {
    /// Start building a datastream with the given stream id.
    pub fn builder(stream_id: impl Into<String>) -> DatastreamBuilder<P> {
        DatastreamBuilder {
            stream_id: stream_id.into(),
            feed_id: None,
            publisher: None,
            queue_size: DEFAULT_QUEUE_SIZE,
            clock: Arc::new(SystemClock),
        }
    }

    /// Buffer a point, publishing the whole buffer if it is now full.
    ///
    /// `at` defaults to the datastream's clock. Returns `Ok(None)` when the
    /// point was only buffered and `Ok(Some(outcome))` when a batch was
    /// published. A publish error is returned as-is; the drained batch is
    /// discarded.
    pub async fn add_point(
        &mut self,
        value: impl ToString,
        at: Option<DateTime<Utc>>,
    ) -> Result<Option<PublishOutcome>> {
        let at = at.unwrap_or_else(|| self.clock.now());
        self.queue.enqueue(DataPoint::new(at, value))?;
        self.points_accepted += 1;

        trace!(
            feed_id = self.address.feed_id,
            stream_id = %self.address.stream_id,
            buffered = self.queue.len(),
            "point buffered"
        );

        if !self.queue.is_full() {
            return Ok(None);
        }
        let batch = self.queue.drain();
        self.submit(batch).await.map(Some)
    }

    /// Publish whatever is buffered, even if the queue is not full.
    ///
    /// Returns `Ok(None)` without a network call when nothing is buffered.
    pub async fn flush(&mut self) -> Result<Option<PublishOutcome>> {
        if self.queue.is_empty() {
            return Ok(None);
        }
        let batch = self.queue.drain();
        self.submit(batch).await.map(Some)
    }

    async fn submit(&mut self, batch: Vec<DataPoint>) -> Result<PublishOutcome> {
        debug!(
            feed_id = self.address.feed_id,
            stream_id = %self.address.stream_id,
            points = batch.len(),
            "publishing batch"
        );
        let result = self.publisher.publish(&self.address, &batch).await;
        match result {
            Ok(_) => self.batches_published += 1,
            Err(_) => self.batches_failed += 1,
        }
        result
    }

    /// Wrap this datastream for use from several tasks.
    pub fn into_shared(self) -> SharedDatastream<P> {
        Arc::new(tokio::sync::Mutex::new(self))
    }
}

impl<P> Datastream<P> {
    pub fn id(&self) -> &str {
        &self.address.stream_id
    }

    pub fn feed_id(&self) -> u64 {
        self.address.feed_id
    }

    pub fn address(&self) -> &StreamAddress {
        &self.address
    }

    pub fn queue_size(&self) -> usize {
        self.queue.capacity()
    }

    /// Points currently buffered.
    pub fn buffered(&self) -> usize {
        self.queue.len()
    }

    pub fn points_accepted(&self) -> u64 {
        self.points_accepted
    }

    pub fn batches_published(&self) -> u64 {
        self.batches_published
    }

    pub fn batches_failed(&self) -> u64 {
        self.batches_failed
    }
}

impl<P> fmt::Debug for Datastream<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datastream")
            .field("address", &self.address)
            .field("queue_size", &self.queue.capacity())
            .field("buffered", &self.queue.len())
            .finish_non_exhaustive()
    }
}

/// Serializes as `{"id": "<stream id>"}`.
impl<P> Serialize for Datastream<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Datastream", 1)?;
        state.serialize_field("id", &self.address.stream_id)?;
        state.end()
    }
}
