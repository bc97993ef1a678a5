// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Feed entity.
//!
//! A feed is a named collection of datastreams on the service. Only the
//! fields declared on [`Feed`] are ever serialized; unset optional fields are
//! omitted from the body.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConstructionError;

const DEFAULT_VERSION: &str = "1.0.0";

/// Options for [`Feed::new`]. At least one of `title` and `id` is required.
#[derive(Debug, Clone, Default)]
pub struct FeedOptions {
    pub title: Option<String>,
    pub version: Option<String>,
    pub website: Option<String>,
    pub tags: Vec<String>,
    pub id: Option<u64>,
    pub private: bool,
}

impl FeedOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_id(id: u64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }
}

/// A feed, as sent to and received from the service.
///
/// Deserialization goes through [`Feed::new`], so a body with neither a title
/// nor an id is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FeedRecord")]
pub struct Feed {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,

    version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    website: Option<String>,

    tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,

    private: bool,
}

/// Feed body as received, before validation.
#[derive(Deserialize)]
struct FeedRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    id: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    private: bool,
}

impl TryFrom<FeedRecord> for Feed {
    type Error = ConstructionError;

    fn try_from(record: FeedRecord) -> Result<Self, Self::Error> {
        Feed::new(FeedOptions {
            title: record.title,
            version: record.version,
            website: record.website,
            tags: record.tags,
            id: record.id,
            private: record.private,
        })
    }
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// The service reports `private` either as a JSON bool or as `"true"`/`"false"`.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid private flag: {}",
                other
            ))),
        },
    }
}

impl Feed {
    /// Create a feed. Fails unless a title or an id is given.
    pub fn new(options: FeedOptions) -> Result<Self, ConstructionError> {
        if options.title.is_none() && options.id.is_none() {
            return Err(ConstructionError::MissingIdentity);
        }
        Ok(Self {
            title: options.title,
            version: options.version.unwrap_or_else(default_version),
            website: options.website,
            tags: options.tags,
            id: options.id,
            private: options.private,
        })
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn set_website(&mut self, website: impl Into<String>) {
        self.website = Some(website.into());
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn set_private(&mut self, private: bool) {
        self.private = private;
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    /// Remove the first occurrence of `tag`. Returns whether a tag was removed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        match self.tags.iter().position(|t| t == tag) {
            Some(index) => {
                self.tags.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
