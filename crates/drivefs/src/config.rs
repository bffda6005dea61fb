// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Adapter configuration
//!
//! Loaded from YAML, e.g.
//!
//! ```yaml
//! root_id: 0AFolderIdOfTheShare
//! root_path: /projects/site
//! delete_policy: trash
//! duplicate_policy: newest_modified
//! cache_max_age: 5m
//! page_size: 200
//! request_timeout: 30s
//! visibility: anyone_with_link
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

/// Backend alias for the authenticated user's top-level folder
pub const DEFAULT_ROOT_ID: &str = "root";

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// What `delete` and `delete_directory` do to backend objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Move to the backend trash (recoverable)
    #[default]
    Trash,
    /// Delete immediately
    Permanent,
}

/// How to choose among several non-trashed objects sharing a name in one folder.
///
/// This is a best-effort heuristic: duplicate names are inherently ambiguous
/// in the backend. The choice is deterministic for identical backend state;
/// equal modification times fall back to ID order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Most recently modified wins (greatest ID on ties)
    #[default]
    NewestModified,
    /// Least recently modified wins (smallest ID on ties)
    OldestModified,
    /// Refuse to pick; report `AmbiguousName`
    Strict,
}

/// Mapping of the adapter's public/private visibility onto backend sharing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityMapping {
    /// Visibility operations report `Unsupported`
    #[default]
    Unsupported,
    /// Public means an "anyone with the link" reader permission exists
    AnyoneWithLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    #[serde(default = "default_root_id")]
    pub root_id: String,

    /// Folder path below `root_id` that becomes the adapter's `/`
    #[serde(default)]
    pub root_path: Option<String>,

    #[serde(default)]
    pub delete_policy: DeletePolicy,

    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Entries older than this are refetched; `None` keeps them until invalidated
    #[serde(default, deserialize_with = "deserialize_duration")]
    pub cache_max_age: Option<Duration>,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Upper bound on each client call, passed through as a timeout
    #[serde(default, deserialize_with = "deserialize_duration")]
    pub request_timeout: Option<Duration>,

    #[serde(default)]
    pub visibility: VisibilityMapping,
}

fn default_root_id() -> String {
    DEFAULT_ROOT_ID.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_duration::parse(&s).map_err(serde::de::Error::custom))
        .transpose()
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            root_id: default_root_id(),
            root_path: None,
            delete_policy: DeletePolicy::default(),
            duplicate_policy: DuplicatePolicy::default(),
            cache_max_age: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: None,
            visibility: VisibilityMapping::default(),
        }
    }
}

impl AdapterConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| Error::Config(format!("invalid adapter config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.root_id.trim().is_empty() {
            return Err(Error::Config("root_id must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be positive".to_string()));
        }
        if let Some(root_path) = &self.root_path {
            _ = crate::path::normalize(root_path)
                .map_err(|e| Error::Config(format!("invalid root_path: {e}")))?;
        }
        Ok(())
    }

    #[must_use]
    pub fn with_root_id<S: Into<String>>(mut self, root_id: S) -> Self {
        self.root_id = root_id.into();
        self
    }

    #[must_use]
    pub fn with_root_path<S: Into<String>>(mut self, root_path: S) -> Self {
        self.root_path = Some(root_path.into());
        self
    }

    #[must_use]
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    #[must_use]
    pub fn with_cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache_max_age = Some(max_age);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, mapping: VisibilityMapping) -> Self {
        self.visibility = mapping;
        self
    }
}

/// Adapter-facing visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

/// Per-call options for write, copy, move and directory creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Declared content type; detected from name and content when absent
    pub mime_type: Option<String>,
    pub visibility: Option<Visibility>,
}

impl WriteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }
}
