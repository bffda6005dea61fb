// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Backend object model: opaque IDs, parent links, permissions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// MIME type the backend uses to mark folder objects
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Fallback content type for uploads with no declared or detectable type
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Opaque backend identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A file or folder as the backend reports it.
///
/// Names are not unique within a parent and an object may have several
/// parents; the backend is always the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub id: ObjectId,
    pub name: String,
    pub parent_ids: BTreeSet<ObjectId>,
    pub mime_type: String,
    /// Absent for folders and backend-native documents
    pub size: Option<u64>,
    pub modified_time: DateTime<Utc>,
    pub trashed: bool,
}

impl RemoteObject {
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        !self.is_folder()
    }

    #[must_use]
    pub fn has_parent(&self, id: &ObjectId) -> bool {
        self.parent_ids.contains(id)
    }
}

/// Metadata for an object about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewObject {
    pub name: String,
    pub parent_ids: BTreeSet<ObjectId>,
    pub mime_type: String,
}

impl NewObject {
    pub fn file<S: Into<String>, M: Into<String>>(name: S, parent: ObjectId, mime_type: M) -> Self {
        Self {
            name: name.into(),
            parent_ids: BTreeSet::from([parent]),
            mime_type: mime_type.into(),
        }
    }

    pub fn folder<S: Into<String>>(name: S, parent: ObjectId) -> Self {
        Self::file(name, parent, FOLDER_MIME_TYPE)
    }
}

/// Partial update applied by `RemoteClient::update`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPatch {
    pub name: Option<String>,
    pub add_parents: Vec<ObjectId>,
    pub remove_parents: Vec<ObjectId>,
    pub mime_type: Option<String>,
    pub trashed: Option<bool>,
}

impl ObjectPatch {
    #[must_use]
    pub fn trash() -> Self {
        Self {
            trashed: Some(true),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn unlink(parent: ObjectId) -> Self {
        Self {
            remove_parents: vec![parent],
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.add_parents.is_empty()
            && self.remove_parents.is_empty()
            && self.mime_type.is_none()
            && self.trashed.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    Anyone,
    User,
    Group,
    Domain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionRole {
    Reader,
    Commenter,
    Writer,
    Owner,
}

/// A sharing grant on a backend object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    /// Assigned by the backend; empty on create requests
    pub id: String,
    pub kind: PermissionKind,
    pub role: PermissionRole,
}

impl Permission {
    #[must_use]
    pub fn anyone_reader() -> Self {
        Self {
            id: String::new(),
            kind: PermissionKind::Anyone,
            role: PermissionRole::Reader,
        }
    }

    #[must_use]
    pub fn is_anyone_reader(&self) -> bool {
        self.kind == PermissionKind::Anyone && self.role == PermissionRole::Reader
    }
}
