// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory remote object client
//!
//! Behaves like the remote backend for everything the adapter relies on:
//! opaque IDs, multiple parents, duplicate names, trash flags, paginated
//! query listing and chunked downloads. Used as the test double and for
//! running the adapter without a network.

use crate::client::{ByteStream, ListPage, PageRequest, RemoteClient, RemoteResult, collect_bytes};
use crate::error::{RemoteError, RemoteErrorKind};
use crate::object::{
    FOLDER_MIME_TYPE, NewObject, ObjectId, ObjectPatch, Permission, RemoteObject,
};
use crate::query::Query;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const ROOT_ID: &str = "root";

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Number of client calls made, per method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: u64,
    pub get: u64,
    pub create: u64,
    pub update: u64,
    pub delete: u64,
    pub download: u64,
    pub permissions: u64,
}

impl CallCounts {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.list
            + self.get
            + self.create
            + self.update
            + self.delete
            + self.download
            + self.permissions
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    object: RemoteObject,
    content: Bytes,
    permissions: Vec<Permission>,
}

pub struct State {
    // Ids are zero-padded sequence numbers, so map order is creation order
    objects: BTreeMap<ObjectId, StoredObject>,
    next_id: u64,
    next_permission: u64,
    clock: DateTime<Utc>,
    calls: CallCounts,
    page_limit: Option<u32>,
    chunk_size: usize,
}

impl Default for State {
    fn default() -> Self {
        let clock = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let root = RemoteObject {
            id: ObjectId::from(ROOT_ID),
            name: "My Drive".to_string(),
            parent_ids: BTreeSet::new(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            size: None,
            modified_time: clock,
            trashed: false,
        };
        Self {
            objects: BTreeMap::from([(
                root.id.clone(),
                StoredObject {
                    object: root,
                    content: Bytes::new(),
                    permissions: Vec::new(),
                },
            )]),
            next_id: 1,
            next_permission: 1,
            clock,
            calls: CallCounts::default(),
            page_limit: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl State {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += Duration::seconds(1);
        self.clock
    }

    fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId::new(format!("obj-{:06}", self.next_id));
        self.next_id += 1;
        id
    }

    fn stored(&self, id: &ObjectId) -> RemoteResult<&StoredObject> {
        self.objects
            .get(id)
            .ok_or_else(|| RemoteError::not_found(format!("object {id}")))
    }

    fn stored_mut(&mut self, id: &ObjectId) -> RemoteResult<&mut StoredObject> {
        self.objects
            .get_mut(id)
            .ok_or_else(|| RemoteError::not_found(format!("object {id}")))
    }

    fn check_parents<'a, I: IntoIterator<Item = &'a ObjectId>>(&self, parents: I) -> RemoteResult<()> {
        for parent in parents {
            let stored = self.stored(parent)?;
            if !stored.object.is_folder() {
                return Err(RemoteError::new(
                    RemoteErrorKind::Other,
                    format!("parent {parent} is not a folder"),
                ));
            }
        }
        Ok(())
    }

    fn insert(&mut self, new: NewObject, content: Bytes, modified: DateTime<Utc>) -> RemoteObject {
        let id = self.allocate_id();
        let is_folder = new.mime_type == FOLDER_MIME_TYPE;
        let object = RemoteObject {
            id: id.clone(),
            name: new.name,
            parent_ids: new.parent_ids,
            mime_type: new.mime_type,
            size: (!is_folder).then_some(content.len() as u64),
            modified_time: modified,
            trashed: false,
        };
        _ = self.objects.insert(
            id,
            StoredObject {
                object: object.clone(),
                content,
                permissions: Vec::new(),
            },
        );
        object
    }
}

/// Shared handle; clones see the same objects
#[derive(Clone, Default)]
pub struct MemoryClient(Arc<Mutex<State>>);

impl MemoryClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap every listing page at `limit` entries regardless of the requested size
    pub async fn set_page_limit(&self, limit: u32) {
        self.0.lock().await.page_limit = Some(limit.max(1));
    }

    pub async fn set_chunk_size(&self, chunk_size: usize) {
        self.0.lock().await.chunk_size = chunk_size.max(1);
    }

    pub async fn calls(&self) -> CallCounts {
        self.0.lock().await.calls
    }

    pub async fn reset_calls(&self) {
        self.0.lock().await.calls = CallCounts::default();
    }

    /// Seed an object directly, bypassing call accounting
    pub async fn insert(
        &self,
        name: &str,
        parents: &[&ObjectId],
        mime_type: &str,
        content: &[u8],
    ) -> RemoteObject {
        let mut state = self.0.lock().await;
        let modified = state.tick();
        let new = NewObject {
            name: name.to_string(),
            parent_ids: parents.iter().map(|p| (*p).clone()).collect(),
            mime_type: mime_type.to_string(),
        };
        state.insert(new, Bytes::copy_from_slice(content), modified)
    }

    pub async fn insert_folder(&self, name: &str, parent: &ObjectId) -> RemoteObject {
        self.insert(name, &[parent], FOLDER_MIME_TYPE, b"").await
    }

    pub async fn insert_file(&self, name: &str, parent: &ObjectId, content: &[u8]) -> RemoteObject {
        self.insert(name, &[parent], "text/plain", content).await
    }

    /// Replace an object's parent links, with no folder validation (cycles allowed)
    pub async fn set_parents(&self, id: &ObjectId, parents: &[&ObjectId]) {
        if let Some(stored) = self.0.lock().await.objects.get_mut(id) {
            stored.object.parent_ids = parents.iter().map(|p| (*p).clone()).collect();
        }
    }

    pub async fn set_modified_time(&self, id: &ObjectId, modified: DateTime<Utc>) {
        if let Some(stored) = self.0.lock().await.objects.get_mut(id) {
            stored.object.modified_time = modified;
        }
    }

    /// Override the reported size; `None` models native documents
    pub async fn set_size(&self, id: &ObjectId, size: Option<u64>) {
        if let Some(stored) = self.0.lock().await.objects.get_mut(id) {
            stored.object.size = size;
        }
    }

    pub async fn object(&self, id: &ObjectId) -> Option<RemoteObject> {
        self.0.lock().await.objects.get(id).map(|s| s.object.clone())
    }

    pub async fn content(&self, id: &ObjectId) -> Option<Bytes> {
        self.0.lock().await.objects.get(id).map(|s| s.content.clone())
    }

    /// Non-trashed children of `parent` named `name`
    pub async fn children_named(&self, parent: &ObjectId, name: &str) -> Vec<RemoteObject> {
        let query = Query::child_named(parent, name);
        self.0
            .lock()
            .await
            .objects
            .values()
            .filter(|s| query.matches(&s.object))
            .map(|s| s.object.clone())
            .collect()
    }

    /// Total objects stored, including trashed ones and the root
    pub async fn object_count(&self) -> usize {
        self.0.lock().await.objects.len()
    }
}

#[async_trait]
impl RemoteClient for MemoryClient {
    async fn list(&self, query: &Query, page: PageRequest) -> RemoteResult<ListPage> {
        let mut state = self.0.lock().await;
        state.calls.list += 1;

        let offset = match &page.page_token {
            Some(token) => token.parse::<usize>().map_err(|_| {
                RemoteError::new(RemoteErrorKind::Other, format!("invalid page token {token}"))
            })?,
            None => 0,
        };
        let size = match state.page_limit {
            Some(limit) => page.page_size.min(limit),
            None => page.page_size,
        }
        .max(1) as usize;

        let matching: Vec<RemoteObject> = state
            .objects
            .values()
            .filter(|s| query.matches(&s.object))
            .map(|s| s.object.clone())
            .collect();

        let end = (offset + size).min(matching.len());
        let objects = matching.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_page_token = (end < matching.len()).then(|| end.to_string());
        Ok(ListPage {
            objects,
            next_page_token,
        })
    }

    async fn get(&self, id: &ObjectId) -> RemoteResult<RemoteObject> {
        let mut state = self.0.lock().await;
        state.calls.get += 1;
        Ok(state.stored(id)?.object.clone())
    }

    async fn create(
        &self,
        object: NewObject,
        content: Option<ByteStream>,
    ) -> RemoteResult<RemoteObject> {
        let content = match content {
            Some(stream) => collect_bytes(stream)
                .await
                .map_err(|e| RemoteError::transport(format!("upload failed: {e}")))?,
            None => Bytes::new(),
        };

        let mut state = self.0.lock().await;
        state.calls.create += 1;
        state.check_parents(&object.parent_ids)?;
        let modified = state.tick();
        Ok(state.insert(object, content, modified))
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: ObjectPatch,
        content: Option<ByteStream>,
    ) -> RemoteResult<RemoteObject> {
        let content = match content {
            Some(stream) => Some(
                collect_bytes(stream)
                    .await
                    .map_err(|e| RemoteError::transport(format!("upload failed: {e}")))?,
            ),
            None => None,
        };

        let mut state = self.0.lock().await;
        state.calls.update += 1;
        state.check_parents(&patch.add_parents)?;
        let modified = state.tick();
        let stored = state.stored_mut(id)?;

        if let Some(name) = patch.name {
            stored.object.name = name;
        }
        for parent in &patch.remove_parents {
            _ = stored.object.parent_ids.remove(parent);
        }
        for parent in patch.add_parents {
            _ = stored.object.parent_ids.insert(parent);
        }
        if let Some(mime_type) = patch.mime_type {
            stored.object.mime_type = mime_type;
        }
        if let Some(trashed) = patch.trashed {
            stored.object.trashed = trashed;
        }
        if let Some(content) = content {
            stored.object.size = Some(content.len() as u64);
            stored.content = content;
        }
        stored.object.modified_time = modified;
        Ok(stored.object.clone())
    }

    async fn delete(&self, id: &ObjectId) -> RemoteResult<()> {
        let mut state = self.0.lock().await;
        state.calls.delete += 1;
        state
            .objects
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RemoteError::not_found(format!("object {id}")))
    }

    async fn download(&self, id: &ObjectId) -> RemoteResult<ByteStream> {
        let mut state = self.0.lock().await;
        state.calls.download += 1;
        let chunk_size = state.chunk_size;
        let stored = state.stored(id)?;
        if stored.object.is_folder() {
            return Err(RemoteError::new(
                RemoteErrorKind::Other,
                format!("object {id} is a folder"),
            ));
        }

        let content = stored.content.clone();
        let chunks: Vec<std::io::Result<Bytes>> = (0..content.len())
            .step_by(chunk_size)
            .map(|start| Ok(content.slice(start..(start + chunk_size).min(content.len()))))
            .collect();
        Ok(stream::iter(chunks).boxed())
    }

    async fn permissions(&self, id: &ObjectId) -> RemoteResult<Vec<Permission>> {
        let mut state = self.0.lock().await;
        state.calls.permissions += 1;
        Ok(state.stored(id)?.permissions.clone())
    }

    async fn create_permission(
        &self,
        id: &ObjectId,
        permission: Permission,
    ) -> RemoteResult<Permission> {
        let mut state = self.0.lock().await;
        state.calls.permissions += 1;
        let permission_id = format!("perm-{}", state.next_permission);
        state.next_permission += 1;
        let stored = state.stored_mut(id)?;
        let created = Permission {
            id: permission_id,
            ..permission
        };
        stored.permissions.push(created.clone());
        Ok(created)
    }

    async fn delete_permission(&self, id: &ObjectId, permission_id: &str) -> RemoteResult<()> {
        let mut state = self.0.lock().await;
        state.calls.permissions += 1;
        let stored = state.stored_mut(id)?;
        let before = stored.permissions.len();
        stored.permissions.retain(|p| p.id != permission_id);
        if stored.permissions.len() == before {
            return Err(RemoteError::not_found(format!(
                "permission {permission_id} on {id}"
            )));
        }
        Ok(())
    }
}
