// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Path resolution over a parent-linked object graph
//!
//! A path is resolved one segment at a time, starting at the configured
//! root. Each step asks for the non-trashed children of the current folder
//! with exactly that name (folders only for intermediate segments), consults
//! the metadata cache first, and records the answer before moving on.
//!
//! The backend permits several objects with the same name under one parent.
//! When that happens the configured `DuplicatePolicy` picks one; this is a
//! best-effort heuristic that is deterministic for identical backend state.

use crate::cache::{ChildFilter, MetadataCache};
use crate::client::{RemoteClient, list_all};
use crate::config::{AdapterConfig, DuplicatePolicy};
use crate::error::{Error, RemoteResultExt, Result};
use crate::object::{ObjectId, RemoteObject};
use crate::path::{ROOT, join, segments, split};
use crate::query::Query;
use diagnostics::*;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Outcome of resolving a path whose parent exists
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    pub path: String,
    pub segments: Vec<String>,
    /// `None` when the leaf does not exist
    pub object: Option<RemoteObject>,
}

impl ResolvedPath {
    #[must_use]
    pub fn exists(&self) -> bool {
        self.object.is_some()
    }

    #[must_use]
    pub fn object_id(&self) -> Option<&ObjectId> {
        self.object.as_ref().map(|o| &o.id)
    }
}

pub struct PathResolver {
    client: Arc<dyn RemoteClient>,
    cache: MetadataCache,
    root_id: ObjectId,
    root_path: Option<String>,
    policy: DuplicatePolicy,
    page_size: u32,
    root: OnceCell<RemoteObject>,
}

/// Total order used by the tie-break: modification time, then ID
fn recency(a: &RemoteObject, b: &RemoteObject) -> Ordering {
    a.modified_time
        .cmp(&b.modified_time)
        .then_with(|| a.id.cmp(&b.id))
}

impl PathResolver {
    pub fn new(client: Arc<dyn RemoteClient>, config: &AdapterConfig) -> Self {
        Self {
            client,
            cache: MetadataCache::new(config.cache_max_age),
            root_id: ObjectId::new(config.root_id.clone()),
            root_path: config.root_path.clone(),
            policy: config.duplicate_policy,
            page_size: config.page_size,
            root: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    #[must_use]
    pub fn client(&self) -> &Arc<dyn RemoteClient> {
        &self.client
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// The folder the adapter treats as `/`, fetched once per instance
    pub async fn root(&self) -> Result<RemoteObject> {
        self.root
            .get_or_try_init(|| self.load_root())
            .await
            .cloned()
    }

    async fn load_root(&self) -> Result<RemoteObject> {
        let mut current = self.client.get(&self.root_id).await.at_path(ROOT)?;
        if !current.is_folder() {
            return Err(Error::Config(format!(
                "root {} is not a folder",
                self.root_id
            )));
        }

        if let Some(root_path) = &self.root_path {
            let root_path = crate::path::normalize(root_path)?;
            for seg in segments(&root_path) {
                let query = Query::child_named(&current.id, seg).folders_only();
                let found = list_all(self.client.as_ref(), &query, self.page_size)
                    .await
                    .at_path(ROOT)?;
                current = self.choose(&root_path, found)?.ok_or_else(|| {
                    Error::Config(format!("root_path {root_path} not found at {seg}"))
                })?;
            }
        }

        let root_id = current.id.to_string();
        info!("resolved adapter root to {root_id}", root_id: root_id);
        Ok(current)
    }

    /// Non-trashed children of `parent` named exactly `name`.
    ///
    /// `parent_path` is the path `parent` was reached by; it labels cache
    /// entries so that mutations below it can invalidate them.
    pub async fn children(
        &self,
        parent: &RemoteObject,
        parent_path: &str,
        name: &str,
        filter: ChildFilter,
    ) -> Result<Vec<RemoteObject>> {
        let child_path = join(parent_path, name);
        if let Some(hit) = self.cache.get(&parent.id, name, filter).await {
            debug!("resolve: cache hit for {path}", path: child_path.as_str());
            return Ok(hit);
        }

        let mut query = Query::child_named(&parent.id, name);
        if filter == ChildFilter::Folders {
            query = query.folders_only();
        }
        let query_text = query.to_string();
        debug!("resolve: listing {query}", query: query_text);

        let found: Vec<RemoteObject> = list_all(self.client.as_ref(), &query, self.page_size)
            .await
            .at_path(&child_path)?
            .into_iter()
            .filter(|o| !o.trashed && o.name == name && o.has_parent(&parent.id))
            .collect();

        self.cache
            .put(&parent.id, name, &child_path, filter, found.clone())
            .await;
        Ok(found)
    }

    /// Apply the duplicate-name policy to the candidates found at `path`
    pub fn choose(
        &self,
        path: &str,
        candidates: Vec<RemoteObject>,
    ) -> Result<Option<RemoteObject>> {
        let mut live: Vec<RemoteObject> = candidates.into_iter().filter(|o| !o.trashed).collect();
        if live.len() <= 1 {
            return Ok(live.pop());
        }

        let count = live.len();
        let chosen = match self.policy {
            DuplicatePolicy::Strict => {
                return Err(Error::AmbiguousName {
                    path: path.to_string(),
                    count,
                });
            }
            DuplicatePolicy::NewestModified => live.into_iter().max_by(recency),
            DuplicatePolicy::OldestModified => live.into_iter().min_by(recency),
        };
        if let Some(object) = &chosen {
            let id = object.id.to_string();
            warn!(
                "{count} objects share the name {path}; chose {id}",
                count: count,
                path: path,
                id: id
            );
        }
        Ok(chosen)
    }

    /// Resolve a path whose every segment must be a folder
    pub async fn resolve_folder(&self, path: &str) -> Result<RemoteObject> {
        self.walk_folders(path, path).await
    }

    /// Walk `folder_path`; failures are reported against `requested`
    async fn walk_folders(&self, folder_path: &str, requested: &str) -> Result<RemoteObject> {
        let mut current = self.root().await?;
        let mut current_path = ROOT.to_string();
        for seg in segments(folder_path) {
            let child_path = join(&current_path, seg);
            let folders = self
                .children(&current, &current_path, seg, ChildFilter::Folders)
                .await?;
            current = match self.choose(&child_path, folders)? {
                Some(folder) => folder,
                None => return Err(Error::not_found(requested, child_path)),
            };
            current_path = child_path;
        }
        Ok(current)
    }

    /// The folder that would contain `path`'s base name
    pub async fn resolve_parent(&self, path: &str) -> Result<RemoteObject> {
        match split(path) {
            Some((parent, _)) => self.walk_folders(parent, path).await,
            None => Err(Error::invalid_path(path, "the root has no parent")),
        }
    }

    /// Resolve a normalized path to one object
    pub async fn resolve(&self, path: &str) -> Result<RemoteObject> {
        let resolved = self.resolve_path(path).await?;
        resolved
            .object
            .ok_or_else(|| Error::not_found(path, path))
    }

    /// Resolve a normalized path, reporting a missing leaf as a value.
    ///
    /// A missing ancestor is still an error naming that ancestor.
    pub async fn resolve_path(&self, path: &str) -> Result<ResolvedPath> {
        let segs: Vec<String> = segments(path).into_iter().map(str::to_string).collect();
        let object = match split(path) {
            None => Some(self.root().await?),
            Some((parent_path, name)) => {
                let parent = self.walk_folders(parent_path, path).await?;
                let found = self
                    .children(&parent, parent_path, name, ChildFilter::Any)
                    .await?;
                self.choose(path, found)?
            }
        };
        Ok(ResolvedPath {
            path: path.to_string(),
            segments: segs,
            object,
        })
    }
}
