// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Filesystem adapter over a parent-linked remote object store
//!
//! Every operation normalizes its path, resolves the parent folder through
//! the `PathResolver` (cache first, backend on miss), performs the request
//! through the `RemoteClient`, and drops cache entries for the paths it
//! touched. Failures are reported as `AdapterError`s naming the operation.

use crate::adapter::{
    DirectoryAttributes, FileAttributes, FilesystemAdapter, Listing, Reader, StorageAttributes,
};
use crate::cache::{CacheStats, ChildFilter};
use crate::client::{ByteStream, PageRequest, RemoteClient, TimeoutClient, bytes_stream, collect_bytes, list_all};
use crate::config::{AdapterConfig, DeletePolicy, Visibility, VisibilityMapping, WriteOptions};
use crate::error::{
    AdapterError, AdapterResult, Error, MetadataKind, Operation, RemoteResultExt, Result,
};
use crate::mime;
use crate::object::{NewObject, ObjectId, ObjectPatch, Permission, PermissionKind, RemoteObject};
use crate::path::{ROOT, is_within, join, normalize, segments, split};
use crate::query::Query;
use crate::resolver::PathResolver;
use async_trait::async_trait;
use bytes::Bytes;
use diagnostics::*;
use futures::stream::{StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::io::{ReaderStream, StreamReader};

pub struct DriveAdapter {
    resolver: PathResolver,
    config: AdapterConfig,
}

fn during(operation: Operation, path: &str) -> impl FnOnce(Error) -> AdapterError + '_ {
    move |reason| AdapterError::new(operation, path, reason)
}

fn file_attributes(path: String, object: &RemoteObject) -> FileAttributes {
    FileAttributes {
        path,
        file_size: object.size,
        visibility: None,
        last_modified: Some(object.modified_time),
        mime_type: Some(object.mime_type.clone()),
    }
}

fn storage_attributes(path: String, object: &RemoteObject) -> StorageAttributes {
    if object.is_folder() {
        StorageAttributes::Directory(DirectoryAttributes {
            path,
            visibility: None,
            last_modified: Some(object.modified_time),
        })
    } else {
        StorageAttributes::File(file_attributes(path, object))
    }
}

/// Fails when `object` is already on the chain of folders leading to it
fn check_lineage(lineage: &[ObjectId], object: &RemoteObject, path: &str) -> Result<()> {
    if lineage.contains(&object.id) {
        Err(Error::cycle(path))
    } else {
        Ok(())
    }
}

impl DriveAdapter {
    /// Create an adapter over `client`. With `request_timeout` configured,
    /// every client call is bounded by it.
    pub fn new(client: Arc<dyn RemoteClient>, config: AdapterConfig) -> Result<Self> {
        config.validate()?;
        let client: Arc<dyn RemoteClient> = match config.request_timeout {
            Some(timeout) => Arc::new(TimeoutClient::new(client, timeout)),
            None => client,
        };
        Ok(Self {
            resolver: PathResolver::new(client, &config),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.resolver.cache().stats().await
    }

    fn client(&self) -> &dyn RemoteClient {
        self.resolver.client().as_ref()
    }

    /// Drop cached state for `path` after a mutation
    async fn forget(&self, path: &str, parent: &ObjectId, name: &str) {
        let cache = self.resolver.cache();
        cache.invalidate(parent, name).await;
        _ = cache.invalidate_path(path).await;
    }

    /// Drop cached state for mutated objects under every parent they have
    async fn forget_objects<'a, I>(&self, objects: I)
    where
        I: IntoIterator<Item = &'a RemoteObject> + Send,
    {
        self.resolver.cache().invalidate_objects(objects).await;
    }

    /// The parent folder of `path`, or `None` when some ancestor is missing
    async fn parent_if_exists(&self, path: &str) -> Result<Option<RemoteObject>> {
        match self.resolver.resolve_parent(path).await {
            Ok(parent) => Ok(Some(parent)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn folder_if_exists(&self, path: &str) -> Result<Option<RemoteObject>> {
        match self.resolver.resolve_folder(path).await {
            Ok(folder) => Ok(Some(folder)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Non-trashed children of `folder`, every page
    async fn children_of(&self, folder: &RemoteObject, path: &str) -> Result<Vec<RemoteObject>> {
        let found = list_all(
            self.client(),
            &Query::children_of(&folder.id),
            self.resolver.page_size(),
        )
        .await
        .at_path(path)?;
        Ok(found
            .into_iter()
            .filter(|o| !o.trashed && o.has_parent(&folder.id))
            .collect())
    }

    fn require_visibility(&self, path: &str) -> Result<()> {
        match self.config.visibility {
            VisibilityMapping::AnyoneWithLink => Ok(()),
            VisibilityMapping::Unsupported => Err(Error::unsupported(
                path,
                "visibility has no mapping onto backend sharing",
            )),
        }
    }

    /// Remove an object according to the delete policy
    async fn discard(&self, object: &RemoteObject, path: &str) -> Result<()> {
        match self.config.delete_policy {
            DeletePolicy::Trash => {
                _ = self
                    .client()
                    .update(&object.id, ObjectPatch::trash(), None)
                    .await
                    .at_path(path)?;
            }
            DeletePolicy::Permanent => {
                self.client().delete(&object.id).await.at_path(path)?;
            }
        }
        Ok(())
    }

    /// Remove the link between `object` and `parent`. An object that stays
    /// reachable through another parent is unlinked rather than discarded.
    async fn remove_link(&self, object: &RemoteObject, parent: &ObjectId, path: &str) -> Result<()> {
        if object.parent_ids.len() > 1 && object.has_parent(parent) {
            let id = object.id.to_string();
            warn!("{path} ({id}) has other parents; unlinking instead of deleting", path: path, id: id);
            _ = self
                .client()
                .update(&object.id, ObjectPatch::unlink(parent.clone()), None)
                .await
                .at_path(path)?;
            return Ok(());
        }
        self.discard(object, path).await
    }

    async fn apply_visibility(&self, object: &RemoteObject, path: &str, visibility: Visibility) -> Result<()> {
        self.require_visibility(path)?;
        let permissions = self.client().permissions(&object.id).await.at_path(path)?;
        match visibility {
            Visibility::Public => {
                if !permissions.iter().any(Permission::is_anyone_reader) {
                    _ = self
                        .client()
                        .create_permission(&object.id, Permission::anyone_reader())
                        .await
                        .at_path(path)?;
                }
            }
            Visibility::Private => {
                for permission in permissions.iter().filter(|p| p.kind == PermissionKind::Anyone) {
                    self.client()
                        .delete_permission(&object.id, &permission.id)
                        .await
                        .at_path(path)?;
                }
            }
        }
        Ok(())
    }

    async fn change_visibility(&self, path: &str, visibility: Visibility) -> Result<()> {
        let path = normalize(path)?;
        self.require_visibility(&path)?;
        let object = self.resolver.resolve(&path).await?;
        self.apply_visibility(&object, &path, visibility).await?;
        let shown = format!("{visibility:?}");
        info!("set {path} visibility to {shown}", path: path.as_str(), shown: shown);
        Ok(())
    }

    async fn read_visibility(&self, path: &str) -> Result<FileAttributes> {
        let path = normalize(path)?;
        self.require_visibility(&path)?;
        let object = self.resolver.resolve(&path).await?;
        let permissions = self.client().permissions(&object.id).await.at_path(&path)?;
        let visibility = if permissions.iter().any(Permission::is_anyone_reader) {
            Visibility::Public
        } else {
            Visibility::Private
        };
        Ok(FileAttributes {
            visibility: Some(visibility),
            ..FileAttributes::new(path)
        })
    }

    async fn exists(&self, path: &str, folder: bool) -> Result<bool> {
        let path = normalize(path)?;
        let Some((parent_path, name)) = split(&path) else {
            _ = self.resolver.root().await?;
            return Ok(folder);
        };
        let Some(parent) = self.parent_if_exists(&path).await? else {
            return Ok(false);
        };
        let found = self
            .resolver
            .children(&parent, parent_path, name, ChildFilter::Any)
            .await?;
        Ok(found.iter().any(|o| o.is_folder() == folder))
    }

    /// Upload `content` to `path`, updating an existing file in place
    async fn upload(
        &self,
        path: &str,
        content: ByteStream,
        sniff: Option<&[u8]>,
        options: &WriteOptions,
    ) -> Result<RemoteObject> {
        let path = normalize(path)?;
        let (parent_path, name) = split(&path).ok_or_else(|| Error::not_a_file(ROOT))?;
        if options.visibility.is_some() {
            self.require_visibility(&path)?;
        }

        let parent = self.resolver.resolve_parent(&path).await?;
        let found = self
            .resolver
            .children(&parent, parent_path, name, ChildFilter::Any)
            .await?;
        let (files, folders): (Vec<_>, Vec<_>) = found.into_iter().partition(RemoteObject::is_file);
        let mime_type = options
            .mime_type
            .clone()
            .unwrap_or_else(|| mime::detect(&path, sniff).to_string());

        let object = match self.resolver.choose(&path, files)? {
            Some(existing) => {
                let patch = ObjectPatch {
                    mime_type: Some(mime_type),
                    ..Default::default()
                };
                let updated = self
                    .client()
                    .update(&existing.id, patch, Some(content))
                    .await
                    .at_path(&path)?;
                self.forget_objects([&existing]).await;
                updated
            }
            None if !folders.is_empty() => {
                return Err(Error::conflict(&path, "a directory exists with this name"));
            }
            None => self
                .client()
                .create(NewObject::file(name, parent.id.clone(), mime_type), Some(content))
                .await
                .at_path(&path)?,
        };
        self.forget(&path, &parent.id, name).await;
        self.forget_objects([&object]).await;

        if let Some(visibility) = options.visibility {
            self.apply_visibility(&object, &path, visibility).await?;
        }
        let size = object.size.unwrap_or_default();
        info!("wrote {path} ({size} bytes)", path: path.as_str(), size: size);
        Ok(object)
    }

    /// Normalized path and the object it resolves to
    async fn stat(&self, path: &str) -> Result<(String, RemoteObject)> {
        let path = normalize(path)?;
        let object = self.resolver.resolve(&path).await?;
        Ok((path, object))
    }

    async fn file(&self, path: &str) -> Result<(String, RemoteObject)> {
        let (path, object) = self.stat(path).await?;
        if object.is_folder() {
            return Err(Error::not_a_file(path));
        }
        Ok((path, object))
    }

    async fn read_file(&self, path: &str) -> Result<Bytes> {
        let (path, object) = self.file(path).await?;
        let content = self.client().download(&object.id).await.at_path(&path)?;
        let content = collect_bytes(content).await?;
        debug!("read {path} ({len} bytes)", path: path.as_str(), len: content.len());
        Ok(content)
    }

    async fn open_file(&self, path: &str) -> Result<Reader> {
        let (path, object) = self.file(path).await?;
        let content = self.client().download(&object.id).await.at_path(&path)?;
        debug!("streaming {path}", path: path.as_str());
        Ok(Box::pin(StreamReader::new(content)))
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        let path = normalize(path)?;
        let (parent_path, name) = split(&path).ok_or_else(|| Error::not_a_file(ROOT))?;
        let Some(parent) = self.parent_if_exists(&path).await? else {
            debug!("delete: parent of {path} is missing", path: path.as_str());
            return Ok(());
        };
        let found = self
            .resolver
            .children(&parent, parent_path, name, ChildFilter::Any)
            .await?;
        let (files, folders): (Vec<_>, Vec<_>) = found.into_iter().partition(RemoteObject::is_file);
        if files.is_empty() && !folders.is_empty() {
            return Err(Error::not_a_file(path));
        }

        for file in &files {
            self.remove_link(file, &parent.id, &path).await?;
        }
        if !files.is_empty() {
            self.forget(&path, &parent.id, name).await;
            self.forget_objects(&files).await;
            let count = files.len();
            info!("deleted {path} ({count} objects)", path: path.as_str(), count: count);
        }
        Ok(())
    }

    async fn delete_folder(&self, path: &str) -> Result<()> {
        let path = normalize(path)?;
        let Some((parent_path, name)) = split(&path) else {
            return Err(Error::unsupported(ROOT, "deleting the root directory"));
        };
        let Some(parent) = self.parent_if_exists(&path).await? else {
            return Ok(());
        };
        let found = self
            .resolver
            .children(&parent, parent_path, name, ChildFilter::Any)
            .await?;
        let (folders, files): (Vec<_>, Vec<_>) = found.into_iter().partition(RemoteObject::is_folder);
        let Some(folder) = self.resolver.choose(&path, folders)? else {
            if files.is_empty() {
                return Ok(());
            }
            return Err(Error::not_a_folder(path));
        };

        if folder.parent_ids.len() > 1 {
            self.remove_link(&folder, &parent.id, &path).await?;
            self.forget(&path, &parent.id, name).await;
            self.forget_objects([&folder]).await;
            return Ok(());
        }

        // Gather the subtree first so a cycle fails before anything is removed
        let mut order: Vec<(RemoteObject, String)> = Vec::new();
        let mut scope: HashSet<ObjectId> = HashSet::from([folder.id.clone()]);
        let mut seen: HashSet<ObjectId> = HashSet::from([folder.id.clone()]);
        let mut pending = vec![(folder.clone(), path.clone(), Vec::new())];
        while let Some((current, current_path, mut lineage)) = pending.pop() {
            lineage.push(current.id.clone());
            for child in self.children_of(&current, &current_path).await? {
                let child_path = join(&current_path, &child.name);
                check_lineage(&lineage, &child, &child_path)?;
                if !seen.insert(child.id.clone()) {
                    continue;
                }
                if child.is_folder() {
                    _ = scope.insert(child.id.clone());
                    pending.push((child.clone(), child_path.clone(), lineage.clone()));
                }
                order.push((child, child_path));
            }
        }

        // Objects still reachable from outside the subtree survive
        let mut survivors: HashSet<ObjectId> = HashSet::new();
        loop {
            let before = survivors.len();
            for (object, _) in &order {
                if !survivors.contains(&object.id)
                    && object
                        .parent_ids
                        .iter()
                        .any(|p| !scope.contains(p) || survivors.contains(p))
                {
                    _ = survivors.insert(object.id.clone());
                }
            }
            if survivors.len() == before {
                break;
            }
        }

        // Descendants before ancestors
        for (object, object_path) in order.iter().rev() {
            if survivors.contains(&object.id) {
                let patch = ObjectPatch {
                    remove_parents: object
                        .parent_ids
                        .iter()
                        .filter(|p| scope.contains(*p) && !survivors.contains(*p))
                        .cloned()
                        .collect(),
                    ..Default::default()
                };
                if patch.is_empty() {
                    continue;
                }
                warn!("{path} is linked elsewhere; unlinking instead of deleting", path: object_path.as_str());
                _ = self
                    .client()
                    .update(&object.id, patch, None)
                    .await
                    .at_path(object_path)?;
            } else {
                self.discard(object, object_path).await?;
            }
        }
        self.discard(&folder, &path).await?;
        self.forget(&path, &parent.id, name).await;
        self.forget_objects(order.iter().map(|(object, _)| object).chain([&folder]))
            .await;

        let count = order.len() + 1;
        info!("deleted directory {path} ({count} objects)", path: path.as_str(), count: count);
        Ok(())
    }

    async fn make_directories(&self, path: &str, options: &WriteOptions) -> Result<()> {
        let path = normalize(path)?;
        if options.visibility.is_some() {
            self.require_visibility(&path)?;
        }

        let mut current = self.resolver.root().await?;
        let mut current_path = ROOT.to_string();
        for seg in segments(&path) {
            let child_path = join(&current_path, seg);
            let found = self
                .resolver
                .children(&current, &current_path, seg, ChildFilter::Any)
                .await?;
            let (folders, files): (Vec<_>, Vec<_>) = found.into_iter().partition(RemoteObject::is_folder);
            current = match self.resolver.choose(&child_path, folders)? {
                Some(folder) => folder,
                None if !files.is_empty() => {
                    return Err(Error::conflict(child_path, "a file exists with this name"));
                }
                None => {
                    let created = self
                        .client()
                        .create(NewObject::folder(seg, current.id.clone()), None)
                        .await
                        .at_path(&child_path)?;
                    self.forget(&child_path, &current.id, seg).await;
                    info!("created directory {path}", path: child_path.as_str());
                    created
                }
            };
            current_path = child_path;
        }

        if let Some(visibility) = options.visibility {
            self.apply_visibility(&current, &path, visibility).await?;
        }
        Ok(())
    }

    async fn relocate(&self, source: &str, destination: &str, options: &WriteOptions) -> Result<()> {
        let source = normalize(source)?;
        let destination = normalize(destination)?;
        let (source_parent_path, source_name) =
            split(&source).ok_or_else(|| Error::unsupported(ROOT, "moving the root directory"))?;
        let (dest_parent_path, dest_name) = split(&destination)
            .ok_or_else(|| Error::conflict(ROOT, "the root directory already exists"))?;
        if options.visibility.is_some() {
            self.require_visibility(&destination)?;
        }

        let source_parent = self.resolver.resolve_parent(&source).await?;
        let candidates = self
            .resolver
            .children(&source_parent, source_parent_path, source_name, ChildFilter::Any)
            .await?;
        let object = self
            .resolver
            .choose(&source, candidates)?
            .ok_or_else(|| Error::not_found(&source, &source))?;
        if source == destination {
            return Ok(());
        }
        if object.is_folder() && is_within(&destination, &source) {
            return Err(Error::conflict(&destination, "cannot move a directory beneath itself"));
        }

        let dest_parent = self.resolver.resolve_parent(&destination).await?;
        let existing = self
            .resolver
            .children(&dest_parent, dest_parent_path, dest_name, ChildFilter::Any)
            .await?;
        for other in existing.iter().filter(|o| o.id != object.id) {
            if other.is_folder() {
                return Err(Error::conflict(&destination, "a directory exists at the destination"));
            }
            if object.is_folder() {
                return Err(Error::conflict(&destination, "a file exists at the destination"));
            }
        }
        for other in existing.iter().filter(|o| o.id != object.id) {
            self.remove_link(other, &dest_parent.id, &destination).await?;
        }

        let mut patch = ObjectPatch::default();
        if source_parent.id != dest_parent.id {
            patch.remove_parents.push(source_parent.id.clone());
            patch.add_parents.push(dest_parent.id.clone());
        }
        if source_name != dest_name {
            patch.name = Some(dest_name.to_string());
        }
        if object.is_file() {
            patch.mime_type = options.mime_type.clone();
        }
        let moved = if patch.is_empty() {
            object.clone()
        } else {
            self.client()
                .update(&object.id, patch, None)
                .await
                .at_path(&destination)?
        };

        self.forget(&source, &source_parent.id, source_name).await;
        self.forget(&destination, &dest_parent.id, dest_name).await;
        self.forget_objects(existing.iter().chain([&object, &moved])).await;
        if let Some(visibility) = options.visibility {
            self.apply_visibility(&moved, &destination, visibility).await?;
        }
        info!("moved {source} to {destination}", source: source.as_str(), destination: destination.as_str());
        Ok(())
    }

    async fn duplicate(&self, source: &str, destination: &str, options: &WriteOptions) -> Result<()> {
        let (source, object) = self.file(source).await?;
        let destination = normalize(destination)?;
        if source == destination {
            return Ok(());
        }
        let content = self.client().download(&object.id).await.at_path(&source)?;
        let options = WriteOptions {
            mime_type: options.mime_type.clone().or(Some(object.mime_type.clone())),
            visibility: options.visibility,
        };
        _ = self.upload(&destination, content, None, &options).await?;
        info!("copied {source} to {destination}", source: source.as_str(), destination: destination.as_str());
        Ok(())
    }

    /// Each folder's entries page by page, then its subfolders depth-first
    fn entries<'a>(
        &'a self,
        path: &'a str,
        deep: bool,
    ) -> impl futures::Stream<Item = Result<StorageAttributes>> + Send + 'a {
        async_stream::stream! {
            let path = match normalize(path) {
                Ok(path) => path,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            let folder = match self.folder_if_exists(&path).await {
                Ok(Some(folder)) => folder,
                Ok(None) => {
                    debug!("list: {path} does not exist", path: path.as_str());
                    return;
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let mut pending: Vec<(ObjectId, String, Vec<ObjectId>)> = vec![(folder.id, path, Vec::new())];
            while let Some((id, dir, mut lineage)) = pending.pop() {
                lineage.push(id.clone());
                let query = Query::children_of(&id);
                let mut page = PageRequest::first(self.resolver.page_size());
                let mut subfolders = Vec::new();
                loop {
                    let result = match self.client().list(&query, page.clone()).await.at_path(&dir) {
                        Ok(result) => result,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    };
                    for object in result.objects {
                        if object.trashed || !object.has_parent(&id) {
                            continue;
                        }
                        let child_path = join(&dir, &object.name);
                        if deep && object.is_folder() {
                            if let Err(e) = check_lineage(&lineage, &object, &child_path) {
                                yield Err(e);
                                return;
                            }
                            subfolders.push((object.id.clone(), child_path.clone(), lineage.clone()));
                        }
                        yield Ok(storage_attributes(child_path, &object));
                    }
                    match result.next_page_token {
                        Some(token) => page.page_token = Some(token),
                        None => break,
                    }
                }
                pending.extend(subfolders.into_iter().rev());
            }
        }
    }
}

#[async_trait]
impl FilesystemAdapter for DriveAdapter {
    async fn file_exists(&self, path: &str) -> AdapterResult<bool> {
        self.exists(path, false)
            .await
            .map_err(during(Operation::CheckExistence, path))
    }

    async fn directory_exists(&self, path: &str) -> AdapterResult<bool> {
        self.exists(path, true)
            .await
            .map_err(during(Operation::CheckExistence, path))
    }

    async fn write(&self, path: &str, contents: Bytes, options: &WriteOptions) -> AdapterResult<()> {
        let sniff = contents.clone();
        self.upload(path, bytes_stream(contents), Some(&sniff), options)
            .await
            .map(|_| ())
            .map_err(during(Operation::Write, path))
    }

    async fn write_stream(
        &self,
        path: &str,
        contents: Reader,
        options: &WriteOptions,
    ) -> AdapterResult<()> {
        let content: ByteStream = ReaderStream::new(contents).boxed();
        self.upload(path, content, None, options)
            .await
            .map(|_| ())
            .map_err(during(Operation::Write, path))
    }

    async fn read(&self, path: &str) -> AdapterResult<Bytes> {
        self.read_file(path).await.map_err(during(Operation::Read, path))
    }

    async fn read_stream(&self, path: &str) -> AdapterResult<Reader> {
        self.open_file(path).await.map_err(during(Operation::Read, path))
    }

    async fn delete(&self, path: &str) -> AdapterResult<()> {
        self.delete_file(path).await.map_err(during(Operation::Delete, path))
    }

    async fn delete_directory(&self, path: &str) -> AdapterResult<()> {
        self.delete_folder(path)
            .await
            .map_err(during(Operation::DeleteDirectory, path))
    }

    async fn create_directory(&self, path: &str, options: &WriteOptions) -> AdapterResult<()> {
        self.make_directories(path, options)
            .await
            .map_err(during(Operation::CreateDirectory, path))
    }

    async fn set_visibility(&self, path: &str, visibility: Visibility) -> AdapterResult<()> {
        self.change_visibility(path, visibility)
            .await
            .map_err(during(Operation::SetVisibility, path))
    }

    async fn visibility(&self, path: &str) -> AdapterResult<FileAttributes> {
        self.read_visibility(path)
            .await
            .map_err(during(Operation::RetrieveMetadata(MetadataKind::Visibility), path))
    }

    async fn mime_type(&self, path: &str) -> AdapterResult<FileAttributes> {
        self.stat(path)
            .await
            .map(|(path, object)| FileAttributes {
                mime_type: Some(object.mime_type),
                ..FileAttributes::new(path)
            })
            .map_err(during(Operation::RetrieveMetadata(MetadataKind::MimeType), path))
    }

    async fn last_modified(&self, path: &str) -> AdapterResult<FileAttributes> {
        self.stat(path)
            .await
            .map(|(path, object)| FileAttributes {
                last_modified: Some(object.modified_time),
                ..FileAttributes::new(path)
            })
            .map_err(during(Operation::RetrieveMetadata(MetadataKind::LastModified), path))
    }

    async fn file_size(&self, path: &str) -> AdapterResult<FileAttributes> {
        self.stat(path)
            .await
            .and_then(|(path, object)| match object.size {
                Some(size) => Ok(FileAttributes {
                    file_size: Some(size),
                    ..FileAttributes::new(path)
                }),
                None => Err(Error::MetadataUnavailable {
                    path,
                    field: "file size",
                }),
            })
            .map_err(during(Operation::RetrieveMetadata(MetadataKind::FileSize), path))
    }

    fn list_contents<'a>(&'a self, path: &'a str, deep: bool) -> Listing<'a> {
        self.entries(path, deep)
            .map_err(move |e| AdapterError::new(Operation::List, path, e))
            .boxed()
    }

    async fn move_object(
        &self,
        source: &str,
        destination: &str,
        options: &WriteOptions,
    ) -> AdapterResult<()> {
        self.relocate(source, destination, options)
            .await
            .map_err(during(Operation::Move, source))
    }

    async fn copy_object(
        &self,
        source: &str,
        destination: &str,
        options: &WriteOptions,
    ) -> AdapterResult<()> {
        self.duplicate(source, destination, options)
            .await
            .map_err(during(Operation::Copy, source))
    }
}
