// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Remote object client contract.
//!
//! The adapter consumes this trait; transport, authentication, retry and
//! pagination cursors live beneath it. Implementations must be safe to share
//! between adapter instances, which receive them as `Arc<dyn RemoteClient>`.

use crate::error::RemoteError;
use crate::object::{NewObject, ObjectId, ObjectPatch, Permission, RemoteObject};
use crate::query::Query;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::io;
use std::sync::Arc;
use std::time::Duration;

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Streamed object content
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// Wrap an in-memory buffer as a single-chunk stream
#[must_use]
pub fn bytes_stream(content: Bytes) -> ByteStream {
    stream::once(async move { Ok(content) }).boxed()
}

/// Drain a content stream into one buffer
pub async fn collect_bytes(content: ByteStream) -> io::Result<Bytes> {
    let chunks: Vec<Bytes> = content.try_collect().await?;
    if chunks.len() == 1 {
        return Ok(chunks.into_iter().next().unwrap_or_default());
    }
    let total = chunks.iter().map(Bytes::len).sum();
    let mut buf = Vec::with_capacity(total);
    for chunk in chunks {
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: u32,
    pub page_token: Option<String>,
}

impl PageRequest {
    #[must_use]
    pub fn first(page_size: u32) -> Self {
        Self {
            page_size,
            page_token: None,
        }
    }
}

/// One page of listing results
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<RemoteObject>,
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn list(&self, query: &Query, page: PageRequest) -> RemoteResult<ListPage>;

    async fn get(&self, id: &ObjectId) -> RemoteResult<RemoteObject>;

    async fn create(
        &self,
        object: NewObject,
        content: Option<ByteStream>,
    ) -> RemoteResult<RemoteObject>;

    async fn update(
        &self,
        id: &ObjectId,
        patch: ObjectPatch,
        content: Option<ByteStream>,
    ) -> RemoteResult<RemoteObject>;

    /// Permanently delete; soft deletion is `update` with `ObjectPatch::trash()`
    async fn delete(&self, id: &ObjectId) -> RemoteResult<()>;

    async fn download(&self, id: &ObjectId) -> RemoteResult<ByteStream>;

    async fn permissions(&self, id: &ObjectId) -> RemoteResult<Vec<Permission>>;

    async fn create_permission(
        &self,
        id: &ObjectId,
        permission: Permission,
    ) -> RemoteResult<Permission>;

    async fn delete_permission(&self, id: &ObjectId, permission_id: &str) -> RemoteResult<()>;
}

/// Fetch every page of a query
pub async fn list_all(
    client: &dyn RemoteClient,
    query: &Query,
    page_size: u32,
) -> RemoteResult<Vec<RemoteObject>> {
    let mut objects = Vec::new();
    let mut page = PageRequest::first(page_size);
    loop {
        let result = client.list(query, page.clone()).await?;
        objects.extend(result.objects);
        match result.next_page_token {
            Some(token) => page.page_token = Some(token),
            None => return Ok(objects),
        }
    }
}

/// Decorator bounding every call of the wrapped client.
///
/// A download is bounded until its stream is returned, not while it is consumed.
pub struct TimeoutClient {
    inner: Arc<dyn RemoteClient>,
    timeout: Duration,
}

impl TimeoutClient {
    pub fn new(inner: Arc<dyn RemoteClient>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T, F>(&self, what: &str, fut: F) -> RemoteResult<T>
    where
        F: std::future::Future<Output = RemoteResult<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::timeout(format!(
                "{what} exceeded {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl RemoteClient for TimeoutClient {
    async fn list(&self, query: &Query, page: PageRequest) -> RemoteResult<ListPage> {
        self.bounded("list", self.inner.list(query, page)).await
    }

    async fn get(&self, id: &ObjectId) -> RemoteResult<RemoteObject> {
        self.bounded("get", self.inner.get(id)).await
    }

    async fn create(
        &self,
        object: NewObject,
        content: Option<ByteStream>,
    ) -> RemoteResult<RemoteObject> {
        self.bounded("create", self.inner.create(object, content)).await
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: ObjectPatch,
        content: Option<ByteStream>,
    ) -> RemoteResult<RemoteObject> {
        self.bounded("update", self.inner.update(id, patch, content))
            .await
    }

    async fn delete(&self, id: &ObjectId) -> RemoteResult<()> {
        self.bounded("delete", self.inner.delete(id)).await
    }

    async fn download(&self, id: &ObjectId) -> RemoteResult<ByteStream> {
        self.bounded("download", self.inner.download(id)).await
    }

    async fn permissions(&self, id: &ObjectId) -> RemoteResult<Vec<Permission>> {
        self.bounded("permissions", self.inner.permissions(id)).await
    }

    async fn create_permission(
        &self,
        id: &ObjectId,
        permission: Permission,
    ) -> RemoteResult<Permission> {
        self.bounded("create_permission", self.inner.create_permission(id, permission))
            .await
    }

    async fn delete_permission(&self, id: &ObjectId, permission_id: &str) -> RemoteResult<()> {
        self.bounded(
            "delete_permission",
            self.inner.delete_permission(id, permission_id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_bytes_joins_chunks() {
        let chunks = vec![
            Ok(Bytes::from_static(b"hello ")),
            Ok(Bytes::from_static(b"world")),
        ];
        let content: ByteStream = stream::iter(chunks).boxed();
        let all = collect_bytes(content).await.unwrap();
        assert_eq!(&all[..], b"hello world");
    }

    struct Stalled;

    #[async_trait]
    impl RemoteClient for Stalled {
        async fn list(&self, _query: &Query, _page: PageRequest) -> RemoteResult<ListPage> {
            futures::future::pending().await
        }
        async fn get(&self, id: &ObjectId) -> RemoteResult<RemoteObject> {
            Err(RemoteError::not_found(id.to_string()))
        }
        async fn create(&self, _: NewObject, _: Option<ByteStream>) -> RemoteResult<RemoteObject> {
            futures::future::pending().await
        }
        async fn update(
            &self,
            _: &ObjectId,
            _: ObjectPatch,
            _: Option<ByteStream>,
        ) -> RemoteResult<RemoteObject> {
            futures::future::pending().await
        }
        async fn delete(&self, _: &ObjectId) -> RemoteResult<()> {
            futures::future::pending().await
        }
        async fn download(&self, _: &ObjectId) -> RemoteResult<ByteStream> {
            futures::future::pending().await
        }
        async fn permissions(&self, _: &ObjectId) -> RemoteResult<Vec<Permission>> {
            futures::future::pending().await
        }
        async fn create_permission(&self, _: &ObjectId, _: Permission) -> RemoteResult<Permission> {
            futures::future::pending().await
        }
        async fn delete_permission(&self, _: &ObjectId, _: &str) -> RemoteResult<()> {
            futures::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_client_bounds_calls() {
        let client = TimeoutClient::new(Arc::new(Stalled), Duration::from_secs(5));
        let err = client
            .list(&Query::new(), PageRequest::first(10))
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::error::RemoteErrorKind::Timeout);

        // Failures from the inner client pass through untouched
        let err = client.get(&ObjectId::from("x")).await.unwrap_err();
        assert_eq!(err.kind, crate::error::RemoteErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_collect_empty_stream() {
        let content: ByteStream = stream::empty().boxed();
        let all = collect_bytes(content).await.unwrap();
        assert!(all.is_empty());
    }
}
