// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Generic path-based filesystem adapter contract

use crate::config::{Visibility, WriteOptions};
use crate::error::AdapterResult;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::pin::Pin;
use tokio::io::AsyncRead;

pub type Reader = Pin<Box<dyn AsyncRead + Send>>;

/// Lazily produced listing; re-invoke `list_contents` to restart it
pub type Listing<'a> = BoxStream<'a, AdapterResult<StorageAttributes>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttributes {
    pub path: String,
    pub file_size: Option<u64>,
    pub visibility: Option<Visibility>,
    pub last_modified: Option<DateTime<Utc>>,
    pub mime_type: Option<String>,
}

impl FileAttributes {
    pub fn new<P: Into<String>>(path: P) -> Self {
        Self {
            path: path.into(),
            file_size: None,
            visibility: None,
            last_modified: None,
            mime_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryAttributes {
    pub path: String,
    pub visibility: Option<Visibility>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageAttributes {
    File(FileAttributes),
    Directory(DirectoryAttributes),
}

impl StorageAttributes {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            StorageAttributes::File(f) => &f.path,
            StorageAttributes::Directory(d) => &d.path,
        }
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, StorageAttributes::File(_))
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        matches!(self, StorageAttributes::Directory(_))
    }
}

/// Path-based storage operations.
///
/// Paths are `/`-delimited and normalized by the implementation. Failures
/// name the attempted operation (`AdapterError::operation`) and carry the
/// offending path.
#[async_trait]
pub trait FilesystemAdapter: Send + Sync {
    /// False (not an error) when the parent directory is missing
    async fn file_exists(&self, path: &str) -> AdapterResult<bool>;

    async fn directory_exists(&self, path: &str) -> AdapterResult<bool>;

    /// The parent directory must already exist
    async fn write(&self, path: &str, contents: Bytes, options: &WriteOptions) -> AdapterResult<()>;

    async fn write_stream(
        &self,
        path: &str,
        contents: Reader,
        options: &WriteOptions,
    ) -> AdapterResult<()>;

    async fn read(&self, path: &str) -> AdapterResult<Bytes>;

    async fn read_stream(&self, path: &str) -> AdapterResult<Reader>;

    /// Succeeds when nothing exists at `path`
    async fn delete(&self, path: &str) -> AdapterResult<()>;

    async fn delete_directory(&self, path: &str) -> AdapterResult<()>;

    async fn create_directory(&self, path: &str, options: &WriteOptions) -> AdapterResult<()>;

    async fn set_visibility(&self, path: &str, visibility: Visibility) -> AdapterResult<()>;

    async fn visibility(&self, path: &str) -> AdapterResult<FileAttributes>;

    async fn mime_type(&self, path: &str) -> AdapterResult<FileAttributes>;

    async fn last_modified(&self, path: &str) -> AdapterResult<FileAttributes>;

    async fn file_size(&self, path: &str) -> AdapterResult<FileAttributes>;

    fn list_contents<'a>(&'a self, path: &'a str, deep: bool) -> Listing<'a>;

    async fn move_object(
        &self,
        source: &str,
        destination: &str,
        options: &WriteOptions,
    ) -> AdapterResult<()>;

    async fn copy_object(
        &self,
        source: &str,
        destination: &str,
        options: &WriteOptions,
    ) -> AdapterResult<()>;
}
