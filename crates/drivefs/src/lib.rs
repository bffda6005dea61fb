// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! DriveFS - a path-based filesystem adapter over a parent-linked object store
//!
//! Set DRIVEFS_LOG environment variable to control logging:
//! - DRIVEFS_LOG=off (default) - silent
//! - DRIVEFS_LOG=info - mutations
//! - DRIVEFS_LOG=debug - resolution and cache detail

/// Filesystem adapter contract and attribute records
pub mod adapter;

// Metadata cache for resolutions
pub mod cache;

/// Remote object client contract
pub mod client;

pub mod config;

/// Concrete adapter over a `RemoteClient`
pub mod drive;

// Error types
pub mod error;

// In-memory remote client
pub mod memory;

pub mod mime;

// Backend object model
pub mod object;

/// Pure path utilities
pub mod path;

pub mod query;

pub mod resolver;

pub use adapter::{
    DirectoryAttributes, FileAttributes, FilesystemAdapter, Listing, Reader, StorageAttributes,
};
pub use cache::{CacheStats, ChildFilter, MetadataCache};
pub use client::{ByteStream, ListPage, PageRequest, RemoteClient, RemoteResult, TimeoutClient};
pub use config::{
    AdapterConfig, DeletePolicy, DuplicatePolicy, Visibility, VisibilityMapping, WriteOptions,
};
pub use drive::DriveAdapter;
pub use error::{
    AdapterError, AdapterResult, Error, MetadataKind, Operation, RemoteError, RemoteErrorKind,
    Result,
};
pub use memory::MemoryClient;
pub use object::{
    NewObject, ObjectId, ObjectPatch, Permission, PermissionKind, PermissionRole, RemoteObject,
};
pub use query::{Clause, Query};
pub use resolver::{PathResolver, ResolvedPath};
