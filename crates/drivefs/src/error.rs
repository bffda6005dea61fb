// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for drive resolution and adapter operations

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by the filesystem adapter contract
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Classification of a failure reported by the remote object client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    NotFound,
    PermissionDenied,
    QuotaExceeded,
    Timeout,
    Transport,
    Other,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RemoteErrorKind::NotFound => "not found",
            RemoteErrorKind::PermissionDenied => "permission denied",
            RemoteErrorKind::QuotaExceeded => "quota exceeded",
            RemoteErrorKind::Timeout => "timed out",
            RemoteErrorKind::Transport => "transport failure",
            RemoteErrorKind::Other => "remote failure",
        };
        f.write_str(s)
    }
}

/// Failure raised by a `RemoteClient` implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new<S: Into<String>>(kind: RemoteErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::new(RemoteErrorKind::NotFound, message)
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::new(RemoteErrorKind::Transport, message)
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::new(RemoteErrorKind::Timeout, message)
    }
}

/// Errors produced while resolving paths and talking to the backend
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `missing` is the first absent sub-path, which may be an ancestor of `path`
    #[error("Path not found: {path} (missing {missing})")]
    NotFound { path: String, missing: String },

    #[error("Not a directory: {0}")]
    NotAFolder(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Conflict at {path}: {reason}")]
    Conflict { path: String, reason: String },

    #[error("Ambiguous name: {count} objects named {path}")]
    AmbiguousName { path: String, count: usize },

    #[error("Unsupported operation at {path}: {what}")]
    Unsupported { path: String, what: String },

    #[error("Parent-link cycle detected at {0}")]
    Cycle(String),

    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Metadata unavailable at {path}: {field}")]
    MetadataUnavailable { path: String, field: &'static str },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote failure at {path}: {source}")]
    Remote {
        path: String,
        #[source]
        source: RemoteError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_found<P: Into<String>, M: Into<String>>(path: P, missing: M) -> Self {
        Error::NotFound {
            path: path.into(),
            missing: missing.into(),
        }
    }

    pub fn not_a_folder<P: Into<String>>(path: P) -> Self {
        Error::NotAFolder(path.into())
    }

    pub fn not_a_file<P: Into<String>>(path: P) -> Self {
        Error::NotAFile(path.into())
    }

    pub fn conflict<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        Error::Conflict {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported<P: Into<String>, W: Into<String>>(path: P, what: W) -> Self {
        Error::Unsupported {
            path: path.into(),
            what: what.into(),
        }
    }

    pub fn cycle<P: Into<String>>(path: P) -> Self {
        Error::Cycle(path.into())
    }

    pub fn invalid_path<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn remote<P: Into<String>>(path: P, source: RemoteError) -> Self {
        Error::Remote {
            path: path.into(),
            source,
        }
    }

    /// True when the path (or one of its ancestors) does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Remote { source, .. } => source.kind == RemoteErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Extension for attaching a path to client results
pub trait RemoteResultExt<T> {
    fn at_path(self, path: &str) -> Result<T>;
}

impl<T> RemoteResultExt<T> for std::result::Result<T, RemoteError> {
    fn at_path(self, path: &str) -> Result<T> {
        self.map_err(|e| Error::remote(path, e))
    }
}

/// The adapter operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CheckExistence,
    Write,
    Read,
    Delete,
    DeleteDirectory,
    CreateDirectory,
    Move,
    Copy,
    List,
    RetrieveMetadata(MetadataKind),
    SetVisibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    MimeType,
    LastModified,
    FileSize,
    Visibility,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CheckExistence => f.write_str("check existence"),
            Operation::Write => f.write_str("write file"),
            Operation::Read => f.write_str("read file"),
            Operation::Delete => f.write_str("delete file"),
            Operation::DeleteDirectory => f.write_str("delete directory"),
            Operation::CreateDirectory => f.write_str("create directory"),
            Operation::Move => f.write_str("move"),
            Operation::Copy => f.write_str("copy"),
            Operation::List => f.write_str("list contents"),
            Operation::RetrieveMetadata(kind) => {
                let field = match kind {
                    MetadataKind::MimeType => "mime type",
                    MetadataKind::LastModified => "last modified",
                    MetadataKind::FileSize => "file size",
                    MetadataKind::Visibility => "visibility",
                };
                write!(f, "retrieve {field}")
            }
            Operation::SetVisibility => f.write_str("set visibility"),
        }
    }
}

/// Failure of a filesystem adapter operation, wrapping the underlying cause
#[derive(Debug, thiserror::Error)]
#[error("Unable to {operation} at {path}: {reason}")]
pub struct AdapterError {
    pub operation: Operation,
    pub path: String,
    #[source]
    pub reason: Error,
}

impl AdapterError {
    pub fn new<P: Into<String>>(operation: Operation, path: P, reason: Error) -> Self {
        Self {
            operation,
            path: path.into(),
            reason,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.reason.is_not_found()
    }
}
