// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};

pub const ROOT: &str = "/";

/// Normalizes a `/`-delimited path.
///
/// The result always has a leading slash, no trailing slash (except the
/// root itself), and no empty or `.` segments. `..` removes the previous
/// segment and is an error when it would climb above the root.
pub fn normalize(path: &str) -> Result<String> {
    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(Error::invalid_path(path, "traverses above root"));
                }
            }
            s => {
                if s.chars().any(char::is_control) {
                    return Err(Error::invalid_path(path, "control character in segment"));
                }
                segments.push(s);
            }
        }
    }
    Ok(format!("/{}", segments.join("/")))
}

/// Segments of a normalized path; empty for the root
#[must_use]
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[must_use]
pub fn is_root(path: &str) -> bool {
    path == ROOT
}

/// Splits a normalized path into `(parent_path, base_name)`; `None` for the root
#[must_use]
pub fn split(path: &str) -> Option<(&str, &str)> {
    if is_root(path) {
        return None;
    }
    let idx = path.rfind('/')?;
    let parent = if idx == 0 { ROOT } else { &path[..idx] };
    Some((parent, &path[idx + 1..]))
}

#[must_use]
pub fn basename(path: &str) -> Option<&str> {
    split(path).map(|(_, base)| base)
}

#[must_use]
pub fn extension(path: &str) -> Option<&str> {
    let base = basename(path)?;
    match base.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&base[idx + 1..]),
    }
}

/// Joins a normalized parent path and a single segment
#[must_use]
pub fn join(parent: &str, name: &str) -> String {
    if is_root(parent) {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// True if `path` equals `ancestor` or lies beneath it
#[must_use]
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if is_root(ancestor) {
        return true;
    }
    path == ancestor
        || (path.starts_with(ancestor) && path.as_bytes().get(ancestor.len()) == Some(&b'/'))
}
