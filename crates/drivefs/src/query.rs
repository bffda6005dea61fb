// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Listing filter expressions.
//!
//! Queries are a conjunction of exact-match clauses. There is no
//! substring clause: every name lookup is scoped to a parent ID.

use crate::object::{FOLDER_MIME_TYPE, ObjectId, RemoteObject};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    ParentIs(ObjectId),
    NameIs(String),
    MimeTypeIs(String),
    Trashed(bool),
}

impl Clause {
    #[must_use]
    pub fn matches(&self, object: &RemoteObject) -> bool {
        match self {
            Clause::ParentIs(id) => object.has_parent(id),
            Clause::NameIs(name) => object.name == *name,
            Clause::MimeTypeIs(m) => object.mime_type == *m,
            Clause::Trashed(t) => object.trashed == *t,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    clauses: Vec<Clause>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-trashed children of `parent`
    #[must_use]
    pub fn children_of(parent: &ObjectId) -> Self {
        Self::new()
            .with(Clause::ParentIs(parent.clone()))
            .with(Clause::Trashed(false))
    }

    /// Non-trashed children of `parent` with exactly this name
    #[must_use]
    pub fn child_named(parent: &ObjectId, name: &str) -> Self {
        Self::children_of(parent).with(Clause::NameIs(name.to_string()))
    }

    #[must_use]
    pub fn folders_only(self) -> Self {
        self.with(Clause::MimeTypeIs(FOLDER_MIME_TYPE.to_string()))
    }

    #[must_use]
    pub fn with(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    #[must_use]
    pub fn matches(&self, object: &RemoteObject) -> bool {
        self.clauses.iter().all(|c| c.matches(object))
    }
}

/// Quote a string literal for the backend query language
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::ParentIs(id) => write!(f, "{} in parents", quote(id.as_str())),
            Clause::NameIs(name) => write!(f, "name = {}", quote(name)),
            Clause::MimeTypeIs(m) => write!(f, "mimeType = {}", quote(m)),
            Clause::Trashed(t) => write!(f, "trashed = {t}"),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}
