// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Content type detection for uploads without a declared MIME type

use crate::object::DEFAULT_MIME_TYPE;

const BY_EXTENSION: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("parquet", "application/vnd.apache.parquet"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
];

const BY_MAGIC: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b", "application/gzip"),
    (b"PAR1", "application/vnd.apache.parquet"),
];

/// Type implied by the file name's extension, if known
#[must_use]
pub fn from_path(path: &str) -> Option<&'static str> {
    let ext = crate::path::extension(path)?.to_ascii_lowercase();
    BY_EXTENSION
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Type implied by leading magic bytes, or `text/plain` for UTF-8 content
#[must_use]
pub fn from_content(content: &[u8]) -> Option<&'static str> {
    if let Some((_, mime)) = BY_MAGIC.iter().find(|(magic, _)| content.starts_with(magic)) {
        return Some(*mime);
    }
    if !content.is_empty() && std::str::from_utf8(content).is_ok() && !content.contains(&0) {
        return Some("text/plain");
    }
    None
}

/// Extension first, then content sniffing, then the generic binary type
#[must_use]
pub fn detect(path: &str, content: Option<&[u8]>) -> &'static str {
    from_path(path)
        .or_else(|| content.and_then(from_content))
        .unwrap_or(DEFAULT_MIME_TYPE)
}
