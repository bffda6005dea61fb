// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Adapter behavior over the in-memory client: existence, read/write,
//! delete, directories, move/copy, duplicates, visibility and caching.

use bytes::Bytes;
use drivefs::memory::ROOT_ID;
use drivefs::{
    AdapterConfig, DeletePolicy, DriveAdapter, DuplicatePolicy, Error, FilesystemAdapter,
    MemoryClient, ObjectId, Operation, Visibility, VisibilityMapping, WriteOptions,
};
use std::sync::Arc;
use std::time::Duration;

fn new_adapter(config: AdapterConfig) -> (MemoryClient, DriveAdapter) {
    let client = MemoryClient::new();
    let adapter = DriveAdapter::new(Arc::new(client.clone()), config).unwrap();
    (client, adapter)
}

fn opts() -> WriteOptions {
    WriteOptions::new()
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    fs.create_directory("/docs", &opts()).await.unwrap();

    for (name, body) in [
        ("/docs/empty.txt", &b""[..]),
        ("/docs/hello.txt", &b"hello world"[..]),
        ("/docs/binary.bin", &[0u8, 159, 146, 150, 255][..]),
    ] {
        fs.write(name, Bytes::copy_from_slice(body), &opts())
            .await
            .unwrap();
        assert_eq!(&fs.read(name).await.unwrap()[..], body, "{name}");
        assert!(fs.file_exists(name).await.unwrap());
    }
}

#[tokio::test]
async fn test_paths_are_normalized() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    fs.create_directory("a/b/", &opts()).await.unwrap();
    fs.write("/a/./b/../b/f.txt", Bytes::from_static(b"x"), &opts())
        .await
        .unwrap();

    assert!(fs.file_exists("a/b/f.txt").await.unwrap());
    assert!(fs.directory_exists("/a//b").await.unwrap());

    let err = fs.read("/../f.txt").await.unwrap_err();
    assert!(matches!(err.reason, Error::InvalidPath { .. }));
}

#[tokio::test]
async fn test_delete_then_exists_is_false() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    fs.write("/gone.txt", Bytes::from_static(b"bye"), &opts())
        .await
        .unwrap();
    assert!(fs.file_exists("/gone.txt").await.unwrap());

    fs.delete("/gone.txt").await.unwrap();
    assert!(!fs.file_exists("/gone.txt").await.unwrap());
    assert!(fs.read("/gone.txt").await.unwrap_err().is_not_found());

    // Deleting again, or under a missing parent, still succeeds
    fs.delete("/gone.txt").await.unwrap();
    fs.delete("/no/such/parent.txt").await.unwrap();
}

#[tokio::test]
async fn test_delete_directory_path_is_not_a_file() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    fs.create_directory("/dir", &opts()).await.unwrap();

    let err = fs.delete("/dir").await.unwrap_err();
    assert_eq!(err.operation, Operation::Delete);
    assert!(matches!(err.reason, Error::NotAFile(_)));
    assert!(fs.directory_exists("/dir").await.unwrap());
}

#[tokio::test]
async fn test_exists_with_missing_parent_is_false() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    assert!(!fs.file_exists("/missing/file.txt").await.unwrap());
    assert!(!fs.directory_exists("/missing/dir").await.unwrap());
    assert!(fs.directory_exists("/").await.unwrap());
    assert!(!fs.file_exists("/").await.unwrap());
}

#[tokio::test]
async fn test_exists_distinguishes_files_and_directories() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    fs.create_directory("/d", &opts()).await.unwrap();
    fs.write("/f", Bytes::from_static(b"x"), &opts()).await.unwrap();

    assert!(fs.directory_exists("/d").await.unwrap());
    assert!(!fs.file_exists("/d").await.unwrap());
    assert!(fs.file_exists("/f").await.unwrap());
    assert!(!fs.directory_exists("/f").await.unwrap());
}

#[tokio::test]
async fn test_missing_segment_is_named() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    fs.create_directory("/a", &opts()).await.unwrap();

    let err = fs.read("/a/missing/b").await.unwrap_err();
    assert_eq!(err.operation, Operation::Read);
    assert!(err.is_not_found());
    assert!(
        err.to_string().starts_with("Unable to read file at /a/missing/b"),
        "{err}"
    );
    match err.reason {
        Error::NotFound { missing, .. } => assert_eq!(missing, "/a/missing"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_create_directory_is_idempotent() {
    let (client, fs) = new_adapter(AdapterConfig::default());
    let root = ObjectId::from(ROOT_ID);

    fs.create_directory("/x/y/z", &opts()).await.unwrap();
    let count = client.object_count().await;
    fs.create_directory("/x/y/z", &opts()).await.unwrap();
    fs.create_directory("/x/y", &opts()).await.unwrap();

    assert_eq!(client.object_count().await, count);
    assert_eq!(client.children_named(&root, "x").await.len(), 1);
    assert!(fs.directory_exists("/x/y/z").await.unwrap());
}

#[tokio::test]
async fn test_create_directory_through_file_conflicts() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    fs.write("/file", Bytes::from_static(b"x"), &opts())
        .await
        .unwrap();

    let err = fs
        .create_directory("/file/sub", &opts())
        .await
        .unwrap_err();
    assert_eq!(err.operation, Operation::CreateDirectory);
    match err.reason {
        Error::Conflict { path, .. } => assert_eq!(path, "/file"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_move_renames_and_relinks() {
    let (client, fs) = new_adapter(AdapterConfig::default());
    fs.create_directory("/a", &opts()).await.unwrap();
    fs.create_directory("/b", &opts()).await.unwrap();
    fs.write("/a/f.txt", Bytes::from_static(b"payload"), &opts())
        .await
        .unwrap();
    let a = fs.resolver().resolve("/a").await.unwrap();
    let original = client.children_named(&a.id, "f.txt").await[0].clone();

    fs.move_object("/a/f.txt", "/b/g.txt", &opts())
        .await
        .unwrap();

    assert!(!fs.file_exists("/a/f.txt").await.unwrap());
    assert!(fs.file_exists("/b/g.txt").await.unwrap());
    assert_eq!(&fs.read("/b/g.txt").await.unwrap()[..], b"payload");

    let moved = client.object(&original.id).await.unwrap();
    assert_eq!(moved.name, "g.txt");
    assert!(!moved.has_parent(&a.id));
    assert_eq!(moved.parent_ids.len(), 1);
}

#[tokio::test]
async fn test_move_replaces_destination_file() {
    let (client, fs) = new_adapter(AdapterConfig::default());
    let root = ObjectId::from(ROOT_ID);
    fs.write("/src.txt", Bytes::from_static(b"new"), &opts())
        .await
        .unwrap();
    fs.write("/dst.txt", Bytes::from_static(b"old"), &opts())
        .await
        .unwrap();

    fs.move_object("/src.txt", "/dst.txt", &opts())
        .await
        .unwrap();

    assert_eq!(client.children_named(&root, "dst.txt").await.len(), 1);
    assert_eq!(&fs.read("/dst.txt").await.unwrap()[..], b"new");
    assert!(!fs.file_exists("/src.txt").await.unwrap());
}

#[tokio::test]
async fn test_move_conflicts() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    fs.create_directory("/a/sub", &opts()).await.unwrap();
    fs.create_directory("/target", &opts()).await.unwrap();
    fs.write("/f.txt", Bytes::from_static(b"x"), &opts())
        .await
        .unwrap();

    let err = fs
        .move_object("/a", "/a/sub/a", &opts())
        .await
        .unwrap_err();
    assert_eq!(err.operation, Operation::Move);
    assert!(matches!(err.reason, Error::Conflict { .. }));

    let err = fs
        .move_object("/f.txt", "/target", &opts())
        .await
        .unwrap_err();
    assert!(matches!(err.reason, Error::Conflict { .. }));

    let err = fs
        .move_object("/nope.txt", "/elsewhere.txt", &opts())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_move_directory_carries_contents() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    fs.create_directory("/old/inner", &opts()).await.unwrap();
    fs.write("/old/inner/f.txt", Bytes::from_static(b"x"), &opts())
        .await
        .unwrap();

    fs.move_object("/old", "/new", &opts()).await.unwrap();

    assert!(!fs.directory_exists("/old").await.unwrap());
    assert!(fs.file_exists("/new/inner/f.txt").await.unwrap());
}

#[tokio::test]
async fn test_move_to_same_path_is_noop() {
    let (client, fs) = new_adapter(AdapterConfig::default());
    fs.write("/same.txt", Bytes::from_static(b"x"), &opts())
        .await
        .unwrap();
    let before = client.calls().await.update;

    fs.move_object("/same.txt", "/same.txt", &opts())
        .await
        .unwrap();
    assert_eq!(client.calls().await.update, before);
    assert!(fs.file_exists("/same.txt").await.unwrap());
}

#[tokio::test]
async fn test_copy_creates_independent_object() {
    let (client, fs) = new_adapter(AdapterConfig::default());
    let root = ObjectId::from(ROOT_ID);
    fs.create_directory("/b", &opts()).await.unwrap();
    fs.write(
        "/a.dat",
        Bytes::from_static(b"copy me"),
        &opts().mime_type("application/x-sample"),
    )
    .await
    .unwrap();

    fs.copy_object("/a.dat", "/b/c.dat", &opts()).await.unwrap();

    assert_eq!(&fs.read("/b/c.dat").await.unwrap()[..], b"copy me");
    assert_eq!(&fs.read("/a.dat").await.unwrap()[..], b"copy me");
    let source = &client.children_named(&root, "a.dat").await[0];
    let b = fs.resolver().resolve("/b").await.unwrap();
    let copy = &client.children_named(&b.id, "c.dat").await[0];
    assert_ne!(source.id, copy.id);
    assert_eq!(copy.mime_type, "application/x-sample");
    assert_eq!(client.content(&copy.id).await.unwrap(), client.content(&source.id).await.unwrap());

    fs.create_directory("/dir", &opts()).await.unwrap();
    let err = fs.copy_object("/dir", "/dir2", &opts()).await.unwrap_err();
    assert_eq!(err.operation, Operation::Copy);
    assert!(matches!(err.reason, Error::NotAFile(_)));
}

#[tokio::test]
async fn test_duplicate_names() {
    let client = MemoryClient::new();
    let root = ObjectId::from(ROOT_ID);
    _ = client.insert_file("dup.txt", &root, b"older").await;
    _ = client.insert_file("dup.txt", &root, b"newer").await;

    let fs = DriveAdapter::new(Arc::new(client.clone()), AdapterConfig::default()).unwrap();
    assert!(fs.file_exists("/dup.txt").await.unwrap());
    assert_eq!(&fs.read("/dup.txt").await.unwrap()[..], b"newer");

    let fs = DriveAdapter::new(
        Arc::new(client.clone()),
        AdapterConfig::default().with_duplicate_policy(DuplicatePolicy::OldestModified),
    )
    .unwrap();
    assert_eq!(&fs.read("/dup.txt").await.unwrap()[..], b"older");

    let fs = DriveAdapter::new(
        Arc::new(client.clone()),
        AdapterConfig::default().with_duplicate_policy(DuplicatePolicy::Strict),
    )
    .unwrap();
    assert!(fs.file_exists("/dup.txt").await.unwrap());
    let err = fs.read("/dup.txt").await.unwrap_err();
    assert!(matches!(err.reason, Error::AmbiguousName { count: 2, .. }));
}

#[tokio::test]
async fn test_delete_removes_every_duplicate() {
    let client = MemoryClient::new();
    let root = ObjectId::from(ROOT_ID);
    _ = client.insert_file("dup.txt", &root, b"1").await;
    _ = client.insert_file("dup.txt", &root, b"2").await;
    let fs = DriveAdapter::new(Arc::new(client.clone()), AdapterConfig::default()).unwrap();

    fs.delete("/dup.txt").await.unwrap();
    assert!(!fs.file_exists("/dup.txt").await.unwrap());
    assert!(client.children_named(&root, "dup.txt").await.is_empty());
}

#[tokio::test]
async fn test_visibility_unsupported_by_default() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    fs.write("/f.txt", Bytes::from_static(b"x"), &opts())
        .await
        .unwrap();

    let err = fs.visibility("/f.txt").await.unwrap_err();
    assert!(matches!(err.reason, Error::Unsupported { .. }));
    let err = fs
        .set_visibility("/f.txt", Visibility::Public)
        .await
        .unwrap_err();
    assert_eq!(err.operation, Operation::SetVisibility);

    // A write asking for visibility fails before uploading anything
    let err = fs
        .write(
            "/g.txt",
            Bytes::from_static(b"x"),
            &opts().visibility(Visibility::Public),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.reason, Error::Unsupported { .. }));
    assert!(!fs.file_exists("/g.txt").await.unwrap());
}

#[tokio::test]
async fn test_visibility_round_trip_with_link_sharing() {
    let (_client, fs) = new_adapter(
        AdapterConfig::default().with_visibility(VisibilityMapping::AnyoneWithLink),
    );
    fs.write("/f.txt", Bytes::from_static(b"x"), &opts())
        .await
        .unwrap();

    let attrs = fs.visibility("/f.txt").await.unwrap();
    assert_eq!(attrs.visibility, Some(Visibility::Private));

    fs.set_visibility("/f.txt", Visibility::Public).await.unwrap();
    fs.set_visibility("/f.txt", Visibility::Public).await.unwrap();
    let attrs = fs.visibility("/f.txt").await.unwrap();
    assert_eq!(attrs.visibility, Some(Visibility::Public));

    fs.set_visibility("/f.txt", Visibility::Private).await.unwrap();
    let attrs = fs.visibility("/f.txt").await.unwrap();
    assert_eq!(attrs.visibility, Some(Visibility::Private));

    fs.write(
        "/p.txt",
        Bytes::from_static(b"x"),
        &opts().visibility(Visibility::Public),
    )
    .await
    .unwrap();
    let attrs = fs.visibility("/p.txt").await.unwrap();
    assert_eq!(attrs.visibility, Some(Visibility::Public));
}

#[tokio::test]
async fn test_metadata_projections() {
    let (_client, fs) = new_adapter(AdapterConfig::default());
    fs.write("/page.html", Bytes::from_static(b"<html></html>"), &opts())
        .await
        .unwrap();

    let attrs = fs.mime_type("/page.html").await.unwrap();
    assert_eq!(attrs.path, "/page.html");
    assert_eq!(attrs.mime_type.as_deref(), Some("text/html"));

    let attrs = fs.file_size("/page.html").await.unwrap();
    assert_eq!(attrs.file_size, Some(13));

    let attrs = fs.last_modified("/page.html").await.unwrap();
    assert!(attrs.last_modified.is_some());

    let err = fs.file_size("/absent").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_repeated_resolution_uses_cache() {
    let (client, fs) = new_adapter(AdapterConfig::default());
    fs.create_directory("/a/b", &opts()).await.unwrap();
    fs.write("/a/b/f.txt", Bytes::from_static(b"x"), &opts())
        .await
        .unwrap();

    assert!(fs.file_exists("/a/b/f.txt").await.unwrap());
    let lists = client.calls().await.list;
    for _ in 0..5 {
        assert!(fs.file_exists("/a/b/f.txt").await.unwrap());
    }
    assert_eq!(client.calls().await.list, lists);
    assert!(fs.cache_stats().await.hits > 0);
}

#[tokio::test(start_paused = true)]
async fn test_cache_max_age_requeries() {
    let (client, fs) = new_adapter(
        AdapterConfig::default().with_cache_max_age(Duration::from_secs(60)),
    );
    fs.write("/f.txt", Bytes::from_static(b"x"), &opts())
        .await
        .unwrap();

    assert!(fs.file_exists("/f.txt").await.unwrap());
    client.reset_calls().await;
    assert!(fs.file_exists("/f.txt").await.unwrap());
    assert_eq!(client.calls().await.total(), 0);

    tokio::time::advance(Duration::from_secs(61)).await;
    assert!(fs.file_exists("/f.txt").await.unwrap());
    assert!(client.calls().await.list > 0);
    assert!(fs.cache_stats().await.expirations > 0);
}

#[tokio::test]
async fn test_mutations_invalidate_every_parent_of_a_shared_file() {
    let (client, fs) = new_adapter(AdapterConfig::default());
    let root = ObjectId::from(ROOT_ID);
    let a = client.insert_folder("a", &root).await;
    let b = client.insert_folder("b", &root).await;
    _ = client
        .insert("x.txt", &[&a.id, &b.id], "text/plain", b"old")
        .await;

    assert_eq!(fs.file_size("/a/x.txt").await.unwrap().file_size, Some(3));
    fs.write("/b/x.txt", Bytes::from_static(b"nineteen bytes long"), &opts())
        .await
        .unwrap();
    assert_eq!(fs.file_size("/a/x.txt").await.unwrap().file_size, Some(19));
    assert_eq!(&fs.read("/a/x.txt").await.unwrap()[..], b"nineteen bytes long");

    // A rename applies under both parents
    assert!(!fs.file_exists("/a/y.txt").await.unwrap());
    fs.move_object("/b/x.txt", "/b/y.txt", &opts()).await.unwrap();
    assert!(!fs.file_exists("/a/x.txt").await.unwrap());
    assert!(fs.file_exists("/a/y.txt").await.unwrap());
    assert!(fs.file_exists("/b/y.txt").await.unwrap());

    // Deleting through one parent leaves the other link in place
    fs.delete("/b/y.txt").await.unwrap();
    assert!(!fs.file_exists("/b/y.txt").await.unwrap());
    assert!(fs.file_exists("/a/y.txt").await.unwrap());
    fs.delete("/a/y.txt").await.unwrap();
    assert!(!fs.file_exists("/a/y.txt").await.unwrap());
}

#[tokio::test]
async fn test_other_writers_are_not_seen_through_cache() {
    let (client, fs) = new_adapter(AdapterConfig::default());
    let root = ObjectId::from(ROOT_ID);

    assert!(!fs.file_exists("/late.txt").await.unwrap());
    _ = client.insert_file("late.txt", &root, b"x").await;
    // Without max-age the negative lookup stands until cleared
    assert!(!fs.file_exists("/late.txt").await.unwrap());

    fs.resolver().cache().clear().await;
    assert!(fs.file_exists("/late.txt").await.unwrap());
}

#[tokio::test]
async fn test_trash_and_permanent_delete_directory() {
    let (client, fs) = new_adapter(AdapterConfig::default());
    fs.create_directory("/t/inner", &opts()).await.unwrap();
    fs.write("/t/inner/f.txt", Bytes::from_static(b"x"), &opts())
        .await
        .unwrap();
    let count = client.object_count().await;

    fs.delete_directory("/t").await.unwrap();
    assert!(!fs.directory_exists("/t").await.unwrap());
    // Trashed objects remain in the backend
    assert_eq!(client.object_count().await, count);

    let (client, fs) = new_adapter(
        AdapterConfig::default().with_delete_policy(DeletePolicy::Permanent),
    );
    fs.create_directory("/t/inner", &opts()).await.unwrap();
    fs.write("/t/inner/f.txt", Bytes::from_static(b"x"), &opts())
        .await
        .unwrap();
    let count = client.object_count().await;

    fs.delete_directory("/t").await.unwrap();
    assert!(!fs.directory_exists("/t").await.unwrap());
    assert_eq!(client.object_count().await, count - 3);
}
