mod common;

use std::time::Duration;

use blobsync_daemon::blob::Snapshot;
use blobsync_daemon::scheduler::{self, run_pass};
use blobsync_daemon::storage::StorageBackend;
use blobsync_daemon::utils::multiset_equal;
use common::{memory_config, memory_store};
use tokio::sync::watch;

#[tokio::test]
async fn test_full_pass_over_memory_backend() {
    let store = memory_store();
    let config = memory_config();

    // Hub: one blob updated upstream, one removed downstream.
    store
        .put_blob("hub", "report.pdf", Some("2024-01-02T00:00:00Z"), "2048")
        .await
        .unwrap();
    store
        .put_blob("hub", "obsolete.log", Some("2024-01-01T00:00:00Z"), "512")
        .await
        .unwrap();

    // Node: the stale counterpart plus a blob born downstream.
    store
        .put_blob("node", "report.pdf", Some("2024-01-01T00:00:00Z"), "2048")
        .await
        .unwrap();
    store
        .put_blob("node", "fresh.dat", Some("2024-01-03T00:00:00Z"), "128")
        .await
        .unwrap();

    let summary = run_pass(&store, &config).await.unwrap();
    assert_eq!(summary.copied_to_dest, 1);
    assert_eq!(summary.copied_to_source, 1);
    assert_eq!(summary.deleted_from_source, 1);

    // Both containers now hold the same blob set.
    assert_eq!(
        store.blob_names("hub").await.unwrap(),
        vec!["fresh.dat", "report.pdf"]
    );
    assert_eq!(
        store.blob_names("node").await.unwrap(),
        vec!["fresh.dat", "report.pdf"]
    );

    // The updated blob carried its metadata to the node.
    assert_eq!(
        store.blob_last_modified("node", "report.pdf").await.unwrap(),
        Some("2024-01-02T00:00:00Z".to_string())
    );

    // Nothing left to do on the next pass.
    let second = run_pass(&store, &config).await.unwrap();
    assert!(second.is_converged());
}

#[tokio::test]
async fn test_zero_length_blobs_are_ignored() {
    let store = memory_store();
    let config = memory_config();

    store
        .put_blob("hub", "folder-marker", Some("2024-01-01T00:00:00Z"), "0")
        .await
        .unwrap();
    store
        .put_blob("node", "other-marker", None, "0")
        .await
        .unwrap();

    let summary = run_pass(&store, &config).await.unwrap();
    assert!(summary.is_converged());

    // Placeholders stay where they were.
    assert_eq!(
        store.blob_names("hub").await.unwrap(),
        vec!["folder-marker"]
    );
    assert_eq!(store.blob_names("node").await.unwrap(), vec!["other-marker"]);
}

#[tokio::test]
async fn test_listing_twice_is_multiset_equal() {
    let store = memory_store();

    store
        .put_blob("hub", "a.txt", Some("2024-01-01T00:00:00Z"), "10")
        .await
        .unwrap();
    store
        .put_blob("hub", "b.txt", Some("2024-01-02T00:00:00Z"), "20")
        .await
        .unwrap();
    store.put_blob("hub", "c.txt", None, "30").await.unwrap();

    let first = Snapshot::from_listing(store.list("hub").await.unwrap()).unwrap();
    let second = Snapshot::from_listing(store.list("hub").await.unwrap()).unwrap();

    assert!(multiset_equal(&first.records, &second.records));
}

#[tokio::test]
async fn test_scheduler_runs_until_shutdown() {
    let store = memory_store();
    let config = memory_config();

    store
        .put_blob("hub", "shared", Some("2024-01-02T00:00:00Z"), "10")
        .await
        .unwrap();
    store
        .put_blob("node", "shared", Some("2024-01-01T00:00:00Z"), "10")
        .await
        .unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let finished = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(scheduler::run(&store, &config, shutdown_rx), async {
            // Give the immediate first tick time to run a pass.
            tokio::time::sleep(Duration::from_millis(200)).await;
            shutdown_tx.send(true).unwrap();
        })
    })
    .await;

    assert!(finished.is_ok(), "scheduler should stop on shutdown signal");

    // The first tick synced the stale node blob.
    assert_eq!(
        store.blob_last_modified("node", "shared").await.unwrap(),
        Some("2024-01-02T00:00:00Z".to_string())
    );
}
