//! Cross-backend fan-out aggregation (`list_by_user`).

use std::collections::HashSet;

use post_store_core::{BackendKind, Error};

use super::helpers::{build_store, build_store_with_failing, build_store_with_failing_redis, save_post};

#[tokio::test]
async fn aggregates_exactly_the_users_posts_across_all_backends() {
    let store = build_store();

    let mut expected = HashSet::new();
    for kind in BackendKind::all() {
        let post = save_post(&store, "u1", *kind, "mine").await;
        expected.insert((post.backend, post.id));
    }
    // Noise owned by someone else.
    save_post(&store, "u2", BackendKind::Postgres, "theirs").await;
    save_post(&store, "u2", BackendKind::Redis, "theirs").await;

    let aggregated = store.list_by_user("u1").await.unwrap();

    // Ordering across backends is unspecified; compare as a set.
    let got: HashSet<_> = aggregated
        .iter()
        .map(|post| (post.backend, post.id.clone()))
        .collect();
    assert_eq!(got, expected);
    assert_eq!(aggregated.len(), 4, "no duplicates expected");
    assert!(aggregated.iter().all(|post| post.user_id == "u1"));
}

#[tokio::test]
async fn aggregation_for_unknown_user_is_empty() {
    let store = build_store();
    save_post(&store, "u1", BackendKind::Mongodb, "hello").await;

    let aggregated = store.list_by_user("nobody").await.unwrap();
    assert!(aggregated.is_empty());
}

#[tokio::test]
async fn scales_past_one_post_per_backend() {
    let store = build_store();
    for _ in 0..3 {
        save_post(&store, "u1", BackendKind::Redis, "mine").await;
    }
    save_post(&store, "u1", BackendKind::Elasticsearch, "mine").await;
    save_post(&store, "u2", BackendKind::Redis, "theirs").await;

    let aggregated = store.list_by_user("u1").await.unwrap();
    assert_eq!(aggregated.len(), 4);

    let ids: HashSet<_> = aggregated.iter().map(|post| post.id.clone()).collect();
    assert_eq!(ids.len(), 4, "no duplicates expected");
}

#[tokio::test]
async fn one_failing_scan_fails_the_whole_aggregation() {
    let store = build_store_with_failing_redis();

    // The three healthy backends hold real posts; their results must not
    // leak out as a partial aggregate.
    save_post(&store, "u1", BackendKind::Postgres, "mine").await;
    save_post(&store, "u1", BackendKind::Mongodb, "mine").await;
    save_post(&store, "u1", BackendKind::Elasticsearch, "mine").await;

    let err = store.list_by_user("u1").await.unwrap_err();
    match err {
        Error::Aggregate { backend, .. } => assert_eq!(backend, BackendKind::Redis),
        other => panic!("expected Aggregate error, got {other:?}"),
    }
}

#[tokio::test]
async fn every_scan_is_drained_and_the_first_failure_is_reported() {
    // Two failing scans: all handles are still joined, and the error is
    // attributed to the first failing backend in scan order.
    let store = build_store_with_failing(&[BackendKind::Postgres, BackendKind::Redis]);
    save_post(&store, "u1", BackendKind::Mongodb, "mine").await;

    let err = store.list_by_user("u1").await.unwrap_err();
    match err {
        Error::Aggregate { backend, .. } => assert_eq!(backend, BackendKind::Postgres),
        other => panic!("expected Aggregate error, got {other:?}"),
    }
}
