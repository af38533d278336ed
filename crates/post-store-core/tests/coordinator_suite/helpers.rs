//! Test helper utilities.
//!
//! Builds coordinators over in-memory backends and an in-memory blob
//! store, plus a fault-injecting backend for aggregation failure tests.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use post_store_core::{
    BackendError, BackendKind, BackendSet, BlobStore, Caller, Error, MemoryBackend, NewPost, Post,
    PostBackend, PostStore, Result,
};

/// Build a coordinator over four in-memory backends.
pub fn build_store() -> PostStore {
    PostStore::new(
        BackendSet::in_memory(),
        Arc::new(BlobStore::in_memory("post-images")),
    )
}

/// Build a coordinator whose key-value backend fails every scan.
pub fn build_store_with_failing_redis() -> PostStore {
    build_store_with_failing(&[BackendKind::Redis])
}

/// Build a coordinator where the given backend kinds fail every operation.
pub fn build_store_with_failing(kinds: &[BackendKind]) -> PostStore {
    let adapter = |kind: BackendKind| -> Arc<dyn PostBackend> {
        if kinds.contains(&kind) {
            Arc::new(FailingBackend { kind })
        } else {
            Arc::new(MemoryBackend::new(kind))
        }
    };
    let backends = BackendSet::new(
        adapter(BackendKind::Postgres),
        adapter(BackendKind::Mongodb),
        adapter(BackendKind::Redis),
        adapter(BackendKind::Elasticsearch),
    );
    PostStore::new(backends, Arc::new(BlobStore::in_memory("post-images")))
}

pub fn caller(user_id: &str) -> Caller {
    Caller::new(user_id)
}

pub fn image(bytes: &'static str) -> Bytes {
    Bytes::from(bytes)
}

/// Save a post and return it.
pub async fn save_post(store: &PostStore, user_id: &str, kind: BackendKind, text: &str) -> Post {
    store
        .save(&caller(user_id), kind, text, image("IMG"))
        .await
        .expect("save should succeed")
}

/// Backend whose every operation fails, for injected-failure tests.
pub struct FailingBackend {
    pub kind: BackendKind,
}

impl FailingBackend {
    fn fail<T>(&self) -> Result<T> {
        Err(Error::Backend(BackendError::Other(format!(
            "injected {} failure",
            self.kind
        ))))
    }
}

#[async_trait]
impl PostBackend for FailingBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        self.fail()
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<Post>> {
        self.fail()
    }

    async fn insert(&self, _post: NewPost) -> Result<Post> {
        self.fail()
    }

    async fn update(&self, _post: &Post) -> Result<()> {
        self.fail()
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        self.fail()
    }
}
