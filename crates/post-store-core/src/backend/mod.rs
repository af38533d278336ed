//! Post storage backends.
//!
//! One uniform CRUD contract fronting four heterogeneous engines:
//!
//! - **Postgres**: relational store (sqlx)
//! - **Mongodb**: document store
//! - **Redis**: key-value store (caller-assigned ids)
//! - **Elasticsearch**: search index
//! - **Memory**: in-memory backend (for testing)

mod elasticsearch;
mod memory;
mod mongodb;
mod postgres;
mod redis;

pub use self::elasticsearch::{ElasticsearchBackend, ElasticsearchConfig};
pub use self::memory::MemoryBackend;
pub use self::mongodb::{MongodbBackend, MongodbConfig};
pub use self::postgres::{PostgresBackend, PostgresConfig};
pub use self::redis::{RedisBackend, RedisConfig};

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::BackendsConfig;
use crate::post::{BackendKind, NewPost, Post};
use crate::Result;

/// Trait for post storage backends.
///
/// Absent records are `Ok(None)` on lookup, not errors; `update` and
/// `delete` of a missing id fail with `Error::NotFound`. Transient driver
/// failures are propagated as `Error::Backend` and never retried.
#[async_trait]
pub trait PostBackend: Send + Sync {
    /// Which engine this adapter fronts.
    fn kind(&self) -> BackendKind;

    /// Full scan; order is backend-defined and not guaranteed stable.
    async fn find_all(&self) -> Result<Vec<Post>>;

    /// Look up a single post by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Post>>;

    /// Insert a new record, returning the persisted post with its final id.
    ///
    /// Backends without server-side id generation require `post.id` to be
    /// pre-populated by the coordinator.
    async fn insert(&self, post: NewPost) -> Result<Post>;

    /// Replace the stored record matching `post.id`.
    async fn update(&self, post: &Post) -> Result<()>;

    /// Remove the record with the given id.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// The four backends addressed by the coordinator, keyed by kind.
#[derive(Clone)]
pub struct BackendSet {
    postgres: Arc<dyn PostBackend>,
    mongodb: Arc<dyn PostBackend>,
    redis: Arc<dyn PostBackend>,
    elasticsearch: Arc<dyn PostBackend>,
}

impl BackendSet {
    /// Assemble a set from four adapters, one per kind.
    pub fn new(
        postgres: Arc<dyn PostBackend>,
        mongodb: Arc<dyn PostBackend>,
        redis: Arc<dyn PostBackend>,
        elasticsearch: Arc<dyn PostBackend>,
    ) -> Self {
        debug_assert_eq!(postgres.kind(), BackendKind::Postgres);
        debug_assert_eq!(mongodb.kind(), BackendKind::Mongodb);
        debug_assert_eq!(redis.kind(), BackendKind::Redis);
        debug_assert_eq!(elasticsearch.kind(), BackendKind::Elasticsearch);
        Self {
            postgres,
            mongodb,
            redis,
            elasticsearch,
        }
    }

    /// Connect all four real backends from configuration.
    pub async fn connect(config: &BackendsConfig) -> Result<Self> {
        let postgres = PostgresBackend::connect(&config.postgres).await?;
        let mongodb = MongodbBackend::connect(&config.mongodb).await?;
        let redis = RedisBackend::connect(&config.redis).await?;
        let elasticsearch = ElasticsearchBackend::connect(&config.elasticsearch)?;

        Ok(Self::new(
            Arc::new(postgres),
            Arc::new(mongodb),
            Arc::new(redis),
            Arc::new(elasticsearch),
        ))
    }

    /// A set of four in-memory backends, for testing.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryBackend::new(BackendKind::Postgres)),
            Arc::new(MemoryBackend::new(BackendKind::Mongodb)),
            Arc::new(MemoryBackend::new(BackendKind::Redis)),
            Arc::new(MemoryBackend::new(BackendKind::Elasticsearch)),
        )
    }

    /// The adapter for one backend kind.
    pub fn get(&self, kind: BackendKind) -> &Arc<dyn PostBackend> {
        match kind {
            BackendKind::Postgres => &self.postgres,
            BackendKind::Mongodb => &self.mongodb,
            BackendKind::Redis => &self.redis,
            BackendKind::Elasticsearch => &self.elasticsearch,
        }
    }

    /// Iterate over all four adapters in aggregation order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PostBackend>> {
        BackendKind::all().iter().map(|kind| self.get(*kind))
    }
}
