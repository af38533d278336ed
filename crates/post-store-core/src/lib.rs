//! Multi-Backend Post Store Core Library
//!
//! This crate provides the core functionality for storing short text+image
//! posts in one of four interchangeable storage backends (PostgreSQL,
//! MongoDB, Redis, Elasticsearch), with post images kept in an external
//! S3-compatible blob store and a concurrent fan-out read that aggregates
//! one user's posts across all four backends.

pub mod auth;
pub mod backend;
pub mod blob;
pub mod config;
pub mod error;
pub mod post;
pub mod service;

pub use auth::Caller;
pub use backend::{
    BackendSet, ElasticsearchBackend, ElasticsearchConfig, MemoryBackend, MongodbBackend,
    MongodbConfig, PostBackend, PostgresBackend, PostgresConfig, RedisBackend, RedisConfig,
};
pub use blob::{object_name_from_url, BlobStore, BlobStoreConfig};
pub use config::{BackendsConfig, Config};
pub use error::{BackendError, Error, Result};
pub use post::{BackendKind, NewPost, Post};
pub use service::PostStore;
