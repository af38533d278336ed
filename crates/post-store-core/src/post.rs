//! Post entity shared by every storage backend.
//!
//! The coordinator and the aggregation path depend only on this shape,
//! never on driver-level records.

use serde::{Deserialize, Serialize};

/// The four interchangeable storage engines a post can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Relational store
    Postgres,
    /// Document store
    Mongodb,
    /// Key-value store
    Redis,
    /// Search index
    Elasticsearch,
}

impl BackendKind {
    /// Backend-origin tag as persisted alongside the post.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "Postgres",
            Self::Mongodb => "Mongodb",
            Self::Redis => "Redis",
            Self::Elasticsearch => "Elasticsearch",
        }
    }

    /// All backend kinds, in aggregation order.
    #[must_use]
    pub fn all() -> &'static [BackendKind] {
        &[
            Self::Postgres,
            Self::Mongodb,
            Self::Redis,
            Self::Elasticsearch,
        ]
    }

    /// Whether the engine assigns ids itself on insert.
    ///
    /// Redis has no native id generation, so the coordinator must supply a
    /// freshly generated UUID before insertion.
    #[must_use]
    pub fn server_generated_ids(&self) -> bool {
        !matches!(self, Self::Redis)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Opaque identifier, unique within its backend only.
    pub id: String,
    /// Identifier of the creating user; immutable after creation.
    pub user_id: String,
    /// Post body; never empty.
    pub text: String,
    /// URL of the image object in the blob store.
    pub image_url: String,
    /// Which backend stores this record; set at construction.
    pub backend: BackendKind,
}

/// A post that has not been persisted yet.
///
/// `id` is `None` when the target backend assigns identifiers itself.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: Option<String>,
    pub user_id: String,
    pub text: String,
    pub image_url: String,
}
