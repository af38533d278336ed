//! Redis post backend.
//!
//! Posts live in a single hash (field = post id, value = JSON record), so
//! a full scan is one `HVALS`. Redis assigns no ids; the coordinator must
//! supply one before insertion.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::PostBackend;
use crate::error::BackendError;
use crate::post::{BackendKind, NewPost, Post};
use crate::{Error, Result};

/// Redis backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Hash key the post records are stored under
    #[serde(default = "default_hash_key")]
    pub hash_key: String,
}

fn default_hash_key() -> String {
    "posts".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct RedisRecord {
    id: String,
    user_id: String,
    text: String,
    image_url: String,
}

impl RedisRecord {
    fn from_post(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            user_id: post.user_id.clone(),
            text: post.text.clone(),
            image_url: post.image_url.clone(),
        }
    }

    fn into_post(self) -> Post {
        Post {
            id: self.id,
            user_id: self.user_id,
            text: self.text,
            image_url: self.image_url,
            backend: BackendKind::Redis,
        }
    }
}

/// Redis post backend.
pub struct RedisBackend {
    conn: MultiplexedConnection,
    hash_key: String,
}

impl RedisBackend {
    /// Connect to the configured Redis instance.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Connected to Redis post backend");
        Ok(Self {
            conn,
            hash_key: config.hash_key.clone(),
        })
    }
}

#[async_trait]
impl PostBackend for RedisBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Redis
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        debug!("Redis HVALS {}", self.hash_key);
        let mut conn = self.conn.clone();
        let values: Vec<String> = conn.hvals(&self.hash_key).await?;

        values
            .iter()
            .map(|value| {
                let record: RedisRecord = serde_json::from_str(value)?;
                Ok(record.into_post())
            })
            .collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>> {
        debug!("Redis HGET {} {}", self.hash_key, id);
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.hget(&self.hash_key, id).await?;

        match value {
            Some(value) => {
                let record: RedisRecord = serde_json::from_str(&value)?;
                Ok(Some(record.into_post()))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, post: NewPost) -> Result<Post> {
        let id = post.id.ok_or_else(|| {
            Error::Backend(BackendError::Redis(
                "Redis assigns no ids; caller must supply one".to_string(),
            ))
        })?;

        let persisted = Post {
            id: id.clone(),
            user_id: post.user_id,
            text: post.text,
            image_url: post.image_url,
            backend: BackendKind::Redis,
        };
        let value = serde_json::to_string(&RedisRecord::from_post(&persisted))?;

        debug!("Redis HSET {} {}", self.hash_key, id);
        let mut conn = self.conn.clone();
        let _: () = conn.hset(&self.hash_key, &id, value).await?;
        Ok(persisted)
    }

    async fn update(&self, post: &Post) -> Result<()> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.hexists(&self.hash_key, &post.id).await?;
        if !exists {
            return Err(Error::NotFound {
                backend: BackendKind::Redis,
                id: post.id.clone(),
            });
        }

        let value = serde_json::to_string(&RedisRecord::from_post(post))?;
        debug!("Redis HSET (update) {} {}", self.hash_key, post.id);
        let _: () = conn.hset(&self.hash_key, &post.id, value).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        debug!("Redis HDEL {} {}", self.hash_key, id);
        let mut conn = self.conn.clone();
        let removed: i64 = conn.hdel(&self.hash_key, id).await?;
        if removed == 0 {
            return Err(Error::NotFound {
                backend: BackendKind::Redis,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
