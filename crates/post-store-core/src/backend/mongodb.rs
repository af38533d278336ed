//! MongoDB post backend.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::PostBackend;
use crate::error::BackendError;
use crate::post::{BackendKind, NewPost, Post};
use crate::{Error, Result};

/// MongoDB backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongodbConfig {
    /// Connection URL (e.g., "mongodb://localhost:27017")
    pub url: String,
    /// Database holding the posts collection
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_database() -> String {
    "posts".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct PostDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    user_id: String,
    text: String,
    image_url: String,
}

impl PostDocument {
    fn into_post(self) -> Result<Post> {
        let id = self.id.ok_or_else(|| {
            Error::Backend(BackendError::Mongodb(
                "document is missing its _id".to_string(),
            ))
        })?;
        Ok(Post {
            id: id.to_hex(),
            user_id: self.user_id,
            text: self.text,
            image_url: self.image_url,
            backend: BackendKind::Mongodb,
        })
    }
}

/// MongoDB post backend.
///
/// Ids are `ObjectId`s assigned by the server, rendered as hex strings.
pub struct MongodbBackend {
    posts: Collection<PostDocument>,
}

impl MongodbBackend {
    /// Connect to the configured database.
    pub async fn connect(config: &MongodbConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.url).await?;
        let posts = client.database(&config.database).collection("posts");
        info!("Connected to MongoDB post backend");
        Ok(Self { posts })
    }

    fn parse_id(id: &str) -> Option<ObjectId> {
        ObjectId::parse_str(id).ok()
    }
}

#[async_trait]
impl PostBackend for MongodbBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mongodb
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        debug!("MongoDB find all posts");
        let cursor = self.posts.find(doc! {}).await?;
        let documents: Vec<PostDocument> = cursor.try_collect().await?;

        documents
            .into_iter()
            .map(PostDocument::into_post)
            .collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>> {
        debug!("MongoDB find post {}", id);
        // Ids that are not valid ObjectIds cannot name a stored document.
        let Some(oid) = Self::parse_id(id) else {
            return Ok(None);
        };

        let document = self.posts.find_one(doc! { "_id": oid }).await?;
        document.map(PostDocument::into_post).transpose()
    }

    async fn insert(&self, post: NewPost) -> Result<Post> {
        let id = match &post.id {
            Some(id) => Some(ObjectId::parse_str(id).map_err(|e| {
                Error::Backend(BackendError::Mongodb(format!(
                    "invalid caller-assigned id {}: {}",
                    id, e
                )))
            })?),
            None => None,
        };

        let document = PostDocument {
            id,
            user_id: post.user_id,
            text: post.text,
            image_url: post.image_url,
        };

        let result = self.posts.insert_one(&document).await?;
        let inserted_id = result.inserted_id.as_object_id().ok_or_else(|| {
            Error::Backend(BackendError::Mongodb(
                "server returned a non-ObjectId _id".to_string(),
            ))
        })?;

        debug!("MongoDB inserted post {}", inserted_id.to_hex());
        PostDocument {
            id: Some(inserted_id),
            ..document
        }
        .into_post()
    }

    async fn update(&self, post: &Post) -> Result<()> {
        debug!("MongoDB replace post {}", post.id);
        let not_found = || Error::NotFound {
            backend: BackendKind::Mongodb,
            id: post.id.clone(),
        };
        let oid = Self::parse_id(&post.id).ok_or_else(not_found)?;

        let document = PostDocument {
            id: Some(oid),
            user_id: post.user_id.clone(),
            text: post.text.clone(),
            image_url: post.image_url.clone(),
        };

        let result = self
            .posts
            .replace_one(doc! { "_id": oid }, &document)
            .await?;
        if result.matched_count == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        debug!("MongoDB delete post {}", id);
        let not_found = || Error::NotFound {
            backend: BackendKind::Mongodb,
            id: id.to_string(),
        };
        let oid = Self::parse_id(id).ok_or_else(not_found)?;

        let result = self.posts.delete_one(doc! { "_id": oid }).await?;
        if result.deleted_count == 0 {
            return Err(not_found());
        }
        Ok(())
    }
}
