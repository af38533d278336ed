//! In-memory post backend for testing.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::PostBackend;
use crate::error::BackendError;
use crate::post::{BackendKind, NewPost, Post};
use crate::{Error, Result};

/// In-memory post backend.
///
/// Stands in for any of the four engines in tests; it honors the id
/// capability of the kind it is tagged with, so coordinator behavior
/// around caller-assigned ids is exercised the same way as against the
/// real drivers.
pub struct MemoryBackend {
    kind: BackendKind,
    posts: RwLock<HashMap<String, Post>>,
}

impl MemoryBackend {
    /// Create an empty backend tagged with the given kind.
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            posts: RwLock::new(HashMap::new()),
        }
    }

    fn read_posts(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Post>>> {
        self.posts
            .read()
            .map_err(|_| Error::Backend(BackendError::Other("post map lock poisoned".to_string())))
    }

    fn write_posts(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Post>>> {
        self.posts
            .write()
            .map_err(|_| Error::Backend(BackendError::Other("post map lock poisoned".to_string())))
    }
}

#[async_trait]
impl PostBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        let posts = self.read_posts()?;
        Ok(posts.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>> {
        let posts = self.read_posts()?;
        Ok(posts.get(id).cloned())
    }

    async fn insert(&self, post: NewPost) -> Result<Post> {
        let id = match post.id {
            Some(id) => id,
            None if self.kind.server_generated_ids() => Uuid::new_v4().to_string(),
            None => {
                return Err(Error::Backend(BackendError::Other(format!(
                    "{} assigns no ids; caller must supply one",
                    self.kind
                ))))
            }
        };

        let persisted = Post {
            id: id.clone(),
            user_id: post.user_id,
            text: post.text,
            image_url: post.image_url,
            backend: self.kind,
        };

        let mut posts = self.write_posts()?;
        posts.insert(id, persisted.clone());
        Ok(persisted)
    }

    async fn update(&self, post: &Post) -> Result<()> {
        let mut posts = self.write_posts()?;
        if !posts.contains_key(&post.id) {
            return Err(Error::NotFound {
                backend: self.kind,
                id: post.id.clone(),
            });
        }
        posts.insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut posts = self.write_posts()?;
        if posts.remove(id).is_none() {
            return Err(Error::NotFound {
                backend: self.kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
