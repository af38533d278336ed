//! Post coordinator.
//!
//! Orchestrates authorization, backend selection, the blob lifecycle and
//! the cross-backend aggregation read. Each single-backend operation runs
//! on the calling task; only `list_by_user` fans out.
//!
//! Mutation ordering:
//! 1. `save` uploads the image before the record is constructed, so a
//!    persisted post never references a not-yet-uploaded image.
//! 2. `update`/`delete` check ownership before any write; the existence
//!    check runs first, so NotFound takes precedence over AccessDenied.
//! 3. `delete` removes the blob object before the record; if the blob
//!    delete fails, the record is left intact.

use std::sync::Arc;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::backend::BackendSet;
use crate::blob::{object_name_from_url, BlobStore};
use crate::config::Config;
use crate::error::BackendError;
use crate::post::{BackendKind, NewPost, Post};
use crate::{Error, Result};

/// The core post store service.
///
/// Holds no per-request mutable state; all shared state lives in the
/// backends and the blob store.
pub struct PostStore {
    backends: BackendSet,
    blob: Arc<BlobStore>,
}

impl PostStore {
    /// Assemble a store from an already-built backend set and blob store.
    pub fn new(backends: BackendSet, blob: Arc<BlobStore>) -> Self {
        Self { backends, blob }
    }

    /// Connect every backend and the blob store from configuration.
    pub async fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let backends = BackendSet::connect(&config.backends).await?;
        let blob = Arc::new(BlobStore::new(&config.blob)?);
        Ok(Self::new(backends, blob))
    }

    /// Full contents of one backend. Unauthenticated read.
    pub async fn list_all(&self, kind: BackendKind) -> Result<Vec<Post>> {
        self.backends.get(kind).find_all().await
    }

    /// Look up one post by id in one backend.
    pub async fn get_by_id(&self, kind: BackendKind, id: &str) -> Result<Post> {
        self.backends
            .get(kind)
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound {
                backend: kind,
                id: id.to_string(),
            })
    }

    /// Create a post in the selected backend, owned by the caller.
    ///
    /// The image is uploaded under a fresh object name first; for backends
    /// without server-side id generation a UUID id is assigned here.
    pub async fn save(
        &self,
        caller: &Caller,
        kind: BackendKind,
        text: &str,
        image: Bytes,
    ) -> Result<Post> {
        validate_text(text)?;
        validate_image(&image)?;

        let object_name = Uuid::new_v4().to_string();
        let image_url = self.blob.upload(&object_name, image).await?;

        let id = if kind.server_generated_ids() {
            None
        } else {
            Some(Uuid::new_v4().to_string())
        };

        let post = self
            .backends
            .get(kind)
            .insert(NewPost {
                id,
                user_id: caller.user_id.clone(),
                text: text.to_string(),
                image_url,
            })
            .await?;

        info!("Post {} saved to {}", post.id, kind);
        Ok(post)
    }

    /// Replace an existing post's text and image. Owner only.
    ///
    /// The image bytes are replaced in place under the existing object
    /// name; the stored URL does not change.
    pub async fn update(
        &self,
        caller: &Caller,
        kind: BackendKind,
        id: &str,
        text: &str,
        image: Bytes,
    ) -> Result<Post> {
        validate_text(text)?;
        validate_image(&image)?;

        let backend = self.backends.get(kind);
        let existing = backend.find_by_id(id).await?.ok_or_else(|| Error::NotFound {
            backend: kind,
            id: id.to_string(),
        })?;
        ensure_owner(caller, &existing)?;

        let object_name = object_name_from_url(&existing.image_url);
        let image_url = self.blob.replace(object_name, image).await?;

        let updated = Post {
            id: existing.id,
            user_id: existing.user_id,
            text: text.to_string(),
            image_url,
            backend: kind,
        };
        backend.update(&updated).await?;

        info!("Post {} updated in {}", updated.id, kind);
        Ok(updated)
    }

    /// Delete a post and its image object. Owner only.
    pub async fn delete(&self, caller: &Caller, kind: BackendKind, id: &str) -> Result<()> {
        let backend = self.backends.get(kind);
        let existing = backend.find_by_id(id).await?.ok_or_else(|| Error::NotFound {
            backend: kind,
            id: id.to_string(),
        })?;
        ensure_owner(caller, &existing)?;

        self.blob
            .delete(object_name_from_url(&existing.image_url))
            .await?;
        backend.delete(id).await?;

        info!("Post {} deleted from {}", id, kind);
        Ok(())
    }

    /// All posts owned by one user, aggregated across all four backends.
    ///
    /// The four scans run as independent tasks and are all joined before
    /// anything is returned; the first failing scan fails the whole call
    /// and no partial aggregate is observable. Output ordering is
    /// unspecified.
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Post>> {
        let scans: Vec<(BackendKind, JoinHandle<Result<Vec<Post>>>)> = self
            .backends
            .iter()
            .map(|backend| {
                let backend = Arc::clone(backend);
                let user_id = user_id.to_string();
                let kind = backend.kind();
                let handle = tokio::spawn(async move {
                    let posts = backend.find_all().await?;
                    Ok(posts
                        .into_iter()
                        .filter(|post| post.user_id == user_id)
                        .collect())
                });
                (kind, handle)
            })
            .collect();

        // Merge single-threaded after the join; no shared accumulator.
        // Every handle is drained before a failure is reported, so no scan
        // is left running detached.
        let mut merged = Vec::new();
        let mut first_error = None;
        for (kind, handle) in scans {
            let scanned = handle
                .await
                .map_err(|e| Error::Aggregate {
                    backend: kind,
                    source: Box::new(Error::Backend(BackendError::Other(e.to_string()))),
                })
                .and_then(|inner| {
                    inner.map_err(|e| Error::Aggregate {
                        backend: kind,
                        source: Box::new(e),
                    })
                });
            match scanned {
                Ok(posts) => merged.extend(posts),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(merged),
        }
    }

    /// The blob store this service writes images through.
    pub fn blob(&self) -> &Arc<BlobStore> {
        &self.blob
    }
}

fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::Validation("post text must not be empty".to_string()));
    }
    Ok(())
}

fn validate_image(image: &Bytes) -> Result<()> {
    if image.is_empty() {
        return Err(Error::Validation("post image must not be empty".to_string()));
    }
    Ok(())
}

/// Owner check; reports only the post id, never the true owner.
fn ensure_owner(caller: &Caller, post: &Post) -> Result<()> {
    if post.user_id != caller.user_id {
        return Err(Error::AccessDenied(post.id.clone()));
    }
    Ok(())
}
