//! Elasticsearch post backend.
//!
//! Full scans are a bounded `match_all` search; no ranking or query DSL is
//! exposed. Writes request `refresh=true` so a following scan observes
//! them.

use async_trait::async_trait;
use elasticsearch::http::transport::Transport;
use elasticsearch::http::StatusCode;
use elasticsearch::params::Refresh;
use elasticsearch::{DeleteParts, Elasticsearch, ExistsParts, GetParts, IndexParts, SearchParts};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::PostBackend;
use crate::error::BackendError;
use crate::post::{BackendKind, NewPost, Post};
use crate::{Error, Result};

/// Elasticsearch backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Node URL (e.g., "http://localhost:9200")
    pub url: String,
    /// Index holding the post documents
    #[serde(default = "default_index")]
    pub index: String,
}

fn default_index() -> String {
    "posts".to_string()
}

/// Upper bound on a full scan; the store is not paginated.
const FULL_SCAN_LIMIT: usize = 10_000;

#[derive(Debug, Serialize, Deserialize)]
struct PostSource {
    user_id: String,
    text: String,
    image_url: String,
}

impl PostSource {
    fn into_post(self, id: String) -> Post {
        Post {
            id,
            user_id: self.user_id,
            text: self.text,
            image_url: self.image_url,
            backend: BackendKind::Elasticsearch,
        }
    }
}

fn backend_error(context: &str, status: StatusCode) -> Error {
    Error::Backend(BackendError::Elasticsearch(format!(
        "{} returned status {}",
        context, status
    )))
}

/// Elasticsearch post backend.
///
/// Ids are assigned by the cluster on index.
pub struct ElasticsearchBackend {
    client: Elasticsearch,
    index: String,
}

impl ElasticsearchBackend {
    /// Create a client against a single node.
    pub fn connect(config: &ElasticsearchConfig) -> Result<Self> {
        let transport = Transport::single_node(&config.url)
            .map_err(|e| Error::Backend(BackendError::Elasticsearch(e.to_string())))?;
        info!("Created Elasticsearch post backend client");
        Ok(Self {
            client: Elasticsearch::new(transport),
            index: config.index.clone(),
        })
    }
}

#[async_trait]
impl PostBackend for ElasticsearchBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Elasticsearch
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        debug!("Elasticsearch match_all on {}", self.index);
        let response = self
            .client
            .search(SearchParts::Index(&[self.index.as_str()]))
            .body(json!({
                "query": { "match_all": {} },
                "size": FULL_SCAN_LIMIT,
            }))
            .send()
            .await?;

        // A never-written-to index does not exist yet; treat it as empty.
        if response.status_code() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status_code().is_success() {
            return Err(backend_error("search", response.status_code()));
        }

        let body: Value = response.json().await?;
        let hits = body["hits"]["hits"].as_array().cloned().unwrap_or_default();

        hits.into_iter()
            .map(|hit| {
                let id = hit["_id"]
                    .as_str()
                    .ok_or_else(|| {
                        Error::Backend(BackendError::Elasticsearch(
                            "search hit is missing its _id".to_string(),
                        ))
                    })?
                    .to_string();
                let source: PostSource = serde_json::from_value(hit["_source"].clone())?;
                Ok(source.into_post(id))
            })
            .collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>> {
        debug!("Elasticsearch GET {}/{}", self.index, id);
        let response = self
            .client
            .get(GetParts::IndexId(&self.index, id))
            .send()
            .await?;

        if response.status_code() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status_code().is_success() {
            return Err(backend_error("get", response.status_code()));
        }

        let body: Value = response.json().await?;
        let source: PostSource = serde_json::from_value(body["_source"].clone())?;
        Ok(Some(source.into_post(id.to_string())))
    }

    async fn insert(&self, post: NewPost) -> Result<Post> {
        let source = PostSource {
            user_id: post.user_id,
            text: post.text,
            image_url: post.image_url,
        };

        let response = match &post.id {
            Some(id) => {
                self.client
                    .index(IndexParts::IndexId(&self.index, id))
                    .body(&source)
                    .refresh(Refresh::True)
                    .send()
                    .await?
            }
            None => {
                self.client
                    .index(IndexParts::Index(&self.index))
                    .body(&source)
                    .refresh(Refresh::True)
                    .send()
                    .await?
            }
        };

        if !response.status_code().is_success() {
            return Err(backend_error("index", response.status_code()));
        }

        let body: Value = response.json().await?;
        let id = body["_id"]
            .as_str()
            .ok_or_else(|| {
                Error::Backend(BackendError::Elasticsearch(
                    "index response is missing its _id".to_string(),
                ))
            })?
            .to_string();
        debug!("Elasticsearch indexed post {}", id);
        Ok(source.into_post(id))
    }

    async fn update(&self, post: &Post) -> Result<()> {
        debug!("Elasticsearch reindex post {}", post.id);
        // Indexing by id is an upsert; guard it so a missing id fails
        // instead of creating a phantom document.
        let head = self
            .client
            .exists(ExistsParts::IndexId(&self.index, &post.id))
            .send()
            .await?;
        if head.status_code() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                backend: BackendKind::Elasticsearch,
                id: post.id.clone(),
            });
        }
        if !head.status_code().is_success() {
            return Err(backend_error("exists", head.status_code()));
        }

        let source = PostSource {
            user_id: post.user_id.clone(),
            text: post.text.clone(),
            image_url: post.image_url.clone(),
        };

        let response = self
            .client
            .index(IndexParts::IndexId(&self.index, &post.id))
            .body(&source)
            .refresh(Refresh::True)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(backend_error("index", response.status_code()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        debug!("Elasticsearch DELETE {}/{}", self.index, id);
        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index, id))
            .refresh(Refresh::True)
            .send()
            .await?;

        if response.status_code() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                backend: BackendKind::Elasticsearch,
                id: id.to_string(),
            });
        }
        if !response.status_code().is_success() {
            return Err(backend_error("delete", response.status_code()));
        }
        Ok(())
    }
}
