//! Post lifecycle: listing, fetching with view counting, create/update/delete.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewPost, Pagination, Post, PostFilter, PostPatch};
use crate::error::{DomainError, RepoError};
use crate::ports::PostRepository;

const ENTITY: &str = "Post";

/// A page of posts together with the unpaginated match count.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub total: u64,
    pub pagination: Pagination,
}

impl PostPage {
    pub fn pages(&self) -> u64 {
        self.pagination.pages(self.total)
    }
}

/// Post store operations on top of any `PostRepository`.
///
/// Nothing here retries; a failed storage call surfaces once to the caller.
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Published posts matching `filter`, newest first.
    pub async fn list(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<PostPage, DomainError> {
        let (items, total) = self
            .repo
            .list(filter, pagination)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        tracing::debug!(
            page = pagination.page,
            limit = pagination.limit,
            total,
            returned = items.len(),
            "Listed posts"
        );

        Ok(PostPage {
            items,
            total,
            pagination,
        })
    }

    /// Load a post without touching its view counter.
    pub async fn find(&self, id: Uuid) -> Result<Post, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::from_repo(e, ENTITY, id))?
            .ok_or(DomainError::NotFound {
                entity_type: ENTITY,
                id,
            })
    }

    /// Fetch a post for reading. Every successful call counts one view.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Post, DomainError> {
        let post = self
            .repo
            .increment_views(id)
            .await
            .map_err(|e| DomainError::from_repo(e, ENTITY, id))?
            .ok_or(DomainError::NotFound {
                entity_type: ENTITY,
                id,
            })?;

        tracing::debug!(post_id = %id, views = post.views, "Post viewed");
        Ok(post)
    }

    /// Validate and persist a new post owned by `author_id`.
    pub async fn create(&self, input: NewPost, author_id: Uuid) -> Result<Post, DomainError> {
        let post = Post::create(input, author_id)?;
        let slug = post.slug.clone();

        let saved = self.repo.insert(post).await.map_err(|e| match e {
            RepoError::Constraint(_) => {
                DomainError::Duplicate(format!("A post with slug '{slug}' already exists"))
            }
            other => DomainError::Internal(other.to_string()),
        })?;

        tracing::info!(post_id = %saved.id, author_id = %author_id, slug = %saved.slug, "Post created");
        Ok(saved)
    }

    /// Apply a partial update. Author and slug never change.
    pub async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Post, DomainError> {
        let mut post = self.find(id).await?;
        post.apply(patch)?;

        let saved = self
            .repo
            .update(post)
            .await
            .map_err(|e| DomainError::from_repo(e, ENTITY, id))?;

        tracing::info!(post_id = %id, "Post updated");
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo
            .delete(id)
            .await
            .map_err(|e| DomainError::from_repo(e, ENTITY, id))?;

        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }
}
