//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Pagination, Post, PostFilter, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

/// Posts keyed by id, with slug uniqueness enforced on write.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint(format!("id {} already exists", post.id)));
        }
        if store.values().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint(format!(
                "slug '{}' already exists",
                post.slug
            )));
        }

        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        if store
            .values()
            .any(|p| p.id != post.id && p.slug == post.slug)
        {
            return Err(RepoError::Constraint(format!(
                "slug '{}' already exists",
                post.slug
            )));
        }

        // The view counter is owned by `increment_views`.
        match store.get_mut(&post.id) {
            Some(existing) => {
                *existing = Post {
                    views: existing.views,
                    ..post
                };
                Ok(existing.clone())
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        let store = self.store.read().await;

        let mut matches: Vec<&Post> = store.values().filter(|p| filter.matches(p)).collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matches.len() as u64;
        let skip = usize::try_from(pagination.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
        let items = matches.into_iter().skip(skip).take(limit).cloned().collect();

        Ok((items, total))
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        Ok(store.get_mut(&id).map(|post| {
            post.views += 1;
            post.clone()
        }))
    }
}

/// Users keyed by id, with email and username uniqueness enforced on write.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        if store
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(RepoError::Constraint("User already exists".to_string()));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use quill_core::DomainError;
    use quill_core::PostService;
    use quill_core::domain::{NewPost, PostPatch};

    use super::*;

    fn new_post(title: &str, content: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: content.to_string(),
            category: Some(Uuid::new_v4()),
            ..Default::default()
        }
    }

    fn service() -> (Arc<InMemoryPostRepository>, PostService) {
        let repo = Arc::new(InMemoryPostRepository::new());
        (repo.clone(), PostService::new(repo))
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let (_, service) = service();
        let author = Uuid::new_v4();

        let created = service
            .create(new_post("My First Post", "Hello there, world"), author)
            .await
            .unwrap();
        let found = service.find(created.id).await.unwrap();

        assert_eq!(found, created);
        assert_eq!(found.slug, "my-first-post");
        assert_eq!(found.author, author);
    }

    #[tokio::test]
    async fn test_duplicate_title_conflicts_on_slug() {
        let (_, service) = service();

        service
            .create(new_post("Same Title", "First body text"), Uuid::new_v4())
            .await
            .unwrap();
        let err = service
            .create(new_post("Same Title", "Second body text"), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Duplicate(msg) if msg.contains("same-title")));
    }

    #[tokio::test]
    async fn test_get_by_id_counts_every_fetch() {
        let (_, service) = service();
        let post = service
            .create(new_post("Counted post", "Body text here"), Uuid::new_v4())
            .await
            .unwrap();

        for _ in 0..5 {
            service.get_by_id(post.id).await.unwrap();
        }

        assert_eq!(service.find(post.id).await.unwrap().views, 5);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let (_, service) = service();
        let id = Uuid::new_v4();

        assert!(matches!(
            service.get_by_id(id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.update(id, PostPatch::default()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete(id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_preserves_slug() {
        let (_, service) = service();
        let post = service
            .create(new_post("Before the edit", "Body text here"), Uuid::new_v4())
            .await
            .unwrap();

        let updated = service
            .update(
                post.id,
                PostPatch {
                    title: Some("After the edit".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "After the edit");
        assert_eq!(updated.slug, "before-the-edit");
        assert!(updated.updated_at >= post.updated_at);
    }

    #[tokio::test]
    async fn test_update_keeps_views_counted_after_read() {
        let (repo, service) = service();
        let post = service
            .create(new_post("Racing the counter", "Views land mid-update"), Uuid::new_v4())
            .await
            .unwrap();

        let mut stale = repo.find_by_id(post.id).await.unwrap().unwrap();
        service.get_by_id(post.id).await.unwrap();
        service.get_by_id(post.id).await.unwrap();

        stale.title = "Racing the counter again".to_string();
        let saved = repo.update(stale).await.unwrap();

        assert_eq!(saved.views, 2);
        assert_eq!(service.find(post.id).await.unwrap().views, 2);
        assert_eq!(saved.title, "Racing the counter again");
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_paginates() {
        let (repo, service) = service();
        let base = Utc::now();

        for i in 0..15 {
            let mut post = Post::create(
                new_post(&format!("Pagination Post {i}"), "Paged content body"),
                Uuid::new_v4(),
            )
            .unwrap();
            post.created_at = base + Duration::seconds(i);
            repo.insert(post).await.unwrap();
        }

        let page = service
            .list(&PostFilter::default(), Pagination::new(Some(2), Some(5)))
            .await
            .unwrap();

        assert_eq!(page.total, 15);
        assert_eq!(page.pages(), 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].title, "Pagination Post 9");
        assert_eq!(page.items[4].title, "Pagination Post 5");

        let last = service
            .list(&PostFilter::default(), Pagination::new(Some(4), Some(5)))
            .await
            .unwrap();
        assert!(last.items.is_empty());
        assert_eq!(last.total, 15);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let (_, service) = service();
        let author = Uuid::new_v4();

        let js = service
            .create(
                NewPost {
                    tags: vec!["web".to_string()],
                    ..new_post("JavaScript Tutorial", "Learn JavaScript programming")
                },
                author,
            )
            .await
            .unwrap();
        service
            .create(new_post("Rust Tutorial", "Learn Rust programming"), Uuid::new_v4())
            .await
            .unwrap();
        service
            .create(
                NewPost {
                    is_published: Some(false),
                    ..new_post("Draft about javascript", "Unpublished body")
                },
                author,
            )
            .await
            .unwrap();

        let search = PostFilter {
            search: Some("javascript".to_string()),
            ..Default::default()
        };
        let page = service.list(&search, Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, js.id);

        let by_author = PostFilter {
            author: Some(author),
            ..Default::default()
        };
        assert_eq!(service.list(&by_author, Pagination::default()).await.unwrap().total, 1);

        let by_category = PostFilter {
            category: Some(js.category),
            ..Default::default()
        };
        assert_eq!(service.list(&by_category, Pagination::default()).await.unwrap().total, 1);

        let by_tags = PostFilter {
            tags: vec!["web".to_string(), "mobile".to_string()],
            ..Default::default()
        };
        assert_eq!(service.list(&by_tags, Pagination::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_user_uniqueness() {
        let repo = InMemoryUserRepository::new();
        let user = User::new("alice".into(), "alice@example.com".into(), "hash".into());
        repo.insert(user.clone()).await.unwrap();

        let dup = User::new("alice2".into(), "alice@example.com".into(), "hash".into());
        assert!(matches!(repo.insert(dup).await, Err(RepoError::Constraint(_))));

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }
}
