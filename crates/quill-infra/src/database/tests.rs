use std::collections::BTreeMap;
use std::sync::Arc;

use quill_core::domain::{Pagination, Post, PostFilter};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};
use sea_orm::{DatabaseBackend, DbConn, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

fn post_model(id: Uuid, views: i64) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id,
        title: "Test Post".to_owned(),
        content: "Content for the test post".to_owned(),
        author: Uuid::new_v4(),
        category: Uuid::new_v4(),
        slug: "test-post".to_owned(),
        tags: vec!["testing".to_owned()],
        is_published: true,
        views,
        excerpt: None,
        featured_image: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn count_row(total: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::from(total))])
}

/// Executed SQL, with the string quoting of the debug output undone.
fn sql_log(db: Arc<DbConn>) -> String {
    let Ok(db) = Arc::try_unwrap(db) else {
        panic!("connection is still shared");
    };
    format!("{:?}", db.into_transaction_log()).replace("\\\"", "\"")
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, 3)]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.views, 3);
    assert_eq!(post.tags, vec!["testing".to_string()]);
}

#[tokio::test]
async fn test_increment_views_reads_back_row() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results([vec![post_model(post_id, 8)]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    let post = repo.increment_views(post_id).await.unwrap().unwrap();
    assert_eq!(post.views, 8);
}

#[tokio::test]
async fn test_increment_views_on_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    assert!(repo.increment_views(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_update_never_writes_views() {
    let post_id = Uuid::new_v4();

    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(post_id, 5)]])
            .into_connection(),
    );
    let repo = PostgresPostRepository::new(Arc::clone(&db));

    // Read before two concurrent fetches landed; the row now holds 5.
    let mut stale: Post = post_model(post_id, 3).into();
    stale.title = "Edited Title".to_owned();

    let saved = BaseRepository::<Post, Uuid>::update(&repo, stale).await.unwrap();
    assert_eq!(saved.views, 5);

    drop(repo);
    let sql = sql_log(db);
    assert!(sql.contains("UPDATE \"posts\" SET"));
    assert!(sql.contains("\"title\" = "));
    assert!(!sql.contains("\"views\" = "));
}

#[tokio::test]
async fn test_list_builds_filtered_page_and_count() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                post_model(Uuid::new_v4(), 1),
                post_model(Uuid::new_v4(), 2),
            ]])
            .append_query_results([vec![count_row(7)]])
            .into_connection(),
    );
    let repo = PostgresPostRepository::new(Arc::clone(&db));

    let filter = PostFilter {
        category: Some(Uuid::new_v4()),
        author: None,
        tags: vec!["rust".to_owned(), "web".to_owned()],
        search: Some("50%".to_owned()),
    };
    let (items, total) = repo
        .list(&filter, Pagination::new(Some(2), Some(5)))
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(total, 7);

    drop(repo);
    let sql = sql_log(db);
    assert!(sql.contains("\"is_published\" = "));
    assert!(sql.contains("\"category\" = "));
    assert!(!sql.contains("\"author\" = "));
    assert!(sql.contains("\"tags\" && "));
    assert!(sql.contains("\"title\" ILIKE"));
    assert!(sql.contains("\"content\" ILIKE"));
    assert!(sql.contains("ESCAPE"));
    assert!(sql.contains("50\\\\%"));
    assert!(sql.contains("ORDER BY \"posts\".\"created_at\" DESC"));
    assert!(sql.contains("LIMIT"));
    assert!(sql.contains("OFFSET"));
    assert!(sql.contains("COUNT(*)"));
}

#[tokio::test]
async fn test_list_without_filters_only_restricts_published() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .append_query_results([vec![count_row(0)]])
            .into_connection(),
    );
    let repo = PostgresPostRepository::new(Arc::clone(&db));

    let (items, total) = repo
        .list(&PostFilter::default(), Pagination::default())
        .await
        .unwrap();

    assert!(items.is_empty());
    assert_eq!(total, 0);

    drop(repo);
    let sql = sql_log(db);
    assert!(sql.contains("\"is_published\" = "));
    assert!(!sql.contains("&&"));
    assert!(!sql.contains("ILIKE"));
}

#[tokio::test]
async fn test_find_user_by_multibyte_email() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let repo = PostgresUserRepository::new(Arc::new(db));

    let found = repo.find_by_email("élodie@example.com").await.unwrap();
    assert!(found.is_none());
}
