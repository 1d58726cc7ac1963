//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{NewPost, Pagination, PostFilter, PostPatch, can_modify};
use quill_shared::dto::{CreatePostRequest, ListPostsQuery, UpdatePostRequest};
use quill_shared::{ApiResponse, PaginatedResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// A path id that is not a UUID cannot name an existing post.
fn parse_post_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Post not found".to_string()))
}

/// Blank query values are treated as absent.
fn parse_id_param(raw: Option<&str>, name: &str) -> AppResult<Option<Uuid>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid {name} id"))),
    }
}

fn build_filter(query: &ListPostsQuery) -> AppResult<PostFilter> {
    Ok(PostFilter {
        category: parse_id_param(query.category.as_deref(), "category")?,
        author: parse_id_param(query.author.as_deref(), "author")?,
        tags: query
            .tags
            .as_deref()
            .map(PostFilter::parse_tags)
            .unwrap_or_default(),
        search: query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter = build_filter(&query)?;
    let pagination = Pagination::new(query.page, query.limit);

    let page = state.posts.list(&filter, pagination).await?;
    let pages = page.pages();

    Ok(HttpResponse::Ok().json(PaginatedResponse::new(
        page.items,
        page.total,
        pagination.page,
        pagination.limit,
        pages,
    )))
}

/// GET /api/posts/{id} - counts one view per successful call.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let post = state.posts.get_by_id(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts - Protected route. The author is always the caller.
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = NewPost {
        title: req.title.unwrap_or_default(),
        content: req.content.unwrap_or_default(),
        category: req.category,
        slug: req.slug,
        tags: req.tags.unwrap_or_default(),
        is_published: req.is_published,
        excerpt: req.excerpt,
        featured_image: req.featured_image,
    };

    let post = state.posts.create(input, identity.user_id).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        post,
        "Post created successfully",
    )))
}

/// PUT /api/posts/{id} - owner or admin only.
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let existing = state.posts.find(id).await?;

    if !can_modify(&identity.actor(), &existing) {
        tracing::warn!(post_id = %id, user_id = %identity.user_id, "Update rejected: not owner");
        return Err(AppError::Forbidden(
            "Not authorized to update this post".to_string(),
        ));
    }

    let req = body.into_inner();
    let patch = PostPatch {
        title: req.title,
        content: req.content,
        category: req.category,
        tags: req.tags,
        is_published: req.is_published,
        excerpt: req.excerpt,
        featured_image: req.featured_image,
    };

    let post = state.posts.update(id, patch).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        post,
        "Post updated successfully",
    )))
}

/// DELETE /api/posts/{id} - owner or admin only.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let existing = state.posts.find(id).await?;

    if !can_modify(&identity.actor(), &existing) {
        tracing::warn!(post_id = %id, user_id = %identity.user_id, "Delete rejected: not owner");
        return Err(AppError::Forbidden(
            "Not authorized to delete this post".to_string(),
        ));
    }

    state.posts.delete(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted successfully")))
}
