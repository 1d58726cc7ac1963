use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::{derive_slug, is_valid_slug};
use super::user::{Actor, Role};
use crate::error::DomainError;

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 200;
pub const CONTENT_MIN_CHARS: usize = 10;
pub const CONTENT_MAX_CHARS: usize = 10_000;

/// Post entity - represents a blog post or article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Uuid,
    pub category: Uuid,
    pub slug: String,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub views: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a post. The author is never taken from here.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: Option<Uuid>,
    pub slug: Option<String>,
    pub tags: Vec<String>,
    pub is_published: Option<bool>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
}

/// Partial update. `author`, `id` and `slug` are deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
}

impl Post {
    /// Build a post from validated input, stamping the author and deriving the slug.
    pub fn create(input: NewPost, author: Uuid) -> Result<Self, DomainError> {
        let mut errors = Vec::new();

        let title = input.title.trim().to_string();
        check_title(&title, &mut errors);
        check_content(&input.content, &mut errors);
        if input.category.is_none() {
            errors.push("Post category is required".to_string());
        }

        let slug = match input.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => {
                if !is_valid_slug(slug) {
                    errors.push(
                        "Slug may only contain lowercase letters, digits and hyphens".to_string(),
                    );
                }
                slug.to_string()
            }
            _ => {
                let derived = derive_slug(&title);
                if derived.is_empty() && !title.is_empty() {
                    errors.push("Title must contain at least one letter or digit".to_string());
                }
                derived
            }
        };

        let category = match input.category {
            Some(category) if errors.is_empty() => category,
            _ => return Err(DomainError::Validation(errors.join(", "))),
        };

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            content: input.content,
            author,
            category,
            slug,
            tags: clean_tags(input.tags),
            is_published: input.is_published.unwrap_or(true),
            views: 0,
            excerpt: input.excerpt,
            featured_image: input.featured_image,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update in place, re-validating only the fields it touches.
    pub fn apply(&mut self, patch: PostPatch) -> Result<(), DomainError> {
        let mut errors = Vec::new();

        let title = patch.title.map(|t| t.trim().to_string());
        if let Some(title) = &title {
            check_title(title, &mut errors);
        }
        if let Some(content) = &patch.content {
            check_content(content, &mut errors);
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors.join(", ")));
        }

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tags) = patch.tags {
            self.tags = clean_tags(tags);
        }
        if let Some(is_published) = patch.is_published {
            self.is_published = is_published;
        }
        if patch.excerpt.is_some() {
            self.excerpt = patch.excerpt;
        }
        if patch.featured_image.is_some() {
            self.featured_image = patch.featured_image;
        }
        self.updated_at = Utc::now();

        Ok(())
    }
}

/// Only the author or an admin may change or remove a post.
pub fn can_modify(actor: &Actor, post: &Post) -> bool {
    actor.id == post.author || actor.role == Role::Admin
}

fn check_title(title: &str, errors: &mut Vec<String>) {
    let len = title.chars().count();
    if len == 0 {
        errors.push("Post title is required".to_string());
    } else if len < TITLE_MIN_CHARS {
        errors.push(format!(
            "Title must be at least {TITLE_MIN_CHARS} characters long"
        ));
    } else if len > TITLE_MAX_CHARS {
        errors.push(format!("Title cannot exceed {TITLE_MAX_CHARS} characters"));
    }
}

fn check_content(content: &str, errors: &mut Vec<String>) {
    let len = content.chars().count();
    if len == 0 {
        errors.push("Post content is required".to_string());
    } else if len < CONTENT_MIN_CHARS {
        errors.push(format!(
            "Content must be at least {CONTENT_MIN_CHARS} characters long"
        ));
    } else if len > CONTENT_MAX_CHARS {
        errors.push(format!(
            "Content cannot exceed {CONTENT_MAX_CHARS} characters"
        ));
    }
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
