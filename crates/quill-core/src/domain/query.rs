//! Listing filters and pagination.

use uuid::Uuid;

use super::post::Post;

/// Filter for listing posts. Unpublished posts are never listed.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub category: Option<Uuid>,
    pub author: Option<Uuid>,
    /// Matches posts carrying any of these tags.
    pub tags: Vec<String>,
    /// Case-insensitive substring over title or content.
    pub search: Option<String>,
}

impl PostFilter {
    /// Parse a comma-separated tag list, dropping blanks.
    pub fn parse_tags(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }

    /// In-process evaluation of the filter, for stores without a query engine.
    pub fn matches(&self, post: &Post) -> bool {
        if !post.is_published {
            return false;
        }
        if self.category.is_some_and(|c| c != post.category) {
            return false;
        }
        if self.author.is_some_and(|a| a != post.author) {
            return false;
        }
        if !self.tags.is_empty() && !post.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        match self.search.as_deref() {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                post.title.to_lowercase().contains(&needle)
                    || post.content.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_LIMIT: u64 = 10;
    pub const MAX_LIMIT: u64 = 100;

    /// Build from optional query values; `page` floors at 1 and `limit` is kept in `1..=MAX_LIMIT`.
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(Self::DEFAULT_PAGE).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Number of pages needed for `total` items.
    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}
