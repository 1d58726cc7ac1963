//! Standardized API response envelopes.
//!
//! Every body carries a `success` flag; failures carry only a `message`.

use serde::{Deserialize, Serialize};

/// Standard successful API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A success body with a message and no payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// One page of a listing plus the numbers a client needs to page through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    /// Items on this page.
    pub count: usize,
    /// Matches across all pages.
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
    pub data: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u64, limit: u64, pages: u64) -> Self {
        Self {
            success: true,
            count: data.len(),
            total,
            page,
            limit,
            pages,
            data,
        }
    }
}

/// Uniform failure body: `{"success": false, "message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    // Common error constructors
    pub fn unauthorized() -> Self {
        Self::new("Not authorized, no valid token provided")
    }

    pub fn internal_error() -> Self {
        Self::new("Server Error")
    }

    pub fn too_many_requests() -> Self {
        Self::new("Too many requests, please try again later.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_value(ErrorResponse::new("Post not found")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "message": "Post not found" })
        );
    }

    #[test]
    fn test_message_only_body_omits_data() {
        let json = serde_json::to_value(ApiResponse::message("Post deleted successfully")).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_paginated_counts_items() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 13, 2, 3, 5);
        assert_eq!(page.count, 3);
        assert_eq!(page.pages, 5);
    }
}
