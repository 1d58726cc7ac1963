//! # Quill Core
//!
//! The domain layer of the Quill blog API.
//! This crate contains the post lifecycle rules (validation, slug derivation,
//! pagination, ownership) with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::{PostPage, PostService};
