//! Domain entities - the core business objects.

mod post;
mod query;
mod slug;
mod user;

pub use post::{NewPost, Post, PostPatch, can_modify};
pub use query::{Pagination, PostFilter};
pub use slug::{derive_slug, is_valid_slug};
pub use user::{Actor, Role, User};
