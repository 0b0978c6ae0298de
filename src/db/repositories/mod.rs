//! Database repositories
//!
//! Repository pattern implementations for database access. The widgets only
//! read through these traits; the `create` methods exist to populate a blog.

pub mod category;
pub mod comment;
pub mod post;
pub mod tag;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use tag::{SqlxTagRepository, TagRepository};
