//! Data models
//!
//! Database entities (Post, Category, Tag, Comment), the inputs used to
//! create them, and the presentation types the widgets render.

mod archive;
mod category;
mod comment;
mod post;
mod tag;

pub use archive::{ArchiveEntry, ArchiveYear, MonthCount};
pub use category::{Category, CreateCategoryInput};
pub use comment::{gravatar_url, Comment, CommentStatus, CreateCommentInput, RecentComment};
pub use post::{CreatePostInput, Post, PostStatus};
pub use tag::{SizedTag, Tag, TagWithCount};
