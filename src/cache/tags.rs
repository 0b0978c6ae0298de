//! Per-request page cache tags
//!
//! Widgets register a tag for every entity they display. The rendered page
//! is stored together with these tags, and flushing a tag later purges every
//! page that displayed the entity.

use crate::models::Post;

/// Cache tags collected while rendering one page
///
/// Tags keep their registration order; registering a tag twice keeps one
/// copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCacheTags {
    tags: Vec<String>,
}

impl PageCacheTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tag_to_page(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn add_tags_to_page<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.add_tag_to_page(tag);
        }
    }

    /// Tag the page with a post and the category it is filed under
    pub fn add_tags_for_post(&mut self, post: &Post) {
        self.add_tag_to_page(post.cache_tag());
        if let Some(category_id) = post.category_id {
            self.add_tag_to_page(format!("blog_category_{}", category_id));
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tags
    }
}
