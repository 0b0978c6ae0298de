//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `PostStatus` enum for publication states
//! - `CreatePostInput` used to populate the blog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Post title
    pub title: String,
    /// Short summary shown in lists and feeds
    pub teaser: String,
    /// Full content
    pub content: String,
    /// Publication status
    pub status: PostStatus,
    /// Category ID
    pub category_id: Option<i64>,
    /// Blog setup (site section) the post belongs to
    pub blog_setup_id: Option<i64>,
    /// Publication timestamp
    pub published_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Page cache tag identifying pages that display this post
    pub fn cache_tag(&self) -> String {
        format!("blog_post_{}", self.id)
    }

    /// Publication date, falling back to the creation date for drafts
    pub fn date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }
}

/// Post publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Draft - not visible to public
    #[default]
    Draft,
    /// Published - visible to public
    Published,
    /// Archived - hidden but not deleted
    Archived,
}

impl PostStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }

    /// Parse status from database string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            "archived" => Some(PostStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub teaser: String,
    #[serde(default)]
    pub content: String,
    pub category_id: Option<i64>,
    pub blog_setup_id: Option<i64>,
    /// Defaults to draft
    pub status: Option<PostStatus>,
    /// Defaults to now for published posts
    pub published_at: Option<DateTime<Utc>>,
    /// Tags attached to the post on creation
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

impl CreatePostInput {
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            teaser: String::new(),
            content: String::new(),
            category_id: None,
            blog_setup_id: None,
            status: None,
            published_at: None,
            tag_ids: Vec::new(),
        }
    }

    /// Mark the post published at the given time
    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.status = Some(PostStatus::Published);
        self.published_at = Some(at);
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_teaser(mut self, teaser: impl Into<String>) -> Self {
        self.teaser = teaser.into();
        self
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_blog_setup(mut self, blog_setup_id: i64) -> Self {
        self.blog_setup_id = Some(blog_setup_id);
        self
    }

    pub fn with_tags(mut self, tag_ids: Vec<i64>) -> Self {
        self.tag_ids = tag_ids;
        self
    }

    /// Effective publication time for the given status
    pub fn resolved_published_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match (self.status.unwrap_or_default(), self.published_at) {
            (_, Some(at)) => Some(at),
            (PostStatus::Published, None) => Some(now),
            _ => None,
        }
    }
}
