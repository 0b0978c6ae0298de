//! Tag model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Tag name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Page cache tag identifying pages that display this tag
    pub fn cache_tag(&self) -> String {
        format!("blog_tag_{}", self.id)
    }
}

/// Tag with the number of published posts carrying it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    /// Usage count
    pub cnt: i64,
}

impl TagWithCount {
    pub fn new(tag: Tag, cnt: i64) -> Self {
        Self { tag, cnt }
    }
}

/// A tag cloud entry: the counted tag plus its computed font size.
///
/// The size only exists for the response being rendered and is never stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SizedTag {
    #[serde(flatten)]
    pub tag: Tag,
    pub cnt: i64,
    /// Font size in percent
    pub size: i64,
}
