//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity as shown by the categories widget.
///
/// Categories may be nested through `parent_id`; the widget lists them flat,
/// ordered by `sort_order` and then name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Category name
    pub name: String,
    /// Category description
    pub description: Option<String>,
    /// Parent category ID
    pub parent_id: Option<i64>,
    /// Sort order within parent
    pub sort_order: i32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Page cache tag identifying pages that display this category
    pub fn cache_tag(&self) -> String {
        format!("blog_category_{}", self.id)
    }
}

/// Input for creating a new category
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    /// Defaults to 0 when not given
    pub sort_order: Option<i32>,
}

impl CreateCategoryInput {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            description: None,
            parent_id: None,
            sort_order: None,
        }
    }
}
