//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    #[default]
    Pending,
    /// Visible on the site
    Approved,
    Spam,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Spam => "spam",
        }
    }
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "spam" => Ok(Self::Spam),
            _ => Err(format!("Invalid comment status: {}", s)),
        }
    }
}

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_name: String,
    pub author_email: Option<String>,
    pub author_url: Option<String>,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Page cache tag identifying pages that display this comment
    pub fn cache_tag(&self) -> String {
        format!("blog_comment_{}", self.id)
    }
}

/// Comment joined with its post, as listed by the recent comments widget
#[derive(Debug, Clone, Serialize)]
pub struct RecentComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub post_slug: String,
    pub post_title: String,
    pub avatar_url: String,
}

impl RecentComment {
    /// Links only to `http(s)` author URLs
    pub fn new(mut comment: Comment, post_slug: String, post_title: String) -> Self {
        let avatar_url = gravatar_url(comment.author_email.as_deref());
        comment.author_url = comment.author_url.as_deref().and_then(linkable_url);
        Self {
            comment,
            post_slug,
            post_title,
            avatar_url,
        }
    }
}

fn linkable_url(url: &str) -> Option<String> {
    let url = url.trim();
    let scheme = url.split_once("://")?.0;
    (scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
        .then(|| url.to_string())
}

/// Gravatar URL for an email, falling back to the mystery person image
pub fn gravatar_url(email: Option<&str>) -> String {
    match email.map(str::trim) {
        Some(e) if !e.is_empty() => {
            let hash = format!("{:x}", md5::compute(e.to_lowercase()));
            format!("https://www.gravatar.com/avatar/{}?d=mp&s=80", hash)
        }
        _ => "https://www.gravatar.com/avatar/?d=mp&s=80".to_string(),
    }
}

/// Input for creating a comment
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentInput {
    pub post_id: i64,
    pub author_name: String,
    pub author_email: Option<String>,
    pub author_url: Option<String>,
    pub content: String,
    #[serde(default)]
    pub status: CommentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_status_parse() {
        assert_eq!("approved".parse::<CommentStatus>(), Ok(CommentStatus::Approved));
        assert_eq!("SPAM".parse::<CommentStatus>(), Ok(CommentStatus::Spam));
        assert!("visible".parse::<CommentStatus>().is_err());
        assert_eq!(CommentStatus::default(), CommentStatus::Pending);
    }

    #[test]
    fn test_gravatar_url_normalizes_email() {
        let a = gravatar_url(Some("  Someone@Example.com "));
        let b = gravatar_url(Some("someone@example.com"));

        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
        assert!(!a.contains("avatar/?"));
    }

    #[test]
    fn test_gravatar_url_without_email() {
        let expected = "https://www.gravatar.com/avatar/?d=mp&s=80";
        assert_eq!(gravatar_url(None), expected);
        assert_eq!(gravatar_url(Some("")), expected);
    }

    #[test]
    fn test_comment_cache_tag() {
        let comment = Comment {
            id: 9,
            post_id: 1,
            author_name: "Ann".to_string(),
            author_email: None,
            author_url: None,
            content: "Hi".to_string(),
            status: CommentStatus::Approved,
            created_at: Utc::now(),
        };
        assert_eq!(comment.cache_tag(), "blog_comment_9");
    }

    fn recent_with_url(url: &str) -> RecentComment {
        let comment = Comment {
            id: 1,
            post_id: 1,
            author_name: "Ann".to_string(),
            author_email: None,
            author_url: Some(url.to_string()),
            content: "Hi".to_string(),
            status: CommentStatus::Approved,
            created_at: Utc::now(),
        };
        RecentComment::new(comment, "hello".to_string(), "Hello".to_string())
    }

    #[test]
    fn test_recent_comment_keeps_web_urls() {
        assert_eq!(
            recent_with_url(" https://ann.example/ ").comment.author_url.as_deref(),
            Some("https://ann.example/")
        );
        assert_eq!(
            recent_with_url("HTTP://ann.example").comment.author_url.as_deref(),
            Some("HTTP://ann.example")
        );
    }

    #[test]
    fn test_recent_comment_drops_other_schemes() {
        for url in [
            "javascript:alert(1)",
            "JavaScript://%0aalert(1)",
            "data:text/html,<script>alert(1)</script>",
            "//ann.example",
            "ann.example",
            "",
        ] {
            assert_eq!(recent_with_url(url).comment.author_url, None, "{}", url);
        }
    }
}
