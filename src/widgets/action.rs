//! Widget action selector

use serde::Serialize;

/// Content type of every HTML widget
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Content type of the feed
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// The widgets the controller can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetAction {
    Categories,
    Tags,
    RecentPosts,
    Comments,
    Archive,
    Feed,
}

impl WidgetAction {
    pub const ALL: [WidgetAction; 6] = [
        WidgetAction::Categories,
        WidgetAction::Tags,
        WidgetAction::RecentPosts,
        WidgetAction::Comments,
        WidgetAction::Archive,
        WidgetAction::Feed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Tags => "tags",
            Self::RecentPosts => "recentPosts",
            Self::Comments => "comments",
            Self::Archive => "archive",
            Self::Feed => "feed",
        }
    }

    /// Template rendering this widget
    pub fn template(&self) -> &'static str {
        match self {
            Self::Categories => "widgets/categories.html",
            Self::Tags => "widgets/tags.html",
            Self::RecentPosts => "widgets/recent_posts.html",
            Self::Comments => "widgets/comments.html",
            Self::Archive => "widgets/archive.html",
            Self::Feed => "widgets/feed.xml",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Feed => XML_CONTENT_TYPE,
            _ => HTML_CONTENT_TYPE,
        }
    }
}

impl std::fmt::Display for WidgetAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WidgetAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "categories" => Ok(Self::Categories),
            "tags" => Ok(Self::Tags),
            "recentPosts" | "recent-posts" => Ok(Self::RecentPosts),
            "comments" => Ok(Self::Comments),
            "archive" => Ok(Self::Archive),
            "feed" => Ok(Self::Feed),
            _ => Err(format!("Unknown widget: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_canonical_names() {
        for action in WidgetAction::ALL {
            assert_eq!(action.as_str().parse::<WidgetAction>(), Ok(action));
        }
    }

    #[test]
    fn test_recent_posts_alias() {
        assert_eq!("recent-posts".parse::<WidgetAction>(), Ok(WidgetAction::RecentPosts));
    }

    #[test]
    fn test_unknown_action() {
        assert!("calendar".parse::<WidgetAction>().is_err());
        assert!("Tags".parse::<WidgetAction>().is_err());
    }

    #[test]
    fn test_only_feed_is_xml() {
        for action in WidgetAction::ALL {
            let expected = if action == WidgetAction::Feed {
                "application/xml; charset=utf-8"
            } else {
                "text/html; charset=utf-8"
            };
            assert_eq!(action.content_type(), expected);
        }
    }
}
