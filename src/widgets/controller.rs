//! Widget controller
//!
//! One method per widget action. Each action reads its repository, assigns
//! the results to a fresh view and records the cache tags of every entity
//! that ended up in the output.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::cache::PageCacheTags;
use crate::config::{SiteConfig, WidgetsConfig};
use crate::db::repositories::{
    CategoryRepository, CommentRepository, PostRepository, TagRepository,
};
use crate::theme::ThemeEngine;

use super::action::WidgetAction;
use super::archive::extract_data_from_posts;
use super::request::WidgetRequest;
use super::tag_cloud::compute_sizes;
use super::view::WidgetView;

/// A rendered widget with the cache tags of its content
#[derive(Debug, Clone)]
pub struct WidgetResponse {
    pub body: String,
    pub content_type: &'static str,
    pub cache_tags: Vec<String>,
}

/// Renders blog widgets from repository data
pub struct WidgetController {
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    theme: Arc<ThemeEngine>,
    settings: WidgetsConfig,
    site: SiteConfig,
}

impl WidgetController {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        tags: Arc<dyn TagRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        theme: Arc<ThemeEngine>,
        settings: WidgetsConfig,
        site: SiteConfig,
    ) -> Self {
        Self {
            categories,
            tags,
            posts,
            comments,
            theme,
            settings,
            site,
        }
    }

    /// Run one action and render its template
    pub async fn dispatch(
        &self,
        action: WidgetAction,
        request: &WidgetRequest,
    ) -> Result<WidgetResponse> {
        let mut view = WidgetView::new(self.theme.clone());
        let mut page_tags = PageCacheTags::new();
        view.assign("site", &self.site);

        match action {
            WidgetAction::Categories => {
                self.categories_action(request, &mut view, &mut page_tags)
                    .await?
            }
            WidgetAction::Tags => self.tags_action(request, &mut view, &mut page_tags).await?,
            WidgetAction::RecentPosts => {
                self.recent_posts_action(&mut view, &mut page_tags).await?
            }
            WidgetAction::Comments => self.comments_action(&mut view, &mut page_tags).await?,
            WidgetAction::Archive => self.archive_action(&mut view).await?,
            WidgetAction::Feed => self.feed_action(&mut view, &mut page_tags).await?,
        }

        let body = view
            .render(action.template())
            .with_context(|| format!("Failed to render {} widget", action))?;

        tracing::debug!(
            action = %action,
            cache_tags = page_tags.as_slice().len(),
            "Rendered widget"
        );

        Ok(WidgetResponse {
            body,
            content_type: action.content_type(),
            cache_tags: page_tags.into_vec(),
        })
    }

    async fn categories_action(
        &self,
        request: &WidgetRequest,
        view: &mut WidgetView,
        page_tags: &mut PageCacheTags,
    ) -> Result<()> {
        let categories = self.categories.find_all().await?;
        page_tags.add_tags_to_page(categories.iter().map(|c| c.cache_tag()));

        view.assign("categories", &categories);
        view.assign("current_category", &request.current_category);
        Ok(())
    }

    async fn tags_action(
        &self,
        request: &WidgetRequest,
        view: &mut WidgetView,
        page_tags: &mut PageCacheTags,
    ) -> Result<()> {
        let settings = &self.settings.tags;
        let tags = self
            .tags
            .find_top_by_usage(settings.effective_limit())
            .await?;
        let sized = compute_sizes(
            tags,
            settings.effective_min_size(),
            settings.effective_max_size(),
        );
        page_tags.add_tags_to_page(sized.iter().map(|t| t.tag.cache_tag()));

        view.assign("tags", &sized);
        view.assign("current_tag", &request.current_tag);
        Ok(())
    }

    async fn recent_posts_action(
        &self,
        view: &mut WidgetView,
        page_tags: &mut PageCacheTags,
    ) -> Result<()> {
        let limit = self.settings.recent_posts.effective_limit();
        let posts = if limit > 0 {
            self.posts.find_all_with_limit(limit).await?
        } else {
            self.posts.find_all().await?
        };
        for post in &posts {
            page_tags.add_tags_for_post(post);
        }

        view.assign("posts", &posts);
        Ok(())
    }

    async fn comments_action(
        &self,
        view: &mut WidgetView,
        page_tags: &mut PageCacheTags,
    ) -> Result<()> {
        let settings = &self.settings.comments;
        let comments = self
            .comments
            .find_active_comments(settings.effective_limit(), settings.effective_blog_setup())
            .await?;
        page_tags.add_tags_to_page(comments.iter().map(|c| c.comment.cache_tag()));

        view.assign("comments", &comments);
        Ok(())
    }

    // Archive rows carry no entity ids, so this page only expires by TTL
    async fn archive_action(&self, view: &mut WidgetView) -> Result<()> {
        let months = self.posts.find_months_and_years_with_posts().await?;
        view.assign("archive", &extract_data_from_posts(&months));
        Ok(())
    }

    async fn feed_action(
        &self,
        view: &mut WidgetView,
        page_tags: &mut PageCacheTags,
    ) -> Result<()> {
        let posts = self
            .posts
            .find_all_with_limit(self.settings.feed.effective_limit())
            .await?;
        for post in &posts {
            page_tags.add_tags_for_post(post);
        }

        let build_date: DateTime<Utc> = posts.first().map(|p| p.date()).unwrap_or_else(Utc::now);
        view.assign("build_date", &build_date.to_rfc3339());
        view.assign("posts", &posts);
        Ok(())
    }
}
