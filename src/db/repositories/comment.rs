//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentStatus, CreateCommentInput, RecentComment};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment>;

    /// Newest approved comments on published posts
    ///
    /// When `blog_setup` is given only comments on posts of that blog setup
    /// are returned.
    async fn find_active_comments(
        &self,
        limit: i64,
        blog_setup: Option<i64>,
    ) -> Result<Vec<RecentComment>>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn find_active_comments(
        &self,
        limit: i64,
        blog_setup: Option<i64>,
    ) -> Result<Vec<RecentComment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                find_active_sqlite(self.pool.sqlite()?, limit, blog_setup).await
            }
            DatabaseDriver::Mysql => {
                find_active_mysql(self.pool.mysql()?, limit, blog_setup).await
            }
        }
    }
}

const INSERT_SQL: &str = r#"
    INSERT INTO comments (post_id, author_name, author_email, author_url, content, status, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

fn active_comments_query(scoped: bool) -> String {
    format!(
        r#"
        SELECT c.id, c.post_id, c.author_name, c.author_email, c.author_url, c.content,
               c.status, c.created_at, p.slug as post_slug, p.title as post_title
        FROM comments c
        INNER JOIN posts p ON p.id = c.post_id
        WHERE c.status = 'approved' AND p.status = 'published'{}
        ORDER BY c.created_at DESC, c.id DESC
        LIMIT ?
        "#,
        if scoped { " AND p.blog_setup_id = ?" } else { "" }
    )
}

fn comment_from_input(id: i64, input: &CreateCommentInput, now: chrono::DateTime<Utc>) -> Comment {
    Comment {
        id,
        post_id: input.post_id,
        author_name: input.author_name.clone(),
        author_email: input.author_email.clone(),
        author_url: input.author_url.clone(),
        content: input.content.clone(),
        status: input.status,
        created_at: now,
    }
}

fn parse_status(status: &str) -> Result<CommentStatus> {
    status.parse().map_err(|e: String| anyhow::anyhow!(e))
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, input: &CreateCommentInput) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(INSERT_SQL)
        .bind(input.post_id)
        .bind(&input.author_name)
        .bind(&input.author_email)
        .bind(&input.author_url)
        .bind(&input.content)
        .bind(input.status.as_str())
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    Ok(comment_from_input(result.last_insert_rowid(), input, now))
}

async fn find_active_sqlite(
    pool: &SqlitePool,
    limit: i64,
    blog_setup: Option<i64>,
) -> Result<Vec<RecentComment>> {
    let sql = active_comments_query(blog_setup.is_some());
    let mut query = sqlx::query(&sql);
    if let Some(blog_setup) = blog_setup {
        query = query.bind(blog_setup);
    }

    let rows = query
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to find active comments")?;

    rows.iter().map(row_to_recent_comment_sqlite).collect()
}

fn row_to_recent_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<RecentComment> {
    let status: String = row.try_get("status")?;
    let comment = Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author_name: row.try_get("author_name")?,
        author_email: row.try_get("author_email")?,
        author_url: row.try_get("author_url")?,
        content: row.try_get("content")?,
        status: parse_status(&status)?,
        created_at: row.try_get("created_at")?,
    };

    Ok(RecentComment::new(
        comment,
        row.try_get("post_slug")?,
        row.try_get("post_title")?,
    ))
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &CreateCommentInput) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(INSERT_SQL)
        .bind(input.post_id)
        .bind(&input.author_name)
        .bind(&input.author_email)
        .bind(&input.author_url)
        .bind(&input.content)
        .bind(input.status.as_str())
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    Ok(comment_from_input(result.last_insert_id() as i64, input, now))
}

async fn find_active_mysql(
    pool: &MySqlPool,
    limit: i64,
    blog_setup: Option<i64>,
) -> Result<Vec<RecentComment>> {
    let sql = active_comments_query(blog_setup.is_some());
    let mut query = sqlx::query(&sql);
    if let Some(blog_setup) = blog_setup {
        query = query.bind(blog_setup);
    }

    let rows = query
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to find active comments")?;

    rows.iter().map(row_to_recent_comment_mysql).collect()
}

fn row_to_recent_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Result<RecentComment> {
    let status: String = row.try_get("status")?;
    let comment = Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author_name: row.try_get("author_name")?,
        author_email: row.try_get("author_email")?,
        author_url: row.try_get("author_url")?,
        content: row.try_get("content")?,
        status: parse_status(&status)?,
        created_at: row.try_get("created_at")?,
    };

    Ok(RecentComment::new(
        comment,
        row.try_get("post_slug")?,
        row.try_get("post_title")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{PostRepository, SqlxPostRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreatePostInput;

    struct Fixture {
        repo: SqlxCommentRepository,
        posts: SqlxPostRepository,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        Fixture {
            repo: SqlxCommentRepository::new(pool.clone()),
            posts: SqlxPostRepository::new(pool),
        }
    }

    impl Fixture {
        async fn post(&self, slug: &str, blog_setup: Option<i64>) -> i64 {
            let mut input = CreatePostInput::new(slug, format!("Title {}", slug))
                .with_status(crate::models::PostStatus::Published);
            input.blog_setup_id = blog_setup;
            self.posts.create(&input).await.expect("Failed to create post").id
        }

        async fn comment(&self, post_id: i64, author: &str, status: CommentStatus) -> Comment {
            self.repo
                .create(&CreateCommentInput {
                    post_id,
                    author_name: author.to_string(),
                    author_email: Some(format!("{}@example.com", author)),
                    author_url: None,
                    content: format!("Comment by {}", author),
                    status,
                })
                .await
                .expect("Failed to create comment")
        }
    }

    #[tokio::test]
    async fn test_create_comment() {
        let fx = setup().await;
        let post_id = fx.post("post", None).await;

        let comment = fx.comment(post_id, "ann", CommentStatus::Approved).await;

        assert!(comment.id > 0);
        assert_eq!(comment.post_id, post_id);
        assert_eq!(comment.status, CommentStatus::Approved);
    }

    #[tokio::test]
    async fn test_find_active_comments_only_approved_newest_first() {
        let fx = setup().await;
        let post_id = fx.post("post", None).await;

        let first = fx.comment(post_id, "ann", CommentStatus::Approved).await;
        fx.comment(post_id, "spammer", CommentStatus::Spam).await;
        fx.comment(post_id, "waiting", CommentStatus::Pending).await;
        let last = fx.comment(post_id, "bob", CommentStatus::Approved).await;

        let comments = fx.repo.find_active_comments(10, None).await.unwrap();

        let ids: Vec<i64> = comments.iter().map(|c| c.comment.id).collect();
        assert_eq!(ids, vec![last.id, first.id]);
        assert_eq!(comments[0].post_slug, "post");
        assert_eq!(comments[0].post_title, "Title post");
        assert!(comments[0].avatar_url.starts_with("https://www.gravatar.com/avatar/"));
    }

    #[tokio::test]
    async fn test_find_active_comments_limit() {
        let fx = setup().await;
        let post_id = fx.post("post", None).await;
        for i in 0..7 {
            fx.comment(post_id, &format!("user{}", i), CommentStatus::Approved).await;
        }

        let comments = fx.repo.find_active_comments(5, None).await.unwrap();
        assert_eq!(comments.len(), 5);
    }

    #[tokio::test]
    async fn test_find_active_comments_scoped_to_blog_setup() {
        let fx = setup().await;
        let main_post = fx.post("main", Some(1)).await;
        let other_post = fx.post("other", Some(2)).await;

        let kept = fx.comment(main_post, "ann", CommentStatus::Approved).await;
        fx.comment(other_post, "bob", CommentStatus::Approved).await;

        let scoped = fx.repo.find_active_comments(10, Some(1)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].comment.id, kept.id);

        let all = fx.repo.find_active_comments(10, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_find_active_comments_skips_unpublished_posts() {
        let fx = setup().await;
        let draft = fx
            .posts
            .create(&CreatePostInput::new("draft", "Draft"))
            .await
            .unwrap();
        fx.comment(draft.id, "ann", CommentStatus::Approved).await;

        assert!(fx.repo.find_active_comments(10, None).await.unwrap().is_empty());
    }
}
