//! Post repository
//!
//! Database operations for blog posts.
//!
//! This module provides:
//! - `PostRepository` trait defining the interface for post data access
//! - `SqlxPostRepository` implementing the trait for SQLite and MySQL
//!
//! Listing queries only ever return published posts, newest first.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreatePostInput, MonthCount, Post, PostStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post and attach its tags
    async fn create(&self, input: &CreatePostInput) -> Result<Post>;

    /// All published posts, newest first
    async fn find_all(&self) -> Result<Vec<Post>>;

    /// The `limit` newest published posts
    async fn find_all_with_limit(&self, limit: i64) -> Result<Vec<Post>>;

    /// Every (year, month) that has published posts, with the number of
    /// posts in it, newest month first
    async fn find_months_and_years_with_posts(&self) -> Result<Vec<MonthCount>>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_post_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_post_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => find_published_sqlite(self.pool.sqlite()?, None).await,
            DatabaseDriver::Mysql => find_published_mysql(self.pool.mysql()?, None).await,
        }
    }

    async fn find_all_with_limit(&self, limit: i64) -> Result<Vec<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => find_published_sqlite(self.pool.sqlite()?, Some(limit)).await,
            DatabaseDriver::Mysql => find_published_mysql(self.pool.mysql()?, Some(limit)).await,
        }
    }

    async fn find_months_and_years_with_posts(&self) -> Result<Vec<MonthCount>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => find_months_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => find_months_mysql(self.pool.mysql()?).await,
        }
    }
}

const POST_COLUMNS: &str = "id, slug, title, teaser, content, status, category_id, blog_setup_id, published_at, created_at, updated_at";

const INSERT_POST_SQL: &str = r#"
    INSERT INTO posts (slug, title, teaser, content, status, category_id, blog_setup_id, published_at, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

fn published_query(limited: bool) -> String {
    let mut sql = format!(
        "SELECT {} FROM posts WHERE status = 'published' ORDER BY published_at DESC, id DESC",
        POST_COLUMNS
    );
    if limited {
        sql.push_str(" LIMIT ?");
    }
    sql
}

fn post_from_input(id: i64, input: &CreatePostInput, now: chrono::DateTime<Utc>) -> Post {
    Post {
        id,
        slug: input.slug.clone(),
        title: input.title.clone(),
        teaser: input.teaser.clone(),
        content: input.content.clone(),
        status: input.status.unwrap_or_default(),
        category_id: input.category_id,
        blog_setup_id: input.blog_setup_id,
        published_at: input.resolved_published_at(now),
        created_at: now,
        updated_at: now,
    }
}

fn parse_status(status: &str) -> Result<PostStatus> {
    PostStatus::parse(status).ok_or_else(|| anyhow::anyhow!("Invalid post status: {}", status))
}

fn month_count(year: i64, month: i64, count: i64) -> Result<MonthCount> {
    Ok(MonthCount {
        year: i32::try_from(year).context("Archive year out of range")?,
        month: u32::try_from(month).context("Archive month out of range")?,
        count,
    })
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, input: &CreatePostInput) -> Result<Post> {
    let now = Utc::now();
    let post = post_from_input(0, input, now);

    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let result = sqlx::query(INSERT_POST_SQL)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.teaser)
        .bind(&post.content)
        .bind(post.status.as_str())
        .bind(post.category_id)
        .bind(post.blog_setup_id)
        .bind(post.published_at)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Failed to create post")?;
    let id = result.last_insert_rowid();

    for tag_id in &input.tag_ids {
        sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(id)
            .bind(*tag_id)
            .execute(&mut *tx)
            .await
            .context("Failed to attach tag to post")?;
    }

    tx.commit().await.context("Failed to commit post")?;

    Ok(Post { id, ..post })
}

async fn find_published_sqlite(pool: &SqlitePool, limit: Option<i64>) -> Result<Vec<Post>> {
    let sql = published_query(limit.is_some());
    let mut query = sqlx::query(&sql);
    if let Some(limit) = limit {
        query = query.bind(limit);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to list published posts")?;

    rows.iter().map(row_to_post_sqlite).collect()
}

async fn find_months_sqlite(pool: &SqlitePool) -> Result<Vec<MonthCount>> {
    let rows = sqlx::query(
        r#"
        SELECT CAST(strftime('%Y', published_at) AS INTEGER) as year,
               CAST(strftime('%m', published_at) AS INTEGER) as month,
               COUNT(*) as count
        FROM posts
        WHERE status = 'published' AND published_at IS NOT NULL
        GROUP BY year, month
        ORDER BY year DESC, month DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to find archive months")?;

    rows.iter()
        .map(|row| month_count(row.try_get("year")?, row.try_get("month")?, row.try_get("count")?))
        .collect()
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let status: String = row.try_get("status")?;

    Ok(Post {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        teaser: row.try_get("teaser")?,
        content: row.try_get("content")?,
        status: parse_status(&status)?,
        category_id: row.try_get("category_id")?,
        blog_setup_id: row.try_get("blog_setup_id")?,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, input: &CreatePostInput) -> Result<Post> {
    let now = Utc::now();
    let post = post_from_input(0, input, now);

    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let result = sqlx::query(INSERT_POST_SQL)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.teaser)
        .bind(&post.content)
        .bind(post.status.as_str())
        .bind(post.category_id)
        .bind(post.blog_setup_id)
        .bind(post.published_at)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Failed to create post")?;
    let id = result.last_insert_id() as i64;

    for tag_id in &input.tag_ids {
        sqlx::query("INSERT IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(id)
            .bind(*tag_id)
            .execute(&mut *tx)
            .await
            .context("Failed to attach tag to post")?;
    }

    tx.commit().await.context("Failed to commit post")?;

    Ok(Post { id, ..post })
}

async fn find_published_mysql(pool: &MySqlPool, limit: Option<i64>) -> Result<Vec<Post>> {
    let sql = published_query(limit.is_some());
    let mut query = sqlx::query(&sql);
    if let Some(limit) = limit {
        query = query.bind(limit);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to list published posts")?;

    rows.iter().map(row_to_post_mysql).collect()
}

async fn find_months_mysql(pool: &MySqlPool) -> Result<Vec<MonthCount>> {
    let rows = sqlx::query(
        r#"
        SELECT CAST(YEAR(published_at) AS SIGNED) as year,
               CAST(MONTH(published_at) AS SIGNED) as month,
               COUNT(*) as count
        FROM posts
        WHERE status = 'published' AND published_at IS NOT NULL
        GROUP BY year, month
        ORDER BY year DESC, month DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to find archive months")?;

    rows.iter()
        .map(|row| month_count(row.try_get("year")?, row.try_get("month")?, row.try_get("count")?))
        .collect()
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Post> {
    let status: String = row.try_get("status")?;

    Ok(Post {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        teaser: row.try_get("teaser")?,
        content: row.try_get("content")?,
        status: parse_status(&status)?,
        category_id: row.try_get("category_id")?,
        blog_setup_id: row.try_get("blog_setup_id")?,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
