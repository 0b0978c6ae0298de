//! Tag repository
//!
//! Database operations for tags.
//!
//! This module provides:
//! - `TagRepository` trait defining the interface for tag data access
//! - `SqlxTagRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Tag, TagWithCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, slug: &str, name: &str) -> Result<Tag>;

    /// Most used tags, by number of published posts
    ///
    /// Ordered by usage descending, then name ascending. Tags without any
    /// published post are left out.
    async fn find_top_by_usage(&self, limit: i64) -> Result<Vec<TagWithCount>>;

    /// Associate tag with post
    async fn add_to_post(&self, tag_id: i64, post_id: i64) -> Result<()>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, slug: &str, name: &str) -> Result<Tag> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_tag_sqlite(self.pool.sqlite()?, slug, name).await,
            DatabaseDriver::Mysql => create_tag_mysql(self.pool.mysql()?, slug, name).await,
        }
    }

    async fn find_top_by_usage(&self, limit: i64) -> Result<Vec<TagWithCount>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => find_top_by_usage_sqlite(self.pool.sqlite()?, limit).await,
            DatabaseDriver::Mysql => find_top_by_usage_mysql(self.pool.mysql()?, limit).await,
        }
    }

    async fn add_to_post(&self, tag_id: i64, post_id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                add_tag_to_post_sqlite(self.pool.sqlite()?, tag_id, post_id).await
            }
            DatabaseDriver::Mysql => {
                add_tag_to_post_mysql(self.pool.mysql()?, tag_id, post_id).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_tag_sqlite(pool: &SqlitePool, slug: &str, name: &str) -> Result<Tag> {
    let now = Utc::now();

    let result = sqlx::query("INSERT INTO tags (slug, name, created_at) VALUES (?, ?, ?)")
        .bind(slug)
        .bind(name)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create tag")?;

    Ok(Tag {
        id: result.last_insert_rowid(),
        slug: slug.to_string(),
        name: name.to_string(),
        created_at: now,
    })
}

async fn find_top_by_usage_sqlite(pool: &SqlitePool, limit: i64) -> Result<Vec<TagWithCount>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.slug, t.name, t.created_at, COUNT(p.id) as cnt
        FROM tags t
        INNER JOIN post_tags pt ON t.id = pt.tag_id
        INNER JOIN posts p ON p.id = pt.post_id AND p.status = 'published'
        GROUP BY t.id, t.slug, t.name, t.created_at
        ORDER BY cnt DESC, t.name ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to find top tags by usage")?;

    rows.iter()
        .map(|row| {
            let cnt: i64 = row.get("cnt");
            Ok(TagWithCount::new(row_to_tag_sqlite(row)?, cnt))
        })
        .collect()
}

async fn add_tag_to_post_sqlite(pool: &SqlitePool, tag_id: i64, post_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
        .bind(post_id)
        .bind(tag_id)
        .execute(pool)
        .await
        .context("Failed to add tag to post")?;

    Ok(())
}

fn row_to_tag_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Tag> {
    Ok(Tag {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_tag_mysql(pool: &MySqlPool, slug: &str, name: &str) -> Result<Tag> {
    let now = Utc::now();

    let result = sqlx::query("INSERT INTO tags (slug, name, created_at) VALUES (?, ?, ?)")
        .bind(slug)
        .bind(name)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create tag")?;

    Ok(Tag {
        id: result.last_insert_id() as i64,
        slug: slug.to_string(),
        name: name.to_string(),
        created_at: now,
    })
}

async fn find_top_by_usage_mysql(pool: &MySqlPool, limit: i64) -> Result<Vec<TagWithCount>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.slug, t.name, t.created_at, COUNT(p.id) as cnt
        FROM tags t
        INNER JOIN post_tags pt ON t.id = pt.tag_id
        INNER JOIN posts p ON p.id = pt.post_id AND p.status = 'published'
        GROUP BY t.id, t.slug, t.name, t.created_at
        ORDER BY cnt DESC, t.name ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to find top tags by usage")?;

    rows.iter()
        .map(|row| {
            let cnt: i64 = row.get("cnt");
            Ok(TagWithCount::new(row_to_tag_mysql(row)?, cnt))
        })
        .collect()
}

async fn add_tag_to_post_mysql(pool: &MySqlPool, tag_id: i64, post_id: i64) -> Result<()> {
    sqlx::query("INSERT IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
        .bind(post_id)
        .bind(tag_id)
        .execute(pool)
        .await
        .context("Failed to add tag to post")?;

    Ok(())
}

fn row_to_tag_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Tag> {
    Ok(Tag {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxTagRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxTagRepository::new(pool.clone());
        (pool, repo)
    }

    /// Helper to create a post with the given status
    async fn create_test_post(pool: &SqlitePool, slug: &str, status: &str) -> i64 {
        let result = sqlx::query("INSERT INTO posts (slug, title, status) VALUES (?, ?, ?)")
            .bind(slug)
            .bind(format!("Title for {}", slug))
            .bind(status)
            .execute(pool)
            .await
            .expect("Failed to create test post");
        result.last_insert_rowid()
    }

    #[tokio::test]
    async fn test_create_tag() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo.create("rust", "Rust").await.expect("Failed to create tag");

        assert!(created.id > 0);
        assert_eq!(created.slug, "rust");
        assert_eq!(created.name, "Rust");
    }

    #[tokio::test]
    async fn test_create_duplicate_slug_fails() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create("rust", "Rust").await.unwrap();
        assert!(repo.create("rust", "Rust again").await.is_err());
    }

    #[tokio::test]
    async fn test_find_top_by_usage_empty() {
        let (_pool, repo) = setup_test_repo().await;

        let tags = repo.find_top_by_usage(20).await.unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_find_top_by_usage_sorted_by_count_then_name() {
        let (pool, repo) = setup_test_repo().await;
        let sqlite = pool.sqlite().unwrap();

        let p1 = create_test_post(sqlite, "post-1", "published").await;
        let p2 = create_test_post(sqlite, "post-2", "published").await;
        let p3 = create_test_post(sqlite, "post-3", "published").await;

        let popular = repo.create("popular", "Popular").await.unwrap();
        let beta = repo.create("beta", "Beta").await.unwrap();
        let alpha = repo.create("alpha", "Alpha").await.unwrap();

        for post in [p1, p2, p3] {
            repo.add_to_post(popular.id, post).await.unwrap();
        }
        repo.add_to_post(beta.id, p1).await.unwrap();
        repo.add_to_post(alpha.id, p2).await.unwrap();

        let tags = repo.find_top_by_usage(10).await.unwrap();

        let summary: Vec<(&str, i64)> = tags.iter().map(|t| (t.tag.slug.as_str(), t.cnt)).collect();
        assert_eq!(summary, vec![("popular", 3), ("alpha", 1), ("beta", 1)]);
    }

    #[tokio::test]
    async fn test_find_top_by_usage_counts_only_published_posts() {
        let (pool, repo) = setup_test_repo().await;
        let sqlite = pool.sqlite().unwrap();

        let published = create_test_post(sqlite, "published", "published").await;
        let draft = create_test_post(sqlite, "draft", "draft").await;

        let rust = repo.create("rust", "Rust").await.unwrap();
        let hidden = repo.create("hidden", "Hidden").await.unwrap();
        repo.add_to_post(rust.id, published).await.unwrap();
        repo.add_to_post(rust.id, draft).await.unwrap();
        repo.add_to_post(hidden.id, draft).await.unwrap();

        let tags = repo.find_top_by_usage(10).await.unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag.id, rust.id);
        assert_eq!(tags[0].cnt, 1);
    }

    #[tokio::test]
    async fn test_find_top_by_usage_limit() {
        let (pool, repo) = setup_test_repo().await;
        let sqlite = pool.sqlite().unwrap();
        let post = create_test_post(sqlite, "post", "published").await;

        for i in 1..=5 {
            let tag = repo.create(&format!("tag-{}", i), &format!("Tag {}", i)).await.unwrap();
            repo.add_to_post(tag.id, post).await.unwrap();
        }

        let tags = repo.find_top_by_usage(3).await.unwrap();
        assert_eq!(tags.len(), 3);
    }

    #[tokio::test]
    async fn test_add_to_post_is_idempotent() {
        let (pool, repo) = setup_test_repo().await;
        let sqlite = pool.sqlite().unwrap();
        let post = create_test_post(sqlite, "post", "published").await;
        let tag = repo.create("rust", "Rust").await.unwrap();

        repo.add_to_post(tag.id, post).await.unwrap();
        repo.add_to_post(tag.id, post).await.unwrap();

        let tags = repo.find_top_by_usage(10).await.unwrap();
        assert_eq!(tags[0].cnt, 1);
    }
}
