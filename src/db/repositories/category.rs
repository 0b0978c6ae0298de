//! Category repository
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Category, CreateCategoryInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category>;

    /// All categories, ordered by sort order then name
    async fn find_all(&self) -> Result<Vec<Category>>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_category_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_category_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn find_all(&self) -> Result<Vec<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => find_all_categories_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => find_all_categories_mysql(self.pool.mysql()?).await,
        }
    }
}

const FIND_ALL_SQL: &str = r#"
    SELECT id, slug, name, description, parent_id, sort_order, created_at
    FROM categories
    ORDER BY sort_order, name
"#;

const INSERT_SQL: &str = r#"
    INSERT INTO categories (slug, name, description, parent_id, sort_order, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
"#;

fn category_from_input(id: i64, input: &CreateCategoryInput, now: chrono::DateTime<Utc>) -> Category {
    Category {
        id,
        slug: input.slug.clone(),
        name: input.name.clone(),
        description: input.description.clone(),
        parent_id: input.parent_id,
        sort_order: input.sort_order.unwrap_or(0),
        created_at: now,
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, input: &CreateCategoryInput) -> Result<Category> {
    let now = Utc::now();

    let result = sqlx::query(INSERT_SQL)
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.parent_id)
        .bind(input.sort_order.unwrap_or(0))
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create category")?;

    Ok(category_from_input(result.last_insert_rowid(), input, now))
}

async fn find_all_categories_sqlite(pool: &SqlitePool) -> Result<Vec<Category>> {
    let rows = sqlx::query(FIND_ALL_SQL)
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    rows.iter().map(row_to_category_sqlite).collect()
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        parent_id: row.try_get("parent_id")?,
        sort_order: row.try_get("sort_order")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, input: &CreateCategoryInput) -> Result<Category> {
    let now = Utc::now();

    let result = sqlx::query(INSERT_SQL)
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.parent_id)
        .bind(input.sort_order.unwrap_or(0))
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create category")?;

    Ok(category_from_input(result.last_insert_id() as i64, input, now))
}

async fn find_all_categories_mysql(pool: &MySqlPool) -> Result<Vec<Category>> {
    let rows = sqlx::query(FIND_ALL_SQL)
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    rows.iter().map(row_to_category_mysql).collect()
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        parent_id: row.try_get("parent_id")?,
        sort_order: row.try_get("sort_order")?,
        created_at: row.try_get("created_at")?,
    })
}
