//! Blog post repository
//!
//! Database operations for blog posts. Every read and write takes an
//! explicit `PostFilter` or targets active posts only, so soft-deleted rows
//! never leak through a default query.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{BlogPost, CreateBlogPostInput, UpdateBlogPostInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Which posts a query should see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostFilter {
    /// Posts that have not been soft-deleted
    #[default]
    Active,
    /// Soft-deleted posts only
    Deleted,
    /// Every stored post
    All,
}

impl PostFilter {
    fn condition(&self) -> &'static str {
        match self {
            PostFilter::Active => "deleted = 0",
            PostFilter::Deleted => "deleted = 1",
            PostFilter::All => "1 = 1",
        }
    }
}

/// Blog post repository trait
#[async_trait]
pub trait BlogPostRepository: Send + Sync {
    /// Insert a new, active post
    async fn create(&self, input: &CreateBlogPostInput) -> Result<BlogPost>;

    /// Get a post by ID, restricted by `filter`
    async fn get_by_id(&self, id: i64, filter: PostFilter) -> Result<Option<BlogPost>>;

    /// List posts newest first
    async fn list(&self, filter: PostFilter, offset: i64, limit: i64) -> Result<Vec<BlogPost>>;

    /// Count posts matching `filter`
    async fn count(&self, filter: PostFilter) -> Result<i64>;

    /// Apply a partial update to an active post; `None` if no active post has this ID
    async fn update(&self, id: i64, input: &UpdateBlogPostInput) -> Result<Option<BlogPost>>;

    /// Flag an active post as deleted; returns false if no active post has this ID
    async fn soft_delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based blog post repository (SQLite and MySQL)
pub struct SqlxBlogPostRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogPostRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BlogPostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl BlogPostRepository for SqlxBlogPostRepository {
    async fn create(&self, input: &CreateBlogPostInput) -> Result<BlogPost> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_post_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_post_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn get_by_id(&self, id: i64, filter: PostFilter) -> Result<Option<BlogPost>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_sqlite(self.pool.sqlite()?, id, filter).await,
            DatabaseDriver::Mysql => get_post_mysql(self.pool.mysql()?, id, filter).await,
        }
    }

    async fn list(&self, filter: PostFilter, offset: i64, limit: i64) -> Result<Vec<BlogPost>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_posts_sqlite(self.pool.sqlite()?, filter, offset, limit).await
            }
            DatabaseDriver::Mysql => {
                list_posts_mysql(self.pool.mysql()?, filter, offset, limit).await
            }
        }
    }

    async fn count(&self, filter: PostFilter) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM blog_posts WHERE {}",
            filter.condition()
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .fetch_one(self.pool.sqlite()?)
                    .await
                    .context("Failed to count blog posts")?;
                Ok(row.get("count"))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .fetch_one(self.pool.mysql()?)
                    .await
                    .context("Failed to count blog posts")?;
                Ok(row.get("count"))
            }
        }
    }

    async fn update(&self, id: i64, input: &UpdateBlogPostInput) -> Result<Option<BlogPost>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_post_sqlite(self.pool.sqlite()?, id, input).await,
            DatabaseDriver::Mysql => update_post_mysql(self.pool.mysql()?, id, input).await,
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<bool> {
        const SQL: &str = "UPDATE blog_posts SET deleted = 1 WHERE id = ? AND deleted = 0";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .context("Failed to soft-delete blog post")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .context("Failed to soft-delete blog post")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

const POST_COLUMNS: &str = "id, title, category, text, website, create_date, deleted";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, input: &CreateBlogPostInput) -> Result<BlogPost> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO blog_posts (title, category, text, website, create_date, deleted)
        VALUES (?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(&input.title)
    .bind(&input.category)
    .bind(&input.text)
    .bind(&input.website)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create blog post")?;

    get_post_sqlite(pool, result.last_insert_rowid(), PostFilter::All)
        .await?
        .context("Blog post missing right after insert")
}

async fn get_post_sqlite(
    pool: &SqlitePool,
    id: i64,
    filter: PostFilter,
) -> Result<Option<BlogPost>> {
    let sql = format!(
        "SELECT {} FROM blog_posts WHERE id = ? AND {}",
        POST_COLUMNS,
        filter.condition()
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog post by ID")?;

    Ok(row.as_ref().map(row_to_post_sqlite))
}

async fn list_posts_sqlite(
    pool: &SqlitePool,
    filter: PostFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<BlogPost>> {
    let sql = format!(
        "SELECT {} FROM blog_posts WHERE {} ORDER BY create_date DESC, id DESC LIMIT ? OFFSET ?",
        POST_COLUMNS,
        filter.condition()
    );
    let rows = sqlx::query(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list blog posts")?;

    Ok(rows.iter().map(row_to_post_sqlite).collect())
}

async fn update_post_sqlite(
    pool: &SqlitePool,
    id: i64,
    input: &UpdateBlogPostInput,
) -> Result<Option<BlogPost>> {
    let Some(existing) = get_post_sqlite(pool, id, PostFilter::Active).await? else {
        return Ok(None);
    };

    if !input.has_changes() {
        return Ok(Some(existing));
    }

    sqlx::query(
        r#"
        UPDATE blog_posts
        SET title = ?, category = ?, text = ?, website = ?
        WHERE id = ? AND deleted = 0
        "#,
    )
    .bind(input.title.as_ref().unwrap_or(&existing.title))
    .bind(input.category.as_ref().unwrap_or(&existing.category))
    .bind(input.text.as_ref().unwrap_or(&existing.text))
    .bind(input.website.as_ref().unwrap_or(&existing.website))
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update blog post")?;

    get_post_sqlite(pool, id, PostFilter::Active).await
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> BlogPost {
    BlogPost {
        id: row.get("id"),
        title: row.get("title"),
        category: row.get("category"),
        text: row.get("text"),
        website: row.get("website"),
        create_date: row.get("create_date"),
        deleted: row.get("deleted"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, input: &CreateBlogPostInput) -> Result<BlogPost> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO blog_posts (title, category, text, website, create_date, deleted)
        VALUES (?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(&input.title)
    .bind(&input.category)
    .bind(&input.text)
    .bind(&input.website)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create blog post")?;

    // TIMESTAMP drops sub-second precision; return what was stored.
    get_post_mysql(pool, result.last_insert_id() as i64, PostFilter::All)
        .await?
        .context("Blog post missing right after insert")
}

async fn get_post_mysql(pool: &MySqlPool, id: i64, filter: PostFilter) -> Result<Option<BlogPost>> {
    let sql = format!(
        "SELECT {} FROM blog_posts WHERE id = ? AND {}",
        POST_COLUMNS,
        filter.condition()
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog post by ID")?;

    Ok(row.as_ref().map(row_to_post_mysql))
}

async fn list_posts_mysql(
    pool: &MySqlPool,
    filter: PostFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<BlogPost>> {
    let sql = format!(
        "SELECT {} FROM blog_posts WHERE {} ORDER BY create_date DESC, id DESC LIMIT ? OFFSET ?",
        POST_COLUMNS,
        filter.condition()
    );
    let rows = sqlx::query(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list blog posts")?;

    Ok(rows.iter().map(row_to_post_mysql).collect())
}

async fn update_post_mysql(
    pool: &MySqlPool,
    id: i64,
    input: &UpdateBlogPostInput,
) -> Result<Option<BlogPost>> {
    let Some(existing) = get_post_mysql(pool, id, PostFilter::Active).await? else {
        return Ok(None);
    };

    if !input.has_changes() {
        return Ok(Some(existing));
    }

    sqlx::query(
        r#"
        UPDATE blog_posts
        SET title = ?, category = ?, text = ?, website = ?
        WHERE id = ? AND deleted = 0
        "#,
    )
    .bind(input.title.as_ref().unwrap_or(&existing.title))
    .bind(input.category.as_ref().unwrap_or(&existing.category))
    .bind(input.text.as_ref().unwrap_or(&existing.text))
    .bind(input.website.as_ref().unwrap_or(&existing.website))
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update blog post")?;

    get_post_mysql(pool, id, PostFilter::Active).await
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> BlogPost {
    BlogPost {
        id: row.get("id"),
        title: row.get("title"),
        category: row.get("category"),
        text: row.get("text"),
        website: row.get("website"),
        create_date: row.get("create_date"),
        deleted: row.get("deleted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxBlogPostRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxBlogPostRepository::new(pool)
    }

    fn input(title: &str) -> CreateBlogPostInput {
        CreateBlogPostInput::new(title, "tech", format!("Body of {}", title), "http://example.com")
    }

    #[tokio::test]
    async fn test_create_post() {
        let repo = setup_test_repo().await;

        let created = repo.create(&input("A")).await.expect("Failed to create post");

        assert_eq!(created.id, 1);
        assert_eq!(created.title, "A");
        assert!(!created.deleted);
    }

    #[tokio::test]
    async fn test_get_by_id_roundtrip() {
        let repo = setup_test_repo().await;
        let created = repo.create(&input("A")).await.unwrap();

        let found = repo
            .get_by_id(created.id, PostFilter::Active)
            .await
            .unwrap()
            .expect("Post should exist");
        assert_eq!(found.title, "A");
        assert_eq!(found.text, "Body of A");
        assert_eq!(found.create_date, created.create_date);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_post_but_keeps_row() {
        let repo = setup_test_repo().await;
        let created = repo.create(&input("A")).await.unwrap();

        assert!(repo.soft_delete(created.id).await.unwrap());

        assert!(repo.get_by_id(created.id, PostFilter::Active).await.unwrap().is_none());
        let stored = repo
            .get_by_id(created.id, PostFilter::All)
            .await
            .unwrap()
            .expect("Row must still be stored");
        assert!(stored.deleted);
        assert_eq!(repo.count(PostFilter::Deleted).await.unwrap(), 1);
        assert_eq!(repo.count(PostFilter::Active).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_soft_delete_twice_reports_missing() {
        let repo = setup_test_repo().await;
        let created = repo.create(&input("A")).await.unwrap();

        assert!(repo.soft_delete(created.id).await.unwrap());
        assert!(!repo.soft_delete(created.id).await.unwrap());
        assert!(!repo.soft_delete(9999).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_excludes_deleted_and_orders_newest_first() {
        let repo = setup_test_repo().await;
        for title in ["first", "second", "third"] {
            repo.create(&input(title)).await.unwrap();
        }
        repo.soft_delete(2).await.unwrap();

        let posts = repo.list(PostFilter::Active, 0, 10).await.unwrap();
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "first"]);

        let page = repo.list(PostFilter::Active, 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "first");
    }

    #[tokio::test]
    async fn test_partial_update() {
        let repo = setup_test_repo().await;
        let created = repo.create(&input("A")).await.unwrap();

        let updated = repo
            .update(created.id, &UpdateBlogPostInput::new().with_title("B"))
            .await
            .unwrap()
            .expect("Post should be updated");

        assert_eq!(updated.title, "B");
        assert_eq!(updated.category, "tech");
        assert_eq!(updated.create_date, created.create_date);
    }

    #[tokio::test]
    async fn test_update_deleted_post_returns_none() {
        let repo = setup_test_repo().await;
        let created = repo.create(&input("A")).await.unwrap();
        repo.soft_delete(created.id).await.unwrap();

        let result = repo
            .update(created.id, &UpdateBlogPostInput::new().with_title("B"))
            .await
            .unwrap();
        assert!(result.is_none());

        let stored = repo.get_by_id(created.id, PostFilter::All).await.unwrap().unwrap();
        assert_eq!(stored.title, "A");
    }
}
