//! Banner image repository
//!
//! A post has at most one banner image; `upsert` relies on the UNIQUE
//! `blog_post_id` column so a second image for the same post replaces the
//! stored reference instead of adding a row.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::BannerImage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait BannerImageRepository: Send + Sync {
    /// Get the banner image of a post
    async fn get_by_post(&self, blog_post_id: i64) -> Result<Option<BannerImage>>;

    /// Get the banner images of several posts in one query
    async fn get_by_posts(&self, blog_post_ids: &[i64]) -> Result<Vec<BannerImage>>;

    /// Create the post's banner image, or replace its reference if one exists
    async fn upsert(&self, blog_post_id: i64, image: &str) -> Result<BannerImage>;
}

/// SQLx-based banner image repository (SQLite and MySQL)
pub struct SqlxBannerImageRepository {
    pool: DynDatabasePool,
}

impl SqlxBannerImageRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BannerImageRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl BannerImageRepository for SqlxBannerImageRepository {
    async fn get_by_post(&self, blog_post_id: i64) -> Result<Option<BannerImage>> {
        const SQL: &str =
            "SELECT id, blog_post_id, image FROM banner_images WHERE blog_post_id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(SQL)
                    .bind(blog_post_id)
                    .fetch_optional(self.pool.sqlite()?)
                    .await
                    .context("Failed to get banner image")?;
                Ok(row.as_ref().map(row_to_image_sqlite))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(SQL)
                    .bind(blog_post_id)
                    .fetch_optional(self.pool.mysql()?)
                    .await
                    .context("Failed to get banner image")?;
                Ok(row.as_ref().map(row_to_image_mysql))
            }
        }
    }

    async fn get_by_posts(&self, blog_post_ids: &[i64]) -> Result<Vec<BannerImage>> {
        if blog_post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; blog_post_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, blog_post_id, image FROM banner_images WHERE blog_post_id IN ({})",
            placeholders
        );

        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query(&sql);
                for id in blog_post_ids {
                    query = query.bind(*id);
                }
                let rows = query
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to list banner images")?;
                Ok(rows.iter().map(row_to_image_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query(&sql);
                for id in blog_post_ids {
                    query = query.bind(*id);
                }
                let rows = query
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to list banner images")?;
                Ok(rows.iter().map(row_to_image_mysql).collect())
            }
        }
    }

    async fn upsert(&self, blog_post_id: i64, image: &str) -> Result<BannerImage> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                upsert_image_sqlite(self.pool.sqlite()?, blog_post_id, image).await
            }
            DatabaseDriver::Mysql => {
                upsert_image_mysql(self.pool.mysql()?, blog_post_id, image).await
            }
        }
    }
}

async fn upsert_image_sqlite(
    pool: &SqlitePool,
    blog_post_id: i64,
    image: &str,
) -> Result<BannerImage> {
    let row = sqlx::query(
        r#"
        INSERT INTO banner_images (blog_post_id, image)
        VALUES (?, ?)
        ON CONFLICT(blog_post_id) DO UPDATE SET image = excluded.image
        RETURNING id, blog_post_id, image
        "#,
    )
    .bind(blog_post_id)
    .bind(image)
    .fetch_one(pool)
    .await
    .context("Failed to save banner image")?;

    Ok(row_to_image_sqlite(&row))
}

async fn upsert_image_mysql(
    pool: &MySqlPool,
    blog_post_id: i64,
    image: &str,
) -> Result<BannerImage> {
    sqlx::query(
        r#"
        INSERT INTO banner_images (blog_post_id, image)
        VALUES (?, ?)
        ON DUPLICATE KEY UPDATE image = VALUES(image)
        "#,
    )
    .bind(blog_post_id)
    .bind(image)
    .execute(pool)
    .await
    .context("Failed to save banner image")?;

    let row =
        sqlx::query("SELECT id, blog_post_id, image FROM banner_images WHERE blog_post_id = ?")
            .bind(blog_post_id)
            .fetch_one(pool)
            .await
            .context("Failed to read back banner image")?;

    Ok(row_to_image_mysql(&row))
}

fn row_to_image_sqlite(row: &sqlx::sqlite::SqliteRow) -> BannerImage {
    BannerImage {
        id: row.get("id"),
        blog_post_id: row.get("blog_post_id"),
        image: row.get("image"),
    }
}

fn row_to_image_mysql(row: &sqlx::mysql::MySqlRow) -> BannerImage {
    BannerImage {
        id: row.get("id"),
        blog_post_id: row.get("blog_post_id"),
        image: row.get("image"),
    }
}

/// Banner image rows bound to a post, read straight from the test pool
#[cfg(test)]
pub(crate) async fn count_rows_for_post(pool: &DynDatabasePool, blog_post_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM banner_images WHERE blog_post_id = ?")
        .bind(blog_post_id)
        .fetch_one(pool.sqlite().expect("Test pool is SQLite"))
        .await
        .expect("Failed to count banner images")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{BlogPostRepository, SqlxBlogPostRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreateBlogPostInput;

    async fn setup() -> (DynDatabasePool, SqlxBlogPostRepository, SqlxBannerImageRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        (
            pool.clone(),
            SqlxBlogPostRepository::new(pool.clone()),
            SqlxBannerImageRepository::new(pool),
        )
    }

    async fn create_post(posts: &SqlxBlogPostRepository, title: &str) -> i64 {
        posts
            .create(&CreateBlogPostInput::new(title, "tech", "x", "http://a"))
            .await
            .expect("Failed to create post")
            .id
    }

    #[tokio::test]
    async fn test_upsert_creates_then_replaces() {
        let (pool, posts, images) = setup().await;
        let post_id = create_post(&posts, "A").await;

        let first = images.upsert(post_id, "/uploads/img1.png").await.unwrap();
        let second = images.upsert(post_id, "/uploads/img2.png").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.image, "/uploads/img2.png");
        assert_eq!(count_rows_for_post(&pool, post_id).await, 1);

        let stored = images.get_by_post(post_id).await.unwrap().unwrap();
        assert_eq!(stored.image, "/uploads/img2.png");
    }

    #[tokio::test]
    async fn test_get_by_post_without_image() {
        let (pool, posts, images) = setup().await;
        let post_id = create_post(&posts, "A").await;

        assert!(images.get_by_post(post_id).await.unwrap().is_none());
        assert_eq!(count_rows_for_post(&pool, post_id).await, 0);
    }

    #[tokio::test]
    async fn test_get_by_posts_batches() {
        let (_pool, posts, images) = setup().await;
        let a = create_post(&posts, "A").await;
        let b = create_post(&posts, "B").await;
        let c = create_post(&posts, "C").await;
        images.upsert(a, "/uploads/a.png").await.unwrap();
        images.upsert(c, "/uploads/c.png").await.unwrap();

        let mut found = images.get_by_posts(&[a, b, c]).await.unwrap();
        found.sort_by_key(|img| img.blog_post_id);
        let owners: Vec<i64> = found.iter().map(|img| img.blog_post_id).collect();
        assert_eq!(owners, vec![a, c]);

        assert!(images.get_by_posts(&[]).await.unwrap().is_empty());
    }
}
