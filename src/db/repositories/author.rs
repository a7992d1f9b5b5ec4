//! Author repository
//!
//! Authors have no soft-delete flag, so `delete` removes the row.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Author, CreateAuthorInput, UpdateAuthorInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Author repository trait
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn create(&self, input: &CreateAuthorInput) -> Result<Author>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Author>>;

    /// List all authors ordered by ID
    async fn list(&self) -> Result<Vec<Author>>;

    /// Apply a partial update; `None` if the author does not exist
    async fn update(&self, id: i64, input: &UpdateAuthorInput) -> Result<Option<Author>>;

    /// Remove an author; returns false if nothing was deleted
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based author repository (SQLite and MySQL)
pub struct SqlxAuthorRepository {
    pool: DynDatabasePool,
}

impl SqlxAuthorRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn AuthorRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AuthorRepository for SqlxAuthorRepository {
    async fn create(&self, input: &CreateAuthorInput) -> Result<Author> {
        const SQL: &str = "INSERT INTO authors (first_name, last_name, email) VALUES (?, ?, ?)";
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(&input.first_name)
                .bind(&input.last_name)
                .bind(&input.email)
                .execute(self.pool.sqlite()?)
                .await
                .context("Failed to create author")?
                .last_insert_rowid(),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(&input.first_name)
                .bind(&input.last_name)
                .bind(&input.email)
                .execute(self.pool.mysql()?)
                .await
                .context("Failed to create author")?
                .last_insert_id() as i64,
        };

        Ok(Author {
            id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Author>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_author_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_author_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Author>> {
        const SQL: &str = "SELECT id, first_name, last_name, email FROM authors ORDER BY id";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(SQL)
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to list authors")?;
                Ok(rows.iter().map(row_to_author_sqlite).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(SQL)
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to list authors")?;
                Ok(rows.iter().map(row_to_author_mysql).collect())
            }
        }
    }

    async fn update(&self, id: i64, input: &UpdateAuthorInput) -> Result<Option<Author>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        if !input.has_changes() {
            return Ok(Some(existing));
        }

        let updated = input.apply_to(&existing);
        const SQL: &str =
            "UPDATE authors SET first_name = ?, last_name = ?, email = ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(SQL)
                    .bind(&updated.first_name)
                    .bind(&updated.last_name)
                    .bind(&updated.email)
                    .bind(id)
                    .execute(self.pool.sqlite()?)
                    .await
                    .context("Failed to update author")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(SQL)
                    .bind(&updated.first_name)
                    .bind(&updated.last_name)
                    .bind(&updated.email)
                    .bind(id)
                    .execute(self.pool.mysql()?)
                    .await
                    .context("Failed to update author")?;
            }
        }

        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        const SQL: &str = "DELETE FROM authors WHERE id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(SQL)
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .context("Failed to delete author")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(SQL)
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .context("Failed to delete author")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

async fn get_author_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Author>> {
    let row = sqlx::query("SELECT id, first_name, last_name, email FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get author by ID")?;
    Ok(row.as_ref().map(row_to_author_sqlite))
}

async fn get_author_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Author>> {
    let row = sqlx::query("SELECT id, first_name, last_name, email FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get author by ID")?;
    Ok(row.as_ref().map(row_to_author_mysql))
}

fn row_to_author_sqlite(row: &sqlx::sqlite::SqliteRow) -> Author {
    Author {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
    }
}

fn row_to_author_mysql(row: &sqlx::mysql::MySqlRow) -> Author {
    Author {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxAuthorRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxAuthorRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&CreateAuthorInput::new("Ada", "Lovelace", "ada@example.com"))
            .await
            .expect("Failed to create author");

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_list_ordered_by_id() {
        let repo = setup_test_repo().await;
        for (first, last) in [("Ada", "Lovelace"), ("Alan", "Turing")] {
            repo.create(&CreateAuthorInput::new(first, last, "x@example.com"))
                .await
                .unwrap();
        }

        let authors = repo.list().await.unwrap();
        let names: Vec<&str> = authors.iter().map(|a| a.first_name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Alan"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&CreateAuthorInput::new("Ada", "Lovelace", "ada@example.com"))
            .await
            .unwrap();

        let updated = repo
            .update(created.id, &UpdateAuthorInput::new().with_email("ada@analytical.engine"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.email, "ada@analytical.engine");
        assert_eq!(updated.first_name, "Ada");

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(repo
            .update(created.id, &UpdateAuthorInput::new().with_email("a@b.io"))
            .await
            .unwrap()
            .is_none());
    }
}
