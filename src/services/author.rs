//! Author service

use crate::db::repositories::AuthorRepository;
use crate::models::{Author, CreateAuthorInput, UpdateAuthorInput};
use crate::services::validation::{validate_create_author, validate_update_author, ValidationErrors};
use std::sync::Arc;

/// Error types for author service operations
#[derive(Debug, thiserror::Error)]
pub enum AuthorServiceError {
    #[error("Author not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(ValidationErrors),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Whether an update must carry every field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorUpdateMode {
    Full,
    Partial,
}

pub struct AuthorService {
    repo: Arc<dyn AuthorRepository>,
}

impl AuthorService {
    pub fn new(repo: Arc<dyn AuthorRepository>) -> Self {
        Self { repo }
    }

    /// All authors ordered by ID
    pub async fn list(&self) -> Result<Vec<Author>, AuthorServiceError> {
        Ok(self.repo.list().await?)
    }

    pub async fn retrieve(&self, id: i64) -> Result<Author, AuthorServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Create an author
    ///
    /// Duplicate e-mail addresses are accepted.
    pub async fn create(&self, input: CreateAuthorInput) -> Result<Author, AuthorServiceError> {
        validate_create_author(&input).map_err(AuthorServiceError::ValidationError)?;
        let author = self.repo.create(&input).await?;
        tracing::info!("Created author {}", author.id);
        Ok(author)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateAuthorInput,
        mode: AuthorUpdateMode,
    ) -> Result<Author, AuthorServiceError> {
        if self.repo.get_by_id(id).await?.is_none() {
            return Err(not_found(id));
        }

        let mut errors = ValidationErrors::new();
        if mode == AuthorUpdateMode::Full {
            for (field, value) in [
                ("first_name", &input.first_name),
                ("last_name", &input.last_name),
                ("email", &input.email),
            ] {
                if value.is_none() {
                    errors.add(field, "This field is required.");
                }
            }
        }
        if let Err(field_errors) = validate_update_author(&input) {
            for e in field_errors.errors() {
                errors.add(e.field, e.message.clone());
            }
        }
        errors
            .into_result()
            .map_err(AuthorServiceError::ValidationError)?;

        let author = self
            .repo
            .update(id, &input)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!("Updated author {}", id);
        Ok(author)
    }

    /// Remove an author permanently
    pub async fn delete(&self, id: i64) -> Result<(), AuthorServiceError> {
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!("Deleted author {}", id);
        Ok(())
    }
}

fn not_found(id: i64) -> AuthorServiceError {
    AuthorServiceError::NotFound(format!("Author with ID {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxAuthorRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> AuthorService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        AuthorService::new(SqlxAuthorRepository::boxed(pool))
    }

    fn ada() -> CreateAuthorInput {
        CreateAuthorInput::new("Ada", "Lovelace", "ada@example.com")
    }

    #[tokio::test]
    async fn test_create_and_retrieve() {
        let service = setup_test_service().await;
        let created = service.create(ada()).await.unwrap();
        assert_eq!(service.retrieve(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_duplicate_email_allowed() {
        let service = setup_test_service().await;
        service.create(ada()).await.unwrap();
        service.create(ada()).await.unwrap();
        assert_eq!(service.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let service = setup_test_service().await;
        let err = service
            .create(CreateAuthorInput::new("Ada", "", "nope"))
            .await
            .unwrap_err();
        match err {
            AuthorServiceError::ValidationError(errors) => {
                assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["last_name", "email"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_full_update_requires_all_fields() {
        let service = setup_test_service().await;
        let created = service.create(ada()).await.unwrap();

        let err = service
            .update(
                created.id,
                UpdateAuthorInput::new().with_first_name("Augusta"),
                AuthorUpdateMode::Full,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthorServiceError::ValidationError(_)));

        let patched = service
            .update(
                created.id,
                UpdateAuthorInput::new().with_first_name("Augusta"),
                AuthorUpdateMode::Partial,
            )
            .await
            .unwrap();
        assert_eq!(patched.first_name, "Augusta");
        assert_eq!(patched.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_missing_author() {
        let service = setup_test_service().await;
        assert!(matches!(
            service.retrieve(42).await,
            Err(AuthorServiceError::NotFound(_))
        ));
        assert!(matches!(
            service
                .update(42, UpdateAuthorInput::new(), AuthorUpdateMode::Partial)
                .await,
            Err(AuthorServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(42).await,
            Err(AuthorServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_author() {
        let service = setup_test_service().await;
        let created = service.create(ada()).await.unwrap();
        service.delete(created.id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }
}
