//! Blog post service
//!
//! Implements the post lifecycle:
//! - Create with an optional banner image
//! - Full (PUT) and partial (PATCH) updates; a new image replaces the old one
//! - Soft delete: the row stays, every default query skips it
//! - Listing with the active total and the deleted count

use crate::db::repositories::{BannerImageRepository, BlogPostRepository, PostFilter};
use crate::models::{
    BannerImage, BlogPostWithBanner, CreateBlogPostInput, ImageUpload, ListParams, PagedResult,
    UpdateBlogPostInput,
};
use crate::services::media::MediaStore;
use crate::services::validation::{validate_create_post, validate_update_post, ValidationErrors};
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;

/// Multipart/form field carrying the banner image
pub const BANNER_IMAGE_FIELD: &str = "banner_image";

/// Error types for blog post service operations
#[derive(Debug, thiserror::Error)]
pub enum BlogPostServiceError {
    /// No active post with this ID
    #[error("Blog post not found: {0}")]
    NotFound(String),

    /// One or more fields failed validation
    #[error("Validation error: {0}")]
    ValidationError(ValidationErrors),

    /// Entity store or media store failure
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Whether an update must carry every writable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// PUT: title, category, text and website are all required
    Full,
    /// PATCH: any subset
    Partial,
}

/// One page of active posts plus the deleted count
#[derive(Debug, Clone)]
pub struct PostListing {
    pub page: PagedResult<BlogPostWithBanner>,
    /// Number of soft-deleted posts still in storage
    pub deleted_count: i64,
}

pub struct BlogPostService {
    posts: Arc<dyn BlogPostRepository>,
    images: Arc<dyn BannerImageRepository>,
    media: Arc<MediaStore>,
}

impl BlogPostService {
    pub fn new(
        posts: Arc<dyn BlogPostRepository>,
        images: Arc<dyn BannerImageRepository>,
        media: Arc<MediaStore>,
    ) -> Self {
        Self {
            posts,
            images,
            media,
        }
    }

    /// List active posts newest first
    pub async fn list(&self, params: &ListParams) -> Result<PostListing, BlogPostServiceError> {
        let total = self.posts.count(PostFilter::Active).await?;
        let deleted_count = self.posts.count(PostFilter::Deleted).await?;
        let posts = self
            .posts
            .list(PostFilter::Active, params.offset(), params.limit())
            .await?;

        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let mut images: HashMap<i64, _> = self
            .images
            .get_by_posts(&ids)
            .await?
            .into_iter()
            .map(|image| (image.blog_post_id, image))
            .collect();

        let items = posts
            .into_iter()
            .map(|post| {
                let image = images.remove(&post.id);
                BlogPostWithBanner::new(post, image)
            })
            .collect();

        tracing::debug!(
            "Listed posts page {} ({} active, {} deleted)",
            params.page,
            total,
            deleted_count
        );

        Ok(PostListing {
            page: PagedResult::new(items, total, params),
            deleted_count,
        })
    }

    /// Get an active post with its banner image
    ///
    /// # Errors
    /// - `NotFound` if the post does not exist or was soft-deleted
    pub async fn retrieve(&self, id: i64) -> Result<BlogPostWithBanner, BlogPostServiceError> {
        let post = self
            .posts
            .get_by_id(id, PostFilter::Active)
            .await?
            .ok_or_else(|| not_found(id))?;
        let image = self.images.get_by_post(id).await?;
        Ok(BlogPostWithBanner::new(post, image))
    }

    /// Create a post, storing the banner image when one is supplied
    ///
    /// # Errors
    /// - `ValidationError` if a field or the image is rejected
    pub async fn create(
        &self,
        input: CreateBlogPostInput,
        image: Option<ImageUpload>,
    ) -> Result<BlogPostWithBanner, BlogPostServiceError> {
        let mut errors = validate_create_post(&input).err().unwrap_or_default();
        self.check_image(image.as_ref(), &mut errors);
        if !errors.is_empty() {
            return Err(BlogPostServiceError::ValidationError(errors));
        }

        let reference = match &image {
            Some(upload) => Some(self.media.save(upload).await?),
            None => None,
        };

        let post = match self.posts.create(&input).await {
            Ok(post) => post,
            Err(e) => {
                self.discard(reference.as_deref()).await;
                return Err(e.into());
            }
        };

        let banner = match reference {
            Some(reference) => Some(self.attach_image(post.id, &reference).await?),
            None => None,
        };

        tracing::info!("Created blog post {} ({})", post.id, post.title);
        Ok(BlogPostWithBanner::new(post, banner))
    }

    /// Update an active post
    ///
    /// A supplied image replaces the post's banner in place, or creates one
    /// if the post had none. An update with no fields and no image returns
    /// the post unchanged.
    ///
    /// # Errors
    /// - `NotFound` if the post does not exist or was soft-deleted
    /// - `ValidationError` if a field is missing (full update) or invalid
    pub async fn update(
        &self,
        id: i64,
        input: UpdateBlogPostInput,
        image: Option<ImageUpload>,
        mode: UpdateMode,
    ) -> Result<BlogPostWithBanner, BlogPostServiceError> {
        let existing = self
            .posts
            .get_by_id(id, PostFilter::Active)
            .await?
            .ok_or_else(|| not_found(id))?;

        let mut errors = ValidationErrors::new();
        if mode == UpdateMode::Full {
            for field in input.missing_fields() {
                errors.add(field, "This field is required.");
            }
        }
        if let Err(field_errors) = validate_update_post(&input) {
            for e in field_errors.errors() {
                errors.add(e.field, e.message.clone());
            }
        }
        self.check_image(image.as_ref(), &mut errors);
        if !errors.is_empty() {
            return Err(BlogPostServiceError::ValidationError(errors));
        }

        // Store the new file before touching the row so a failed write
        // leaves the post as it was
        let previous = self.images.get_by_post(id).await?;
        let reference = match &image {
            Some(upload) => Some(self.media.save(upload).await?),
            None => None,
        };

        let post = if input.has_changes() {
            match self.posts.update(id, &input).await {
                Ok(Some(post)) => post,
                Ok(None) => {
                    self.discard(reference.as_deref()).await;
                    return Err(not_found(id));
                }
                Err(e) => {
                    self.discard(reference.as_deref()).await;
                    return Err(e.into());
                }
            }
        } else {
            existing
        };

        let banner = match reference {
            Some(reference) => {
                let banner = self.attach_image(id, &reference).await?;
                if let Some(old) = previous.as_ref().and_then(|p| p.reference()) {
                    if old != reference {
                        self.discard(Some(old)).await;
                    }
                }
                Some(banner)
            }
            None => previous,
        };

        tracing::info!("Updated blog post {}", id);
        Ok(BlogPostWithBanner::new(post, banner))
    }

    /// Flag a post as deleted; it stays in storage and counts toward
    /// `deleted_count`
    ///
    /// # Errors
    /// - `NotFound` if the post does not exist or is already deleted
    pub async fn soft_delete(&self, id: i64) -> Result<(), BlogPostServiceError> {
        if !self.posts.soft_delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!("Soft-deleted blog post {}", id);
        Ok(())
    }

    fn check_image(&self, image: Option<&ImageUpload>, errors: &mut ValidationErrors) {
        if let Some(upload) = image {
            if let Err(image_errors) = self.media.check(BANNER_IMAGE_FIELD, upload) {
                for e in image_errors.errors() {
                    errors.add(e.field, e.message.clone());
                }
            }
        }
    }

    async fn attach_image(
        &self,
        post_id: i64,
        reference: &str,
    ) -> Result<BannerImage, BlogPostServiceError> {
        match self
            .images
            .upsert(post_id, reference)
            .await
            .context("Failed to attach banner image")
        {
            Ok(banner) => Ok(banner),
            Err(e) => {
                self.discard(Some(reference)).await;
                Err(e.into())
            }
        }
    }

    /// Best-effort removal of a stored file no row points at
    async fn discard(&self, reference: Option<&str>) {
        if let Some(reference) = reference {
            if let Err(e) = self.media.remove(reference).await {
                tracing::warn!("Failed to remove unused banner image {}: {:#}", reference, e);
            }
        }
    }
}

fn not_found(id: i64) -> BlogPostServiceError {
    BlogPostServiceError::NotFound(format!("Blog post with ID {} not found", id))
}
