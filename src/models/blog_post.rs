//! Blog post model
//!
//! Provides:
//! - `BlogPost` entity with its soft-delete flag
//! - `BlogPostWithBanner`, the record handed to the response shapes
//! - Input types for creating and updating posts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BannerImage;

/// Blog post entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Unique identifier
    pub id: i64,
    pub title: String,
    pub category: String,
    /// Post body
    pub text: String,
    /// Related website URL
    pub website: String,
    /// Creation timestamp, never changed after insert
    pub create_date: DateTime<Utc>,
    /// Soft-delete flag; once set the post is hidden from every default query
    #[serde(default)]
    pub deleted: bool,
}

/// A post together with its optional banner image
#[derive(Debug, Clone, PartialEq)]
pub struct BlogPostWithBanner {
    pub post: BlogPost,
    pub banner_image: Option<BannerImage>,
}

impl BlogPostWithBanner {
    pub fn new(post: BlogPost, banner_image: Option<BannerImage>) -> Self {
        Self { post, banner_image }
    }

    /// Reference of the banner image, `None` when absent or empty
    pub fn banner_reference(&self) -> Option<&str> {
        self.banner_image.as_ref().and_then(BannerImage::reference)
    }
}

/// Input for creating a blog post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBlogPostInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub website: String,
}

impl CreateBlogPostInput {
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        text: impl Into<String>,
        website: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            text: text.into(),
            website: website.into(),
        }
    }
}

/// Partial update for a blog post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBlogPostInput {
    pub title: Option<String>,
    pub category: Option<String>,
    pub text: Option<String>,
    pub website: Option<String>,
}

impl UpdateBlogPostInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.category.is_some()
            || self.text.is_some()
            || self.website.is_some()
    }

    /// Names of the fields a full (PUT) update must carry but this one lacks
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        if self.text.is_none() {
            missing.push("text");
        }
        if self.website.is_none() {
            missing.push("website");
        }
        missing
    }
}

impl From<CreateBlogPostInput> for UpdateBlogPostInput {
    fn from(input: CreateBlogPostInput) -> Self {
        Self {
            title: Some(input.title),
            category: Some(input.category),
            text: Some(input.text),
            website: Some(input.website),
        }
    }
}
