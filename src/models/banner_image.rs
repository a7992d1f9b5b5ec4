//! Banner image model
//!
//! A post owns at most one banner image. The `image` column holds the public
//! reference returned by the media store (e.g. `/uploads/<uuid>.png`).

use serde::{Deserialize, Serialize};

/// Banner image entity, bound 1:1 to a blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerImage {
    pub id: i64,
    pub blog_post_id: i64,
    pub image: String,
}

impl BannerImage {
    /// Public reference of the stored image, `None` when nothing is stored
    pub fn reference(&self) -> Option<&str> {
        let image = self.image.trim();
        if image.is_empty() {
            None
        } else {
            Some(image)
        }
    }
}

/// An uploaded image file that has not been stored yet
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-supplied file name
    pub filename: String,
    /// Declared MIME type
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
