//! Blog post request bodies
//!
//! Create and update accept either `multipart/form-data` (the only way to
//! send a banner image) or a JSON object with the text fields.

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header,
    Json,
};

use crate::api::middleware::ApiError;
use crate::models::{CreateBlogPostInput, ImageUpload, UpdateBlogPostInput};
use crate::services::blog_post::BANNER_IMAGE_FIELD;

/// Text fields and optional banner image of a post request
#[derive(Debug, Default)]
pub struct PostPayload {
    pub fields: UpdateBlogPostInput,
    pub image: Option<ImageUpload>,
}

impl PostPayload {
    /// Fields for a create; absent fields become blank and fail validation
    pub fn into_create(self) -> (CreateBlogPostInput, Option<ImageUpload>) {
        let fields = self.fields;
        let input = CreateBlogPostInput {
            title: fields.title.unwrap_or_default(),
            category: fields.category.unwrap_or_default(),
            text: fields.text.unwrap_or_default(),
            website: fields.website.unwrap_or_default(),
        };
        (input, self.image)
    }
}

impl<S> FromRequest<S> for PostPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation_error(e.body_text()))?;
            read_multipart(multipart).await
        } else {
            let Json(fields) = Json::<UpdateBlogPostInput>::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation_error(e.body_text()))?;
            Ok(PostPayload {
                fields,
                image: None,
            })
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<PostPayload, ApiError> {
    let mut payload = PostPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == BANNER_IMAGE_FIELD {
            let filename = field.file_name().unwrap_or("").to_string();
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation_error(format!("Failed to read file: {}", e)))?;

            // Browsers send an empty part when no file was chosen
            if data.is_empty() && filename.is_empty() {
                continue;
            }
            payload.image = Some(ImageUpload::new(filename, content_type, data.to_vec()));
            continue;
        }

        let slot = match name.as_str() {
            "title" => &mut payload.fields.title,
            "category" => &mut payload.fields.category,
            "text" => &mut payload.fields.text,
            "website" => &mut payload.fields.website,
            _ => continue,
        };
        let value = field
            .text()
            .await
            .map_err(|e| {
                ApiError::validation_error(format!("Failed to read field {}: {}", name, e))
            })?;
        *slot = Some(value);
    }

    Ok(payload)
}
