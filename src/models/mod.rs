//! Data models
//!
//! Database entities (Author, BlogPost, BannerImage), the inputs used to
//! create and update them, and pagination containers.

mod author;
mod banner_image;
mod blog_post;
mod pagination;

pub use author::{Author, CreateAuthorInput, UpdateAuthorInput};
pub use banner_image::{BannerImage, ImageUpload};
pub use blog_post::{BlogPost, BlogPostWithBanner, CreateBlogPostInput, UpdateBlogPostInput};
pub use pagination::{ListParams, PagedResult};
