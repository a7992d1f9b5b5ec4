//! Database repositories
//!
//! One repository per table. Each exposes an async trait and an sqlx
//! implementation covering SQLite and MySQL.

pub mod author;
pub mod banner_image;
pub mod blog_post;

pub use author::{AuthorRepository, SqlxAuthorRepository};
pub use banner_image::{BannerImageRepository, SqlxBannerImageRepository};
pub use blog_post::{BlogPostRepository, PostFilter, SqlxBlogPostRepository};
