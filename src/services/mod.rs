//! Services layer - Business logic
//!
//! Services are responsible for:
//! - Validating input and enforcing the soft-delete policy
//! - Coordinating the post, banner image and media stores
//! - Shaping records into per-action responses

pub mod author;
pub mod blog_post;
pub mod media;
pub mod projection;
pub mod shapes;
pub mod validation;

pub use author::{AuthorService, AuthorServiceError, AuthorUpdateMode};
pub use blog_post::{BlogPostService, BlogPostServiceError, PostListing, UpdateMode};
pub use media::MediaStore;
pub use projection::{project, AllowList, Shape};
pub use shapes::{shape_author, shape_post, Action, PostShape};
pub use validation::{FieldError, ValidationErrors};
