//! Response shapes and the per-action shaping table
//!
//! Blog posts render through one of two shapes (list or detail). Authors
//! always render through the same shape, narrowed by an allow-list that
//! depends on the action being served.

use chrono::SecondsFormat;
use serde_json::{json, Map, Value};

use super::projection::{project, AllowList, Shape};
use crate::models::{Author, BlogPostWithBanner};

/// Operation being served, resolved by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

/// Named output shapes for blog posts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostShape {
    List,
    Detail,
}

impl Action {
    /// Shape a blog post response takes for this action; `None` when the
    /// response has no body
    pub fn post_shape(&self) -> Option<PostShape> {
        match self {
            Action::List => Some(PostShape::List),
            Action::Retrieve | Action::Create | Action::Update | Action::PartialUpdate => {
                Some(PostShape::Detail)
            }
            Action::Destroy => None,
        }
    }

    /// Fields an author response may carry for this action
    pub fn author_fields(&self) -> AllowList {
        match self {
            Action::List => AllowList::only(["first_name", "last_name"]),
            Action::Update => AllowList::only(["first_name", "last_name", "email"]),
            Action::Retrieve | Action::Create | Action::PartialUpdate | Action::Destroy => {
                AllowList::all()
            }
        }
    }
}

impl PostShape {
    /// Render a post, additionally narrowed by a caller allow-list
    pub fn render(&self, record: &BlogPostWithBanner, requested: &AllowList) -> Map<String, Value> {
        match self {
            PostShape::List => project(&PostListView(record), requested),
            PostShape::Detail => project(&PostDetailView(record), requested),
        }
    }
}

/// Render a blog post for `action`; `None` when the action has no body
pub fn shape_post(
    action: Action,
    record: &BlogPostWithBanner,
    requested: &AllowList,
) -> Option<Map<String, Value>> {
    action.post_shape().map(|shape| shape.render(record, requested))
}

/// Render an author for `action`, intersecting the action's allow-list with
/// the caller's
pub fn shape_author(action: Action, author: &Author, requested: &AllowList) -> Map<String, Value> {
    let allowed = action.author_fields().intersect(requested);
    project(&AuthorView(author), &allowed)
}

fn post_value(record: &BlogPostWithBanner, field: &str) -> Value {
    let post = &record.post;
    match field {
        "id" => json!(post.id),
        "title" => json!(post.title),
        "category" => json!(post.category),
        "banner_image" => record
            .banner_reference()
            .map(|reference| json!(reference))
            .unwrap_or(Value::Null),
        "text" => json!(post.text),
        "website" => json!(post.website),
        "create_date" => json!(post.create_date.to_rfc3339_opts(SecondsFormat::Micros, true)),
        _ => Value::Null,
    }
}

struct PostListView<'a>(&'a BlogPostWithBanner);

impl Shape for PostListView<'_> {
    const FIELDS: &'static [&'static str] = &["id", "title", "category", "banner_image"];

    fn value(&self, field: &str) -> Value {
        post_value(self.0, field)
    }
}

struct PostDetailView<'a>(&'a BlogPostWithBanner);

impl Shape for PostDetailView<'_> {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "category",
        "banner_image",
        "text",
        "website",
        "create_date",
    ];

    fn value(&self, field: &str) -> Value {
        post_value(self.0, field)
    }
}

struct AuthorView<'a>(&'a Author);

impl Shape for AuthorView<'_> {
    const FIELDS: &'static [&'static str] = &["id", "first_name", "last_name", "email"];

    fn value(&self, field: &str) -> Value {
        let author = self.0;
        match field {
            "id" => json!(author.id),
            "first_name" => json!(author.first_name),
            "last_name" => json!(author.last_name),
            "email" => json!(author.email),
            _ => Value::Null,
        }
    }
}
