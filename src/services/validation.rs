//! Field validation shared by the post and author services
//!
//! Validation collects every failing field instead of stopping at the first
//! one, so a client can fix a whole form in one round trip.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::models::{CreateAuthorInput, CreateBlogPostInput, UpdateAuthorInput, UpdateBlogPostInput};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_CATEGORY_LENGTH: usize = 100;
pub const MAX_WEBSITE_LENGTH: usize = 200;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)https?://[^\s/?#:]+(?::\d{1,5})?(?:[/?#]\S*)?$")
        .expect("url pattern is valid")
});

/// A single failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All failing fields of one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors for a single field
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|e| e.field)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(())` when nothing failed
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    fn check_text(&mut self, field: &'static str, value: &str, max_len: Option<usize>) {
        if value.trim().is_empty() {
            self.add(field, "This field may not be blank.");
            return;
        }
        if let Some(max) = max_len {
            if value.chars().count() > max {
                self.add(
                    field,
                    format!("Ensure this field has no more than {} characters.", max),
                );
            }
        }
    }

    fn check_email(&mut self, field: &'static str, value: &str) {
        self.check_text(field, value, Some(MAX_EMAIL_LENGTH));
        if !value.trim().is_empty() && !is_valid_email(value) {
            self.add(field, "Enter a valid email address.");
        }
    }

    fn check_url(&mut self, field: &'static str, value: &str) {
        self.check_text(field, value, Some(MAX_WEBSITE_LENGTH));
        if !value.trim().is_empty() && !is_valid_url(value) {
            self.add(field, "Enter a valid URL.");
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// Absolute `http`/`https` URL with a host
pub fn is_valid_url(value: &str) -> bool {
    URL_RE.is_match(value.trim())
}

pub fn validate_create_author(input: &CreateAuthorInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check_text("first_name", &input.first_name, Some(MAX_NAME_LENGTH));
    errors.check_text("last_name", &input.last_name, Some(MAX_NAME_LENGTH));
    errors.check_email("email", &input.email);
    errors.into_result()
}

pub fn validate_update_author(input: &UpdateAuthorInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(first_name) = &input.first_name {
        errors.check_text("first_name", first_name, Some(MAX_NAME_LENGTH));
    }
    if let Some(last_name) = &input.last_name {
        errors.check_text("last_name", last_name, Some(MAX_NAME_LENGTH));
    }
    if let Some(email) = &input.email {
        errors.check_email("email", email);
    }
    errors.into_result()
}

pub fn validate_create_post(input: &CreateBlogPostInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check_text("title", &input.title, Some(MAX_TITLE_LENGTH));
    errors.check_text("category", &input.category, Some(MAX_CATEGORY_LENGTH));
    errors.check_text("text", &input.text, None);
    errors.check_url("website", &input.website);
    errors.into_result()
}

pub fn validate_update_post(input: &UpdateBlogPostInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(title) = &input.title {
        errors.check_text("title", title, Some(MAX_TITLE_LENGTH));
    }
    if let Some(category) = &input.category {
        errors.check_text("category", category, Some(MAX_CATEGORY_LENGTH));
    }
    if let Some(text) = &input.text {
        errors.check_text("text", text, None);
    }
    if let Some(website) = &input.website {
        errors.check_url("website", website);
    }
    errors.into_result()
}
