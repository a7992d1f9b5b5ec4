//! Blog post API - a content service for blog posts and authors
//!
//! Posts are soft-deleted, responses are shaped per action and can be
//! narrowed with a caller-supplied field list.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
