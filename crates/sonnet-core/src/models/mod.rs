//! Data models for sonnet-core

mod blog;

pub use blog::{Blog, BlogId, BlogPatch, DEFAULT_TITLE};
