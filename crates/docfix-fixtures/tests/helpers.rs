//! Test helpers for docfix-fixtures integration tests.
//!
//! Provides the blog model registry, on-disk fixture directories and resolver setup.

#[path = "helpers/blog.rs"]
pub mod blog;
