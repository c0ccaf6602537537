//! # Xicon Common Library
//!
//! Shared code for the Xicon glossary service:
//! - Data model and per-family payload validation
//! - Slug and pipe-list rules
//! - Database schema and initialization
//! - Configuration loading
//! - Reader-side browsing (search, tags, pagination, references, stars)
//! - API request/response types and password hashing

pub mod api;
pub mod browse;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod pipe_list;
pub mod slug;

pub use error::{Error, Result};
pub use models::{Family, GlossaryEntry, Submission};
