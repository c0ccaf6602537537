//! API module for shared HTTP API functionality
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared request/response types
//!
//! The server crate wraps these with axum handlers and middleware.

pub mod auth;
pub mod types;

pub use auth::{generate_salt, hash_password, verify_password};
pub use types::{ErrorResponse, LoginRequest, SessionInfo, SubmitResponse, SuccessResponse};
