//! HTTP API handlers for xicon-server
//!
//! Exicon and Lexicon share one set of generic handlers. The family is fixed
//! per route at compile time through a [`FamilyScope`] marker, so
//! `/api/exicon/...` and `/api/lexicon/...` are plain static routes.

pub mod auth;
pub mod browse;
pub mod buildinfo;
pub mod entries;
pub mod health;
pub mod submissions;

pub use auth::{current_session, login, logout, require_admin, AdminSession};
pub use buildinfo::get_build_info;
pub use health::health_routes;

use xicon_common::models::Family;

/// Binds a handler to one glossary family
pub trait FamilyScope: Send + Sync + 'static {
    const FAMILY: Family;
}

/// `/api/exicon/...`
pub struct Exicon;

/// `/api/lexicon/...`
pub struct Lexicon;

impl FamilyScope for Exicon {
    const FAMILY: Family = Family::Exicon;
}

impl FamilyScope for Lexicon {
    const FAMILY: Family = Family::Lexicon;
}
