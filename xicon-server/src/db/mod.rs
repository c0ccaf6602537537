//! Database access layer for xicon-server
//!
//! Schema creation lives in `xicon_common::db`; this module holds the
//! queries the HTTP handlers run.

pub mod entries;
pub mod submissions;
pub mod users;

pub use xicon_common::db::{init_database, init_memory_database};

use xicon_common::models::Family;
use xicon_common::Error;

/// Turn a UNIQUE constraint failure into the family's Conflict error
///
/// The pre-insert availability check covers the common case; this catches a
/// concurrent insert that slipped in between check and write.
pub(crate) fn map_unique_violation(family: Family) -> impl Fn(sqlx::Error) -> Error {
    move |err| {
        let unique = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if unique {
            Error::Conflict(family.conflict_message())
        } else {
            Error::Database(err)
        }
    }
}
