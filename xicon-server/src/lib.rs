//! xicon-server library - glossary REST service
//!
//! Public routes serve browsing and anonymous submission. Everything that
//! changes published content or reviews the queue requires an admin session.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod session;

use api::FamilyScope;
use session::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Live admin sessions
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            sessions: SessionStore::new(),
        }
    }
}

/// Routes for one family, public and admin-gated
fn family_routes<F: FamilyScope>(state: &AppState) -> Router<AppState> {
    use api::{browse, entries, submissions};
    use axum::middleware;
    use axum::routing::{get, post, put};

    let base = format!("/api/{}", F::FAMILY);

    let public = Router::new()
        .route(&base, get(entries::list_entries::<F>))
        .route(&format!("{}/browse", base), get(browse::browse_entries::<F>))
        .route(&format!("{}/submit", base), post(submissions::submit::<F>))
        .route(&format!("{}/:slug", base), get(entries::get_entry::<F>))
        .route(
            &format!("{}/:slug/references", base),
            get(browse::references::<F>),
        );

    let admin = Router::new()
        .route(&format!("{}/create", base), post(entries::create_entry::<F>))
        .route(
            &format!("{}/:slug", base),
            put(entries::update_entry::<F>).delete(entries::delete_entry::<F>),
        )
        .route(
            &format!("{}/submissions/:id", base),
            get(submissions::get_submission::<F>).delete(submissions::reject_submission::<F>),
        )
        .route(
            &format!("{}/submissions/:id/approve", base),
            post(submissions::approve_submission::<F>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_admin,
        ));

    public.merge(admin)
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Admin-only routes not tied to one family
    let admin = Router::new()
        .route("/api/auth/logout", post(api::logout))
        .route("/api/auth/session", get(api::current_session))
        .route("/api/submissions/list", get(api::submissions::list_submissions))
        .route("/api/submissions/count", get(api::submissions::count_submissions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_admin,
        ));

    let public = Router::new()
        .route("/api/auth/login", post(api::login))
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/exicon/tags", get(api::browse::tag_catalog))
        .route("/api/exicon/export", get(api::browse::export_entries))
        .merge(api::health_routes());

    Router::new()
        .merge(public)
        .merge(admin)
        .merge(family_routes::<api::Exicon>(&state))
        .merge(family_routes::<api::Lexicon>(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
