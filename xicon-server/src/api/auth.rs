//! Admin login sessions and the moderation gate
//!
//! Every mutating or review route sits behind [`require_admin`]. A request
//! without a live bearer token is answered 401 before its handler (and its
//! body) is touched, so nothing changes.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use chrono::Utc;
use tracing::{debug, info, warn};
use xicon_common::api::{LoginRequest, SessionInfo, SuccessResponse};

use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::session::{bearer_token, Session};
use crate::AppState;

/// Authenticated admin, inserted into request extensions by [`require_admin`]
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
    pub session: Session,
}

/// Reject the request unless it carries a live admin session
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);

    let Some(token) = token else {
        debug!("Rejected {} {}: no bearer token", request.method(), request.uri().path());
        return Err(ApiError::Unauthorized);
    };

    let Some(session) = state.sessions.get_session(&token).await else {
        debug!("Rejected {} {}: unknown or expired session", request.method(), request.uri().path());
        return Err(ApiError::Unauthorized);
    };

    request
        .extensions_mut()
        .insert(AdminSession { token, session });
    Ok(next.run(request).await)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<SessionInfo>> {
    let Json(credentials) = payload?;
    let username = credentials.username.trim();
    if username.is_empty() || credentials.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let Some(user) = users::authenticate(&state.db, username, &credentials.password).await? else {
        warn!("Failed login for {:?}", username);
        return Err(ApiError::Unauthorized);
    };

    let session = Session {
        user_id: user.id,
        username: user.username,
        created_at: Utc::now(),
    };
    let token = state.sessions.create_session(session.clone()).await;
    info!("Admin {:?} logged in", session.username);

    Ok(Json(session.info(&token)))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminSession>,
) -> Json<SuccessResponse> {
    state.sessions.delete_session(&admin.token).await;
    info!("Admin {:?} logged out", admin.session.username);
    Json(SuccessResponse::ok())
}

/// GET /api/auth/session
pub async fn current_session(Extension(admin): Extension<AdminSession>) -> Json<SessionInfo> {
    Json(admin.session.info(&admin.token))
}
