//! Canonical entry routes: list and fetch (public), create/edit/delete (admin)

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use xicon_common::api::SuccessResponse;
use xicon_common::models::{parse_draft, GlossaryEntry};

use super::FamilyScope;
use crate::db::entries;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/{family}
pub async fn list_entries<F: FamilyScope>(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<GlossaryEntry>>> {
    Ok(Json(entries::list(&state.db, F::FAMILY).await?))
}

/// GET /api/{family}/{slug}
pub async fn get_entry<F: FamilyScope>(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<GlossaryEntry>> {
    Ok(Json(entries::get_by_slug(&state.db, F::FAMILY, &slug).await?))
}

/// POST /api/{family}/create
pub async fn create_entry<F: FamilyScope>(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GlossaryEntry>)> {
    let Json(body) = payload?;
    let (fields, _) = parse_draft(F::FAMILY, body)?;

    let entry = entries::create(&state.db, &fields).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/{family}/{slug}
pub async fn update_entry<F: FamilyScope>(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<GlossaryEntry>> {
    let Json(body) = payload?;
    let (fields, _) = parse_draft(F::FAMILY, body)?;

    Ok(Json(entries::update(&state.db, &slug, &fields).await?))
}

/// DELETE /api/{family}/{slug}
pub async fn delete_entry<F: FamilyScope>(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    entries::delete(&state.db, F::FAMILY, &slug).await?;
    Ok(Json(SuccessResponse::ok()))
}
