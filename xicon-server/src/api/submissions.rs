//! Submission routes: public intake, admin review/approve/reject

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use xicon_common::api::{SubmitResponse, SuccessResponse};
use xicon_common::models::{parse_draft, GlossaryEntry, PendingCounts, PendingSubmissions, Submission};

use super::FamilyScope;
use crate::db::submissions;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/{family}/submit
///
/// Answers 200; nothing is published until an admin approves.
pub async fn submit<F: FamilyScope>(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SubmitResponse>> {
    let Json(body) = payload?;
    let (fields, attribution) = parse_draft(F::FAMILY, body)?;

    let id = submissions::submit(&state.db, &fields, &attribution).await?;
    Ok(Json(SubmitResponse {
        message: "Submission received".to_string(),
        id,
    }))
}

/// GET /api/{family}/submissions/{id}
pub async fn get_submission<F: FamilyScope>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Submission>> {
    let Path(id) = id?;
    Ok(Json(submissions::get(&state.db, F::FAMILY, id).await?))
}

/// DELETE /api/{family}/submissions/{id}
pub async fn reject_submission<F: FamilyScope>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Path(id) = id?;
    submissions::reject(&state.db, F::FAMILY, id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/{family}/submissions/{id}/approve
///
/// An empty body approves the submission as submitted; a JSON body replaces
/// its content with the admin's edits.
pub async fn approve_submission<F: FamilyScope>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<GlossaryEntry>)> {
    let Path(id) = id?;
    let edited = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;
        Some(parse_draft(F::FAMILY, value)?.0)
    };

    let entry = submissions::approve(&state.db, F::FAMILY, id, edited).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/submissions/list
pub async fn list_submissions(State(state): State<AppState>) -> ApiResult<Json<PendingSubmissions>> {
    Ok(Json(submissions::list_pending(&state.db).await?))
}

/// GET /api/submissions/count
pub async fn count_submissions(State(state): State<AppState>) -> ApiResult<Json<PendingCounts>> {
    Ok(Json(submissions::count_pending(&state.db).await?))
}
