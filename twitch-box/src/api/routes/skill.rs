//! Voice-skill endpoint.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::post,
};

use crate::api::error::{ApiError, ApiResult};
use crate::api::server::AppState;
use crate::skill::{SkillRequest, SkillResponse};

/// Create the skill router, one path segment per skill.
pub fn router() -> Router<AppState> {
    Router::new().route("/{skill}", post(handle_skill))
}

async fn handle_skill(
    State(state): State<AppState>,
    Path(skill): Path<String>,
    payload: Result<Json<SkillRequest>, JsonRejection>,
) -> ApiResult<Json<SkillResponse>> {
    let handler = state
        .skill(&skill)
        .ok_or_else(|| ApiError::not_found(format!("Unknown skill '{skill}'")))?;

    let Json(request) = payload?;

    if let Some(expected) = state.skill_app_id.as_deref()
        && request.application_id() != Some(expected)
    {
        tracing::warn!(
            skill = %skill,
            application_id = ?request.application_id(),
            "Rejecting request for another application"
        );
        return Err(ApiError::bad_request("Application id does not match"));
    }

    Ok(Json(handler.handle(&request).await))
}
