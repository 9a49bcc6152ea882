use super::{ApiError, ApiResult, AppState, Session};
use crate::database::models::UserRecord;
use crate::mentions::MentionSuggestion;
use crate::users::{RegisterInput, UpdateProfileInput, UserProfile, UserService};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct FollowResponse {
    changed: bool,
}

pub(crate) async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterInput>,
) -> Result<(StatusCode, Json<UserRecord>), ApiError> {
    let service = UserService::new(state.database.clone(), state.notifications.clone());
    let user = service.register(payload)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub(crate) async fn get_profile(
    State(state): State<AppState>,
    _session: Session,
    Path(username): Path<String>,
) -> ApiResult<UserProfile> {
    let service = UserService::new(state.database.clone(), state.notifications.clone());
    Ok(Json(service.get_profile(&username)?))
}

pub(crate) async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<UpdateProfileInput>,
) -> ApiResult<UserRecord> {
    let service = UserService::new(state.database.clone(), state.notifications.clone());
    Ok(Json(service.update_profile(&session.user_id, payload)?))
}

pub(crate) async fn follow(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> ApiResult<FollowResponse> {
    let service = UserService::new(state.database.clone(), state.notifications.clone());
    let changed = service.follow(&session.user_id, &username)?;
    Ok(Json(FollowResponse { changed }))
}

pub(crate) async fn unfollow(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> ApiResult<FollowResponse> {
    let service = UserService::new(state.database.clone(), state.notifications.clone());
    let changed = service.unfollow(&session.user_id, &username)?;
    Ok(Json(FollowResponse { changed }))
}

pub(crate) async fn mention_suggestions(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SuggestionParams>,
) -> ApiResult<Vec<MentionSuggestion>> {
    let service = UserService::new(state.database.clone(), state.notifications.clone());
    Ok(Json(service.mention_suggestions(&session.user_id, &params.q)?))
}
