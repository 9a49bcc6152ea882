use super::{ApiResult, AppState, Session};
use crate::likes::{LikeService, LikesView};
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct LikeResponse {
    changed: bool,
}

pub(crate) async fn like_showcase(
    State(state): State<AppState>,
    session: Session,
    Path(showcase_id): Path<String>,
) -> ApiResult<LikeResponse> {
    let service = LikeService::new(state.database.clone(), state.notifications.clone());
    let changed = service.like_showcase(&showcase_id, &session.user_id)?;
    Ok(Json(LikeResponse { changed }))
}

pub(crate) async fn unlike_showcase(
    State(state): State<AppState>,
    session: Session,
    Path(showcase_id): Path<String>,
) -> ApiResult<LikeResponse> {
    let service = LikeService::new(state.database.clone(), state.notifications.clone());
    let changed = service.unlike_showcase(&showcase_id, &session.user_id)?;
    Ok(Json(LikeResponse { changed }))
}

pub(crate) async fn showcase_likes(
    State(state): State<AppState>,
    _session: Session,
    Path(showcase_id): Path<String>,
) -> ApiResult<LikesView> {
    let service = LikeService::new(state.database.clone(), state.notifications.clone());
    Ok(Json(service.showcase_likes(&showcase_id)?))
}

pub(crate) async fn like_comment(
    State(state): State<AppState>,
    session: Session,
    Path(comment_id): Path<String>,
) -> ApiResult<LikeResponse> {
    let service = LikeService::new(state.database.clone(), state.notifications.clone());
    let changed = service.like_comment(&comment_id, &session.user_id)?;
    Ok(Json(LikeResponse { changed }))
}

pub(crate) async fn unlike_comment(
    State(state): State<AppState>,
    session: Session,
    Path(comment_id): Path<String>,
) -> ApiResult<LikeResponse> {
    let service = LikeService::new(state.database.clone(), state.notifications.clone());
    let changed = service.unlike_comment(&comment_id, &session.user_id)?;
    Ok(Json(LikeResponse { changed }))
}

pub(crate) async fn comment_likes(
    State(state): State<AppState>,
    _session: Session,
    Path(comment_id): Path<String>,
) -> ApiResult<LikesView> {
    let service = LikeService::new(state.database.clone(), state.notifications.clone());
    Ok(Json(service.comment_likes(&comment_id)?))
}
