use super::{ApiError, ApiResult, AppState, Session};
use crate::comments::{CommentNode, CommentService, ShowcaseCommentGroup};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct CommentBody {
    content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchParams {
    /// Comma-separated showcase ids, e.g. `?showcase_ids=a,b,c`.
    showcase_ids: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteCommentResponse {
    removed: usize,
}

pub(crate) async fn post_comment(
    State(state): State<AppState>,
    session: Session,
    Path(showcase_id): Path<String>,
    Json(payload): Json<CommentBody>,
) -> Result<(StatusCode, Json<CommentNode>), ApiError> {
    let service = CommentService::new(state.database.clone(), state.notifications.clone());
    let comment = service.post_comment(&showcase_id, &payload.content, &session.user_id)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub(crate) async fn post_reply(
    State(state): State<AppState>,
    session: Session,
    Path(comment_id): Path<String>,
    Json(payload): Json<CommentBody>,
) -> Result<(StatusCode, Json<CommentNode>), ApiError> {
    let service = CommentService::new(state.database.clone(), state.notifications.clone());
    let reply = service.post_reply(&comment_id, &payload.content, &session.user_id)?;
    Ok((StatusCode::CREATED, Json(reply)))
}

pub(crate) async fn update_comment(
    State(state): State<AppState>,
    session: Session,
    Path(comment_id): Path<String>,
    Json(payload): Json<CommentBody>,
) -> ApiResult<CommentNode> {
    let service = CommentService::new(state.database.clone(), state.notifications.clone());
    Ok(Json(service.update_comment(
        &comment_id,
        &payload.content,
        &session.user_id,
    )?))
}

pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    session: Session,
    Path(comment_id): Path<String>,
) -> ApiResult<DeleteCommentResponse> {
    let service = CommentService::new(state.database.clone(), state.notifications.clone());
    let removed = service.delete_comment(&comment_id, &session.user_id)?;
    Ok(Json(DeleteCommentResponse { removed }))
}

pub(crate) async fn list_for_showcase(
    State(state): State<AppState>,
    _session: Session,
    Path(showcase_id): Path<String>,
) -> ApiResult<Vec<CommentNode>> {
    let service = CommentService::new(state.database.clone(), state.notifications.clone());
    Ok(Json(service.comments_for_showcase(&showcase_id)?))
}

pub(crate) async fn list_for_showcases(
    State(state): State<AppState>,
    _session: Session,
    Query(params): Query<BatchParams>,
) -> ApiResult<Vec<ShowcaseCommentGroup>> {
    let showcase_ids: Vec<String> = params
        .showcase_ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(Into::into)
        .collect();
    let service = CommentService::new(state.database.clone(), state.notifications.clone());
    Ok(Json(service.comments_for_showcases(&showcase_ids)?))
}
