use super::{ApiError, ApiResult, AppState, Session};
use crate::albums::{AlbumService, AlbumView};
use crate::database::models::AlbumRecord;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumNameBody {
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddShowcaseBody {
    showcase_id: String,
}

pub(crate) async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AlbumNameBody>,
) -> Result<(StatusCode, Json<AlbumRecord>), ApiError> {
    let service = AlbumService::new(state.database.clone());
    let album = service.create(&session.user_id, &payload.name)?;
    Ok((StatusCode::CREATED, Json(album)))
}

pub(crate) async fn rename(
    State(state): State<AppState>,
    session: Session,
    Path(album_id): Path<String>,
    Json(payload): Json<AlbumNameBody>,
) -> ApiResult<AlbumRecord> {
    let service = AlbumService::new(state.database.clone());
    Ok(Json(service.rename(&album_id, &session.user_id, &payload.name)?))
}

pub(crate) async fn delete_album(
    State(state): State<AppState>,
    session: Session,
    Path(album_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let service = AlbumService::new(state.database.clone());
    service.delete(&album_id, &session.user_id)?;
    Ok(StatusCode::OK)
}

pub(crate) async fn list(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Vec<AlbumView>> {
    let service = AlbumService::new(state.database.clone());
    Ok(Json(service.list_for_owner(&session.user_id)?))
}

pub(crate) async fn add_showcase(
    State(state): State<AppState>,
    session: Session,
    Path(album_id): Path<String>,
    Json(payload): Json<AddShowcaseBody>,
) -> Result<StatusCode, ApiError> {
    let service = AlbumService::new(state.database.clone());
    service.add_showcase(&album_id, &payload.showcase_id, &session.user_id)?;
    Ok(StatusCode::OK)
}

pub(crate) async fn remove_showcase(
    State(state): State<AppState>,
    session: Session,
    Path((album_id, showcase_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let service = AlbumService::new(state.database.clone());
    service.remove_showcase(&album_id, &showcase_id, &session.user_id)?;
    Ok(StatusCode::OK)
}
