use super::{ApiError, ApiResult, AppState, Session};
use crate::database::models::ShowcaseRecord;
use crate::showcases::{CreateShowcaseInput, ShowcaseService, UpdateShowcaseInput};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

pub(crate) async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateShowcaseInput>,
) -> Result<(StatusCode, Json<ShowcaseRecord>), ApiError> {
    let service = ShowcaseService::new(state.database.clone(), state.notifications.clone());
    let showcase = service.create(&session.user_id, payload)?;
    Ok((StatusCode::CREATED, Json(showcase)))
}

pub(crate) async fn get_showcase(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<ShowcaseRecord> {
    let service = ShowcaseService::new(state.database.clone(), state.notifications.clone());
    Ok(Json(service.get(&id, &session.user_id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<UpdateShowcaseInput>,
) -> ApiResult<ShowcaseRecord> {
    let service = ShowcaseService::new(state.database.clone(), state.notifications.clone());
    Ok(Json(service.update(&id, &session.user_id, payload)?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let service = ShowcaseService::new(state.database.clone(), state.notifications.clone());
    service.delete(&id, &session.user_id)?;
    Ok(StatusCode::OK)
}

pub(crate) async fn list_for_user(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> ApiResult<Vec<ShowcaseRecord>> {
    let service = ShowcaseService::new(state.database.clone(), state.notifications.clone());
    Ok(Json(service.list_for_user(&username, &session.user_id)?))
}
