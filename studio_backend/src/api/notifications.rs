use super::{ApiError, ApiResult, AppState, Session};
use crate::notifications::NotificationView;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

#[derive(Debug, Deserialize)]
pub(crate) struct SetReadBody {
    #[serde(default = "default_is_read")]
    is_read: bool,
}

fn default_is_read() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub(crate) struct UnreadCountResponse {
    count: usize,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Vec<NotificationView>> {
    Ok(Json(state.notifications.list(&session.user_id)?))
}

pub(crate) async fn unread_count(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<UnreadCountResponse> {
    let count = state.notifications.unread_count(&session.user_id)?;
    Ok(Json(UnreadCountResponse { count }))
}

pub(crate) async fn set_read(
    State(state): State<AppState>,
    session: Session,
    Path(notification_id): Path<String>,
    Json(payload): Json<SetReadBody>,
) -> Result<StatusCode, ApiError> {
    state
        .notifications
        .set_read(&notification_id, &session.user_id, payload.is_read)?;
    Ok(StatusCode::OK)
}

/// Live pushes for the session user's own channel. The stream is a
/// cache-invalidation hint; clients reconcile by re-querying the list.
pub(crate) async fn stream(
    State(state): State<AppState>,
    session: Session,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let receiver = state.realtime.subscribe(&session.user_id)?;
    let stream = futures_util::stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(push) => match Event::default().event("notification").json_data(&push) {
                    Ok(event) => return Some((Ok(event), receiver)),
                    Err(err) => {
                        tracing::warn!(error = ?err, "failed to encode notification push");
                        continue;
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "notification subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
