mod albums;
mod comments;
mod likes;
mod notifications;
mod showcases;
mod users;

use crate::config::StudioConfig;
use crate::database::Database;
use crate::error::StudioError;
use crate::notifications::NotificationService;
use crate::realtime::RealtimeBridge;
use anyhow::Result;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Header installed by the fronting identity provider; carries the
/// authenticated caller's opaque user id.
pub const SESSION_HEADER: &str = "x-studio-user";

#[derive(Clone)]
pub struct AppState {
    pub config: StudioConfig,
    pub database: Database,
    pub realtime: RealtimeBridge,
    pub notifications: NotificationService,
}

pub(crate) type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn into_response_parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse { message: msg }),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    message: "unauthorized".into(),
                },
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse { message: msg }),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse { message: msg }),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        message: "internal server error".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_response_parts();
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<StudioError> for ApiError {
    fn from(err: StudioError) -> Self {
        match err {
            StudioError::Unauthorized => ApiError::Unauthorized,
            StudioError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            StudioError::Conflict(msg) => ApiError::Conflict(msg),
            StudioError::BadRequest(msg) => ApiError::BadRequest(msg),
            StudioError::Internal(err) => ApiError::Internal(err),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

/// The authenticated caller. Extraction fails with 401 when the identity
/// provider's header is absent; everything beyond that (who the id belongs
/// to) is the services' concern.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());
        match user_id {
            Some(user_id) => Ok(Session {
                user_id: user_id.to_string(),
            }),
            None => Err(ApiError::Unauthorized),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    version: &'static str,
    api_port: u16,
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        api_port: state.config.api_port,
    })
}

/// Tries to bind to the given port, or finds the next available port
async fn find_available_port(start_port: u16) -> Result<(TcpListener, u16)> {
    const MAX_PORT_ATTEMPTS: u16 = 100;

    for offset in 0..MAX_PORT_ATTEMPTS {
        let port = start_port + offset;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok((listener, port)),
            Err(e) => {
                if offset == 0 {
                    tracing::debug!(port, error = %e, "Port in use, trying next port");
                }
                continue;
            }
        }
    }

    anyhow::bail!(
        "Could not find available port in range {}-{}",
        start_port,
        start_port + MAX_PORT_ATTEMPTS - 1
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/users", post(users::register))
        .route("/users/me", put(users::update_profile))
        .route("/users/:username", get(users::get_profile))
        .route("/users/:username/follow", post(users::follow))
        .route("/users/:username/unfollow", post(users::unfollow))
        .route("/users/:username/showcases", get(showcases::list_for_user))
        .route("/mentions/suggestions", get(users::mention_suggestions))
        .route("/showcases", post(showcases::create))
        .route(
            "/showcases/:id",
            get(showcases::get_showcase)
                .put(showcases::update)
                .delete(showcases::delete),
        )
        .route(
            "/showcases/:id/comments",
            get(comments::list_for_showcase).post(comments::post_comment),
        )
        .route("/comments", get(comments::list_for_showcases))
        .route("/comments/:id/replies", post(comments::post_reply))
        .route(
            "/comments/:id",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/showcases/:id/like", post(likes::like_showcase))
        .route("/showcases/:id/unlike", post(likes::unlike_showcase))
        .route("/showcases/:id/likes", get(likes::showcase_likes))
        .route("/comments/:id/like", post(likes::like_comment))
        .route("/comments/:id/unlike", post(likes::unlike_comment))
        .route("/comments/:id/likes", get(likes::comment_likes))
        .route("/albums", get(albums::list).post(albums::create))
        .route(
            "/albums/:id",
            put(albums::rename).delete(albums::delete_album),
        )
        .route("/albums/:id/showcases", post(albums::add_showcase))
        .route(
            "/albums/:id/showcases/:showcase_id",
            delete(albums::remove_showcase),
        )
        .route("/notifications", get(notifications::list))
        .route("/notifications/unread/count", get(notifications::unread_count))
        .route("/notifications/:id/read", post(notifications::set_read))
        .route("/notifications/stream", get(notifications::stream))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve_http(
    config: StudioConfig,
    database: Database,
    realtime: RealtimeBridge,
) -> Result<()> {
    let notifications = NotificationService::new(database.clone(), realtime.clone());
    let state = AppState {
        config: config.clone(),
        database,
        realtime,
        notifications,
    };

    let app = router(state);

    // Try to bind to the configured port, or find the next available port
    let (listener, actual_port) = find_available_port(config.api_port).await?;
    let addr = SocketAddr::from(([0, 0, 0, 0], actual_port));

    if actual_port != config.api_port {
        tracing::warn!(
            requested_port = config.api_port,
            actual_port = actual_port,
            "Configured port was in use, bound to next available port"
        );
    }

    tracing::info!(?addr, "HTTP server listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
