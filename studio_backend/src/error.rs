use thiserror::Error;

/// Domain error surface. Every mutation propagates one of these to the API
/// layer as a typed rejection; there is no catch-and-retry anywhere.
#[derive(Debug, Error)]
pub enum StudioError {
    /// No session, or the session user does not own the mutated resource.
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness constraint would be violated (e.g. duplicate album name).
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type StudioResult<T> = Result<T, StudioError>;
