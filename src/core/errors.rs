use spin_sdk::http::Response;
use thiserror::Error;

/// Domain error taxonomy. Every core operation returns either its value or
/// one of these kinds; the HTTP layer maps them to conventional statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Not authorized")]
    Authentication,
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    SelfReference(String),
    #[error("Server Error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) | ApiError::SelfReference(_) => 400,
            ApiError::Authentication => 401,
            ApiError::Authorization(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
        }
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        if let ApiError::Internal(cause) = &err {
            // Unclassified failures surface without internal detail.
            tracing::error!(%cause, "unhandled store failure");
        }
        Response::builder()
            .status(err.status())
            .header("Content-Type", "application/json")
            .body(
                serde_json::to_vec(&serde_json::json!({ "message": err.to_string() }))
                    .unwrap_or_default(),
            )
            .build()
    }
}
