use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    /// Malformed or out-of-range input, detected before the store is touched.
    #[error("{0}")]
    Validation(String),

    #[error("{field} '{value}' is already taken")]
    Conflict { field: &'static str, value: String },

    #[error("user {0} not found")]
    NotFound(Uuid),

    /// Any other store failure, including identifiers the store cannot parse.
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn status(&self) -> StatusCode {
        match self {
            UserError::Validation(_) => StatusCode::BAD_REQUEST,
            UserError::Conflict { .. } => StatusCode::CONFLICT,
            UserError::NotFound(_) => StatusCode::NOT_FOUND,
            UserError::Persistence(_) | UserError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            UserError::Validation(_) => "validation_error",
            UserError::Conflict { .. } => "conflict",
            UserError::NotFound(_) => "not_found",
            UserError::Persistence(_) => "persistence_error",
            UserError::PasswordHash(_) => "internal_error",
        }
    }
}

impl From<sqlx::Error> for UserError {
    fn from(e: sqlx::Error) -> Self {
        UserError::Persistence(e.to_string())
    }
}

impl From<JsonRejection> for UserError {
    fn from(rejection: JsonRejection) -> Self {
        UserError::Validation(rejection.body_text())
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({
                "error": {
                    "type": self.kind(),
                    "message": message
                }
            })),
        )
            .into_response()
    }
}
