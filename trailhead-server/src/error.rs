//! Errori degli handler e loro traduzione in risposte HTTP.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use trailhead_core::{Error as ErrorBody, FieldError, ValidationError};

pub const ROUTE_NOT_FOUND: &str = "That route does not exist!";
pub const USER_NOT_FOUND: &str = "User not found!";
pub const PARK_NOT_FOUND: &str = "NationalPark is incorrect!";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("{}", USER_NOT_FOUND)]
    UserNotFound,

    #[error("{}", PARK_NOT_FOUND)]
    ParkNotFound,

    #[error("username already exists")]
    UsernameTaken,

    #[error("{}", ROUTE_NOT_FOUND)]
    RouteNotFound,

    #[error("db error: {0}")]
    Database(sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // l'unico vincolo UNIQUE dello schema è users.username
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::UsernameTaken,
            _ => ApiError::Database(err),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::FORBIDDEN,
            ApiError::Field(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound | ApiError::ParkNotFound | ApiError::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::UsernameTaken => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::RouteNotFound => (status, ROUTE_NOT_FOUND).into_response(),
            ApiError::Database(_) | ApiError::Serialization(_) => {
                tracing::error!("{}", self);
                (status, Json(ErrorBody::new("internal server error"))).into_response()
            }
            other => (status, Json(ErrorBody::new(other.to_string()))).into_response(),
        }
    }
}
