use axum::{
    Json,
    extract::{
        path::ErrorKind,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{models::FieldError, repository::StoreError};

/// ApiError
///
/// Every way a card request can fail. Handlers and extractors reject with this type, and
/// its `IntoResponse` impl is the only place that decides status codes and error bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The current user could not be resolved, or resolved to an empty identity.
    #[error("Could not validate credentials")]
    Unauthorized,
    /// No card has the requested id.
    #[error("Card with id#{0} not found")]
    NotFound(i64),
    /// Path or body failed validation. Raised before any store interaction.
    #[error("request validation failed")]
    Validation(Vec<FieldError>),
    /// The record store failed. Details go to the log, never to the client.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(json!({ "detail": self.to_string() })),
            )
                .into_response(),
            ApiError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": self.to_string() })),
            )
                .into_response(),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": errors })),
            )
                .into_response(),
            ApiError::Store(e) => {
                tracing::error!("card store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![FieldError::invalid_body(rejection.body_text())])
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        let field_error = match &rejection {
            PathRejection::FailedToDeserializePathParams(err) => match err.kind() {
                ErrorKind::ParseErrorAtKey { key, value, .. } => {
                    FieldError::int_parsing(key, value)
                }
                ErrorKind::ParseError { value, .. } => FieldError::int_parsing("card_id", value),
                _ => FieldError::int_parsing("card_id", ""),
            },
            _ => FieldError::int_parsing("card_id", ""),
        };
        ApiError::Validation(vec![field_error])
    }
}
