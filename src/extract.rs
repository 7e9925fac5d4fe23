use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};

use crate::{error::ApiError, models::CardPayload};

/// CardId
///
/// The `{card_id}` path segment. A non-integer segment is a 422 with a structured detail
/// instead of axum's plain-text 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardId(pub i64);

impl<S> FromRequestParts<S> for CardId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        Ok(CardId(id))
    }
}

/// ValidCard
///
/// A JSON `CardPayload` that already passed `CardPayload::validate`. Handlers taking it
/// never run for a malformed or incomplete body, so nothing reaches the store.
#[derive(Debug, Clone)]
pub struct ValidCard(pub CardPayload);

impl<S> FromRequest<S> for ValidCard
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<CardPayload>::from_request(req, state).await?;
        payload.validate().map_err(ApiError::Validation)?;
        Ok(ValidCard(payload))
    }
}
