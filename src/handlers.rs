use crate::{
    AppState,
    auth::CurrentUser,
    error::ApiError,
    extract::{CardId, ValidCard},
    models::{Card, CardPayload, ErrorBody},
};
use axum::{Json, extract::State, http::StatusCode};

// --- Handlers ---
//
// Every handler resolves `CurrentUser` first, so a failed credential check answers 401
// before the path or body is even looked at. Only `list_cards` and `get_card` go further
// and reject an empty identity; the mutating handlers accept any identity that resolved.

/// list_cards
///
/// Returns every stored card, unordered.
#[utoipa::path(
    get,
    path = "/cards",
    tag = "cards",
    responses(
        (status = 200, description = "All cards", body = [Card]),
        (status = 401, description = "Could not validate credentials", body = ErrorBody)
    )
)]
pub async fn list_cards(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Card>>, ApiError> {
    user.require_present()?;

    let mut session = state.store.begin().await?;
    let cards = session.find_all().await?;
    Ok(Json(cards))
}

/// create_card
///
/// Persists a new card. The response has no body; the assigned id is only visible by
/// listing or re-fetching.
#[utoipa::path(
    post,
    path = "/cards",
    tag = "cards",
    request_body = CardPayload,
    responses(
        (status = 201, description = "Created"),
        (status = 401, description = "Could not validate credentials", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody)
    )
)]
pub async fn create_card(
    user: CurrentUser,
    State(state): State<AppState>,
    ValidCard(payload): ValidCard,
) -> Result<StatusCode, ApiError> {
    let mut session = state.store.begin().await?;
    let card = session.insert(payload).await?;
    session.commit().await?;

    tracing::info!(card_id = card.id, user = %user.username, "card created");
    Ok(StatusCode::CREATED)
}

/// get_card
#[utoipa::path(
    get,
    path = "/cards/{card_id}",
    tag = "cards",
    params(("card_id" = i64, Path, description = "Card ID")),
    responses(
        (status = 200, description = "Found", body = Card),
        (status = 401, description = "Could not validate credentials", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_card(
    user: CurrentUser,
    State(state): State<AppState>,
    CardId(card_id): CardId,
) -> Result<Json<Card>, ApiError> {
    user.require_present()?;

    let mut session = state.store.begin().await?;
    match session.find_by_id(card_id).await? {
        Some(card) => Ok(Json(card)),
        None => {
            tracing::debug!(card_id, "card lookup missed");
            Err(ApiError::NotFound(card_id))
        }
    }
}

/// update_card
///
/// Full overwrite: all five attributes are replaced by the payload, never merged.
/// The body is validated before the lookup, so an invalid body on a missing id is a 422.
#[utoipa::path(
    put,
    path = "/cards/{card_id}",
    tag = "cards",
    params(("card_id" = i64, Path, description = "Card ID")),
    request_body = CardPayload,
    responses(
        (status = 204, description = "Updated"),
        (status = 401, description = "Could not validate credentials", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody)
    )
)]
pub async fn update_card(
    user: CurrentUser,
    State(state): State<AppState>,
    CardId(card_id): CardId,
    ValidCard(payload): ValidCard,
) -> Result<StatusCode, ApiError> {
    let mut session = state.store.begin().await?;
    let mut card = session
        .find_by_id(card_id)
        .await?
        .ok_or(ApiError::NotFound(card_id))?;

    payload.apply_to(&mut card);
    session.update(&card).await?;
    session.commit().await?;

    tracing::info!(card_id, user = %user.username, "card updated");
    Ok(StatusCode::NO_CONTENT)
}

/// delete_card
#[utoipa::path(
    delete,
    path = "/cards/{card_id}",
    tag = "cards",
    params(("card_id" = i64, Path, description = "Card ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Could not validate credentials", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_card(
    user: CurrentUser,
    State(state): State<AppState>,
    CardId(card_id): CardId,
) -> Result<StatusCode, ApiError> {
    let mut session = state.store.begin().await?;
    if session.find_by_id(card_id).await?.is_none() {
        return Err(ApiError::NotFound(card_id));
    }

    session.delete_by_id(card_id).await?;
    session.commit().await?;

    tracing::info!(card_id, user = %user.username, "card deleted");
    Ok(StatusCode::NO_CONTENT)
}
