use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Cards Router Module
///
/// The `/cards` resource family. There is no route-level auth layer: each handler
/// resolves `CurrentUser` itself, because the handlers do not all apply the same check
/// to the resolved identity.
pub fn card_routes() -> Router<AppState> {
    Router::new()
        // GET /cards lists every card; POST /cards creates one (201, empty body).
        .route(
            "/cards",
            get(handlers::list_cards).post(handlers::create_card),
        )
        // GET / PUT / DELETE a single card by its integer id.
        .route(
            "/cards/{card_id}",
            get(handlers::get_card)
                .put(handlers::update_card)
                .delete(handlers::delete_card),
        )
}
