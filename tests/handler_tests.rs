use async_trait::async_trait;
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
};
use card_registry::{
    AppConfig, AppState, ApiError, InMemoryCardStore,
    auth::CurrentUser,
    create_router, handlers,
    extract::{CardId, ValidCard},
    models::CardPayload,
    repository::{CardSession, CardStore, StoreError},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tower::ServiceExt;

// --- Mock Stores ---

// Counts session acquisitions and refuses to hand any out. Used to prove that a handler
// rejected the request before touching the store.
#[derive(Default)]
struct UntouchableStore {
    begins: AtomicUsize,
}

#[async_trait]
impl CardStore for UntouchableStore {
    async fn begin(&self) -> Result<Box<dyn CardSession>, StoreError> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }
}

// --- Test Utilities ---

fn state_with(store: Arc<dyn CardStore>) -> AppState {
    AppState {
        store,
        config: AppConfig::default(),
    }
}

fn user(name: &str) -> CurrentUser {
    CurrentUser {
        username: name.to_string(),
        id: None,
    }
}

fn payload(name: &str) -> CardPayload {
    CardPayload {
        id: None,
        name: name.to_string(),
        card_type: "rare".to_string(),
        elixir: "4".to_string(),
        default_level: "9".to_string(),
        use_rate: "12%".to_string(),
    }
}

// --- Handler Tests ---

#[tokio::test]
async fn test_list_with_empty_user_never_queries_store() {
    let store = Arc::new(UntouchableStore::default());
    let state = state_with(store.clone());

    let result = handlers::list_cards(user(""), State(state)).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(store.begins.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_get_with_empty_user_never_queries_store() {
    let store = Arc::new(UntouchableStore::default());
    let state = state_with(store.clone());

    let result = handlers::get_card(user(""), State(state), CardId(1)).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(store.begins.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mutations_do_not_recheck_identity() {
    let store = InMemoryCardStore::new();
    let state = state_with(Arc::new(store.clone()));

    let status = handlers::create_card(user(""), State(state.clone()), ValidCard(payload("golem")))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let Json(cards) = handlers::list_cards(user("someone"), State(state.clone()))
        .await
        .unwrap();
    let id = cards[0].id;

    let status = handlers::update_card(
        user(""),
        State(state.clone()),
        CardId(id),
        ValidCard(payload("elixir golem")),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let Json(card) = handlers::get_card(user("someone"), State(state.clone()), CardId(id))
        .await
        .unwrap();
    assert_eq!(card.name, "elixir golem");

    let status = handlers::delete_card(user(""), State(state), CardId(id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_not_found_carries_requested_id() {
    let state = state_with(Arc::new(InMemoryCardStore::new()));

    let result = handlers::delete_card(user("someone"), State(state), CardId(31)).await;

    match result {
        Err(err @ ApiError::NotFound(31)) => {
            assert_eq!(err.to_string(), "Card with id#31 not found");
        }
        other => panic!("expected NotFound(31), got {:?}", other),
    }
}

#[tokio::test]
async fn test_store_failure_is_internal_server_error() {
    let state = state_with(Arc::new(UntouchableStore::default()));
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::get("/cards")
                .header("x-user", "someone")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    // Store details stay in the log.
    assert_eq!(body["detail"], "Internal Server Error");
}
