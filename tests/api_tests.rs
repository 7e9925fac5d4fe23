use card_registry::{AppConfig, AppState, InMemoryCardStore, create_router, models::Card};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
}

async fn spawn_app() -> TestApp {
    let state = AppState {
        store: Arc::new(InMemoryCardStore::new()),
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_card_lifecycle_over_http() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let cards_url = format!("{}/cards", app.address);

    // Create
    let response = client
        .post(&cards_url)
        .header("x-user", "tester")
        .json(&serde_json::json!({
            "name": "knight", "type": "common", "elixir": "3", "default_level": "11", "use_rate": "45%"
        }))
        .send()
        .await
        .expect("post fail");
    assert_eq!(response.status(), 201);

    // List, to learn the assigned id
    let cards: Vec<Card> = client
        .get(&cards_url)
        .header("x-user", "tester")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cards.len(), 1);
    let id = cards[0].id;

    // Read
    let card: Card = client
        .get(format!("{}/{}", cards_url, id))
        .header("x-user", "tester")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(card.name, "knight");
    assert_eq!(card.card_type, "common");
    assert_eq!(card.use_rate, "45%");

    // Update a missing card
    let resp = client
        .put(format!("{}/999", cards_url))
        .header("x-user", "tester")
        .json(&serde_json::json!({
            "name": "x", "type": "x", "elixir": "x", "default_level": "x", "use_rate": "x"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "detail": "Card with id#999 not found" }));

    // Delete
    let resp = client
        .delete(format!("{}/{}", cards_url, id))
        .header("x-user", "tester")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
}
