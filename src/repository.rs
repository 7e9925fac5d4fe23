use crate::models::{Card, CardPayload};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// StoreError
///
/// Failure raised by a record store. Handlers never inspect it; it becomes a 500.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// CardStore Trait
///
/// Entry point to the persistence layer. Each request opens its own session with `begin`
/// and either commits it or drops it; no session outlives the request that opened it.
///
/// **Send + Sync + async_trait** make `Arc<dyn CardStore>` shareable across Axum's tasks.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn CardSession>, StoreError>;
}

/// CardSession Trait
///
/// A request-scoped unit of work over the `cards` table. Writes become durable only on
/// `commit`; dropping the session discards them.
#[async_trait]
pub trait CardSession: Send {
    // Every stored card, in no particular order.
    async fn find_all(&mut self) -> Result<Vec<Card>, StoreError>;
    // At most one card; the first match if the table somehow holds duplicates.
    async fn find_by_id(&mut self, id: i64) -> Result<Option<Card>, StoreError>;
    // Persists a new card and returns it with its store-assigned id.
    async fn insert(&mut self, payload: CardPayload) -> Result<Card, StoreError>;
    // Overwrites all mutable attributes of the row with `card.id`.
    async fn update(&mut self, card: &Card) -> Result<(), StoreError>;
    async fn delete_by_id(&mut self, id: i64) -> Result<(), StoreError>;
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// StoreState
///
/// The concrete type used to share the record store across the application state.
pub type StoreState = Arc<dyn CardStore>;

// --- Postgres ---

const CARD_COLUMNS: &str = r#"id, name, "type", elixir, default_level, use_rate"#;

/// PostgresCardStore
///
/// `CardStore` backed by PostgreSQL. Every session is a database transaction.
pub struct PostgresCardStore {
    pool: PgPool,
}

impl PostgresCardStore {
    /// Creates a new store using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations (creates the `cards` table on first start).
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

struct PostgresSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CardStore for PostgresCardStore {
    async fn begin(&self) -> Result<Box<dyn CardSession>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresSession { tx }))
    }
}

#[async_trait]
impl CardSession for PostgresSession {
    async fn find_all(&mut self) -> Result<Vec<Card>, StoreError> {
        let query = format!("SELECT {CARD_COLUMNS} FROM cards");
        let cards = sqlx::query_as::<_, Card>(&query)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(cards)
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Card>, StoreError> {
        let query = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1 LIMIT 1");
        let card = sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(card)
    }

    /// insert
    ///
    /// The id comes from the `BIGSERIAL` sequence; whatever id the payload carried is ignored.
    async fn insert(&mut self, payload: CardPayload) -> Result<Card, StoreError> {
        let query = format!(
            r#"INSERT INTO cards (name, "type", elixir, default_level, use_rate)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {CARD_COLUMNS}"#
        );
        let card = sqlx::query_as::<_, Card>(&query)
            .bind(payload.name)
            .bind(payload.card_type)
            .bind(payload.elixir)
            .bind(payload.default_level)
            .bind(payload.use_rate)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(card)
    }

    async fn update(&mut self, card: &Card) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE cards
               SET name = $2, "type" = $3, elixir = $4, default_level = $5, use_rate = $6
               WHERE id = $1"#,
        )
        .bind(card.id)
        .bind(&card.name)
        .bind(&card.card_type)
        .bind(&card.elixir)
        .bind(&card.default_level)
        .bind(&card.use_rate)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

// --- In-Memory ---

#[derive(Default)]
struct MemoryTable {
    rows: BTreeMap<i64, Card>,
    // Last id handed out. Ids are never reused, even if the inserting session is dropped.
    last_id: i64,
}

enum PendingWrite {
    Insert(Card),
    Update(Card),
    Delete(i64),
}

impl PendingWrite {
    fn apply(&self, rows: &mut BTreeMap<i64, Card>) {
        match self {
            PendingWrite::Insert(card) => {
                rows.insert(card.id, card.clone());
            }
            PendingWrite::Update(card) => {
                // An update never resurrects a row that was deleted in the meantime.
                if let Some(row) = rows.get_mut(&card.id) {
                    *row = card.clone();
                }
            }
            PendingWrite::Delete(id) => {
                rows.remove(id);
            }
        }
    }
}

/// InMemoryCardStore
///
/// A process-local `CardStore` for tests and for local runs without `DATABASE_URL`.
/// Sessions buffer their writes and publish them atomically on `commit`.
#[derive(Clone, Default)]
pub struct InMemoryCardStore {
    table: Arc<Mutex<MemoryTable>>,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed cards.
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

struct InMemorySession {
    table: Arc<Mutex<MemoryTable>>,
    pending: Vec<PendingWrite>,
}

impl InMemorySession {
    /// Committed rows with this session's own pending writes laid over them.
    async fn view(&self) -> BTreeMap<i64, Card> {
        let mut rows = self.table.lock().await.rows.clone();
        for write in &self.pending {
            write.apply(&mut rows);
        }
        rows
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn begin(&self) -> Result<Box<dyn CardSession>, StoreError> {
        Ok(Box::new(InMemorySession {
            table: Arc::clone(&self.table),
            pending: Vec::new(),
        }))
    }
}

#[async_trait]
impl CardSession for InMemorySession {
    async fn find_all(&mut self) -> Result<Vec<Card>, StoreError> {
        Ok(self.view().await.into_values().collect())
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Card>, StoreError> {
        Ok(self.view().await.remove(&id))
    }

    async fn insert(&mut self, payload: CardPayload) -> Result<Card, StoreError> {
        let id = {
            let mut table = self.table.lock().await;
            table.last_id += 1;
            table.last_id
        };
        let card = payload.into_card(id);
        self.pending.push(PendingWrite::Insert(card.clone()));
        Ok(card)
    }

    async fn update(&mut self, card: &Card) -> Result<(), StoreError> {
        self.pending.push(PendingWrite::Update(card.clone()));
        Ok(())
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<(), StoreError> {
        self.pending.push(PendingWrite::Delete(id));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut table = self.table.lock().await;
        for write in &self.pending {
            write.apply(&mut table.rows);
        }
        Ok(())
    }
}
