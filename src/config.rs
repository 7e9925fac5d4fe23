use std::env;

/// AppConfig
///
/// Holds the service configuration. Loaded once at startup and cloned into handlers
/// through `FromRef`, so every request sees the same immutable values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` selects the in-memory card store (local only).
    pub database_url: Option<String>,
    // Upper bound for the Postgres connection pool.
    pub max_connections: u32,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // Runtime environment marker. Controls the `x-user` development bypass.
    pub env: Env,
    // HS256 secret used to validate incoming bearer tokens.
    pub jwt_secret: String,
}

/// Env
///
/// Runtime context: local development (bypass header, in-memory store allowed)
/// versus production (every secret mandatory).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_JWT_SECRET: &str = "card-registry-local-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

impl Default for AppConfig {
    /// Non-panicking configuration for test state scaffolding.
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_addr: "127.0.0.1:0".to_string(),
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `JWT_SECRET` or `DATABASE_URL` is missing, and in any
    /// environment when `DB_MAX_CONNECTIONS` is set but not a number. The service
    /// refuses to start half-configured.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .expect("FATAL: DB_MAX_CONNECTIONS must be a positive integer."),
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                // Without a database the service falls back to the in-memory store.
                database_url: env::var("DATABASE_URL").ok(),
                max_connections,
                bind_addr,
                jwt_secret: env::var("JWT_SECRET")
                    .unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
            },
            Env::Production => Self {
                env: Env::Production,
                database_url: Some(
                    env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
                ),
                max_connections,
                bind_addr,
                jwt_secret: env::var("JWT_SECRET")
                    .expect("FATAL: JWT_SECRET must be set in production."),
            },
        }
    }
}
