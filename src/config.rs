use std::env;

use crate::validation::ViolationFormat;

pub const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Holds the application's configuration. Immutable once loaded and pulled into handlers
/// and extractors via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the `x-user-id` bypass and log format.
    pub env: Env,
    // Postgres connection string. `None` selects the seeded in-memory repository (local only).
    pub db_url: Option<String>,
    // Secret used to validate incoming bearer JWTs.
    pub jwt_secret: String,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // How validation failures are rendered in 400 responses.
    pub violation_format: ViolationFormat,
}

/// Env
///
/// Local enables development conveniences (header bypass, in-memory store, pretty logs);
/// Production demands every secret explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for tests: local mode, in-memory store.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            violation_format: ViolationFormat::Detailed,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables and fails fast.
    ///
    /// # Panics
    /// Panics in production when `DATABASE_URL` or `JWT_SECRET` is missing, so the service
    /// never starts with an incomplete or insecure configuration.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let violation_format = match env::var("VIOLATION_FORMAT").as_deref() {
            Ok("brief") => ViolationFormat::Brief,
            _ => ViolationFormat::Detailed,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                db_url: env::var("DATABASE_URL").ok(),
                jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                bind_addr,
                violation_format,
            },
            Env::Production => Self {
                env: Env::Production,
                db_url: Some(
                    env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
                ),
                jwt_secret: env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production."),
                bind_addr,
                violation_format,
            },
        }
    }
}
