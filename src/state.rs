use sqlx::PgPool;

use crate::auth::JwtKeys;
use crate::config::Config;

/// Shared application state handed to every handler.
///
/// The pool is the only process-wide mutable resource; everything else is
/// immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            jwt: JwtKeys::new(&config.jwt_secret),
        }
    }
}
