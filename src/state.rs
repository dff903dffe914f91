use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::TokenKeys;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub keys: TokenKeys,
}

impl AppState {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            keys: TokenKeys::new(&config.token_secret, config.token_ttl_minutes),
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> PgPool {
        state.db.clone()
    }
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> TokenKeys {
        state.keys.clone()
    }
}
