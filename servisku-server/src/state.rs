//! Application state shared across handlers

use std::sync::Arc;
use std::time::{Duration, Instant};

use servisku_core::AuthKeys;
use sqlx::SqlitePool;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: SqlitePool,
    auth: AuthKeys,
    started_at: Instant,
}

impl AppState {
    pub fn new(pool: SqlitePool, auth: AuthKeys) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                auth,
                started_at: Instant::now(),
            }),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    pub fn auth(&self) -> &AuthKeys {
        &self.inner.auth
    }

    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }
}
