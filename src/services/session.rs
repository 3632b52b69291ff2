//! Per-session state (home page visit counter) kept in Redis

use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::{
    error::{AppError, AppResult},
    models::SessionState,
};

/// Storage for [`SessionState`], keyed by session id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// State of `session_id`; a session never seen before starts empty
    async fn load(&self, session_id: &str) -> AppResult<SessionState>;

    async fn save(&self, session_id: &str, state: SessionState) -> AppResult<()>;
}

#[derive(Clone)]
pub struct RedisSessionStore {
    client: Client,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Create the store; no connection is made until first use
    pub fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Session(format!("Failed to create Redis client: {}", e)))?;
        Ok(Self { client, ttl_seconds })
    }

    /// Test connection
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Session(format!("Redis connection test failed: {}", e)))?;
        Ok(())
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Session(format!("Failed to get Redis connection: {}", e)))
    }

    fn visits_key(session_id: &str) -> String {
        format!("session:{}:num_visits", session_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: &str) -> AppResult<SessionState> {
        let mut conn = self.connection().await?;
        let num_visits: Option<i64> = conn
            .get(Self::visits_key(session_id))
            .await
            .map_err(|e| AppError::Session(format!("Failed to read session: {}", e)))?;

        Ok(SessionState {
            num_visits: num_visits.unwrap_or(0),
        })
    }

    async fn save(&self, session_id: &str, state: SessionState) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(Self::visits_key(session_id), state.num_visits, self.ttl_seconds)
            .await
            .map_err(|e| AppError::Session(format!("Failed to write session: {}", e)))?;
        Ok(())
    }
}

/// Session workflows on top of a [`SessionStore`]
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Count a home page visit; returns the number of earlier visits
    pub async fn record_visit(&self, session_id: &str) -> AppResult<i64> {
        let state = self.store.load(session_id).await?;
        let (shown, next) = state.visit();
        self.store.save(session_id, next).await?;
        Ok(shown)
    }
}
