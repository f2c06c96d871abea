//! SQLite-backed conversation store using sqlx.

use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    sqlx::{SqlitePool, sqlite::SqlitePoolOptions},
    tracing::debug,
};

use crate::{
    Result,
    clock::{Clock, SystemClock, duration_ms},
    error::Context,
    key::ConversationKey,
    store::{ConversationRecord, ConversationState, ConversationStore},
};

#[derive(sqlx::FromRow)]
struct ConversationRow {
    route: String,
    state: String,
    expires_at: i64,
}

/// Conversation store persisted in a `conversations` table.
///
/// Records survive restarts; expiry is enforced in every query and
/// physically reclaimed by [`ConversationStore::sweep_expired`].
pub struct SqliteConversationStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteConversationStore {
    /// Connect to `database_url` with a dedicated pool and run migrations.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .with_context(|| format!("failed to connect to SQLite at {database_url}"))?;

        crate::run_migrations(&pool).await?;
        debug!(database_url, "conversation store ready");

        Ok(Self::with_pool(pool))
    }

    /// Use an existing pool. [`crate::run_migrations`] must already have run.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn get(&self, key: &ConversationKey) -> Result<Option<ConversationRecord>> {
        let row = sqlx::query_as::<_, ConversationRow>(
            "SELECT route, state, expires_at FROM conversations \
             WHERE conversation_key = ? AND expires_at > ?",
        )
        .bind(key.to_string())
        .bind(self.clock.now_ms())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let state: ConversationState = serde_json::from_str(&row.state)
            .with_context(|| format!("corrupt state for conversation {key}"))?;
        Ok(Some(ConversationRecord {
            key: key.clone(),
            route: row.route,
            state,
            expires_at: row.expires_at,
        }))
    }

    async fn put(
        &self,
        key: &ConversationKey,
        route: &str,
        state: &ConversationState,
        ttl: Duration,
    ) -> Result<()> {
        let now = self.clock.now_ms();
        let state = serde_json::to_string(state)?;
        sqlx::query(
            r#"INSERT INTO conversations
                 (conversation_key, team_id, channel, user_id, route, state, expires_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(conversation_key) DO UPDATE SET
                 route = excluded.route,
                 state = excluded.state,
                 expires_at = excluded.expires_at,
                 updated_at = excluded.updated_at"#,
        )
        .bind(key.to_string())
        .bind(&key.team_id)
        .bind(&key.channel)
        .bind(&key.user)
        .bind(route)
        .bind(state)
        .bind(now.saturating_add(duration_ms(ttl)))
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &ConversationKey) -> Result<()> {
        sqlx::query("DELETE FROM conversations WHERE conversation_key = ?")
            .bind(key.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM conversations WHERE expires_at <= ?")
            .bind(self.clock.now_ms())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn active_count(&self) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM conversations WHERE expires_at > ?")
                .bind(self.clock.now_ms())
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as u64)
    }
}
