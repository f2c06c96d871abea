//! Conversation state storage.
//!
//! Maps a conversation identity (team, channel, user) to the route that
//! should handle that conversation's next message, an opaque state payload,
//! and an expiry. At most one record exists per identity; expired records
//! are indistinguishable from missing ones.

pub mod clock;
pub mod error;
pub mod key;
pub mod store;
pub mod store_memory;
pub mod store_sqlite;

pub use {
    clock::{Clock, ManualClock, SystemClock},
    error::{Error, Result},
    key::ConversationKey,
    store::{ConversationRecord, ConversationState, ConversationStore},
    store_memory::MemoryConversationStore,
    store_sqlite::SqliteConversationStore,
};

/// Run database migrations for the conversations table.
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
