//! Config schema types (bot identity, routing, ambient replies, state store).
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default lifetime of a conversation record: one hour.
pub const DEFAULT_TTL_SECS: u64 = 60 * 60;

/// Default chance that the ambient catch-all answers at all.
pub const DEFAULT_REPLY_PROBABILITY: f64 = 0.4;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PalaverConfig {
    pub bot: BotConfig,
    pub routing: RoutingConfig,
    pub ambient: AmbientConfig,
    pub store: StoreConfig,
}

/// Who the bot is on the messaging platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// The bot's own user ID (e.g. `U024BE7LH`). Needed to recognise
    /// `<@U024BE7LH>` mentions; without it every channel message is ambient.
    pub user_id: Option<String>,
    /// Team/workspace ID used when an inbound event does not carry one.
    pub team_id: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            team_id: "local".into(),
        }
    }
}

/// Conversation routing behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Seconds a pending route stays valid when a handler does not pass its own TTL.
    pub default_ttl_secs: u64,
    /// Whether literal trigger patterns compare case-sensitively.
    /// Defaults to `false`: `Help` and `HELP` both match a `help` literal.
    pub literal_case_sensitive: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: DEFAULT_TTL_SECS,
            literal_case_sensitive: false,
        }
    }
}

impl RoutingConfig {
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

/// Ambient chatter: the catch-all that answers with a random emoji sometimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub enabled: bool,
    /// Probability in `[0, 1]` that a catch-all message gets any reply.
    pub reply_probability: f64,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reply_probability: DEFAULT_REPLY_PROBABILITY,
        }
    }
}

/// Which conversation store backend to use.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map. Conversations are lost on restart.
    #[default]
    Memory,
    /// SQLite database via sqlx.
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: String,
    /// How often expired records are swept. `0` disables the sweeper and
    /// relies on lazy expiry at lookup time.
    pub sweep_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database_url: "sqlite://palaver.db?mode=rwc".into(),
            sweep_interval_secs: 300,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}
