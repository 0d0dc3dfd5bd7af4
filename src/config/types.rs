//! Configuration type definitions.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;

use serde::Deserialize;

/// Default maximum characters per outgoing chat-room message.
pub const DEFAULT_CHUNK_LIMIT: usize = 500;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub onebot: OneBotConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    pub commands: CommandsConfig,
}

/// OneBot (CQHttp) WebSocket endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OneBotConfig {
    pub ws_address: String,
    pub ws_port: u16,
    #[serde(default)]
    pub access_token: Option<String>,
    /// The QQ group relayed by this bridge.
    pub group_id: i64,
}

impl OneBotConfig {
    /// WebSocket URL, qualified with the access token when one is set.
    pub fn url(&self) -> String {
        let mut url = format!("ws://{}:{}/", self.ws_address, self.ws_port);
        if let Some(token) = self.access_token.as_deref().filter(|t| !t.is_empty()) {
            url.push_str("?access_token=");
            url.push_str(token);
        }
        url
    }
}

/// Access list semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum AccessMode {
    /// Only listed members are allowed.
    Whitelist,
    /// Everyone except listed members is allowed.
    #[default]
    Blacklist,
}

impl TryFrom<String> for AccessMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "whitelist" => Ok(Self::Whitelist),
            "blacklist" => Ok(Self::Blacklist),
            other => Err(format!(
                "unknown access mode '{}' (use: whitelist, blacklist)",
                other
            )),
        }
    }
}

/// An access list for one platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Eq + Hash"))]
pub struct AccessList<T> {
    #[serde(default)]
    pub mode: AccessMode,
    #[serde(default)]
    pub members: HashSet<T>,
}

impl<T> Default for AccessList<T> {
    fn default() -> Self {
        Self {
            mode: AccessMode::default(),
            members: HashSet::new(),
        }
    }
}

/// Access control for both platforms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessConfig {
    /// Chat-room access list, keyed by user id.
    #[serde(default)]
    pub chatroom: AccessList<i64>,
    /// Remote access list, keyed by player name.
    #[serde(default)]
    pub remote: AccessList<String>,
    /// Chat-room user ids with admin privilege.
    #[serde(default)]
    pub admins: HashSet<i64>,
}

/// A single token bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct BucketConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Tokens refilled per second.
    #[serde(default = "default_rate")]
    pub rate: f64,
    /// Maximum burst size.
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rate: default_rate(),
            capacity: default_capacity(),
        }
    }
}

impl BucketConfig {
    /// Time to refill one token, if `rate` gives a representable non-zero
    /// period.
    pub fn refill_period(&self) -> Option<Duration> {
        if !(self.rate.is_finite() && self.rate > 0.0) {
            return None;
        }
        Duration::try_from_secs_f64(1.0 / self.rate)
            .ok()
            .filter(|period| !period.is_zero())
    }
}

fn default_rate() -> f64 {
    0.5
}

fn default_capacity() -> u32 {
    5
}

/// Per-direction rate limits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RateLimitConfig {
    /// Chat room -> remote.
    #[serde(default)]
    pub to_remote: BucketConfig,
    /// Remote -> chat room.
    #[serde(default)]
    pub to_chatroom: BucketConfig,
}

/// Relay behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Forward every chat-room message without `!!mc`.
    #[serde(default)]
    pub chatroom_to_remote_auto: bool,
    /// Forward every remote chat message without `!!qq`.
    #[serde(default = "default_true")]
    pub remote_to_chatroom_auto: bool,
    /// Forward "joined"/"left" notices from the remote side.
    #[serde(default = "default_true")]
    pub forward_join_leave: bool,
    /// Max characters for chat room -> remote (0 = unlimited).
    #[serde(default)]
    pub chatroom_max_length: usize,
    /// Max characters for remote -> chat room (0 = unlimited).
    #[serde(default)]
    pub remote_max_length: usize,
    /// Max characters per outgoing chat-room message.
    #[serde(default = "default_chunk_limit")]
    pub chunk_limit: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chatroom_to_remote_auto: false,
            remote_to_chatroom_auto: true,
            forward_join_leave: true,
            chatroom_max_length: 0,
            remote_max_length: 0,
            chunk_limit: DEFAULT_CHUNK_LIMIT,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_chunk_limit() -> usize {
    DEFAULT_CHUNK_LIMIT
}

/// Command targets and privilege overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandsConfig {
    /// Bus client answering `!!online`.
    pub online_query_client: String,
    /// Bus client answering `!!stats`.
    pub stats_query_client: String,
    /// Let non-admins use forced offline registration.
    #[serde(default)]
    pub allow_offline_registration_for_everyone: bool,
    /// Let non-admins add players to the whitelist.
    #[serde(default)]
    pub allow_whitelist_for_everyone: bool,
}
