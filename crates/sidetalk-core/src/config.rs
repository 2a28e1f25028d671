//! Sync engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Engine-wide configuration shared through the [`Connection`](crate::Connection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Buffered values per online/presence channel before slow subscribers lag
    pub channel_capacity: usize,
    /// Avatar pipeline settings
    pub avatar: AvatarConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            avatar: AvatarConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Defaults overlaid with `SIDETALK_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each `SIDETALK_*` key.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(capacity) = parse_var(&lookup, "SIDETALK_CHANNEL_CAPACITY") {
            config.channel_capacity = capacity;
        }
        if let Some(timeout) = parse_var(&lookup, "SIDETALK_AVATAR_TIMEOUT_MS") {
            config.avatar.fetch_timeout_ms = timeout;
        }
        if let Some(cache_fetched) = parse_var(&lookup, "SIDETALK_AVATAR_CACHE_FETCHED") {
            config.avatar.cache_fetched = cache_fetched;
        }
        config
    }

    /// Channel capacity, never zero (`broadcast::channel` rejects zero).
    pub fn effective_capacity(&self) -> usize {
        self.channel_capacity.max(1)
    }
}

/// Avatar pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// How long to wait for a vCard after requesting it
    pub fetch_timeout_ms: u64,
    /// Ask the vCard module to bypass its own storage on a cache miss
    pub ignore_storage: bool,
    /// Write avatars fetched from the network back to the avatar store
    pub cache_fetched: bool,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            ignore_storage: true,
            cache_fetched: true,
        }
    }
}

impl AvatarConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable config value");
            None
        }
    }
}
