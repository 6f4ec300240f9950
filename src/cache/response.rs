//! Response cache for agent invocations.
//!
//! [`ResponseCache`] memoizes agent responses by [`InvocationKey`] for a fixed
//! TTL. Entries are stamped with the time they were written and treated as
//! absent once `now - written_at >= ttl`; expiry is checked on read, so a
//! stale entry may still be physically present until moka evicts it.
//!
//! # Clock
//!
//! Timestamps come from `tokio::time::Instant`, which follows the paused test
//! clock. moka's own eviction runs on wall time and is only a space bound; the
//! read-side age check is what decides hit or miss.

use std::time::Duration;

use moka::sync::Cache;
use tokio::time::Instant;

use super::key::InvocationKey;
use crate::types::AgentResponse;

/// Configuration for the response cache.
///
/// ```rust
/// # use jobscout::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(1_000)
///     .ttl(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// Time-to-live for cached entries. Default: 10 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    written_at: Instant,
    response: AgentResponse,
}

/// In-memory TTL cache of agent responses.
pub struct ResponseCache {
    entries: Cache<String, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a new response cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self {
            entries,
            ttl: config.ttl,
        }
    }

    /// Look up a cached response.
    ///
    /// Returns `None` on a miss or when the entry's age has reached the TTL.
    pub fn get(&self, key: &InvocationKey) -> Option<AgentResponse> {
        let entry = self.entries.get(key.as_str())?;
        if entry.written_at.elapsed() < self.ttl {
            Some(entry.response)
        } else {
            None
        }
    }

    /// Store a response, replacing any existing entry for `key`.
    pub fn put(&self, key: &InvocationKey, response: AgentResponse) {
        self.entries.insert(
            key.as_str().to_string(),
            CacheEntry {
                written_at: Instant::now(),
                response,
            },
        );
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    fn key(text: &str) -> InvocationKey {
        InvocationKey::for_messages(&[Message::user(text)]).unwrap()
    }

    #[test]
    fn cache_config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.ttl, Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn miss_then_hit() {
        let cache = ResponseCache::new(&CacheConfig::default());
        assert!(cache.get(&key("a")).is_none());
        cache.put(&key("a"), AgentResponse::new("out"));
        assert_eq!(cache.get(&key("a")).unwrap().output, "out");
        assert!(cache.get(&key("b")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn put_overwrites() {
        let cache = ResponseCache::new(&CacheConfig::default());
        cache.put(&key("a"), AgentResponse::new("first"));
        cache.put(&key("a"), AgentResponse::new("second"));
        assert_eq!(cache.get(&key("a")).unwrap().output, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_exactly_at_ttl() {
        let ttl = Duration::from_secs(600);
        let cache = ResponseCache::new(&CacheConfig::new().ttl(ttl));
        cache.put(&key("a"), AgentResponse::new("out"));

        tokio::time::advance(ttl - Duration::from_millis(1)).await;
        assert!(cache.get(&key("a")).is_some(), "hit strictly before ttl");

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cache.get(&key("a")).is_none(), "miss at ttl");
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_refreshes_timestamp() {
        let ttl = Duration::from_secs(10);
        let cache = ResponseCache::new(&CacheConfig::new().ttl(ttl));
        cache.put(&key("a"), AgentResponse::new("old"));
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.put(&key("a"), AgentResponse::new("new"));
        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get(&key("a")).unwrap().output, "new");
    }
}
