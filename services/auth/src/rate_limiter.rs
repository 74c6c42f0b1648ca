//! Login rate limiter, keyed by client address and username
//!
//! After `max_attempts` failed logins inside `window_seconds` the key is
//! locked for `ban_duration_seconds`. A successful login clears the key.
//! Keys whose window and ban have both run out are swept at most once per
//! window, so the table only holds recently active clients.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,        // 5 minutes
            ban_duration_seconds: 3600, // 1 hour
        }
    }
}

/// Limiter key for a login attempt
///
/// The address is part of the key so that failed guesses from one client
/// cannot lock the account for everybody else.
pub fn login_key(client: IpAddr, username: &str) -> String {
    format!("{}|{}", client, username)
}

#[derive(Debug)]
struct RateLimiterEntry {
    attempts: u32,
    window_start: Instant,
    ban_expires: Option<Instant>,
}

impl RateLimiterEntry {
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        let banned = self.ban_expires.is_some_and(|expires| now < expires);
        !banned && now.duration_since(self.window_start) >= window
    }
}

#[derive(Debug)]
struct Entries {
    by_key: HashMap<String, RateLimiterEntry>,
    last_sweep: Instant,
}

/// Rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<Entries>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(Entries {
                by_key: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.window_seconds)
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = self.window();

        if now.duration_since(entries.last_sweep) >= window {
            let before = entries.by_key.len();
            entries.by_key.retain(|_, entry| !entry.is_stale(now, window));
            entries.last_sweep = now;
            debug!(
                "Swept {} stale rate limiter entries",
                before - entries.by_key.len()
            );
        }

        let entry = entries
            .by_key
            .entry(key.to_string())
            .or_insert(RateLimiterEntry {
                attempts: 0,
                window_start: now,
                ban_expires: None,
            });

        if let Some(ban_expires) = entry.ban_expires {
            if now < ban_expires {
                return false;
            }
            entry.attempts = 0;
            entry.ban_expires = None;
            entry.window_start = now;
        }

        if now.duration_since(entry.window_start) >= window {
            entry.attempts = 0;
            entry.window_start = now;
        }

        if entry.attempts >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            warn!(
                "Locked login for {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
            return false;
        }

        entry.attempts += 1;
        true
    }

    /// Forget all attempts for `key`
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.by_key.remove(key);
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.by_key.len()
    }
}
