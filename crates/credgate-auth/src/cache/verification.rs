//! Memoization of password verification outcomes.
//!
//! Password hashes are expensive to check on purpose. Under bursty traffic the
//! same (user, password) pair is verified many times in a short window, so
//! outcomes are cached for a fixed TTL in front of the slow comparison.
//!
//! ## Cache Key
//!
//! Entries are keyed by subject id plus a keyed fingerprint of the exact
//! plaintext (see [`Fingerprinter`]). Caching per subject alone would let one
//! successful login vouch for any later password within the TTL.
//!
//! ## Expiry
//!
//! An entry is never served once its TTL has passed. Expired entries are
//! dropped lazily by the next `verify` for the same key, and a background
//! task sweeps the whole map on a fixed period so abandoned keys do not
//! accumulate.
//!
//! ## Staleness
//!
//! There is no invalidation when a password changes. A cached outcome for the
//! old hash may be served until it expires.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::{Instant, MissedTickBehavior};

use super::key::{CacheKey, Fingerprinter};
use crate::AuthResult;
use crate::config::VerificationCacheConfig;
use crate::error::{AuthError, ComparisonError};
use crate::password::PasswordComparator;

/// Memoized outcome with expiration time.
#[derive(Debug, Clone, Copy)]
struct CachedOutcome {
    outcome: bool,
    expires_at: Instant,
}

impl CachedOutcome {
    #[inline]
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Process-wide cache of password verification outcomes.
///
/// Create one instance at startup with [`VerificationCache::new`] and share
/// the returned `Arc`. Concurrent misses for the same key may each run the
/// comparison; the comparison runs without holding any map lock.
pub struct VerificationCache {
    entries: DashMap<CacheKey, CachedOutcome>,
    comparator: Arc<dyn PasswordComparator>,
    fingerprinter: Fingerprinter,
    enabled: bool,
    ttl: Duration,
    sweep_interval: Duration,
    offload: bool,
    sweeper_started: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
    comparisons: AtomicU64,
    failures: AtomicU64,
    evictions: AtomicU64,
    sweeps: AtomicU64,
}

impl VerificationCache {
    /// Creates the cache and starts its background sweep.
    ///
    /// The sweep task holds a weak reference and exits once the last `Arc`
    /// is dropped. It is not started when caching is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if `config` does not validate.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(
        comparator: Arc<dyn PasswordComparator>,
        config: &VerificationCacheConfig,
    ) -> AuthResult<Arc<Self>> {
        config
            .validate()
            .map_err(|e| AuthError::configuration(e.to_string()))?;

        let cache = Arc::new(Self {
            entries: DashMap::new(),
            comparator,
            fingerprinter: Fingerprinter::new(),
            enabled: config.enabled,
            ttl: config.ttl,
            sweep_interval: config.sweep_interval,
            offload: config.offload,
            sweeper_started: AtomicBool::new(false),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            comparisons: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
        });

        if cache.enabled {
            cache.start_sweeper();
        }

        Ok(cache)
    }

    fn start_sweeper(self: &Arc<Self>) {
        if self
            .sweeper_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let cache = Arc::downgrade(self);
        let period = self.sweep_interval;

        tokio::spawn(async move {
            sweep_loop(cache, period).await;
        });

        tracing::debug!(
            ttl = ?self.ttl,
            sweep_interval = ?self.sweep_interval,
            "Verification cache sweeper started"
        );
    }

    /// Returns the cached outcome for a credential if present and unexpired.
    ///
    /// Never removes entries or touches statistics.
    #[must_use]
    pub fn get(&self, subject_id: &str, credential: &str) -> Option<bool> {
        let key = self.fingerprinter.key(subject_id, credential);
        self.lookup(&key, Instant::now())
    }

    fn lookup(&self, key: &CacheKey, now: Instant) -> Option<bool> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.outcome)
    }

    /// Verifies `credential` against `stored_hash`, memoizing the outcome.
    ///
    /// A live cached outcome is returned without running the comparison.
    /// Otherwise the comparison runs and a successful result (match or
    /// mismatch) is cached for the TTL.
    ///
    /// # Errors
    ///
    /// Returns the comparator's [`ComparisonError`]. Failures are not cached.
    pub async fn verify(
        &self,
        subject_id: &str,
        credential: &str,
        stored_hash: &str,
    ) -> Result<bool, ComparisonError> {
        if !self.enabled {
            return self.compare(credential, stored_hash).await;
        }

        let key = self.fingerprinter.key(subject_id, credential);
        let now = Instant::now();

        if let Some(outcome) = self.lookup(&key, now) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(user_id = %subject_id, "Verification cache hit");
            return Ok(outcome);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);

        // An expired entry counts as absent; drop it before recomputing.
        if self
            .entries
            .remove_if(&key, |_, entry| !entry.is_live(now))
            .is_some()
        {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        tracing::debug!(user_id = %subject_id, "Verification cache miss");

        let outcome = self.compare(credential, stored_hash).await?;

        match Instant::now().checked_add(self.ttl) {
            Some(expires_at) => {
                self.entries
                    .insert(key, CachedOutcome { outcome, expires_at });
            }
            None => {
                tracing::warn!(ttl = ?self.ttl, "Verification TTL overflows the clock, outcome not cached");
            }
        }

        Ok(outcome)
    }

    async fn compare(&self, credential: &str, stored_hash: &str) -> Result<bool, ComparisonError> {
        self.comparisons.fetch_add(1, Ordering::Relaxed);

        let result = if self.offload {
            let comparator = Arc::clone(&self.comparator);
            let credential = credential.to_owned();
            let stored_hash = stored_hash.to_owned();

            match tokio::task::spawn_blocking(move || {
                comparator.compare(&credential, &stored_hash)
            })
            .await
            {
                Ok(result) => result,
                Err(e) => Err(ComparisonError::task(e.to_string())),
            }
        } else {
            self.comparator.compare(credential, stored_hash)
        };

        if let Err(e) = &result {
            self.failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, "Password comparison failed");
        }

        result
    }

    /// Removes every expired entry.
    ///
    /// Called by the background sweep; safe to call concurrently with reads
    /// and writes. Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            if entry.is_live(now) {
                true
            } else {
                removed += 1;
                false
            }
        });

        self.sweeps.fetch_add(1, Ordering::Relaxed);
        if removed > 0 {
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        }

        removed
    }

    /// Drops every entry, live or not.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries currently stored, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if outcomes are memoized.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Lifetime of a cached outcome.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Period of the background sweep.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Get cache statistics.
    #[must_use]
    pub fn stats(&self) -> VerificationCacheStats {
        VerificationCacheStats {
            size: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            comparisons: self.comparisons.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for VerificationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationCache")
            .field("enabled", &self.enabled)
            .field("ttl", &self.ttl)
            .field("sweep_interval", &self.sweep_interval)
            .field("offload", &self.offload)
            .field("size", &self.entries.len())
            .finish_non_exhaustive()
    }
}

async fn sweep_loop(cache: Weak<VerificationCache>, period: Duration) {
    let now = Instant::now();
    let start = now.checked_add(period).unwrap_or(now);
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let Some(cache) = cache.upgrade() else {
            tracing::debug!("Verification cache dropped, sweeper exiting");
            break;
        };

        let removed = cache.sweep();
        if removed > 0 {
            tracing::debug!(
                removed,
                remaining = cache.len(),
                "Swept expired verification outcomes"
            );
        }
    }
}

/// Statistics for the verification cache.
#[derive(Debug, Clone, Default)]
pub struct VerificationCacheStats {
    /// Number of entries currently in the cache.
    pub size: usize,
    /// Verifications answered from the cache.
    pub hits: u64,
    /// Verifications that had to run the comparison.
    pub misses: u64,
    /// Invocations of the slow comparison.
    pub comparisons: u64,
    /// Comparisons that returned an error.
    pub failures: u64,
    /// Entries removed because they expired.
    pub evictions: u64,
    /// Completed sweeps.
    pub sweeps: u64,
}

impl VerificationCacheStats {
    /// Calculate hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}
