//! Session store: opaque key to one pipeline.
//!
//! Each session owns exactly one [`Pipeline`] behind its own async mutex, so
//! operations within a session run one at a time while different sessions
//! proceed independently.

use crate::pipeline::Pipeline;
use docqa_core::config::SessionSettings;
use docqa_core::AppResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A pipeline shared between the store and its current users.
pub type SharedPipeline = Arc<tokio::sync::Mutex<Pipeline>>;

/// Storage for live sessions.
pub trait SessionStore: Send + Sync {
    /// Look up a session, refreshing its last-access time.
    fn get(&self, key: &str) -> Option<SharedPipeline>;

    /// Insert a session, replacing any existing one under `key`.
    fn create(&self, key: &str, pipeline: Pipeline) -> SharedPipeline;

    /// Drop a session. Returns whether it existed.
    fn remove(&self, key: &str) -> bool;
}

struct SessionEntry {
    pipeline: SharedPipeline,
    last_access: Instant,
}

/// In-process session store with idle expiry and LRU capacity eviction.
pub struct InMemorySessionStore {
    ttl: Duration,
    max_sessions: usize,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl InMemorySessionStore {
    /// `max_sessions` is clamped to at least one.
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            ttl,
            max_sessions: max_sessions.max(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self::new(Duration::from_secs(settings.ttl_secs), settings.max_sessions)
    }

    /// Return the session under `key`, creating it with `factory` if absent.
    pub fn get_or_create<F>(&self, key: &str, factory: F) -> AppResult<SharedPipeline>
    where
        F: FnOnce() -> AppResult<Pipeline>,
    {
        let now = Instant::now();
        if let Some(pipeline) = self.get_at(key, now) {
            return Ok(pipeline);
        }
        Ok(self.create_at(key, factory()?, now))
    }

    /// Drop every session idle for longer than the TTL. Returns how many.
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Instant::now())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        // a poisoned map is still structurally valid
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<SharedPipeline> {
        let mut sessions = self.lock();
        Self::drop_expired(&mut sessions, self.ttl, now);

        let entry = sessions.get_mut(key)?;
        entry.last_access = now;
        Some(Arc::clone(&entry.pipeline))
    }

    fn create_at(&self, key: &str, pipeline: Pipeline, now: Instant) -> SharedPipeline {
        let mut sessions = self.lock();
        Self::drop_expired(&mut sessions, self.ttl, now);

        if !sessions.contains_key(key) {
            while sessions.len() >= self.max_sessions {
                let Some(oldest) = sessions
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_access)
                    .map(|(k, _)| k.clone())
                else {
                    break;
                };
                tracing::debug!("Evicting least recently used session '{}'", oldest);
                sessions.remove(&oldest);
            }
        }

        let shared = Arc::new(tokio::sync::Mutex::new(pipeline));
        sessions.insert(
            key.to_string(),
            SessionEntry {
                pipeline: Arc::clone(&shared),
                last_access: now,
            },
        );

        tracing::debug!("Created session '{}' ({} live)", key, sessions.len());
        shared
    }

    fn evict_expired_at(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        Self::drop_expired(&mut sessions, self.ttl, now)
    }

    fn drop_expired(
        sessions: &mut HashMap<String, SessionEntry>,
        ttl: Duration,
        now: Instant,
    ) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_access) <= ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} expired sessions", evicted);
        }
        evicted
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::from_settings(&SessionSettings::default())
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Option<SharedPipeline> {
        self.get_at(key, Instant::now())
    }

    fn create(&self, key: &str, pipeline: Pipeline) -> SharedPipeline {
        self.create_at(key, pipeline, Instant::now())
    }

    fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }
}
