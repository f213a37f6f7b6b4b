//! In-memory Session Store
//!
//! Maps session identifiers to their transcripts for the lifetime of the
//! process. Each transcript sits behind its own async mutex so that turns on
//! the same session are applied one at a time, while unrelated sessions never
//! wait on each other. The registry lock is only held for lookups.

use crate::transcript::{Role, Transcript};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{sync::Mutex, task::JoinHandle, time::Instant};
use tracing::{debug, info};

/// Number of turns retained after the system turn.
pub const DEFAULT_MAX_TURNS: usize = 20;

/// A shared, lockable reference to one session's transcript.
pub type SessionHandle = Arc<Mutex<Transcript>>;

struct SessionEntry {
    transcript: SessionHandle,
    last_seen: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            transcript: Arc::new(Mutex::new(Transcript::new())),
            last_seen: Instant::now(),
        }
    }
}

/// Process-wide registry of interview transcripts.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    max_turns: usize,
}

impl SessionStore {
    /// Creates an empty store that retains `max_turns` turns per session
    /// (plus the system turn). A value of zero is raised to one.
    pub fn new(max_turns: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_turns: max_turns.max(1),
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Returns the lockable transcript for `session_id`, registering a fresh
    /// one if the session is unknown.
    pub async fn handle(&self, session_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.entry(session_id.to_string()).or_insert_with(|| {
            debug!(%session_id, "Creating new interview session");
            SessionEntry::new()
        });
        entry.last_seen = Instant::now();
        entry.transcript.clone()
    }

    /// Returns a snapshot of the session's transcript, creating it if absent.
    pub async fn get_or_create(&self, session_id: &str) -> Transcript {
        let handle = self.handle(session_id).await;
        let transcript = handle.lock().await;
        transcript.clone()
    }

    /// Appends a turn to an existing session. Unknown sessions are ignored.
    pub async fn append(&self, session_id: &str, role: Role, content: impl Into<String>) {
        let Some(handle) = self.existing(session_id).await else {
            debug!(%session_id, %role, "Ignoring append to unknown session");
            return;
        };
        handle.lock().await.push(role, content);
    }

    /// Applies the retention policy to an existing session.
    ///
    /// Returns `true` when turns were dropped.
    pub async fn truncate_if_needed(&self, session_id: &str) -> bool {
        match self.existing(session_id).await {
            Some(handle) => handle.lock().await.truncate_to(self.max_turns),
            None => false,
        }
    }

    /// Forgets a session. Returns whether it existed.
    pub async fn reset(&self, session_id: &str) -> bool {
        self.sessions.lock().await.remove(session_id).is_some()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Drops sessions that have been idle for at least `ttl` and are not held
    /// by an in-flight request. Returns how many were removed.
    pub async fn prune_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            now.duration_since(entry.last_seen) < ttl || Arc::strong_count(&entry.transcript) > 1
        });
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Pruned idle interview sessions");
        }
        removed
    }

    /// Spawns a background task that prunes idle sessions every half `ttl`.
    /// The task ends on its own once the store has been dropped.
    pub fn spawn_idle_sweeper(self: &Arc<Self>, ttl: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        let period = (ttl / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.prune_idle(ttl).await;
            }
        })
    }

    async fn existing(&self, session_id: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        sessions.get_mut(session_id).map(|entry| {
            entry.last_seen = Instant::now();
            entry.transcript.clone()
        })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}
