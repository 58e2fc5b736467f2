//! Per-visitor sessions.
//!
//! Each visitor gets a UUID and an isolated [`VisitorSession`]. Sessions live
//! only in memory and are dropped after a period of inactivity by the sweep
//! worker in `main.rs`. The store holds at most `max_sessions`; creating one
//! more evicts the least recently seen session.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use heartheist_core::session::SessionInput;
use heartheist_core::stage::StageCursor;

/// One visitor's form values and stage position.
#[derive(Debug, Clone)]
pub struct VisitorSession {
    pub id: Uuid,
    pub input: SessionInput,
    pub cursor: StageCursor,
    pub last_seen: Instant,
}

impl VisitorSession {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            input: SessionInput::with_defaults(),
            cursor: StageCursor::start(),
            last_seen: Instant::now(),
        }
    }
}

/// Default cap on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// All live sessions, keyed by id.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, VisitorSession>>,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_max_sessions(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding at most `max_sessions` (at least one).
    #[must_use]
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Start a fresh session with default input and return its id.
    ///
    /// When the store is full the least recently seen session is evicted.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .values()
                .min_by_key(|s| s.last_seen)
                .map(|s| s.id)
            else {
                break;
            };
            sessions.remove(&oldest);
            tracing::info!(
                session = %oldest,
                max_sessions = self.max_sessions,
                "session store full, evicted least recently seen session"
            );
        }
        sessions.insert(id, VisitorSession::new(id));
        tracing::debug!(session = %id, "session created");
        id
    }

    /// Snapshot a session and mark it as seen.
    pub async fn touch(&self, id: Uuid) -> Option<VisitorSession> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.last_seen = Instant::now();
        Some(session.clone())
    }

    /// Apply `f` to a session in place and return its result.
    ///
    /// Returns `None` if the session does not exist.
    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut VisitorSession) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.last_seen = Instant::now();
        Some(f(session))
    }

    /// Drop every session idle for longer than `ttl`. Returns how many went.
    pub async fn remove_idle(&self, ttl: Duration) -> usize {
        self.remove_idle_at(ttl, Instant::now()).await
    }

    async fn remove_idle_at(&self, ttl: Duration, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now.saturating_duration_since(s.last_seen) <= ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
