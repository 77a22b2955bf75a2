//! Session collaborator: a single `authenticated` flag keyed by session id.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::RngCore;
use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};
// Follows the runtime clock, so a paused test runtime can age records.
use tokio::time::Instant;

const SESSION_ID_BYTES: usize = 32;

/// Opaque session identifier carried in the session cookie.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Fresh random identifier (32 bytes, unpadded base64url).
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(Base64UrlUnpadded::encode_string(&bytes))
    }

    /// Accept a cookie value only if it has the shape of a generated id.
    #[must_use]
    pub fn from_cookie(value: &str) -> Option<Self> {
        let bytes = Base64UrlUnpadded::decode_vec(value).ok()?;
        (bytes.len() == SESSION_ID_BYTES).then(|| Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Session ids are bearer credentials; keep them out of logs.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(***)")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
}

impl SessionState {
    pub const AUTHENTICATED: Self = Self {
        authenticated: true,
    };
}

pub trait SessionStore: Send + Sync {
    /// Unknown or expired ids read as the default (unauthenticated) state.
    fn get(&self, id: &SessionId) -> SessionState;
    fn set(&self, id: &SessionId, state: SessionState);
    /// Move the record under a new id and forget the old one.
    fn regenerate_id(&self, id: &SessionId) -> SessionId;
    fn destroy(&self, id: &SessionId);
}

#[derive(Debug)]
struct SessionRecord {
    state: SessionState,
    touched_at: Instant,
}

/// Process-local store with an inactivity TTL.
#[derive(Debug)]
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<SessionId, SessionRecord>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionRecord>> {
        // A panic while holding the lock cannot leave a record half-written.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop expired records, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, record| record.touched_at.elapsed() < ttl);
        before - sessions.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &SessionId) -> SessionState {
        let mut sessions = self.lock();
        match sessions.get_mut(id) {
            Some(record) if record.touched_at.elapsed() < self.ttl => {
                record.touched_at = Instant::now();
                record.state
            }
            Some(_) => {
                sessions.remove(id);
                SessionState::default()
            }
            None => SessionState::default(),
        }
    }

    fn set(&self, id: &SessionId, state: SessionState) {
        self.lock().insert(
            id.clone(),
            SessionRecord {
                state,
                touched_at: Instant::now(),
            },
        );
    }

    fn regenerate_id(&self, id: &SessionId) -> SessionId {
        let new_id = SessionId::generate();
        let mut sessions = self.lock();
        let state = sessions
            .remove(id)
            .map(|record| record.state)
            .unwrap_or_default();
        sessions.insert(
            new_id.clone(),
            SessionRecord {
                state,
                touched_at: Instant::now(),
            },
        );
        new_id
    }

    fn destroy(&self, id: &SessionId) {
        self.lock().remove(id);
    }
}
