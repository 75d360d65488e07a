use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Duration, Utc};
use tokio::sync::Mutex as AsyncMutex;

use crate::models::Session;

pub type SessionHandle = Arc<AsyncMutex<Session>>;

/// Per-user session table.
///
/// Each session sits behind its own async lock. Holding that lock for a whole
/// turn serializes messages from one user while other users proceed.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
    idle_ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(idle_ttl: Option<Duration>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Returns the user's session, creating it on first contact. Never fails.
    ///
    /// Creating a session also evicts idle ones when a TTL is configured.
    pub fn get_or_create(&self, user_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = sessions.get(user_id) {
            return Arc::clone(handle);
        }

        self.evict_idle(&mut sessions);

        tracing::debug!(user = user_id, "creating session");
        let handle = Arc::new(AsyncMutex::new(Session::new(user_id)));
        sessions.insert(user_id.to_string(), Arc::clone(&handle));
        handle
    }

    // Only handles nobody else holds are candidates, so an in-flight turn
    // never loses its session.
    fn evict_idle(&self, sessions: &mut HashMap<String, SessionHandle>) {
        let Some(ttl) = self.idle_ttl else {
            return;
        };
        let now = Utc::now().naive_utc();
        let before = sessions.len();
        sessions.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(session) => now - session.last_activity <= ttl,
                Err(_) => true,
            }
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted idle sessions");
        }
    }

    /// Resets the session in place when it has been idle longer than the TTL.
    /// Callers must already hold the session lock.
    pub fn refresh_if_expired(&self, session: &mut Session) {
        let Some(ttl) = self.idle_ttl else {
            return;
        };
        if Utc::now().naive_utc() - session.last_activity > ttl {
            tracing::info!(user = %session.user_id, "session expired, starting fresh");
            *session = Session::new(&session.user_id);
        }
    }

    pub async fn snapshot(&self, user_id: &str) -> Option<Session> {
        let handle = {
            let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            sessions.get(user_id).cloned()
        }?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
