//! Session history store.
//!
//! One [`Session`] per conversation, keyed by id. A turn holds the
//! session's mutex across its whole read-and-append window, so turns on
//! the same session are strictly serialized while different sessions
//! never contend. There is no delete; session lifecycle belongs to the
//! host process.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use atlas_core::messages::Message;

/// One conversation's transcript.
pub struct Session {
    id: String,
    history: Mutex<Vec<Message>>,
}

impl Session {
    fn new(id: String) -> Self {
        Self {
            id,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Lock the transcript. Hold the guard for the full duration of a
    /// turn to keep same-session turns serialized.
    pub async fn lock_history(&self) -> tokio::sync::MutexGuard<'_, Vec<Message>> {
        self.history.lock().await
    }

    /// Snapshot of the transcript, for inspection outside a turn.
    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.clone()
    }
}

/// In-memory map of sessions, per-key locking only.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the session for `id`, creating one when the id is absent
    /// or unknown. Returns the session and its id.
    ///
    /// Racing callers with the same fresh id all land on one session;
    /// the entry guard makes lookup-and-create atomic.
    pub fn get_or_create(&self, id: Option<&str>) -> (Arc<Session>, String) {
        let id = id
            .map(str::to_owned)
            .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
        let session = Arc::clone(
            self.sessions
                .entry(id.clone())
                .or_insert_with(|| {
                    debug!(session_id = %id, "session created");
                    Arc::new(Session::new(id.clone()))
                })
                .value(),
        );
        (session, id)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Whether a session with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }
}
