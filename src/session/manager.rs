//! Session registry with automatic cleanup

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::Session;
use crate::errors::DocChatError;
use crate::errors::Result;
use crate::rag::RagService;

/// Interval between expiry sweeps
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

pub type SessionHandle = Arc<Mutex<Session>>;

/// Session manager with automatic cleanup
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<String, SessionHandle>>,
    rag: Arc<RagService>,
    session_timeout: Duration,
}

impl SessionManager {
    #[must_use]
    pub fn new(rag: Arc<RagService>, session_timeout_secs: u64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            rag,
            session_timeout: Duration::from_secs(session_timeout_secs),
        }
    }

    /// Sweep expired sessions every minute until the runtime shuts down
    pub fn spawn_cleanup_task(&self) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(CLEANUP_INTERVAL).await;
                manager.cleanup_expired();
            }
        })
    }

    /// Start a new empty session and return its id
    pub fn create(&self) -> String {
        let session = Session::new(Arc::clone(&self.rag));
        let session_id = session.id().to_string();
        self.sessions
            .insert(session_id.clone(), Arc::new(Mutex::new(session)));
        tracing::info!("Created session: {}", session_id);
        session_id
    }

    pub fn get(&self, session_id: &str) -> Result<SessionHandle> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| DocChatError::SessionNotFound(session_id.to_string()))
    }

    pub fn delete(&self, session_id: &str) -> Result<()> {
        if self.sessions.remove(session_id).is_none() {
            return Err(DocChatError::SessionNotFound(session_id.to_string()));
        }
        tracing::info!("Deleted session: {}", session_id);
        Ok(())
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Remove sessions idle past the timeout. Sessions busy with a request are kept.
    pub fn cleanup_expired(&self) -> usize {
        let timeout = self.session_timeout;
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .try_lock()
                    .is_ok_and(|session| session.is_expired(timeout))
            })
            .map(|entry| entry.key().clone())
            .collect();

        for session_id in &expired {
            self.sessions.remove(session_id);
            tracing::info!("Cleaned up expired session: {}", session_id);
        }
        expired.len()
    }
}
