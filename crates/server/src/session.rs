//! Session Management
//!
//! One session per browser tab. Each session owns its own
//! `ConversationOrchestrator`; sessions are in-memory only and are dropped
//! after `session_timeout` of inactivity.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use data_chef_agent::ConversationOrchestrator;

use crate::ServerError;

/// Session state
pub struct Session {
    /// Session ID
    pub id: String,
    /// Conversation for this session
    pub orchestrator: Arc<ConversationOrchestrator>,
    /// Creation time
    pub created_at: Instant,
    /// Last activity
    pub last_activity: RwLock<Instant>,
    /// Is active
    pub active: RwLock<bool>,
}

impl Session {
    pub fn new(id: impl Into<String>, orchestrator: ConversationOrchestrator) -> Self {
        Self {
            id: id.into(),
            orchestrator: Arc::new(orchestrator),
            created_at: Instant::now(),
            last_activity: RwLock::new(Instant::now()),
            active: RwLock::new(true),
        }
    }

    /// Update last activity
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// Check if session is expired
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }

    /// Close session
    pub fn close(&self) {
        *self.active.write() = false;
    }

    pub fn is_active(&self) -> bool {
        *self.active.read()
    }
}

/// Session manager
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    max_sessions: usize,
    session_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionManager {
    /// Create a session manager with a 1 hour timeout swept every 5 minutes
    pub fn new(max_sessions: usize) -> Self {
        Self::with_config(
            max_sessions,
            Duration::from_secs(3600),
            Duration::from_secs(300),
        )
    }

    pub fn with_config(
        max_sessions: usize,
        session_timeout: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            session_timeout,
            cleanup_interval,
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Start a background task that periodically removes expired sessions
    ///
    /// Send `true` on the returned channel to stop it.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = manager.cleanup_expired();
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                remaining = manager.count(),
                                "Session cleanup"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Register a new session around `orchestrator`
    pub fn create(
        &self,
        orchestrator: ConversationOrchestrator,
    ) -> Result<Arc<Session>, ServerError> {
        let mut sessions = self.sessions.write();

        if sessions.len() >= self.max_sessions {
            self.cleanup_expired_internal(&mut sessions);

            if sessions.len() >= self.max_sessions {
                return Err(ServerError::SessionLimit);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(&id, orchestrator));
        sessions.insert(id.clone(), session.clone());

        tracing::info!(
            session_id = %id,
            backend = session.orchestrator.backend_name(),
            "Created session"
        );

        Ok(session)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    /// Remove a session, returning whether it existed
    pub fn remove(&self, id: &str) -> bool {
        match self.sessions.write().remove(id) {
            Some(session) => {
                session.close();
                tracing::info!(session_id = %id, "Removed session");
                true
            }
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Remove expired sessions, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions)
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Arc<Session>>) -> usize {
        let timeout = self.session_timeout;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.is_expired(timeout))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            if let Some(session) = sessions.remove(id) {
                session.close();
                tracing::info!(session_id = %id, "Expired session");
            }
        }

        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_chef_agent::MockAnalysisBackend;
    use data_chef_speech::{MockSpeechProvider, SpeechClient};

    fn orchestrator() -> ConversationOrchestrator {
        ConversationOrchestrator::new(
            Arc::new(MockAnalysisBackend::instant()),
            SpeechClient::new(Arc::new(MockSpeechProvider::new())),
        )
    }

    #[test]
    fn test_session_creation() {
        let manager = SessionManager::new(10);
        let session = manager.create(orchestrator()).unwrap();

        assert!(session.is_active());
        assert!(!session.is_expired(Duration::from_secs(60)));
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn test_session_get() {
        let manager = SessionManager::new(10);
        let session = manager.create(orchestrator()).unwrap();
        let id = session.id.clone();

        let retrieved = manager.get(&id);
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().id, id);
    }

    #[test]
    fn test_session_remove() {
        let manager = SessionManager::new(10);
        let session = manager.create(orchestrator()).unwrap();
        let id = session.id.clone();

        assert!(manager.remove(&id));
        assert!(manager.get(&id).is_none());
        assert!(!session.is_active());
        assert!(!manager.remove(&id));
    }

    #[test]
    fn test_session_limit() {
        let manager = SessionManager::new(1);
        manager.create(orchestrator()).unwrap();
        assert!(matches!(
            manager.create(orchestrator()),
            Err(ServerError::SessionLimit)
        ));
    }

    #[test]
    fn test_expired_sessions_make_room() {
        let manager =
            SessionManager::with_config(1, Duration::ZERO, Duration::from_secs(300));
        let first = manager.create(orchestrator()).unwrap();
        std::thread::sleep(Duration::from_millis(5));

        let second = manager.create(orchestrator()).unwrap();
        assert!(manager.get(&first.id).is_none());
        assert!(manager.get(&second.id).is_some());
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_on_shutdown() {
        let manager = Arc::new(SessionManager::with_config(
            10,
            Duration::ZERO,
            Duration::from_millis(10),
        ));
        manager.create(orchestrator()).unwrap();

        let shutdown = manager.start_cleanup_task();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(manager.count(), 0);

        shutdown.send(true).unwrap();
    }
}
