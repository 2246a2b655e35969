// src/quiz/registry.rs

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::quiz::session::{QuizSession, SessionError};

/// In-memory home of active quiz sessions.
///
/// A session is only visible to the user who started it; everyone else gets
/// `SessionError::NotFound`.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, QuizSession>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Stores a new session, dropping idle ones first.
    pub async fn insert(&self, session: QuizSession, now: DateTime<Utc>) -> Uuid {
        let mut sessions = self.sessions.lock().await;

        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_activity() <= self.ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!("Pruned {} idle quiz sessions", pruned);
        }

        let id = Uuid::new_v4();
        sessions.insert(id, session);
        id
    }

    /// Runs `f` on the caller's session while holding the registry lock.
    pub async fn with_session<F, R>(&self, id: Uuid, user_id: i64, f: F) -> Result<R, SessionError>
    where
        F: FnOnce(&mut QuizSession) -> Result<R, SessionError>,
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .filter(|s| s.user_id() == user_id)
            .ok_or(SessionError::NotFound)?;
        f(session)
    }

    /// Discards the caller's session and hands it back.
    pub async fn remove(&self, id: Uuid, user_id: i64) -> Result<QuizSession, SessionError> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(&id) {
            Some(s) if s.user_id() == user_id => sessions.remove(&id).ok_or(SessionError::NotFound),
            _ => Err(SessionError::NotFound),
        }
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
