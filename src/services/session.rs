use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{DecimalCoordinate, MetadataRecord};

/// Everything one client is editing
#[derive(Debug, Clone)]
pub struct PhotoSession {
    pub id: Uuid,
    pub file_name: String,
    pub original: Arc<Vec<u8>>,
    pub metadata: MetadataRecord,
    pub coordinates: Option<DecimalCoordinate>,
    pub modified: Option<Arc<Vec<u8>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PhotoSession {
    pub fn new(
        file_name: String,
        original: Vec<u8>,
        metadata: MetadataRecord,
        coordinates: Option<DecimalCoordinate>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            file_name,
            original: Arc::new(original),
            metadata,
            coordinates,
            modified: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// In-memory sessions keyed by id. Sessions never see each other's state.
#[derive(Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, PhotoSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: PhotoSession) -> Uuid {
        let id = session.id;
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, session);
        id
    }

    /// Get a snapshot of a session
    pub async fn get(&self, id: &Uuid) -> Option<PhotoSession> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }

    /// Apply `update` to a session, bumping its `updated_at`.
    /// Returns `None` if the session does not exist.
    pub async fn update<F, T>(&self, id: &Uuid, update: F) -> Option<T>
    where
        F: FnOnce(&mut PhotoSession) -> T,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        let result = update(session);
        session.updated_at = Utc::now();
        Some(result)
    }

    pub async fn remove(&self, id: &Uuid) -> Option<PhotoSession> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id)
    }

    pub async fn len(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop sessions idle for longer than `ttl`, returning how many went
    pub async fn purge_idle(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.updated_at >= cutoff);
        before - sessions.len()
    }
}
