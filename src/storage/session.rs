use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Dataset, StyleConfig};
use crate::{AppError, Result};

/// Generated workbooks keyed by file name (`<supplier>.xlsx`).
pub type GeneratedFiles = BTreeMap<String, Bytes>;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Everything one user works on between an upload and the end of the session.
#[derive(Debug, Clone)]
pub struct Session {
    pub file_name: String,
    pub dataset: Dataset,
    pub style: StyleConfig,
    pub files: GeneratedFiles,
    last_access: Instant,
}
impl Session {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_access.elapsed() > ttl
    }
}

/// In-memory session store. Sessions never see each other's data.
///
/// A session idle for longer than the TTL is dropped: lazily when it is next
/// touched, on every new upload, and by [`SessionStorage::evict_expired`].
#[derive(Clone)]
pub struct SessionStorage {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}
impl Default for SessionStorage {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}
impl SessionStorage {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
    /// Starts a session for a fresh upload; it owns no generated files yet.
    pub async fn create(&self, file_name: String, dataset: Dataset, style: StyleConfig) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(self.ttl));
        if sessions.len() < before {
            debug!("{} sessões expiradas removidas", before - sessions.len());
        }
        info!("Sessão {id} criada para '{file_name}'");
        let session = Session {
            file_name,
            dataset,
            style,
            files: GeneratedFiles::new(),
            last_access: Instant::now(),
        };
        sessions.insert(id, session);
        id
    }
    /// Runs `f` on a live session and marks it as used.
    async fn touch<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
        let mut sessions = self.sessions.write().await;
        if sessions.get(&id).is_some_and(|s| s.is_expired(self.ttl)) {
            sessions.remove(&id);
            info!("Sessão {id} expirou");
        }
        let session = sessions.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        session.last_access = Instant::now();
        f(session)
    }
    pub async fn get(&self, id: Uuid) -> Result<Session> {
        self.touch(id, |s| Ok(s.clone())).await
    }
    /// Replaces the whole file set of a session.
    pub async fn replace_files(&self, id: Uuid, files: GeneratedFiles) -> Result<()> {
        self.touch(id, |s| {
            s.files = files;
            Ok(())
        })
        .await
    }
    pub async fn set_style(&self, id: Uuid, style: StyleConfig) -> Result<()> {
        self.touch(id, |s| {
            s.style = style;
            Ok(())
        })
        .await
    }
    pub async fn files(&self, id: Uuid) -> Result<GeneratedFiles> {
        self.touch(id, |s| Ok(s.files.clone())).await
    }
    /// Uploaded file name and generated file names, without copying any content.
    pub async fn listing(&self, id: Uuid) -> Result<(String, Vec<String>)> {
        self.touch(id, |s| Ok((s.file_name.clone(), s.files.keys().cloned().collect())))
            .await
    }
    pub async fn file(&self, id: Uuid, name: &str) -> Result<Bytes> {
        self.touch(id, |s| {
            s.files
                .get(name)
                .cloned()
                .ok_or_else(|| AppError::FileNotFound(name.to_string()))
        })
        .await
    }
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!("Sessão {id} encerrada");
                Ok(())
            }
            None => Err(AppError::SessionNotFound(id)),
        }
    }
    /// Drops every idle session; returns how many were dropped.
    pub async fn evict_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(self.ttl));
        before - sessions.len()
    }
    /// Periodic sweep, meant to be spawned once at start-up.
    pub async fn run_sweeper(self) {
        let mut interval = tokio::time::interval(self.ttl.max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            let evicted = self.evict_expired().await;
            if evicted > 0 {
                info!("{evicted} sessões expiradas removidas");
            }
        }
    }
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
