use async_trait::async_trait;
use soroban_core::model::{GameSession, GameStats, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for game sessions.
#[async_trait]
pub trait GameSessionRepository: Send + Sync {
    /// Persist a new session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a session with the same ID exists.
    async fn create_session(&self, session: &GameSession) -> Result<(), StorageError>;

    /// Fetch a session by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_session(&self, id: SessionId) -> Result<GameSession, StorageError>;

    /// Replace a stored session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session was never created.
    async fn update_session(&self, session: &GameSession) -> Result<(), StorageError>;
}

/// Repository contract for the aggregate statistics row.
#[async_trait]
pub trait GameStatsRepository: Send + Sync {
    /// Fetch the aggregate; an empty store yields zeroed stats.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stats cannot be read.
    async fn get_stats(&self) -> Result<GameStats, StorageError>;

    /// Overwrite the aggregate.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stats cannot be stored.
    async fn update_stats(&self, stats: &GameStats) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sessions: Arc<Mutex<HashMap<SessionId, GameSession>>>,
    stats: Arc<Mutex<GameStats>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl GameSessionRepository for InMemoryRepository {
    async fn create_session(&self, session: &GameSession) -> Result<(), StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        if guard.contains_key(&session.id) {
            return Err(StorageError::Conflict);
        }
        guard.insert(session.id, session.clone());
        debug!(session = %session.id, "session created");
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<GameSession, StorageError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn update_session(&self, session: &GameSession) -> Result<(), StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        let slot = guard.get_mut(&session.id).ok_or(StorageError::NotFound)?;
        *slot = session.clone();
        Ok(())
    }
}

#[async_trait]
impl GameStatsRepository for InMemoryRepository {
    async fn get_stats(&self) -> Result<GameStats, StorageError> {
        let guard = self.stats.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    async fn update_stats(&self, stats: &GameStats) -> Result<(), StorageError> {
        let mut guard = self.stats.lock().map_err(poisoned)?;
        *guard = stats.clone();
        Ok(())
    }
}

/// Aggregates session and stats repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn GameSessionRepository>,
    pub stats: Arc<dyn GameStatsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let sessions: Arc<dyn GameSessionRepository> = Arc::new(repo.clone());
        let stats: Arc<dyn GameStatsRepository> = Arc::new(repo);
        Self { sessions, stats }
    }
}
