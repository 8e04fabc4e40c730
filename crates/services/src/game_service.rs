use std::sync::Arc;

use tracing::info;

use soroban_core::generator::generate_problems;
use soroban_core::model::{
    GameAnswer, GameSession, GameSettingsDraft, GameStats, SessionId,
};
use storage::repository::{GameSessionRepository, GameStatsRepository, Storage};

use crate::Clock;
use crate::error::GameError;

/// Creates, persists and finishes two-operand games, keeping the aggregate stats current.
#[derive(Clone)]
pub struct GameService {
    clock: Clock,
    sessions: Arc<dyn GameSessionRepository>,
    stats: Arc<dyn GameStatsRepository>,
}

impl GameService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn GameSessionRepository>,
        stats: Arc<dyn GameStatsRepository>,
    ) -> Self {
        Self {
            clock,
            sessions,
            stats,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(clock, Arc::clone(&storage.sessions), Arc::clone(&storage.stats))
    }

    /// Validate settings, generate the problem set and persist a new session.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Settings` for out-of-range settings.
    /// Returns `GameError::Storage` if persistence fails.
    pub async fn start_game(&self, draft: GameSettingsDraft) -> Result<GameSession, GameError> {
        let settings = draft.validate()?;
        let problems = generate_problems(&settings, &mut rand::rng());
        let session = GameSession::new(SessionId::new(), settings, problems, self.clock.now());
        self.sessions.create_session(&session).await?;
        info!(
            session = %session.id,
            questions = session.problems.len(),
            "game started"
        );
        Ok(session)
    }

    /// Fetch a session by ID.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Storage` (including `NotFound`) if the fetch fails.
    pub async fn get_game(&self, id: SessionId) -> Result<GameSession, GameError> {
        Ok(self.sessions.get_session(id).await?)
    }

    /// Store a client-modified session after checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns `GameError::GameSession` if the session is inconsistent.
    /// Returns `GameError::Storage` if persistence fails.
    pub async fn update_game(&self, session: &GameSession) -> Result<(), GameError> {
        session.validate()?;
        self.sessions.update_session(session).await?;
        Ok(())
    }

    /// Close a session with the final answers and fold it into the stats.
    ///
    /// # Errors
    ///
    /// Returns `GameError::AlreadyFinished` if the session was already closed.
    /// Returns `GameError::GameSession` if the answers do not match its problems.
    /// Returns `GameError::Storage` if persistence fails.
    pub async fn finish_game(
        &self,
        id: SessionId,
        answers: Vec<GameAnswer>,
    ) -> Result<GameSession, GameError> {
        let mut session = self.sessions.get_session(id).await?;
        if session.is_complete() {
            return Err(GameError::AlreadyFinished);
        }
        session.complete(answers, self.clock.now())?;
        self.sessions.update_session(&session).await?;

        let mut stats = self.stats.get_stats().await?;
        stats.record(&session);
        self.stats.update_stats(&stats).await?;

        info!(
            session = %session.id,
            score = session.score,
            accuracy = session.accuracy_percent(),
            games_played = stats.games_played,
            "game finished"
        );
        Ok(session)
    }

    /// Aggregate statistics across finished games.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Storage` if the stats cannot be read.
    pub async fn stats(&self) -> Result<GameStats, GameError> {
        Ok(self.stats.get_stats().await?)
    }

    /// Overwrite the aggregate statistics.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Storage` if the stats cannot be stored.
    pub async fn update_stats(&self, stats: &GameStats) -> Result<(), GameError> {
        self.stats.update_stats(stats).await?;
        Ok(())
    }
}
