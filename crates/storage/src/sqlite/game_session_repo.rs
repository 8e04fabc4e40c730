use async_trait::async_trait;
use soroban_core::model::{GameSession, SessionId};
use tracing::debug;

use super::SqliteRepository;
use super::mapping::{map_session_row, to_json};
use crate::repository::{GameSessionRepository, StorageError};

#[async_trait]
impl GameSessionRepository for SqliteRepository {
    async fn create_session(&self, session: &GameSession) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO game_sessions (id, settings, problems, answers, start_time, end_time, score, total_time)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(session.id.to_string())
        .bind(to_json(&session.settings)?)
        .bind(to_json(&session.problems)?)
        .bind(to_json(&session.answers)?)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(i64::from(session.score))
        .bind(i64::from(session.total_time))
        .execute(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
            other => StorageError::Connection(other.to_string()),
        })?;

        debug!(session = %session.id, "session inserted");
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<GameSession, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, settings, problems, answers, start_time, end_time, score, total_time
            FROM game_sessions
            WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Err(StorageError::NotFound);
        };
        map_session_row(&row)
    }

    async fn update_session(&self, session: &GameSession) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE game_sessions SET
                settings = ?2,
                problems = ?3,
                answers = ?4,
                start_time = ?5,
                end_time = ?6,
                score = ?7,
                total_time = ?8
            WHERE id = ?1
            ",
        )
        .bind(session.id.to_string())
        .bind(to_json(&session.settings)?)
        .bind(to_json(&session.problems)?)
        .bind(to_json(&session.answers)?)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(i64::from(session.score))
        .bind(i64::from(session.total_time))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        debug!(session = %session.id, complete = session.is_complete(), "session updated");
        Ok(())
    }
}
