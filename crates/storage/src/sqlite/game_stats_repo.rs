use async_trait::async_trait;
use soroban_core::model::GameStats;

use super::SqliteRepository;
use super::mapping::map_stats_row;
use crate::repository::{GameStatsRepository, StorageError};

#[async_trait]
impl GameStatsRepository for SqliteRepository {
    async fn get_stats(&self) -> Result<GameStats, StorageError> {
        let row = sqlx::query(
            r"
            SELECT total_questions, correct_answers, accuracy, average_time, games_played
            FROM game_stats
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.as_ref()
            .map_or_else(|| Ok(GameStats::default()), map_stats_row)
    }

    async fn update_stats(&self, stats: &GameStats) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO game_stats (id, total_questions, correct_answers, accuracy, average_time, games_played)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                total_questions = excluded.total_questions,
                correct_answers = excluded.correct_answers,
                accuracy = excluded.accuracy,
                average_time = excluded.average_time,
                games_played = excluded.games_played
            ",
        )
        .bind(1_i64)
        .bind(i64::from(stats.total_questions))
        .bind(i64::from(stats.correct_answers))
        .bind(stats.accuracy)
        .bind(stats.average_time)
        .bind(i64::from(stats.games_played))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
