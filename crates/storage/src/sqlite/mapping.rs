use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use soroban_core::model::{GameSession, GameStats, SessionId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

fn from_json<T: DeserializeOwned>(field: &'static str, raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(format!("{field}: {e}")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<GameSession, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let id: SessionId = id.parse().map_err(ser)?;

    let settings: String = row.try_get("settings").map_err(ser)?;
    let problems: String = row.try_get("problems").map_err(ser)?;
    let answers: String = row.try_get("answers").map_err(ser)?;

    let start_time: DateTime<Utc> = row.try_get("start_time").map_err(ser)?;
    let end_time: Option<DateTime<Utc>> = row.try_get("end_time").map_err(ser)?;

    Ok(GameSession {
        id,
        settings: from_json("settings", &settings)?,
        problems: from_json("problems", &problems)?,
        answers: from_json("answers", &answers)?,
        start_time,
        end_time,
        score: i64_to_u32("score", row.try_get("score").map_err(ser)?)?,
        total_time: i64_to_u32("total_time", row.try_get("total_time").map_err(ser)?)?,
    })
}

pub(crate) fn map_stats_row(row: &SqliteRow) -> Result<GameStats, StorageError> {
    Ok(GameStats {
        total_questions: i64_to_u32(
            "total_questions",
            row.try_get("total_questions").map_err(ser)?,
        )?,
        correct_answers: i64_to_u32(
            "correct_answers",
            row.try_get("correct_answers").map_err(ser)?,
        )?,
        accuracy: row.try_get("accuracy").map_err(ser)?,
        average_time: row.try_get("average_time").map_err(ser)?,
        games_played: i64_to_u32("games_played", row.try_get("games_played").map_err(ser)?)?,
    })
}
