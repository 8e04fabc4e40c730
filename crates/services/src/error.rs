//! Shared error types for the services crate.

use thiserror::Error;

use soroban_core::model::{GameSessionError, SettingsError};
use soroban_core::quiz::QuizPhase;
use storage::repository::StorageError;

/// Errors emitted by `QuizController` when a command does not fit the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("session has not started")]
    NotStarted,
    #[error("session already started")]
    AlreadyStarted,
    #[error("session is finished")]
    Finished,
    #[error("{0} is not one of the offered options")]
    InvalidOption(u64),
    #[error("no option selected")]
    NoSelection,
    #[error("expected {expected:?} but session is {actual:?}")]
    WrongPhase {
        expected: QuizPhase,
        actual: QuizPhase,
    },
}

/// Errors emitted by `GameService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameError {
    #[error("game already finished")]
    AlreadyFinished,
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    GameSession(#[from] GameSessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
