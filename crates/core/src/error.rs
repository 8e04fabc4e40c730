use thiserror::Error;

use crate::model::{DigitClassError, GameSessionError, SettingsError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    DigitClass(#[from] DigitClassError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    GameSession(#[from] GameSessionError),
}
