#![forbid(unsafe_code)]

pub mod error;
pub mod game_service;
pub mod quiz;

pub use soroban_core::Clock;

pub use error::{GameError, QuizError};
pub use game_service::GameService;
pub use quiz::{AnswerRecord, QuizController, QuizRunner, QuizSummary, StepTimer};
