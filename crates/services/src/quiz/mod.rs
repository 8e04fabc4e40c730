//! Drill orchestration on top of the pure reducer in `soroban_core::quiz`.

mod controller;
mod runner;
mod timer;

pub use controller::{AnswerRecord, QuizController, QuizSummary};
pub use runner::QuizRunner;
pub use timer::StepTimer;
