//! Drill session state machine.
//!
//! A session is driven by discrete [`Command`]s folded into a
//! [`SessionState`] by [`apply`]. Commands that make no sense in the current
//! state return the state unchanged; nothing in here fails.

mod command;
mod state;
pub mod timing;
mod transition;

#[cfg(test)]
mod proptests;

pub use command::Command;
pub use state::{AnswerResult, QuizPhase, SessionState};
pub use timing::{MIN_STEP_DURATION, step_duration};
pub use transition::{apply, apply_with};
