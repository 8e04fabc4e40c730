use serde::{Deserialize, Serialize};

use crate::model::SessionConfig;

/// Everything that can happen to a drill session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Begin a session and generate its first expression.
    Start(SessionConfig),
    /// Reveal the next step. Issued by the step timer only.
    AdvanceStep,
    /// Pick an answer option at the terminal step.
    SelectOption(u64),
    /// Grade the selected option.
    CheckAnswer,
    /// Move on after grading, or finish after the last question.
    NextQuestion,
    /// Record an advisory error from audio or timer collaborators.
    SetError(String),
    Reset,
}

impl Command {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start(_) => "start",
            Command::AdvanceStep => "advance_step",
            Command::SelectOption(_) => "select_option",
            Command::CheckAnswer => "check_answer",
            Command::NextQuestion => "next_question",
            Command::SetError(_) => "set_error",
            Command::Reset => "reset",
        }
    }
}
