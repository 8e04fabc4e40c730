use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::{Expression, QuizStep, SessionConfig};
use crate::quiz::timing::step_duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerResult {
    Correct,
    Incorrect,
}

/// Where a session is in its lifecycle, derived from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Unstarted,
    /// Steps are still being revealed.
    Revealing,
    /// At the terminal step, waiting for the answer to be checked.
    AwaitingSelection,
    /// Graded; waiting for the next question.
    Answered,
    Finished,
}

/// Per-session state folded by [`crate::quiz::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub(crate) expression: Option<Expression>,
    pub(crate) step_index: usize,
    pub(crate) selected_option: Option<u64>,
    pub(crate) result: Option<AnswerResult>,
    pub(crate) error_message: Option<String>,
    pub(crate) has_started: bool,
    pub(crate) is_finished: bool,
    pub(crate) settings: Option<SessionConfig>,
    pub(crate) current_question_number: u32,
    pub(crate) total_score: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            expression: None,
            step_index: 0,
            selected_option: None,
            result: None,
            error_message: None,
            has_started: false,
            is_finished: false,
            settings: None,
            current_question_number: 1,
            total_score: 0,
        }
    }
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn expression(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }

    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<u64> {
        self.selected_option
    }

    #[must_use]
    pub fn result(&self) -> Option<AnswerResult> {
        self.result
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    #[must_use]
    pub fn has_started(&self) -> bool {
        self.has_started
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    #[must_use]
    pub fn settings(&self) -> Option<&SessionConfig> {
        self.settings.as_ref()
    }

    #[must_use]
    pub fn current_question_number(&self) -> u32 {
        self.current_question_number
    }

    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Started and not yet finished.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.has_started && !self.is_finished
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.expression.as_ref().map_or(0, Expression::step_count)
    }

    #[must_use]
    pub fn is_at_last_step(&self) -> bool {
        self.expression
            .as_ref()
            .is_some_and(|e| self.step_index >= e.last_step_index())
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&QuizStep> {
        self.expression
            .as_ref()
            .and_then(|e| e.steps().get(self.step_index))
    }

    /// Steps revealed so far, including the current one.
    #[must_use]
    pub fn visible_steps(&self) -> &[QuizStep] {
        match self.expression.as_ref() {
            Some(e) => {
                let end = (self.step_index + 1).min(e.step_count());
                &e.steps()[..end]
            }
            None => &[],
        }
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        if !self.has_started {
            QuizPhase::Unstarted
        } else if self.is_finished {
            QuizPhase::Finished
        } else if self.result.is_some() {
            QuizPhase::Answered
        } else if self.is_at_last_step() {
            QuizPhase::AwaitingSelection
        } else {
            QuizPhase::Revealing
        }
    }

    /// How long the current step stays on screen before the timer advances it.
    ///
    /// `None` unless the session is still revealing steps.
    #[must_use]
    pub fn step_duration(&self) -> Option<Duration> {
        if self.phase() != QuizPhase::Revealing {
            return None;
        }
        let settings = self.settings.as_ref()?;
        Some(step_duration(settings.speed_secs(), self.step_count()))
    }
}
