use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use soroban_core::model::{Grade, SessionConfig};
use soroban_core::quiz::{AnswerResult, Command, QuizPhase, SessionState, apply_with};

use crate::Clock;
use crate::error::QuizError;

/// One graded question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_number: u32,
    pub selected: u64,
    pub correct: u64,
    pub is_correct: bool,
    /// Seconds from the question appearing to the answer being checked.
    pub time_spent_secs: u32,
}

/// Totals for the questions answered so far.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSummary {
    pub answered: u32,
    pub correct: u32,
    pub total_score: u32,
    pub accuracy_percent: u32,
    pub average_time_secs: f64,
    pub grade: Grade,
}

/// Owns a drill session and guards the reducer with explicit errors.
///
/// The reducer silently ignores commands that do not fit the current phase;
/// the controller rejects them instead so callers can surface the mistake.
/// It also stamps each question with the clock to record answer times.
pub struct QuizController {
    state: SessionState,
    clock: Clock,
    rng: StdRng,
    question_started_at: Option<DateTime<Utc>>,
    records: Vec<AnswerRecord>,
}

impl QuizController {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self::with_rng(clock, StdRng::from_rng(&mut rand::rng()))
    }

    /// Controller whose questions are reproducible for a given seed.
    #[must_use]
    pub fn with_seed(clock: Clock, seed: u64) -> Self {
        Self::with_rng(clock, StdRng::seed_from_u64(seed))
    }

    fn with_rng(clock: Clock, rng: StdRng) -> Self {
        Self {
            state: SessionState::default(),
            clock,
            rng,
            question_started_at: None,
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Mutable access for advancing a fixed clock.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Begin a session with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadyStarted` unless the controller is unstarted.
    pub fn start(&mut self, config: SessionConfig) -> Result<(), QuizError> {
        if self.state.has_started() {
            return Err(QuizError::AlreadyStarted);
        }
        if let Some(pacing) = config.pacing_warning() {
            warn!(
                step_secs = pacing.step_secs,
                effective_total_secs = pacing.effective_total_secs,
                "speed leaves little time per row"
            );
        }
        self.dispatch(Command::Start(config));
        self.records.clear();
        self.question_started_at = Some(self.clock.now());
        Ok(())
    }

    /// Reveal the next step. Returns whether the step index moved.
    pub fn advance_step(&mut self) -> bool {
        let before = self.state.step_index();
        self.dispatch(Command::AdvanceStep);
        self.state.step_index() != before
    }

    /// Choose one of the offered options.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidOption` if `value` is not offered, or a phase
    /// error unless the session is awaiting a selection.
    pub fn select_option(&mut self, value: u64) -> Result<(), QuizError> {
        self.require(QuizPhase::AwaitingSelection)?;
        let offered = self
            .state
            .expression()
            .is_some_and(|expr| expr.is_option(value));
        if !offered {
            return Err(QuizError::InvalidOption(value));
        }
        self.dispatch(Command::SelectOption(value));
        Ok(())
    }

    /// Grade the selected option and record the answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoSelection` if nothing is selected, or a phase
    /// error unless the session is awaiting a selection.
    pub fn check_answer(&mut self) -> Result<AnswerResult, QuizError> {
        self.require(QuizPhase::AwaitingSelection)?;
        let Some(selected) = self.state.selected_option() else {
            return Err(QuizError::NoSelection);
        };
        let correct = self
            .state
            .expression()
            .map(|expr| expr.correct_answer())
            .ok_or(QuizError::NotStarted)?;

        self.dispatch(Command::CheckAnswer);
        let result = self.state.result().ok_or(QuizError::NoSelection)?;

        let time_spent_secs = self
            .question_started_at
            .map_or(0, |at| self.clock.elapsed_secs(at));
        let record = AnswerRecord {
            question_number: self.state.current_question_number(),
            selected,
            correct,
            is_correct: result == AnswerResult::Correct,
            time_spent_secs,
        };
        debug!(?record, "answer recorded");
        self.records.push(record);
        Ok(result)
    }

    /// Move on after grading; finishes the session after the last question.
    ///
    /// # Errors
    ///
    /// Returns a phase error unless the current question has been graded.
    pub fn next_question(&mut self) -> Result<(), QuizError> {
        self.require(QuizPhase::Answered)?;
        self.dispatch(Command::NextQuestion);
        if self.state.is_finished() {
            self.question_started_at = None;
            let summary = self.summary();
            info!(
                answered = summary.answered,
                correct = summary.correct,
                score = summary.total_score,
                "drill finished"
            );
        } else {
            self.question_started_at = Some(self.clock.now());
        }
        Ok(())
    }

    /// Attach a user-visible error to the session.
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.dispatch(Command::SetError(message.into()));
    }

    /// Drop the session and every recorded answer.
    pub fn reset(&mut self) {
        self.dispatch(Command::Reset);
        self.records.clear();
        self.question_started_at = None;
    }

    #[must_use]
    pub fn summary(&self) -> QuizSummary {
        let answered = u32::try_from(self.records.len()).unwrap_or(u32::MAX);
        let correct = u32::try_from(self.records.iter().filter(|r| r.is_correct).count())
            .unwrap_or(u32::MAX);
        let (accuracy_percent, average_time_secs) = if answered == 0 {
            (0, 0.0)
        } else {
            let spent: f64 = self
                .records
                .iter()
                .map(|r| f64::from(r.time_spent_secs))
                .sum();
            let accuracy = (f64::from(correct) / f64::from(answered) * 100.0).round();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let accuracy = accuracy as u32;
            (accuracy, spent / f64::from(answered))
        };
        QuizSummary {
            answered,
            correct,
            total_score: self.state.total_score(),
            accuracy_percent,
            average_time_secs,
            grade: Grade::from_accuracy(accuracy_percent),
        }
    }

    fn require(&self, expected: QuizPhase) -> Result<(), QuizError> {
        let actual = self.state.phase();
        if actual == expected {
            return Ok(());
        }
        Err(match actual {
            QuizPhase::Unstarted => QuizError::NotStarted,
            QuizPhase::Finished => QuizError::Finished,
            _ => QuizError::WrongPhase { expected, actual },
        })
    }

    fn dispatch(&mut self, command: Command) {
        let state = std::mem::take(&mut self.state);
        self.state = apply_with(state, command, &mut self.rng);
    }
}
