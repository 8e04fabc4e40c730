use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, watch};
use tracing::trace;

use soroban_core::model::SessionConfig;
use soroban_core::quiz::{AnswerResult, SessionState};

use super::controller::{QuizController, QuizSummary};
use super::timer::StepTimer;
use crate::error::QuizError;

struct Shared {
    controller: QuizController,
    timer: StepTimer,
    updates: watch::Sender<SessionState>,
}

impl Shared {
    fn publish(&self) {
        self.updates.send_replace(self.controller.state().clone());
    }
}

/// Drives a [`QuizController`] in real time.
///
/// Steps advance on their own while the question is revealing; every other
/// command comes from the caller. Commands and timer expiries are serialized
/// through one lock, and each state change is broadcast to subscribers.
#[derive(Clone)]
pub struct QuizRunner {
    shared: Arc<Mutex<Shared>>,
    updates: watch::Receiver<SessionState>,
}

impl QuizRunner {
    #[must_use]
    pub fn new(controller: QuizController) -> Self {
        let (tx, rx) = watch::channel(controller.state().clone());
        let shared = Shared {
            controller,
            timer: StepTimer::new(),
            updates: tx,
        };
        Self {
            shared: Arc::new(Mutex::new(shared)),
            updates: rx,
        }
    }

    /// Receiver that sees every state change, starting from the current one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.clone()
    }

    pub async fn state(&self) -> SessionState {
        self.shared.lock().await.controller.state().clone()
    }

    pub async fn summary(&self) -> QuizSummary {
        self.shared.lock().await.controller.summary()
    }

    /// Start the session and begin revealing steps.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadyStarted` if a session is running.
    pub async fn start(&self, config: SessionConfig) -> Result<(), QuizError> {
        let mut inner = self.shared.lock().await;
        inner.controller.start(config)?;
        inner.publish();
        arm(&self.shared, &mut inner);
        Ok(())
    }

    /// # Errors
    ///
    /// See [`QuizController::select_option`].
    pub async fn select_option(&self, value: u64) -> Result<(), QuizError> {
        let mut inner = self.shared.lock().await;
        inner.controller.select_option(value)?;
        inner.publish();
        Ok(())
    }

    /// # Errors
    ///
    /// See [`QuizController::check_answer`].
    pub async fn check_answer(&self) -> Result<AnswerResult, QuizError> {
        let mut inner = self.shared.lock().await;
        let result = inner.controller.check_answer()?;
        inner.publish();
        Ok(result)
    }

    /// Move to the next question and start revealing it.
    ///
    /// # Errors
    ///
    /// See [`QuizController::next_question`].
    pub async fn next_question(&self) -> Result<(), QuizError> {
        let mut inner = self.shared.lock().await;
        inner.controller.next_question()?;
        inner.publish();
        arm(&self.shared, &mut inner);
        Ok(())
    }

    pub async fn report_error(&self, message: impl Into<String>) {
        let mut inner = self.shared.lock().await;
        inner.controller.report_error(message);
        inner.publish();
    }

    /// Stop the timer and return to an unstarted session.
    pub async fn reset(&self) {
        let mut inner = self.shared.lock().await;
        inner.timer.cancel();
        inner.controller.reset();
        inner.publish();
    }
}

/// Schedule the next automatic advance, or cancel the timer when no step is revealing.
fn arm(shared: &Arc<Mutex<Shared>>, inner: &mut Shared) {
    let Some(delay) = inner.controller.state().step_duration() else {
        inner.timer.cancel();
        return;
    };
    let weak = Arc::downgrade(shared);
    inner
        .timer
        .schedule(delay, move |generation| on_expire(weak, generation));
}

async fn on_expire(weak: Weak<Mutex<Shared>>, generation: u64) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut inner = shared.lock().await;
    if inner.timer.generation() != generation {
        trace!(generation, "stale step expiry ignored");
        return;
    }
    inner.timer.release();
    if inner.controller.advance_step() {
        inner.publish();
    }
    arm(&shared, &mut inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_core::model::SessionConfigDraft;
    use soroban_core::quiz::QuizPhase;
    use soroban_core::time::fixed_clock;
    use std::time::Duration;

    fn config() -> SessionConfig {
        SessionConfigDraft {
            operand_count: Some(2),
            speed_secs: Some(1),
            question_count: Some(2),
            ..SessionConfigDraft::new()
        }
        .clamp()
    }

    #[tokio::test(start_paused = true)]
    async fn reveals_steps_on_schedule() {
        let runner = QuizRunner::new(QuizController::with_seed(fixed_clock(), 11));
        runner.start(config()).await.unwrap();
        assert_eq!(runner.state().await.step_index(), 0);

        tokio::time::sleep(Duration::from_millis(340)).await;
        assert_eq!(runner.state().await.step_index(), 1);

        tokio::time::sleep(Duration::from_millis(340)).await;
        let state = runner.state().await;
        assert_eq!(state.phase(), QuizPhase::AwaitingSelection);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runner.state().await.step_index(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_the_reveal() {
        let runner = QuizRunner::new(QuizController::with_seed(fixed_clock(), 12));
        runner.start(config()).await.unwrap();
        runner.reset().await;

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runner.state().await, SessionState::default());
    }
}
