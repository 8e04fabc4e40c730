use rand::Rng;
use tracing::{debug, info};

use crate::generator::generate_with;
use crate::model::SessionConfig;
use crate::quiz::command::Command;
use crate::quiz::state::{AnswerResult, SessionState};

/// Fold one command into the session using the thread-local RNG.
#[must_use]
pub fn apply(state: SessionState, command: Command) -> SessionState {
    apply_with(state, command, &mut rand::rng())
}

/// Fold one command into the session.
///
/// The RNG is only consulted by `Start` and `NextQuestion`, which generate a
/// fresh expression. Commands that are not valid in the current state return
/// `state` unchanged.
pub fn apply_with<R: Rng + ?Sized>(
    mut state: SessionState,
    command: Command,
    rng: &mut R,
) -> SessionState {
    let name = command.name();
    match command {
        Command::Start(config) => {
            if state.has_started {
                return ignored(state, name, "already started");
            }
            let expression = generate_with(&config.difficulty(), rng);
            info!(
                digits = %config.digit_class(),
                operands = config.operand_count(),
                questions = config.question_count(),
                "session started"
            );
            SessionState {
                expression: Some(expression),
                has_started: true,
                settings: Some(config),
                ..SessionState::default()
            }
        }

        Command::AdvanceStep => {
            if !state.is_active() || state.is_at_last_step() {
                return ignored(state, name, "no step to advance");
            }
            state.step_index += 1;
            state
        }

        Command::SelectOption(value) => {
            if !state.is_active() || !state.is_at_last_step() || state.result.is_some() {
                return ignored(state, name, "not awaiting selection");
            }
            state.selected_option = Some(value);
            state
        }

        Command::CheckAnswer => {
            if !state.is_active() || state.result.is_some() {
                return ignored(state, name, "not awaiting a check");
            }
            let (Some(selected), Some(expression)) = (state.selected_option, &state.expression)
            else {
                return ignored(state, name, "nothing selected");
            };
            if selected == expression.correct_answer() {
                let award = state
                    .settings
                    .as_ref()
                    .map_or(1, SessionConfig::score_per_correct);
                state.total_score = state.total_score.saturating_add(award);
                state.result = Some(AnswerResult::Correct);
            } else {
                state.result = Some(AnswerResult::Incorrect);
            }
            debug!(selected, result = ?state.result, score = state.total_score, "answer checked");
            state
        }

        Command::NextQuestion => {
            if !state.is_active() || state.result.is_none() {
                return ignored(state, name, "question not graded");
            }
            let Some(settings) = state.settings.as_ref() else {
                return ignored(state, name, "no settings");
            };
            if state.current_question_number >= settings.question_count() {
                info!(score = state.total_score, "session finished");
                state.is_finished = true;
                return state;
            }
            state.expression = Some(generate_with(&settings.difficulty(), rng));
            state.step_index = 0;
            state.selected_option = None;
            state.result = None;
            state.error_message = None;
            state.current_question_number += 1;
            state
        }

        Command::SetError(message) => {
            debug!(%message, "session error recorded");
            state.error_message = Some(message);
            state
        }

        Command::Reset => SessionState::default(),
    }
}

fn ignored(state: SessionState, command: &'static str, reason: &'static str) -> SessionState {
    debug!(command, reason, "command ignored");
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Expression, Operator, SessionConfigDraft, Term};
    use crate::quiz::QuizPhase;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(questions: u32, score: u32) -> SessionConfig {
        SessionConfigDraft {
            operand_count: Some(2),
            speed_secs: Some(1),
            question_count: Some(questions),
            score_per_correct: Some(score),
            ..SessionConfigDraft::new()
        }
        .clamp()
    }

    fn five_minus_three() -> Expression {
        Expression::new(
            vec![Term::first(5), Term::new(Operator::Subtract, 3)],
            2,
            vec![2, 7, 1, 3],
        )
    }

    fn started(questions: u32, score: u32) -> SessionState {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = apply_with(
            SessionState::default(),
            Command::Start(config(questions, score)),
            &mut rng,
        );
        state.expression = Some(five_minus_three());
        state
    }

    fn at_terminal(questions: u32, score: u32) -> SessionState {
        let mut state = started(questions, score);
        state = apply(state, Command::AdvanceStep);
        apply(state, Command::AdvanceStep)
    }

    #[test]
    fn start_generates_first_question() {
        let state = apply(SessionState::default(), Command::Start(config(3, 1)));
        assert!(state.has_started());
        assert_eq!(state.current_question_number(), 1);
        assert_eq!(state.total_score(), 0);
        assert_eq!(state.step_index(), 0);
        assert_eq!(state.phase(), QuizPhase::Revealing);
        let expression = state.expression().unwrap();
        assert_eq!(expression.step_count(), 3);
    }

    #[test]
    fn start_is_ignored_once_started() {
        let state = started(3, 1);
        let again = apply(state.clone(), Command::Start(config(9, 9)));
        assert_eq!(again, state);
    }

    #[test]
    fn advance_walks_to_terminal_then_stops() {
        let state = started(3, 1);
        let state = apply(state, Command::AdvanceStep);
        assert_eq!(state.step_index(), 1);
        assert_eq!(state.current_step().unwrap().display, "- 3");

        let once = apply(state, Command::AdvanceStep);
        assert_eq!(once.phase(), QuizPhase::AwaitingSelection);
        let twice = apply(once.clone(), Command::AdvanceStep);
        assert_eq!(twice, once);
        assert_eq!(twice.visible_steps().len(), 3);
    }

    #[test]
    fn advance_before_start_is_a_no_op() {
        let state = apply(SessionState::default(), Command::AdvanceStep);
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn selection_only_at_terminal_step() {
        let early = apply(started(3, 1), Command::SelectOption(2));
        assert_eq!(early.selected_option(), None);

        let state = apply(at_terminal(3, 1), Command::SelectOption(7));
        let state = apply(state, Command::SelectOption(2));
        assert_eq!(state.selected_option(), Some(2));
    }

    #[test]
    fn check_without_selection_is_a_no_op() {
        let state = at_terminal(3, 1);
        assert_eq!(apply(state.clone(), Command::CheckAnswer), state);
    }

    #[test]
    fn correct_answer_scores_configured_points() {
        let state = apply(at_terminal(3, 5), Command::SelectOption(2));
        let state = apply(state, Command::CheckAnswer);
        assert_eq!(state.result(), Some(AnswerResult::Correct));
        assert_eq!(state.total_score(), 5);
        assert_eq!(state.phase(), QuizPhase::Answered);

        let again = apply(state.clone(), Command::CheckAnswer);
        assert_eq!(again.total_score(), 5);
    }

    #[test]
    fn wrong_answer_keeps_score() {
        let state = apply(at_terminal(3, 1), Command::SelectOption(7));
        let state = apply(state, Command::CheckAnswer);
        assert_eq!(state.result(), Some(AnswerResult::Incorrect));
        assert_eq!(state.total_score(), 0);
    }

    #[test]
    fn next_question_requires_a_result() {
        let state = at_terminal(3, 1);
        assert_eq!(apply(state.clone(), Command::NextQuestion), state);
    }

    #[test]
    fn next_question_resets_per_question_fields() {
        let state = apply(at_terminal(3, 1), Command::SelectOption(2));
        let state = apply(state, Command::CheckAnswer);
        let state = apply(state, Command::SetError("audio failed".into()));
        let state = apply(state, Command::NextQuestion);

        assert_eq!(state.current_question_number(), 2);
        assert_eq!(state.step_index(), 0);
        assert_eq!(state.selected_option(), None);
        assert_eq!(state.result(), None);
        assert_eq!(state.error_message(), None);
        assert_eq!(state.total_score(), 1);
        assert!(!state.is_finished());
    }

    #[test]
    fn last_question_finishes_without_generating() {
        let state = apply(at_terminal(1, 1), Command::SelectOption(2));
        let state = apply(state, Command::CheckAnswer);
        let finished = apply(state.clone(), Command::NextQuestion);

        assert!(finished.is_finished());
        assert_eq!(finished.phase(), QuizPhase::Finished);
        assert_eq!(finished.expression(), state.expression());
        assert_eq!(finished.current_question_number(), 1);

        let after = apply(finished.clone(), Command::AdvanceStep);
        assert_eq!(after, finished);
    }

    #[test]
    fn error_is_recorded_without_changing_progress() {
        let state = started(3, 1);
        let errored = apply(state.clone(), Command::SetError("timer lost".into()));
        assert_eq!(errored.error_message(), Some("timer lost"));
        assert_eq!(errored.step_index(), state.step_index());
        let advanced = apply(errored, Command::AdvanceStep);
        assert_eq!(advanced.step_index(), 1);
    }

    #[test]
    fn reset_returns_default_from_anywhere() {
        let graded = apply(apply(at_terminal(1, 1), Command::SelectOption(2)), Command::CheckAnswer);
        let finished = apply(graded.clone(), Command::NextQuestion);
        for state in [SessionState::default(), started(3, 1), graded, finished] {
            assert_eq!(apply(state, Command::Reset), SessionState::default());
        }
    }

    #[test]
    fn step_duration_only_while_revealing() {
        let state = started(3, 1);
        assert_eq!(state.step_duration().unwrap().as_millis(), 333);
        assert_eq!(at_terminal(3, 1).step_duration(), None);
    }
}
