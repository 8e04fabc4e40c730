use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

use crate::generator::{OPTION_COUNT, generate_with};
use crate::model::{CorrectionPolicy, DifficultyConfig, DigitClass, SessionConfigDraft};
use crate::quiz::{Command, SessionState, apply_with};

fn digit_class() -> impl Strategy<Value = DigitClass> {
    prop::sample::select(DigitClass::ALL.to_vec())
}

fn correction() -> impl Strategy<Value = CorrectionPolicy> {
    prop_oneof![Just(CorrectionPolicy::Clamp), Just(CorrectionPolicy::Reflect)]
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        (1u32..=4, 1u32..=3).prop_map(|(operands, questions)| {
            Command::Start(
                SessionConfigDraft {
                    operand_count: Some(operands + 1),
                    question_count: Some(questions),
                    ..SessionConfigDraft::new()
                }
                .clamp(),
            )
        }),
        Just(Command::AdvanceStep),
        Just(Command::AdvanceStep),
        Just(Command::AdvanceStep),
        (0u64..20).prop_map(Command::SelectOption),
        Just(Command::CheckAnswer),
        Just(Command::NextQuestion),
        "[a-z ]{0,12}".prop_map(Command::SetError),
        Just(Command::Reset),
    ]
}

proptest! {
    #[test]
    fn generated_expressions_hold_their_invariants(
        class in digit_class(),
        operands in 1u32..=12,
        policy in correction(),
        seed in any::<u64>(),
    ) {
        let config = DifficultyConfig::new(class, operands).with_correction(policy);
        let mut rng = StdRng::seed_from_u64(seed);
        let expr = generate_with(&config, &mut rng);

        prop_assert_eq!(expr.terms().len(), operands as usize);
        prop_assert_eq!(expr.step_count(), operands as usize + 1);
        prop_assert_eq!(expr.evaluate(), expr.correct_answer() as i64);

        let max_sum = config.max_sum() as i64;
        for sum in expr.running_sums() {
            prop_assert!((0..max_sum).contains(&sum), "sum {} outside [0, {})", sum, max_sum);
        }

        let min = class.range().min;
        for term in expr.terms() {
            prop_assert!(term.operand >= min);
        }

        prop_assert_eq!(expr.options().len(), OPTION_COUNT);
        let distinct: HashSet<_> = expr.options().iter().collect();
        prop_assert_eq!(distinct.len(), OPTION_COUNT);
        prop_assert!(expr.is_option(expr.correct_answer()));
    }

    #[test]
    fn reducer_keeps_session_consistent(
        commands in prop::collection::vec(command(), 0..40),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = SessionState::default();
        for command in commands {
            let before = state.clone();
            let is_advance = matches!(command, Command::AdvanceStep);
            state = apply_with(state, command, &mut rng);

            if is_advance && before.is_at_last_step() {
                prop_assert_eq!(&state, &before);
            }
            if state.has_started() {
                prop_assert!(state.expression().is_some());
                prop_assert!(state.step_index() < state.step_count());
                let questions = state.settings().map_or(0, |s| s.question_count());
                prop_assert!(state.current_question_number() <= questions);
            }
            if state.selected_option().is_some() {
                prop_assert!(state.is_at_last_step());
            }
        }
        prop_assert_eq!(apply_with(state, Command::Reset, &mut rng), SessionState::default());
    }
}
