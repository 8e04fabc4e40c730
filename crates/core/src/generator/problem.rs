use rand::Rng;

use crate::model::{GameSettings, MathProblem, Operator, ProblemId};

/// Re-rolls allowed before a zero-result subtraction falls back to addition.
const MAX_REROLLS: usize = 32;

/// Generate `settings.question_count()` two-operand problems.
pub fn generate_problems<R: Rng + ?Sized>(settings: &GameSettings, rng: &mut R) -> Vec<MathProblem> {
    (0..settings.question_count())
        .map(|_| generate_problem(settings, rng))
        .collect()
}

/// Generate one problem with a strictly positive answer.
///
/// Subtraction operands are ordered larger-first so the result is never negative.
pub fn generate_problem<R: Rng + ?Sized>(settings: &GameSettings, rng: &mut R) -> MathProblem {
    let max_number = settings.max_number().max(1);

    for _ in 0..MAX_REROLLS {
        let a = rng.random_range(1..=max_number);
        let b = rng.random_range(1..=max_number);
        if rng.random_bool(0.5) {
            return build(settings, a, b, Operator::Add);
        }
        let (number1, number2) = if a < b { (b, a) } else { (a, b) };
        if number1 > number2 {
            return build(settings, number1, number2, Operator::Subtract);
        }
    }

    let a = rng.random_range(1..=max_number);
    let b = rng.random_range(1..=max_number);
    build(settings, a, b, Operator::Add)
}

fn build(settings: &GameSettings, number1: u64, number2: u64, operator: Operator) -> MathProblem {
    let correct_answer = match operator {
        Operator::Add => number1 + number2,
        Operator::Subtract => number1 - number2,
    };
    MathProblem {
        id: ProblemId::new(),
        number1,
        number2,
        operator,
        correct_answer,
        difficulty: settings.difficulty(),
    }
}
