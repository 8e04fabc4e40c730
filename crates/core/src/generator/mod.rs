//! Expression generation for the drills.
//!
//! The generator draws a leading operand, then a run of signed operands whose
//! running total stays inside `[0, max_sum)`. Operand sizes are biased low so
//! the total does not swing across the whole range. A drawn operand that
//! would leave the range gets one local repair according to the configured
//! [`CorrectionPolicy`]; earlier operands are never re-rolled.

mod decoys;
mod problem;

use rand::Rng;
use tracing::debug;

use crate::model::{
    CorrectionPolicy, DifficultyConfig, DigitRange, Expression, Operator, Term, evaluate_terms,
};

pub use decoys::OPTION_COUNT;
pub use problem::{generate_problem, generate_problems};

/// Generate an expression using the thread-local RNG.
#[must_use]
pub fn generate(config: &DifficultyConfig) -> Expression {
    generate_with(config, &mut rand::rng())
}

/// Generate an expression from the given RNG.
///
/// Seeding the RNG makes the output reproducible.
pub fn generate_with<R: Rng + ?Sized>(config: &DifficultyConfig, rng: &mut R) -> Expression {
    let terms = draw_terms(config, rng);

    // Authoritative answer: re-evaluate the final terms rather than trusting the
    // bookkeeping done while drawing.
    let answer = evaluate_terms(&terms);
    let correct = u64::try_from(answer).unwrap_or_default();

    let options = decoys::build_options(correct, config.digit_class(), rng);
    Expression::new(terms, correct, options)
}

fn draw_terms<R: Rng + ?Sized>(config: &DifficultyConfig, rng: &mut R) -> Vec<Term> {
    let DigitRange { min, max } = config.range();
    let max_sum = config.max_sum();
    let ceiling = to_i64(max_sum) - 1;
    let count = usize::try_from(config.operand_count()).unwrap_or(1).max(1);

    let mut terms = Vec::with_capacity(count);

    let first_max = max.min(max_sum / 2).max(min);
    let first = rng.random_range(min..=first_max);
    terms.push(Term::first(first));
    let mut sum = to_i64(first);
    debug!(operand = first, sum, "first operand");

    let biased_max = max.min(max_sum / 4).max(min);

    for index in 1..count {
        let drawn = if rng.random_bool(0.5) {
            Operator::Add
        } else {
            Operator::Subtract
        };
        let operator = feasible_operator(drawn, sum, min, ceiling);

        let room = match operator {
            Operator::Add => max_sum.saturating_sub(to_u64(sum)),
            Operator::Subtract => to_u64(sum),
        };
        let upper = biased_max.min(room).max(min);
        let operand = rng.random_range(min..=upper);

        let (term, settled) = settle(operator, operand, sum, min, ceiling, config.correction());
        debug!(index, %operator, operand = term.operand, sum = settled, "operand drawn");
        terms.push(term);
        sum = settled;
    }

    terms
}

/// Swap the drawn operator when it has no room for an operand of at least `min`.
fn feasible_operator(drawn: Operator, sum: i64, min: u64, ceiling: i64) -> Operator {
    let min = to_i64(min);
    let can_add = sum.saturating_add(min) <= ceiling;
    let can_subtract = sum >= min;
    match drawn {
        Operator::Add if !can_add && can_subtract => Operator::Subtract,
        Operator::Subtract if !can_subtract && can_add => Operator::Add,
        other => other,
    }
}

/// Apply one operand to the running total, repairing it once if it leaves `[0, ceiling]`.
fn settle(
    operator: Operator,
    operand: u64,
    sum: i64,
    min: u64,
    ceiling: i64,
    policy: CorrectionPolicy,
) -> (Term, i64) {
    let next = operator.apply(sum, operand);
    if (0..=ceiling).contains(&next) {
        return (Term::new(operator, operand), next);
    }

    if policy == CorrectionPolicy::Reflect {
        let flipped = operator.flipped();
        let reflected = flipped.apply(sum, operand);
        if (0..=ceiling).contains(&reflected) {
            debug!(%operator, operand, sum = reflected, "reflected operator");
            return (Term::new(flipped, operand), reflected);
        }
    }

    let excess = if next > ceiling { next - ceiling } else { -next };
    let reduced = operand.saturating_sub(to_u64(excess)).max(min);
    let settled = operator.apply(sum, reduced);
    debug!(%operator, from = operand, to = reduced, sum = settled, "clamped operand");
    (Term::new(operator, reduced), settled)
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn to_u64(v: i64) -> u64 {
    u64::try_from(v).unwrap_or_default()
}
