use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── OPERATOR ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
}

impl Operator {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
        }
    }

    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Operator::Add => Operator::Subtract,
            Operator::Subtract => Operator::Add,
        }
    }

    /// Apply this operator to a running total.
    #[must_use]
    pub fn apply(self, total: i64, operand: u64) -> i64 {
        let operand = i64::try_from(operand).unwrap_or(i64::MAX);
        match self {
            Operator::Add => total.saturating_add(operand),
            Operator::Subtract => total.saturating_sub(operand),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

//
// ─── TERMS AND STEPS ───────────────────────────────────────────────────────────
//

/// One signed operand. The leading term carries no operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub operator: Option<Operator>,
    pub operand: u64,
}

impl Term {
    #[must_use]
    pub fn first(operand: u64) -> Self {
        Self {
            operator: None,
            operand,
        }
    }

    #[must_use]
    pub fn new(operator: Operator, operand: u64) -> Self {
        Self {
            operator: Some(operator),
            operand,
        }
    }

    #[must_use]
    pub fn display(&self) -> String {
        match self.operator {
            None => self.operand.to_string(),
            Some(op) => format!("{op} {}", self.operand),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    Operand,
    Terminal,
}

/// One unit of the progressive reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizStep {
    pub display: String,
    pub kind: StepKind,
}

impl QuizStep {
    pub const TERMINAL_DISPLAY: &'static str = "= ?";

    #[must_use]
    pub fn terminal() -> Self {
        Self {
            display: Self::TERMINAL_DISPLAY.to_owned(),
            kind: StepKind::Terminal,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.kind == StepKind::Terminal
    }
}

//
// ─── EXPRESSION ────────────────────────────────────────────────────────────────
//

/// A generated drill: the signed terms, the answer and the four answer options.
///
/// Built only by the generator; replaced wholesale on every new question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expression {
    terms: Vec<Term>,
    steps: Vec<QuizStep>,
    correct_answer: u64,
    options: Vec<u64>,
}

impl Expression {
    pub(crate) fn new(terms: Vec<Term>, correct_answer: u64, options: Vec<u64>) -> Self {
        let mut steps: Vec<QuizStep> = terms
            .iter()
            .map(|term| QuizStep {
                display: term.display(),
                kind: StepKind::Operand,
            })
            .collect();
        steps.push(QuizStep::terminal());

        Self {
            terms,
            steps,
            correct_answer,
            options,
        }
    }

    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Steps in reveal order; the last one is always the `= ?` marker.
    #[must_use]
    pub fn steps(&self) -> &[QuizStep] {
        &self.steps
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn last_step_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    #[must_use]
    pub fn correct_answer(&self) -> u64 {
        self.correct_answer
    }

    /// Answer options in display order.
    #[must_use]
    pub fn options(&self) -> &[u64] {
        &self.options
    }

    #[must_use]
    pub fn is_option(&self, value: u64) -> bool {
        self.options.contains(&value)
    }

    /// Left-to-right evaluation of the terms.
    #[must_use]
    pub fn evaluate(&self) -> i64 {
        evaluate_terms(&self.terms)
    }

    /// Running total after each term.
    #[must_use]
    pub fn running_sums(&self) -> Vec<i64> {
        let mut total = 0_i64;
        self.terms
            .iter()
            .map(|term| {
                total = match term.operator {
                    None => i64::try_from(term.operand).unwrap_or(i64::MAX),
                    Some(op) => op.apply(total, term.operand),
                };
                total
            })
            .collect()
    }

    /// Single-line form used once the answer is revealed, e.g. `5 - 3 = 2`.
    #[must_use]
    pub fn render_solved(&self) -> String {
        let body = self
            .terms
            .iter()
            .map(Term::display)
            .collect::<Vec<_>>()
            .join(" ");
        format!("{body} = {}", self.correct_answer)
    }
}

/// Evaluate terms left to right: the first operand is taken literally.
#[must_use]
pub fn evaluate_terms(terms: &[Term]) -> i64 {
    terms.iter().fold(0_i64, |total, term| match term.operator {
        None => i64::try_from(term.operand).unwrap_or(i64::MAX),
        Some(op) => op.apply(total, term.operand),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_minus_three() -> Expression {
        Expression::new(
            vec![Term::first(5), Term::new(Operator::Subtract, 3)],
            2,
            vec![2, 3, 1, 4],
        )
    }

    #[test]
    fn steps_render_operators_and_terminal_marker() {
        let expr = five_minus_three();
        let displays: Vec<&str> = expr.steps().iter().map(|s| s.display.as_str()).collect();
        assert_eq!(displays, ["5", "- 3", "= ?"]);
        assert!(expr.steps().last().unwrap().is_terminal());
        assert_eq!(expr.last_step_index(), 2);
    }

    #[test]
    fn evaluation_matches_answer() {
        let expr = five_minus_three();
        assert_eq!(expr.evaluate(), 2);
        assert_eq!(expr.running_sums(), vec![5, 2]);
        assert_eq!(expr.render_solved(), "5 - 3 = 2");
    }

    #[test]
    fn json_uses_symbol_operators() {
        let json = serde_json::to_value(five_minus_three()).unwrap();
        assert_eq!(json["terms"][1]["operator"], "-");
        assert_eq!(json["correctAnswer"], 2);
    }
}
