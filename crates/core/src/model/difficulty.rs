use serde::{Deserialize, Serialize};

use crate::model::digits::{DigitClass, DigitRange};

/// How the generator repairs a running total that left `[0, max_sum)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorrectionPolicy {
    /// Shrink the offending operand by the overshoot, never below the class minimum.
    #[default]
    Clamp,
    /// Flip the offending operand's sign; clamp if the flip does not land in range.
    Reflect,
}

/// Input to expression generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyConfig {
    digit_class: DigitClass,
    operand_count: u32,
    max_sum: u64,
    #[serde(default)]
    correction: CorrectionPolicy,
}

impl DifficultyConfig {
    /// `operand_count` below 1 is raised to 1. `max_sum` is the class maximum.
    #[must_use]
    pub fn new(digit_class: DigitClass, operand_count: u32) -> Self {
        Self {
            digit_class,
            operand_count: operand_count.max(1),
            max_sum: digit_class.range().max,
            correction: CorrectionPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_correction(mut self, correction: CorrectionPolicy) -> Self {
        self.correction = correction;
        self
    }

    #[must_use]
    pub fn digit_class(&self) -> DigitClass {
        self.digit_class
    }

    #[must_use]
    pub fn range(&self) -> DigitRange {
        self.digit_class.range()
    }

    #[must_use]
    pub fn operand_count(&self) -> u32 {
        self.operand_count
    }

    /// Exclusive upper bound for every running total.
    #[must_use]
    pub fn max_sum(&self) -> u64 {
        self.max_sum
    }

    #[must_use]
    pub fn correction(&self) -> CorrectionPolicy {
        self.correction
    }
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self::new(DigitClass::default(), 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_sum_tracks_class_maximum() {
        let config = DifficultyConfig::new(DigitClass::TwoDigitFromHundred, 4);
        assert_eq!(config.max_sum(), 999);
        assert_eq!(config.operand_count(), 4);
        assert_eq!(config.correction(), CorrectionPolicy::Clamp);
    }

    #[test]
    fn operand_count_is_at_least_one() {
        assert_eq!(DifficultyConfig::new(DigitClass::OneDigitBelowTen, 0).operand_count(), 1);
    }
}
