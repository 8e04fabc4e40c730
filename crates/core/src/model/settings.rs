use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

use crate::model::difficulty::DifficultyConfig;
use crate::model::digits::DigitClass;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("question count must be between 1 and 50")]
    InvalidQuestionCount,

    #[error("row count must be between 1 and 10")]
    InvalidRowCount,

    #[error("time limit must be between 5 and 300 seconds")]
    InvalidTimeLimit,

    #[error("number range must be between 10 and 100000")]
    InvalidNumberRange,
}

//
// ─── DRILL SESSION CONFIG ──────────────────────────────────────────────────────
//

/// Presentation mode of a drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TestKind {
    #[default]
    Visual,
}

/// Immutable parameters of one drill session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    operand_count: u32,
    speed_secs: u32,
    digit_class: DigitClass,
    question_count: u32,
    score_per_correct: u32,
    answer_time_limit_secs: u32,
    rule: String,
    test_kind: TestKind,
}

/// Per-step pacing below this is flagged to the user.
pub const MIN_COMFORTABLE_STEP_SECS: f64 = 0.3;

/// Raised when the configured speed leaves too little time per row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingWarning {
    pub step_secs: f64,
    pub effective_total_secs: f64,
}

impl SessionConfig {
    pub const OPERAND_COUNT: RangeInclusive<u32> = 2..=20;
    pub const SPEED_SECS: RangeInclusive<u32> = 1..=180;
    pub const QUESTION_COUNT: RangeInclusive<u32> = 1..=100;
    pub const SCORE_PER_CORRECT: RangeInclusive<u32> = 1..=100;
    pub const ANSWER_TIME_LIMIT_SECS: RangeInclusive<u32> = 1..=60;

    pub const DEFAULT_RULE: &'static str = "Simple Rules Basic";

    #[must_use]
    pub fn operand_count(&self) -> u32 {
        self.operand_count
    }

    /// Total seconds budgeted for revealing one expression.
    #[must_use]
    pub fn speed_secs(&self) -> u32 {
        self.speed_secs
    }

    #[must_use]
    pub fn digit_class(&self) -> DigitClass {
        self.digit_class
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn score_per_correct(&self) -> u32 {
        self.score_per_correct
    }

    #[must_use]
    pub fn answer_time_limit_secs(&self) -> u32 {
        self.answer_time_limit_secs
    }

    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    #[must_use]
    pub fn test_kind(&self) -> TestKind {
        self.test_kind
    }

    #[must_use]
    pub fn difficulty(&self) -> DifficultyConfig {
        DifficultyConfig::new(self.digit_class, self.operand_count)
    }

    #[must_use]
    pub fn pacing_warning(&self) -> Option<PacingWarning> {
        let rows = f64::from(self.operand_count.max(1));
        let step_secs = f64::from(self.speed_secs) / rows;
        (step_secs < MIN_COMFORTABLE_STEP_SECS).then(|| PacingWarning {
            step_secs,
            effective_total_secs: rows * MIN_COMFORTABLE_STEP_SECS,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfigDraft::default().clamp()
    }
}

/// Raw user input for a drill session; every field is optional.
#[derive(Debug, Clone, Default)]
pub struct SessionConfigDraft {
    pub operand_count: Option<u32>,
    pub speed_secs: Option<u32>,
    pub digit_class: Option<DigitClass>,
    pub question_count: Option<u32>,
    pub score_per_correct: Option<u32>,
    pub answer_time_limit_secs: Option<u32>,
    pub rule: Option<String>,
    pub test_kind: Option<TestKind>,
}

impl SessionConfigDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill defaults for missing values and clamp into the allowed bounds.
    ///
    /// An explicit zero is treated like a cleared form field: it becomes the
    /// field's zero fallback, which differs from the default for the question
    /// count and the speed.
    #[must_use]
    pub fn clamp(self) -> SessionConfig {
        SessionConfig {
            operand_count: bounded(self.operand_count, 2, 2, &SessionConfig::OPERAND_COUNT),
            speed_secs: bounded(self.speed_secs, 3, 1, &SessionConfig::SPEED_SECS),
            digit_class: self.digit_class.unwrap_or_default(),
            question_count: bounded(self.question_count, 5, 1, &SessionConfig::QUESTION_COUNT),
            score_per_correct: bounded(
                self.score_per_correct,
                1,
                1,
                &SessionConfig::SCORE_PER_CORRECT,
            ),
            answer_time_limit_secs: bounded(
                self.answer_time_limit_secs,
                10,
                10,
                &SessionConfig::ANSWER_TIME_LIMIT_SECS,
            ),
            rule: self
                .rule
                .map(|r| r.trim().to_owned())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| SessionConfig::DEFAULT_RULE.to_owned()),
            test_kind: self.test_kind.unwrap_or_default(),
        }
    }
}

fn bounded(value: Option<u32>, default: u32, zero: u32, range: &RangeInclusive<u32>) -> u32 {
    match value {
        None => default,
        Some(0) => zero,
        Some(v) => v,
    }
    .clamp(*range.start(), *range.end())
}

//
// ─── GAME SETTINGS (NETWORKED VARIANT) ─────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Largest operand allowed at this difficulty.
    #[must_use]
    pub fn max_number(self) -> u64 {
        match self {
            Difficulty::Beginner => 100,
            Difficulty::Intermediate => 1_000,
            Difficulty::Advanced => 10_000,
        }
    }
}

/// Validated settings for a server-side game of two-operand problems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct GameSettings {
    question_count: u32,
    row_count: u32,
    time_limit: u32,
    number_range: u64,
    feedback_sound: bool,
    number_reading: bool,
    transition_sound: bool,
    difficulty: Difficulty,
}

impl GameSettings {
    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Seconds allowed per problem.
    #[must_use]
    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    #[must_use]
    pub fn number_range(&self) -> u64 {
        self.number_range
    }

    #[must_use]
    pub fn feedback_sound(&self) -> bool {
        self.feedback_sound
    }

    #[must_use]
    pub fn number_reading(&self) -> bool {
        self.number_reading
    }

    #[must_use]
    pub fn transition_sound(&self) -> bool {
        self.transition_sound
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Effective operand ceiling: the smaller of the range and the difficulty cap.
    #[must_use]
    pub fn max_number(&self) -> u64 {
        self.number_range.min(self.difficulty.max_number())
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            question_count: 10,
            row_count: 3,
            time_limit: 30,
            number_range: 100,
            feedback_sound: true,
            number_reading: false,
            transition_sound: true,
            difficulty: Difficulty::Beginner,
        }
    }
}

/// Wire shape of game settings; absent fields take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettingsDraft {
    pub question_count: Option<u32>,
    pub row_count: Option<u32>,
    pub time_limit: Option<u32>,
    pub number_range: Option<u64>,
    pub feedback_sound: Option<bool>,
    pub number_reading: Option<bool>,
    pub transition_sound: Option<bool>,
    pub difficulty: Option<Difficulty>,
}

impl GameSettingsDraft {
    /// Validate the draft, filling defaults for absent fields.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` when a present value is outside its bounds.
    pub fn validate(self) -> Result<GameSettings, SettingsError> {
        let defaults = GameSettings::default();

        let question_count = self.question_count.unwrap_or(defaults.question_count);
        if !(1..=50).contains(&question_count) {
            return Err(SettingsError::InvalidQuestionCount);
        }
        let row_count = self.row_count.unwrap_or(defaults.row_count);
        if !(1..=10).contains(&row_count) {
            return Err(SettingsError::InvalidRowCount);
        }
        let time_limit = self.time_limit.unwrap_or(defaults.time_limit);
        if !(5..=300).contains(&time_limit) {
            return Err(SettingsError::InvalidTimeLimit);
        }
        let number_range = self.number_range.unwrap_or(defaults.number_range);
        if !(10..=100_000).contains(&number_range) {
            return Err(SettingsError::InvalidNumberRange);
        }

        Ok(GameSettings {
            question_count,
            row_count,
            time_limit,
            number_range,
            feedback_sound: self.feedback_sound.unwrap_or(defaults.feedback_sound),
            number_reading: self.number_reading.unwrap_or(defaults.number_reading),
            transition_sound: self.transition_sound.unwrap_or(defaults.transition_sound),
            difficulty: self.difficulty.unwrap_or(defaults.difficulty),
        })
    }
}
