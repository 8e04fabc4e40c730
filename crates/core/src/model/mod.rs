pub mod abacus;
mod difficulty;
mod digits;
mod expression;
mod game;
mod ids;
mod settings;

pub use abacus::{SorobanColumn, format_grouped, number_to_soroban};
pub use difficulty::{CorrectionPolicy, DifficultyConfig};
pub use digits::{DigitClass, DigitClassError, DigitRange};
pub use expression::{Expression, Operator, QuizStep, StepKind, Term, evaluate_terms};
pub use ids::{ParseIdError, ProblemId, SessionId};

pub use game::{GameAnswer, GameSession, GameSessionError, GameStats, Grade, MathProblem};
pub use settings::{
    Difficulty, GameSettings, GameSettingsDraft, PacingWarning, SessionConfig,
    SessionConfigDraft, SettingsError, TestKind,
};
