use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::expression::Operator;
use crate::model::ids::{ProblemId, SessionId};
use crate::model::settings::{Difficulty, GameSettings};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameSessionError {
    #[error("end_time is before start_time")]
    InvalidTimeRange,

    #[error("answer references unknown problem {0}")]
    UnknownProblem(ProblemId),

    #[error("problem {0} answered more than once")]
    DuplicateAnswer(ProblemId),

    #[error("answer to problem {0} is graded inconsistently")]
    GradeMismatch(ProblemId),
}

//
// ─── PROBLEMS AND ANSWERS ──────────────────────────────────────────────────────
//

/// A single two-operand problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathProblem {
    pub id: ProblemId,
    pub number1: u64,
    pub number2: u64,
    pub operator: Operator,
    pub correct_answer: u64,
    pub difficulty: Difficulty,
}

impl MathProblem {
    #[must_use]
    pub fn is_correct(&self, answer: i64) -> bool {
        u64::try_from(answer).is_ok_and(|a| a == self.correct_answer)
    }

    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {} {} = ?", self.number1, self.operator, self.number2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAnswer {
    pub problem_id: ProblemId,
    pub user_answer: Option<i64>,
    pub time_spent: u32,
    pub is_correct: bool,
    #[serde(default)]
    pub skipped: bool,
}

impl GameAnswer {
    /// Grade `user_answer` against `problem`. `None` records a skip.
    #[must_use]
    pub fn grade(problem: &MathProblem, user_answer: Option<i64>, time_spent: u32) -> Self {
        Self {
            problem_id: problem.id,
            user_answer,
            time_spent,
            is_correct: user_answer.is_some_and(|a| problem.is_correct(a)),
            skipped: user_answer.is_none(),
        }
    }

    /// Whether the stored flags agree with grading `user_answer` against `problem`.
    #[must_use]
    pub fn is_graded_against(&self, problem: &MathProblem) -> bool {
        let fresh = Self::grade(problem, self.user_answer, self.time_spent);
        self.is_correct == fresh.is_correct && self.skipped == fresh.skipped
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Badge awarded from the accuracy of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    KeepTrying,
}

impl Grade {
    #[must_use]
    pub fn from_accuracy(percent: u32) -> Self {
        match percent {
            90..=u32::MAX => Grade::Excellent,
            80..=89 => Grade::Good,
            60..=79 => Grade::Fair,
            _ => Grade::KeepTrying,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: SessionId,
    pub settings: GameSettings,
    pub problems: Vec<MathProblem>,
    pub answers: Vec<GameAnswer>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub total_time: u32,
}

impl GameSession {
    #[must_use]
    pub fn new(
        id: SessionId,
        settings: GameSettings,
        problems: Vec<MathProblem>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            settings,
            problems,
            answers: Vec::new(),
            start_time,
            end_time: None,
            score: 0,
            total_time: 0,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.end_time.is_some()
    }

    #[must_use]
    pub fn problem(&self, id: ProblemId) -> Option<&MathProblem> {
        self.problems.iter().find(|p| p.id == id)
    }

    /// Check the structural invariants of a session received from a client.
    ///
    /// # Errors
    ///
    /// Returns `GameSessionError` if timestamps are inverted or answers do not match problems.
    pub fn validate(&self) -> Result<(), GameSessionError> {
        if self.end_time.is_some_and(|end| end < self.start_time) {
            return Err(GameSessionError::InvalidTimeRange);
        }
        let mut seen = HashSet::new();
        for answer in &self.answers {
            let Some(problem) = self.problem(answer.problem_id) else {
                return Err(GameSessionError::UnknownProblem(answer.problem_id));
            };
            if !answer.is_graded_against(problem) {
                return Err(GameSessionError::GradeMismatch(answer.problem_id));
            }
            if !seen.insert(answer.problem_id) {
                return Err(GameSessionError::DuplicateAnswer(answer.problem_id));
            }
        }
        Ok(())
    }

    /// Record the final answers and close the session.
    ///
    /// Every answer is re-graded against its problem, so client-supplied
    /// correctness flags are ignored. Score is the number of correct answers;
    /// total time is the sum of time spent.
    ///
    /// # Errors
    ///
    /// Returns `GameSessionError` if the answers or `ended_at` are inconsistent with the session.
    pub fn complete(
        &mut self,
        answers: Vec<GameAnswer>,
        ended_at: DateTime<Utc>,
    ) -> Result<(), GameSessionError> {
        let answers: Vec<GameAnswer> = answers
            .into_iter()
            .map(|a| match self.problem(a.problem_id) {
                Some(problem) => GameAnswer::grade(problem, a.user_answer, a.time_spent),
                None => a,
            })
            .collect();
        let mut candidate = self.clone();
        candidate.score = count_u32(answers.iter().filter(|a| a.is_correct).count());
        candidate.total_time = answers
            .iter()
            .fold(0_u32, |acc, a| acc.saturating_add(a.time_spent));
        candidate.answers = answers;
        candidate.end_time = Some(ended_at);
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Correct answers as a rounded percentage of answers given.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        let total = self.answers.len();
        if total == 0 {
            return 0;
        }
        let correct = self.answers.iter().filter(|a| a.is_correct).count();
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = ((correct as f64 / total as f64) * 100.0).round() as u32;
        percent
    }

    /// Rounded mean seconds per answer.
    #[must_use]
    pub fn average_time_secs(&self) -> u32 {
        let total = count_u32(self.answers.len());
        if total == 0 {
            return 0;
        }
        let spent: u64 = self.answers.iter().map(|a| u64::from(a.time_spent)).sum();
        let avg = (spent + u64::from(total) / 2) / u64::from(total);
        u32::try_from(avg).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        Grade::from_accuracy(self.accuracy_percent())
    }

    /// Total time as `m:ss`.
    #[must_use]
    pub fn total_time_formatted(&self) -> String {
        format!("{}:{:02}", self.total_time / 60, self.total_time % 60)
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

//
// ─── AGGREGATE STATISTICS ──────────────────────────────────────────────────────
//

/// Running totals across all finished games.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Percentage of correct answers, 0–100.
    pub accuracy: f64,
    /// Mean seconds per answered question.
    pub average_time: f64,
    pub games_played: u32,
}

impl GameStats {
    /// Fold a finished session into the aggregate.
    pub fn record(&mut self, session: &GameSession) {
        let answered = count_u32(session.answers.len());
        let correct = count_u32(session.answers.iter().filter(|a| a.is_correct).count());
        let spent: f64 = session.answers.iter().map(|a| f64::from(a.time_spent)).sum();

        let previous_total = f64::from(self.total_questions);
        self.total_questions = self.total_questions.saturating_add(answered);
        self.correct_answers = self.correct_answers.saturating_add(correct);
        self.games_played = self.games_played.saturating_add(1);

        let total = f64::from(self.total_questions);
        if self.total_questions > 0 {
            self.accuracy = f64::from(self.correct_answers) / total * 100.0;
            self.average_time = (self.average_time * previous_total + spent) / total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn problem(a: u64, b: u64, operator: Operator) -> MathProblem {
        let correct_answer = match operator {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
        };
        MathProblem {
            id: ProblemId::new(),
            number1: a,
            number2: b,
            operator,
            correct_answer,
            difficulty: Difficulty::Beginner,
        }
    }

    fn session() -> GameSession {
        GameSession::new(
            SessionId::new(),
            GameSettings::default(),
            vec![
                problem(3, 4, Operator::Add),
                problem(9, 2, Operator::Subtract),
                problem(5, 5, Operator::Add),
            ],
            fixed_now(),
        )
    }

    #[test]
    fn grading_handles_skips_and_wrong_answers() {
        let p = problem(3, 4, Operator::Add);
        assert!(GameAnswer::grade(&p, Some(7), 2).is_correct);
        assert!(!GameAnswer::grade(&p, Some(-7), 2).is_correct);
        let skipped = GameAnswer::grade(&p, None, 30);
        assert!(skipped.skipped);
        assert!(!skipped.is_correct);
    }

    #[test]
    fn complete_scores_and_totals() {
        let mut s = session();
        let answers = vec![
            GameAnswer::grade(&s.problems[0], Some(7), 4),
            GameAnswer::grade(&s.problems[1], Some(6), 5),
            GameAnswer::grade(&s.problems[2], None, 30),
        ];
        s.complete(answers, fixed_now() + chrono::Duration::seconds(39))
            .unwrap();

        assert!(s.is_complete());
        assert_eq!(s.score, 1);
        assert_eq!(s.total_time, 39);
        assert_eq!(s.accuracy_percent(), 33);
        assert_eq!(s.average_time_secs(), 13);
        assert_eq!(s.grade(), Grade::KeepTrying);
        assert_eq!(s.total_time_formatted(), "0:39");
    }

    #[test]
    fn complete_rejects_foreign_answers_without_mutating() {
        let mut s = session();
        let stranger = problem(1, 1, Operator::Add);
        let err = s
            .complete(vec![GameAnswer::grade(&stranger, Some(2), 1)], fixed_now())
            .unwrap_err();
        assert_eq!(err, GameSessionError::UnknownProblem(stranger.id));
        assert!(!s.is_complete());
        assert!(s.answers.is_empty());
    }

    #[test]
    fn complete_regrades_client_flags() {
        let mut s = session();
        let forged = s
            .problems
            .iter()
            .map(|p| GameAnswer {
                problem_id: p.id,
                user_answer: Some(-1),
                time_spent: 2,
                is_correct: true,
                skipped: false,
            })
            .collect();
        s.complete(forged, fixed_now()).unwrap();

        assert_eq!(s.score, 0);
        assert_eq!(s.accuracy_percent(), 0);
        assert!(s.answers.iter().all(|a| !a.is_correct));
    }

    #[test]
    fn validate_rejects_inconsistent_grades() {
        let mut s = session();
        let mut answer = GameAnswer::grade(&s.problems[0], Some(1), 3);
        answer.is_correct = true;
        let id = answer.problem_id;
        s.answers = vec![answer];
        assert_eq!(s.validate().unwrap_err(), GameSessionError::GradeMismatch(id));
    }

    #[test]
    fn validate_rejects_inverted_times() {
        let mut s = session();
        s.end_time = Some(fixed_now() - chrono::Duration::seconds(1));
        assert_eq!(s.validate().unwrap_err(), GameSessionError::InvalidTimeRange);
    }

    #[test]
    fn grade_thresholds() {
        assert_eq!(Grade::from_accuracy(90), Grade::Excellent);
        assert_eq!(Grade::from_accuracy(85), Grade::Good);
        assert_eq!(Grade::from_accuracy(60), Grade::Fair);
        assert_eq!(Grade::from_accuracy(59), Grade::KeepTrying);
    }

    #[test]
    fn stats_accumulate_running_average() {
        let mut stats = GameStats::default();

        let mut first = session();
        let answers = vec![
            GameAnswer::grade(&first.problems[0], Some(7), 2),
            GameAnswer::grade(&first.problems[1], Some(7), 4),
        ];
        first.complete(answers, fixed_now()).unwrap();
        stats.record(&first);
        assert_eq!(stats.total_questions, 2);
        assert_eq!(stats.correct_answers, 2);
        assert!((stats.average_time - 3.0).abs() < 1e-9);

        let mut second = session();
        let answers = vec![GameAnswer::grade(&second.problems[0], Some(1), 6)];
        second.complete(answers, fixed_now()).unwrap();
        stats.record(&second);
        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.total_questions, 3);
        assert!((stats.accuracy - 200.0 / 3.0).abs() < 1e-9);
        assert!((stats.average_time - 4.0).abs() < 1e-9);
    }

    #[test]
    fn session_json_uses_iso_timestamps() {
        let s = session();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["startTime"], "2023-11-14T22:13:20Z");
        assert!(json["endTime"].is_null());
        let back: GameSession = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }
}
