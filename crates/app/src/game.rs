//! Persisted two-operand game in the terminal.

use std::error::Error;
use std::time::Duration;

use soroban_core::model::{GameAnswer, GameSettingsDraft, Grade, MathProblem};
use services::{Clock, GameService};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

pub async fn run(service: &GameService, draft: GameSettingsDraft) -> Result<(), Box<dyn Error>> {
    let session = service.start_game(draft).await?;
    let limit = Duration::from_secs(u64::from(session.settings.time_limit()));
    let clock = Clock::default_clock();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let total = session.problems.len();

    let mut answers = Vec::with_capacity(total);
    for (index, problem) in session.problems.iter().enumerate() {
        println!("{}", prompt(index, total, problem));
        let asked = clock.now();
        let reply = match tokio::time::timeout(limit, lines.next_line()).await {
            Ok(line) => line?,
            Err(_) => {
                println!("  time's up");
                None
            }
        };
        let user_answer = reply.and_then(|line| line.trim().parse::<i64>().ok());
        let answer = GameAnswer::grade(problem, user_answer, clock.elapsed_secs(asked));
        debug!(problem = %problem.id, correct = answer.is_correct, "answer graded");
        if answer.is_correct {
            println!("  correct!");
        } else {
            println!("  answer: {}", problem.correct_answer);
        }
        answers.push(answer);
    }

    let finished = service.finish_game(session.id, answers).await?;
    println!();
    println!(
        "Score {}/{total} | accuracy {}% | time {} | {}",
        finished.score,
        finished.accuracy_percent(),
        finished.total_time_formatted(),
        grade_label(finished.grade())
    );
    Ok(())
}

fn prompt(index: usize, total: usize, problem: &MathProblem) -> String {
    format!("[{}/{total}] {}", index + 1, problem.display())
}

fn grade_label(grade: Grade) -> &'static str {
    match grade {
        Grade::Excellent => "excellent",
        Grade::Good => "good job",
        Grade::Fair => "fair",
        Grade::KeepTrying => "keep trying",
    }
}
