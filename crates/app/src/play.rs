//! Timed drill in the terminal.

use std::error::Error;

use soroban_core::model::{SessionConfig, format_grouped, number_to_soroban};
use soroban_core::quiz::{AnswerResult, QuizPhase};
use services::{Clock, QuizController, QuizRunner};
use tokio::io::{AsyncBufReadExt, BufReader};

const OPTION_KEYS: [char; 4] = ['a', 'b', 'c', 'd'];

pub async fn run(config: SessionConfig, seed: Option<u64>) -> Result<(), Box<dyn Error>> {
    let clock = Clock::default_clock();
    let controller = seed.map_or_else(
        || QuizController::new(clock),
        |seed| QuizController::with_seed(clock, seed),
    );
    let runner = QuizRunner::new(controller);
    let mut updates = runner.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Some(pacing) = config.pacing_warning() {
        println!(
            "Note: {:.2}s per row is very fast; {:.1}s total is more comfortable.",
            pacing.step_secs, pacing.effective_total_secs
        );
    }
    let total = config.question_count();
    runner.start(config).await?;

    'questions: loop {
        let mut printed = 0;
        let state = loop {
            let state = updates.borrow_and_update().clone();
            let visible = state.visible_steps();
            if printed == 0 && !visible.is_empty() {
                println!();
                println!("Question {}/{total}", state.current_question_number());
            }
            for step in visible.iter().skip(printed) {
                println!("  {}", step.display);
            }
            printed = visible.len();
            if state.phase() == QuizPhase::AwaitingSelection {
                break state;
            }
            updates.changed().await?;
        };

        let Some(expr) = state.expression() else {
            break;
        };
        let options = expr.options();
        let listing: Vec<String> = OPTION_KEYS
            .iter()
            .zip(options)
            .map(|(key, value)| format!("[{key}] {}", format_grouped(*value)))
            .collect();
        println!("  {}", listing.join("   "));

        let selected = loop {
            let Some(line) = lines.next_line().await? else {
                runner.report_error("input closed").await;
                break 'questions;
            };
            let key = line.trim().chars().next().map(|c| c.to_ascii_lowercase());
            let picked = OPTION_KEYS
                .iter()
                .position(|k| Some(*k) == key)
                .and_then(|i| options.get(i).copied());
            match picked {
                Some(value) => break value,
                None => println!("  choose a, b, c or d"),
            }
        };

        runner.select_option(selected).await?;
        match runner.check_answer().await? {
            AnswerResult::Correct => println!("  correct!"),
            AnswerResult::Incorrect => println!("  not quite: {}", expr.render_solved()),
        }
        println!("  {}", render_beads(expr.correct_answer()));

        runner.next_question().await?;
        if runner.state().await.phase() == QuizPhase::Finished {
            break;
        }
    }

    let summary = runner.summary().await;
    println!();
    println!(
        "Answered {} | correct {} | score {} | accuracy {}% | avg {:.1}s",
        summary.answered,
        summary.correct,
        summary.total_score,
        summary.accuracy_percent,
        summary.average_time_secs
    );
    Ok(())
}

/// One column per digit: heaven bead, then the four earth beads.
fn render_beads(value: u64) -> String {
    let columns = value.to_string().len();
    number_to_soroban(value, columns)
        .iter()
        .map(|column| {
            let heaven = if column.heaven_bead { '●' } else { '○' };
            let earth: String = column
                .earth_beads
                .iter()
                .map(|set| if *set { '●' } else { '○' })
                .collect();
            format!("{heaven}|{earth}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}
