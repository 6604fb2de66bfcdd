use std::error::Error;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use practice_core::Clock;
use services::sessions::{SCORE_FOLD_DELAY_MS, STEP_ADVANCE_DELAY_MS};
use services::{PracticeLoopService, PracticeView, SubmitOutcome, load_catalog};
use storage::repository::InMemoryProgressStore;

const CATALOG_JSON: &str = include_str!("../catalog.json");

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let catalog = load_catalog(CATALOG_JSON)?;
    info!(problems = catalog.len(), "catalog loaded");

    let store = Arc::new(InMemoryProgressStore::new());
    let mut service = PracticeLoopService::start(Clock::default_clock(), catalog, store).await?;

    println!(
        "Practice: answer with an option number, or j/k + s to browse and submit; n/p to move, g <i> to jump, a to try another, q to quit."
    );

    let stdin = io::stdin();
    loop {
        service.tick().await?;
        render(&service.view());
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        match input {
            "" => {}
            "q" => break,
            "n" => service.next_problem().await?,
            "p" => service.previous_problem().await?,
            "a" => service.try_another().await?,
            "j" => service.cursor_next(),
            "k" => service.cursor_previous(),
            "s" => {
                let choice = service.view().option_cursor + 1;
                submit_choice(&mut service, choice).await?;
            }
            _ => {
                if let Some(raw) = input.strip_prefix("g ") {
                    match raw.trim().parse::<usize>() {
                        Ok(index) => service.select_problem(index).await?,
                        Err(_) => println!("expected a problem number, e.g. `g 1`"),
                    }
                } else if let Ok(choice) = input.parse::<usize>() {
                    submit_choice(&mut service, choice).await?;
                } else {
                    println!("unrecognized input: {input}");
                }
            }
        }
    }

    println!("Final total: {}", service.total_points());
    Ok(())
}

/// Resolve a 1-based option number against the current step and submit it,
/// then wait out the deferred transitions so the next render is settled.
async fn submit_choice(
    service: &mut PracticeLoopService,
    choice: usize,
) -> Result<(), Box<dyn Error>> {
    let view = service.view();
    let Some(answer) = choice
        .checked_sub(1)
        .and_then(|i| view.options.get(i))
        .cloned()
    else {
        println!("no option {choice} on this step");
        return Ok(());
    };

    match service.submit_answer(&answer).await? {
        SubmitOutcome::Accepted { finishes_problem } => {
            println!("Correct! +10");
            sleep_ms(STEP_ADVANCE_DELAY_MS).await;
            service.tick().await?;
            if finishes_problem {
                sleep_ms(SCORE_FOLD_DELAY_MS).await;
                service.tick().await?;
            }
        }
        SubmitOutcome::Rejected => println!("Not quite, try again."),
        SubmitOutcome::Ignored => {}
    }
    Ok(())
}

async fn sleep_ms(ms: i64) {
    let ms = u64::try_from(ms).unwrap_or(0);
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

fn render(view: &PracticeView) {
    println!();
    println!(
        "Problem {} | total ★ {}",
        view.problem_index + 1,
        view.total_points
    );
    println!("{}", view.question);
    if view.counter_visible {
        println!("question points: {}", view.question_points);
    }

    for completed in &view.completed_answers {
        println!("  ✓ Step {}: {}", completed.step_number, completed.answer);
    }

    if view.is_completed {
        println!("Congratulations! You solved the problem correctly.");
        println!("(a = try another one)");
        return;
    }

    if let Some(instruction) = &view.instruction {
        println!("Step {}: {instruction}", view.step_index + 1);
    }
    for (i, option) in view.options.iter().enumerate() {
        let marker = if i == view.option_cursor { ">" } else { " " };
        println!(" {marker}{}) {option}", i + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_is_valid() {
        let catalog = load_catalog(CATALOG_JSON).unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn every_catalog_step_validates_its_correct_answer() {
        let catalog = load_catalog(CATALOG_JSON).unwrap();
        for problem in catalog.problems() {
            for step in problem.steps() {
                assert!(step.accepts(step.correct_answer()));
                for option in step.options() {
                    if option != step.correct_answer() {
                        assert!(!step.accepts(option));
                    }
                }
            }
        }
    }
}
