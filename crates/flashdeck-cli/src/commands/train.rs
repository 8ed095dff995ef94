//! The `flashdeck train` command.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};

use flashdeck_core::model::ReviewFeedback;

use super::{today_or, Session};

enum Answer {
    Pass,
    Fail,
    Quit,
}

pub async fn execute(
    deck: String,
    date: Option<NaiveDate>,
    config_path: Option<PathBuf>,
    user: Option<String>,
) -> Result<()> {
    let session = Session::open(config_path, user)?;
    let key = session.deck_key(&deck)?;
    let as_of = today_or(date);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut reviewed = 0usize;
    let mut passed = 0usize;

    loop {
        let Some(card) = session
            .service
            .pull_next_card(&session.caller, &key, as_of)
            .await?
        else {
            println!("No more cards due in {key}.");
            break;
        };

        println!("\nQ: {}", card.question);
        prompt("Press Enter to show the answer (q to quit) ")?;
        let started = Instant::now();
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }
        let response_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        println!("A: {}", card.answer);
        let answer = loop {
            prompt("Did you know it? [y/n/q] ")?;
            let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
                break Answer::Quit;
            };
            match line.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => break Answer::Pass,
                "n" | "no" => break Answer::Fail,
                "q" | "quit" => break Answer::Quit,
                _ => println!("Please answer y, n, or q."),
            }
        };

        let feedback = match answer {
            Answer::Pass => ReviewFeedback::pass(card.id),
            Answer::Fail => ReviewFeedback::fail(card.id),
            Answer::Quit => break,
        }
        .with_response_time(response_ms);

        let updated = session
            .service
            .post_feedback(&session.caller, &key, &feedback, as_of)
            .await?;
        reviewed += 1;
        if feedback.success {
            passed += 1;
        }
        println!(
            "Next review on {} (in {}d)",
            updated.schedule.due, updated.schedule.interval_days
        );
    }

    println!("Reviewed {reviewed} card(s), {passed} passed.");
    Ok(())
}

fn prompt(text: &str) -> Result<()> {
    print!("{text}");
    std::io::stdout().flush().context("failed to flush stdout")
}
