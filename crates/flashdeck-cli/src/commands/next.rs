//! The `flashdeck next` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use super::{today_or, Session};

pub async fn execute(
    deck: String,
    date: Option<NaiveDate>,
    format: String,
    config_path: Option<PathBuf>,
    user: Option<String>,
) -> Result<()> {
    let session = Session::open(config_path, user)?;
    let key = session.deck_key(&deck)?;
    let as_of = today_or(date);

    let card = session
        .service
        .pull_next_card(&session.caller, &key, as_of)
        .await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&card)?),
        _ => match card {
            Some(card) => {
                println!(
                    "Card {} ({}, due {})",
                    card.id,
                    card.schedule.phase(),
                    card.schedule.due
                );
                println!("Q: {}", card.question);
                println!("A: {}", card.answer);
            }
            None => println!("No cards due in {key} as of {as_of}."),
        },
    }
    Ok(())
}
