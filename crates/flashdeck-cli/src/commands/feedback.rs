//! The `flashdeck feedback` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use flashdeck_core::model::ReviewFeedback;

use super::{today_or, Session};

pub async fn execute(
    deck: String,
    card_id: u64,
    pass: bool,
    response_ms: Option<u64>,
    date: Option<NaiveDate>,
    config_path: Option<PathBuf>,
    user: Option<String>,
) -> Result<()> {
    let session = Session::open(config_path, user)?;
    let key = session.deck_key(&deck)?;

    let feedback = ReviewFeedback {
        card_id,
        success: pass,
        response_time_ms: response_ms,
    };
    let card = session
        .service
        .post_feedback(&session.caller, &key, &feedback, today_or(date))
        .await?;

    let s = &card.schedule;
    println!(
        "Card {}: next review on {} (interval {}d, ease {:.2}, repetitions {})",
        card.id, s.due, s.interval_days, s.ease, s.repetitions
    );
    Ok(())
}
