//! The `flashdeck import` command.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use flashdeck_core::error::TrainError;
use flashdeck_core::model::{CardId, DeckKey};
use flashdeck_core::parser;

use super::{today_or, Session};

pub async fn execute(
    deck_path: PathBuf,
    date: Option<NaiveDate>,
    config_path: Option<PathBuf>,
    user: Option<String>,
) -> Result<()> {
    let session = Session::open(config_path, user)?;
    let today = today_or(date);

    let mut edit = parser::parse_deck_file(&deck_path)?;
    for w in parser::validate_deck_edit(&edit, session.service.limits()) {
        match w.card_index {
            Some(i) => eprintln!("  [card {i}] WARNING: {}", w.message),
            None => eprintln!("  WARNING: {}", w.message),
        }
    }

    let key = DeckKey::new(session.caller.username.clone(), edit.name.clone());
    let existing = session.service.deck_contents(&session.caller, &key).await;
    let known: HashSet<CardId> = match existing {
        Ok(existing) => {
            edit.match_existing_ids(&existing);
            existing.cards.iter().map(|c| c.id).collect()
        }
        Err(TrainError::DeckNotFound(_)) => HashSet::new(),
        Err(e) => return Err(e.into()),
    };

    let deck = session
        .service
        .update_deck(&session.caller, None, edit, today)
        .await
        .with_context(|| format!("failed to import {}", deck_path.display()))?;
    let kept = deck.cards.iter().filter(|c| known.contains(&c.id)).count();

    println!(
        "Imported {}: {} cards ({} new, {} kept)",
        deck.key(),
        deck.cards.len(),
        deck.cards.len() - kept,
        kept
    );
    Ok(())
}
