//! The `flashdeck list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::Session;

pub async fn execute(
    owner: Option<String>,
    config_path: Option<PathBuf>,
    user: Option<String>,
) -> Result<()> {
    let session = Session::open(config_path, user)?;
    let owner = owner.unwrap_or_else(|| session.caller.username.clone());

    let decks = session.service.list_decks(&session.caller, &owner).await?;
    if decks.is_empty() {
        println!("No decks found for {owner}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Deck", "Cards", "Visibility", "Color", "Description"]);
    for deck in &decks {
        table.add_row(vec![
            Cell::new(format!("{}/{}", deck.owner, deck.name)),
            Cell::new(deck.card_count),
            Cell::new(if deck.public { "public" } else { "private" }),
            Cell::new(&deck.color),
            Cell::new(&deck.description),
        ]);
    }

    println!("{table}");
    Ok(())
}
