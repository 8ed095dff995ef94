//! The `flashdeck validate` command.

use std::path::PathBuf;

use anyhow::Result;

use flashdeck_core::parser;
use flashdeck_store::config::load_config_from;

pub fn execute(deck_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let limits = load_config_from(config_path.as_deref())?.limits;

    let decks = if deck_path.is_dir() {
        parser::load_deck_directory(&deck_path)?
    } else {
        vec![parser::parse_deck_file(&deck_path)?]
    };

    let mut total_warnings = 0;

    for deck in &decks {
        println!("Deck: {} ({} cards)", deck.name, deck.cards.len());

        let warnings = parser::validate_deck_edit(deck, &limits);
        for w in &warnings {
            let prefix = w
                .card_index
                .map(|i| format!("  [card {i}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All decks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
