//! The `flashdeck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("flashdeck.toml").exists() {
        println!("flashdeck.toml already exists, skipping.");
    } else {
        std::fs::write("flashdeck.toml", SAMPLE_CONFIG)?;
        println!("Created flashdeck.toml");
    }

    std::fs::create_dir_all("decks")?;
    let example_path = std::path::Path::new("decks/example.toml");
    if example_path.exists() {
        println!("decks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DECK)?;
        println!("Created decks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit flashdeck.toml to set your user name");
    println!("  2. Run: flashdeck import --deck decks/example.toml");
    println!("  3. Run: flashdeck train --deck example");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# flashdeck configuration

user = "${USER}"
data_dir = "flashdeck-data"
store = "json"

[scheduler]
initial_ease = 2.5
ease_floor = 1.3
ease_ceiling = 3.5
success_increment = 0.10
easy_increment = 0.15
hard_increment = 0.0
failure_decrement = 0.20
max_interval_days = 36500
easy_response_ms = 2000
hard_response_ms = 5000

[limits]
max_decks_per_user = 30
max_cards_per_deck = 1000
"#;

const EXAMPLE_DECK: &str = r##"[deck]
name = "example"
color = "#3b82f6"
description = "A small deck to get started"
public = false

[[cards]]
question = "What does SM-2 stand for?"
answer = "SuperMemo 2, the algorithm behind most spaced-repetition schedulers"

[[cards]]
question = "What happens to a card's interval after a failed review?"
answer = "It resets to one day"

[[cards]]
question = "Which number multiplies the interval after a successful review?"
answer = "The card's ease factor"
"##;
