//! TOML deck parser.
//!
//! Loads deck definitions from TOML files and directories, and validates
//! them against [`DeckLimits`].

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{CardEdit, DeckEdit, DeckLimits};

/// Intermediate TOML structure for deck files.
#[derive(Debug, Deserialize)]
struct TomlDeckFile {
    deck: TomlDeckHeader,
    #[serde(default)]
    cards: Vec<TomlCard>,
}

#[derive(Debug, Deserialize)]
struct TomlDeckHeader {
    name: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    public: bool,
}

#[derive(Debug, Deserialize)]
struct TomlCard {
    question: String,
    answer: String,
}

/// Parse a single TOML file into a `DeckEdit`.
pub fn parse_deck_file(path: &Path) -> Result<DeckEdit> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read deck file: {}", path.display()))?;

    parse_deck_str(&content, path)
}

/// Parse a TOML string into a `DeckEdit`.
pub fn parse_deck_str(content: &str, source_path: &Path) -> Result<DeckEdit> {
    let parsed: TomlDeckFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let cards = parsed
        .cards
        .into_iter()
        .map(|c| CardEdit {
            id: None,
            question: c.question.trim().to_string(),
            answer: c.answer.trim().to_string(),
        })
        .collect();

    Ok(DeckEdit {
        name: parsed.deck.name,
        color: parsed.deck.color,
        description: parsed.deck.description.trim().to_string(),
        public: parsed.deck.public,
        cards,
    })
}

/// Recursively load all `.toml` deck files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_deck_directory(dir: &Path) -> Result<Vec<DeckEdit>> {
    let mut decks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            decks.extend(load_deck_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_deck_file(&path) {
                Ok(deck) => decks.push(deck),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(decks)
}

/// A warning from deck validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based position of the offending card, if the warning is about one.
    pub card_index: Option<usize>,
    pub message: String,
}

/// Validate a deck for problems that would make it unusable or rejected.
pub fn validate_deck_edit(deck: &DeckEdit, limits: &DeckLimits) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Err(message) = limits.check_edit(deck) {
        warnings.push(ValidationWarning {
            card_index: None,
            message,
        });
    }

    if deck.cards.is_empty() {
        warnings.push(ValidationWarning {
            card_index: None,
            message: "deck has no cards".into(),
        });
    }

    for (i, card) in deck.cards.iter().enumerate() {
        if card.question.is_empty() {
            warnings.push(ValidationWarning {
                card_index: Some(i + 1),
                message: "question is empty".into(),
            });
        }
        if card.answer.is_empty() {
            warnings.push(ValidationWarning {
                card_index: Some(i + 1),
                message: "answer is empty".into(),
            });
        }
    }

    // Duplicate questions make id matching on import ambiguous.
    let mut seen = HashSet::new();
    for (i, card) in deck.cards.iter().enumerate() {
        if !card.question.is_empty() && !seen.insert(card.question.as_str()) {
            warnings.push(ValidationWarning {
                card_index: Some(i + 1),
                message: format!("duplicate question: {}", card.question),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r##"
[deck]
name = "spanish"
color = "#ffaa00"
description = """
Basic vocabulary.
"""
public = true

[[cards]]
question = "hola"
answer = "hello"

[[cards]]
question = "gracias"
answer = " thank you "
"##;

    #[test]
    fn parse_valid_toml() {
        let deck = parse_deck_str(VALID_TOML, &PathBuf::from("spanish.toml")).unwrap();
        assert_eq!(deck.name, "spanish");
        assert_eq!(deck.color, "#ffaa00");
        assert_eq!(deck.description, "Basic vocabulary.");
        assert!(deck.public);
        assert_eq!(deck.cards.len(), 2);
        assert_eq!(deck.cards[1].answer, "thank you");
        assert!(deck.cards.iter().all(|c| c.id.is_none()));
        assert!(validate_deck_edit(&deck, &DeckLimits::default()).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[deck]
name = "minimal"
"#;
        let deck = parse_deck_str(toml, &PathBuf::from("minimal.toml")).unwrap();
        assert!(deck.color.is_empty());
        assert!(!deck.public);
        assert!(deck.cards.is_empty());

        let warnings = validate_deck_edit(&deck, &DeckLimits::default());
        assert!(warnings.iter().any(|w| w.message.contains("no cards")));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_deck_str(bad, &PathBuf::from("bad.toml")).is_err());

        let missing_answer = r#"
[deck]
name = "x"

[[cards]]
question = "only a question"
"#;
        assert!(parse_deck_str(missing_answer, &PathBuf::from("x.toml")).is_err());
    }

    #[test]
    fn validate_duplicates_and_empty_sides() {
        let toml = r#"
[deck]
name = "dupes"

[[cards]]
question = "same"
answer = "one"

[[cards]]
question = "same"
answer = ""
"#;
        let deck = parse_deck_str(toml, &PathBuf::from("dupes.toml")).unwrap();
        let warnings = validate_deck_edit(&deck, &DeckLimits::default());
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("duplicate") && w.card_index == Some(2)));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("answer is empty") && w.card_index == Some(2)));
    }

    #[test]
    fn validate_limits() {
        let toml = r#"
[deck]
name = "a name that is far too long for any deck"

[[cards]]
question = "q"
answer = "a"
"#;
        let deck = parse_deck_str(toml, &PathBuf::from("long.toml")).unwrap();
        let warnings = validate_deck_edit(&deck, &DeckLimits::default());
        assert!(warnings.iter().any(|w| w.message.contains("longer than 32")));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("spanish.toml"), VALID_TOML).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(
            dir.path().join("nested/german.toml"),
            "[deck]\nname = \"german\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not toml {").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let decks = load_deck_directory(dir.path()).unwrap();
        let mut names: Vec<&str> = decks.iter().map(|d| d.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["german", "spanish"]);
    }

    #[test]
    fn load_directory_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("spanish.toml");
        std::fs::write(&file, VALID_TOML).unwrap();
        assert!(load_deck_directory(&file).is_err());
    }
}
