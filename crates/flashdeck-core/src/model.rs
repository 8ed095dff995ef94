//! Core data model types for flashdeck.
//!
//! Decks own cards; each card carries the scheduling state the
//! [`Scheduler`](crate::scheduler::Scheduler) mutates. Everything here is
//! plain data with serde support so stores can persist it directly.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Card identifier, unique within its deck.
pub type CardId = u64;

/// Identifies a deck: deck names are unique per owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeckKey {
    pub owner: String,
    pub name: String,
}

impl DeckKey {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name`, or a bare `name` owned by `default_owner`.
    pub fn parse_or_owned(s: &str, default_owner: &str) -> Result<Self, String> {
        if s.contains('/') {
            s.parse()
        } else if s.trim().is_empty() {
            Err("deck name is empty".to_string())
        } else {
            Ok(DeckKey::new(default_owner, s.trim()))
        }
    }
}

impl fmt::Display for DeckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for DeckKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(DeckKey::new(owner, name))
            }
            _ => Err(format!("invalid deck reference '{s}', expected owner/name")),
        }
    }
}

/// Per-card scheduling state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
    /// Multiplier applied to the interval on each successful review.
    pub ease: f64,
    /// Days until the next review.
    pub interval_days: u32,
    /// Consecutive successful reviews since the last failure.
    pub repetitions: u32,
    /// First date on which the card is eligible for review.
    pub due: NaiveDate,
    /// Date of the most recent review, if any.
    #[serde(default)]
    pub last_reviewed: Option<NaiveDate>,
}

impl SchedulingState {
    /// State of a card that has never been reviewed, due on `introduced`.
    pub fn new(initial_ease: f64, introduced: NaiveDate) -> Self {
        Self {
            ease: initial_ease,
            interval_days: 0,
            repetitions: 0,
            due: introduced,
            last_reviewed: None,
        }
    }

    pub fn phase(&self) -> CardPhase {
        CardPhase::from_repetitions(self.repetitions)
    }

    pub fn is_due(&self, as_of: NaiveDate) -> bool {
        self.due <= as_of
    }
}

/// Learning phase of a card, derived from its repetition count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardPhase {
    New,
    Learning,
    Review,
}

impl CardPhase {
    pub fn from_repetitions(repetitions: u32) -> Self {
        match repetitions {
            0 => CardPhase::New,
            1 | 2 => CardPhase::Learning,
            _ => CardPhase::Review,
        }
    }
}

impl fmt::Display for CardPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardPhase::New => write!(f, "new"),
            CardPhase::Learning => write!(f, "learning"),
            CardPhase::Review => write!(f, "review"),
        }
    }
}

/// A flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Front side; opaque to the scheduler.
    pub question: String,
    /// Back side; opaque to the scheduler.
    pub answer: String,
    pub schedule: SchedulingState,
}

/// A deck of cards owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    /// Public decks are readable (and trainable) by every user.
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            color: String::new(),
            description: String::new(),
            public: false,
            cards: Vec::new(),
        }
    }

    pub fn key(&self) -> DeckKey {
        DeckKey::new(self.owner.clone(), self.name.clone())
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    /// Next free card identifier, or `None` once ids are exhausted.
    pub fn next_card_id(&self) -> Option<CardId> {
        following_id(self.cards.iter().map(|c| c.id).max())
    }

    pub fn is_owned_by(&self, caller: &Caller) -> bool {
        self.owner == caller.username
    }

    pub fn is_readable_by(&self, caller: &Caller) -> bool {
        self.public || self.is_owned_by(caller)
    }

    /// Apply an edit in place.
    ///
    /// Cards missing from the edit are dropped. Cards whose id is known keep
    /// their scheduling state; the rest are added as new cards due `today`.
    ///
    /// Fails without touching the deck when a new card would need an id past
    /// `CardId::MAX`.
    pub fn apply_edit(
        &mut self,
        edit: DeckEdit,
        initial_ease: f64,
        today: NaiveDate,
    ) -> Result<(), String> {
        let first_free = following_id(self.cards.iter().map(|c| c.id).max());
        let mut unclaimed: HashSet<CardId> = self.cards.iter().map(|c| c.id).collect();
        let fresh = edit
            .cards
            .iter()
            .filter(|c| !c.id.is_some_and(|id| unclaimed.remove(&id)))
            .count() as u64;
        let mut next_id = match (fresh, first_free) {
            (0, _) => 0,
            (n, Some(first)) if first.checked_add(n - 1).is_some() => first,
            (n, _) => {
                return Err(format!(
                    "deck '{}' has no card ids left for {n} new card(s)",
                    self.name
                ))
            }
        };

        let mut existing: HashMap<CardId, Card> =
            self.cards.drain(..).map(|c| (c.id, c)).collect();

        self.name = edit.name;
        self.color = edit.color;
        self.description = edit.description;
        self.public = edit.public;

        for card_edit in edit.cards {
            let kept = card_edit.id.and_then(|id| existing.remove(&id));
            let card = match kept {
                Some(mut card) => {
                    card.question = card_edit.question;
                    card.answer = card_edit.answer;
                    card
                }
                None => {
                    let id = next_id;
                    next_id = next_id.saturating_add(1);
                    Card {
                        id,
                        question: card_edit.question,
                        answer: card_edit.answer,
                        schedule: SchedulingState::new(initial_ease, today),
                    }
                }
            };
            self.cards.push(card);
        }
        Ok(())
    }

    pub fn summary(&self) -> DeckSummary {
        DeckSummary {
            owner: self.owner.clone(),
            name: self.name.clone(),
            color: self.color.clone(),
            description: self.description.clone(),
            public: self.public,
            card_count: self.cards.len(),
        }
    }
}

fn following_id(max: Option<CardId>) -> Option<CardId> {
    match max {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Deck metadata without its cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckSummary {
    pub owner: String,
    pub name: String,
    pub color: String,
    pub description: String,
    pub public: bool,
    pub card_count: usize,
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller {
    pub username: String,
}

impl Caller {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Pass/fail outcome reported by the client for one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFeedback {
    pub card_id: CardId,
    pub success: bool,
    /// Time the user took to answer, if measured.
    #[serde(default)]
    pub response_time_ms: Option<u64>,
}

impl ReviewFeedback {
    pub fn pass(card_id: CardId) -> Self {
        Self {
            card_id,
            success: true,
            response_time_ms: None,
        }
    }

    pub fn fail(card_id: CardId) -> Self {
        Self {
            card_id,
            success: false,
            response_time_ms: None,
        }
    }

    pub fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }
}

/// Persisted record of one applied review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    pub id: Uuid,
    pub deck: DeckKey,
    pub card_id: CardId,
    /// Username of whoever reviewed the card.
    pub reviewer: String,
    pub success: bool,
    #[serde(default)]
    pub response_time_ms: Option<u64>,
    pub reviewed_on: NaiveDate,
    pub interval_after: u32,
    pub ease_after: f64,
}

impl ReviewLog {
    pub fn new(
        deck: DeckKey,
        reviewer: &Caller,
        feedback: &ReviewFeedback,
        card: &Card,
        reviewed_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck,
            card_id: card.id,
            reviewer: reviewer.username.clone(),
            success: feedback.success,
            response_time_ms: feedback.response_time_ms,
            reviewed_on,
            interval_after: card.schedule.interval_days,
            ease_after: card.schedule.ease,
        }
    }
}

/// Requested new contents of a deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckEdit {
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub cards: Vec<CardEdit>,
}

impl DeckEdit {
    /// Fill in missing card ids from `deck`, matching on question text.
    pub fn match_existing_ids(&mut self, deck: &Deck) {
        let by_question: HashMap<&str, CardId> = deck
            .cards
            .iter()
            .map(|c| (c.question.as_str(), c.id))
            .collect();
        for card in self.cards.iter_mut().filter(|c| c.id.is_none()) {
            card.id = by_question.get(card.question.as_str()).copied();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEdit {
    /// Existing card to update; `None` creates a card.
    #[serde(default)]
    pub id: Option<CardId>,
    pub question: String,
    pub answer: String,
}

/// Size limits on users, decks, and cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckLimits {
    pub max_decks_per_user: usize,
    pub max_cards_per_deck: usize,
    pub max_deck_name_len: usize,
    pub max_color_len: usize,
    pub max_username_len: usize,
}

impl Default for DeckLimits {
    fn default() -> Self {
        Self {
            max_decks_per_user: 30,
            max_cards_per_deck: 1_000,
            max_deck_name_len: 32,
            max_color_len: 10,
            max_username_len: 20,
        }
    }
}

impl DeckLimits {
    pub fn check_username(&self, username: &str) -> Result<(), String> {
        check_identifier("username", username, self.max_username_len)
    }

    pub fn check_deck_name(&self, name: &str) -> Result<(), String> {
        check_identifier("deck name", name, self.max_deck_name_len)
    }

    /// Check every limit that applies to a single deck edit.
    pub fn check_edit(&self, edit: &DeckEdit) -> Result<(), String> {
        self.check_deck_name(&edit.name)?;
        if edit.color.chars().count() > self.max_color_len {
            return Err(format!(
                "color '{}' is longer than {} characters",
                edit.color, self.max_color_len
            ));
        }
        if edit.cards.len() > self.max_cards_per_deck {
            return Err(format!(
                "deck has {} cards, the limit is {}",
                edit.cards.len(),
                self.max_cards_per_deck
            ));
        }
        Ok(())
    }
}

/// Names double as storage path components, so they must be plain.
fn check_identifier(kind: &str, value: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{kind} is empty"));
    }
    if value.chars().count() > max_len {
        return Err(format!("{kind} '{value}' is longer than {max_len} characters"));
    }
    if value != value.trim() {
        return Err(format!("{kind} '{value}' has leading or trailing whitespace"));
    }
    if value.starts_with('.')
        || value
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(format!("{kind} '{value}' contains invalid characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn deck_with(questions: &[&str]) -> Deck {
        let mut deck = Deck::new("alice", "spanish");
        for (i, q) in questions.iter().enumerate() {
            deck.cards.push(Card {
                id: i as CardId + 1,
                question: q.to_string(),
                answer: format!("{q}-answer"),
                schedule: SchedulingState::new(2.5, day(1)),
            });
        }
        deck
    }

    #[test]
    fn deck_key_display_and_parse() {
        let key = DeckKey::new("alice", "spanish");
        assert_eq!(key.to_string(), "alice/spanish");
        assert_eq!("alice/spanish".parse::<DeckKey>().unwrap(), key);
        assert!("spanish".parse::<DeckKey>().is_err());
        assert!("/spanish".parse::<DeckKey>().is_err());
        assert!("a/b/c".parse::<DeckKey>().is_err());

        assert_eq!(DeckKey::parse_or_owned("spanish", "alice").unwrap(), key);
        assert_eq!(
            DeckKey::parse_or_owned("bob/german", "alice").unwrap(),
            DeckKey::new("bob", "german")
        );
        assert!(DeckKey::parse_or_owned("  ", "alice").is_err());
    }

    #[test]
    fn phase_from_repetitions() {
        assert_eq!(CardPhase::from_repetitions(0), CardPhase::New);
        assert_eq!(CardPhase::from_repetitions(1), CardPhase::Learning);
        assert_eq!(CardPhase::from_repetitions(2), CardPhase::Learning);
        assert_eq!(CardPhase::from_repetitions(3), CardPhase::Review);
        assert_eq!(CardPhase::from_repetitions(40), CardPhase::Review);
        assert_eq!(CardPhase::Learning.to_string(), "learning");
    }

    #[test]
    fn new_state_is_due_on_introduction() {
        let state = SchedulingState::new(2.5, day(5));
        assert_eq!(state.phase(), CardPhase::New);
        assert!(!state.is_due(day(4)));
        assert!(state.is_due(day(5)));
        assert!(state.last_reviewed.is_none());
    }

    #[test]
    fn access_rules() {
        let mut deck = deck_with(&[]);
        let alice = Caller::new("alice");
        let bob = Caller::new("bob");
        assert!(deck.is_readable_by(&alice));
        assert!(!deck.is_readable_by(&bob));
        deck.public = true;
        assert!(deck.is_readable_by(&bob));
        assert!(!deck.is_owned_by(&bob));
    }

    #[test]
    fn apply_edit_keeps_known_cards_and_drops_missing() {
        let mut deck = deck_with(&["uno", "dos", "tres"]);
        deck.cards[0].schedule.repetitions = 4;
        deck.cards[0].schedule.interval_days = 12;

        let edit = DeckEdit {
            name: "espanol".into(),
            color: "#fff".into(),
            description: "numbers".into(),
            public: true,
            cards: vec![
                CardEdit {
                    id: Some(1),
                    question: "uno!".into(),
                    answer: "one".into(),
                },
                CardEdit {
                    id: None,
                    question: "cuatro".into(),
                    answer: "four".into(),
                },
                CardEdit {
                    id: Some(99),
                    question: "cinco".into(),
                    answer: "five".into(),
                },
            ],
        };
        deck.apply_edit(edit, 2.5, day(10)).unwrap();

        assert_eq!(deck.name, "espanol");
        assert!(deck.public);
        assert_eq!(deck.cards.len(), 3);

        let uno = deck.card(1).unwrap();
        assert_eq!(uno.question, "uno!");
        assert_eq!(uno.schedule.repetitions, 4);
        assert_eq!(uno.schedule.interval_days, 12);

        assert!(deck.card(2).is_none());
        assert!(deck.card(3).is_none());
        let ids: Vec<CardId> = deck.cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 4, 5]);
        assert_eq!(deck.card(4).unwrap().schedule.due, day(10));
        assert_eq!(deck.next_card_id(), Some(6));
    }

    #[test]
    fn apply_edit_refuses_to_overflow_card_ids() {
        let mut deck = deck_with(&["uno"]);
        deck.cards[0].id = CardId::MAX;
        assert_eq!(deck.next_card_id(), None);

        let keep_only = DeckEdit {
            name: "spanish".into(),
            color: String::new(),
            description: String::new(),
            public: false,
            cards: vec![CardEdit {
                id: Some(CardId::MAX),
                question: "uno".into(),
                answer: "one".into(),
            }],
        };
        let mut grow = keep_only.clone();
        grow.cards.push(CardEdit {
            id: None,
            question: "dos".into(),
            answer: "two".into(),
        });

        let err = deck.apply_edit(grow, 2.5, day(10)).unwrap_err();
        assert!(err.contains("no card ids left"), "{err}");
        assert_eq!(deck.cards.len(), 1);
        assert_eq!(deck.cards[0].id, CardId::MAX);

        deck.apply_edit(keep_only, 2.5, day(10)).unwrap();
        assert_eq!(deck.cards[0].id, CardId::MAX);
    }

    #[test]
    fn match_existing_ids_by_question() {
        let deck = deck_with(&["uno", "dos"]);
        let mut edit = DeckEdit {
            name: "spanish".into(),
            color: String::new(),
            description: String::new(),
            public: false,
            cards: vec![
                CardEdit {
                    id: None,
                    question: "dos".into(),
                    answer: "two".into(),
                },
                CardEdit {
                    id: None,
                    question: "seis".into(),
                    answer: "six".into(),
                },
            ],
        };
        edit.match_existing_ids(&deck);
        assert_eq!(edit.cards[0].id, Some(2));
        assert_eq!(edit.cards[1].id, None);
    }

    #[test]
    fn limits_reject_bad_names_and_sizes() {
        let limits = DeckLimits::default();
        assert!(limits.check_deck_name("spanish").is_ok());
        assert!(limits.check_deck_name("").is_err());
        assert!(limits.check_deck_name("../etc").is_err());
        assert!(limits.check_deck_name("a/b").is_err());
        assert!(limits.check_deck_name(&"x".repeat(33)).is_err());
        assert!(limits.check_username(&"u".repeat(21)).is_err());

        let mut edit = DeckEdit {
            name: "ok".into(),
            color: "#123456789ab".into(),
            description: String::new(),
            public: false,
            cards: vec![],
        };
        assert!(limits.check_edit(&edit).unwrap_err().contains("color"));
        edit.color = "red".into();
        edit.cards = vec![
            CardEdit {
                id: None,
                question: "q".into(),
                answer: "a".into(),
            };
            1_001
        ];
        assert!(limits.check_edit(&edit).unwrap_err().contains("limit is 1000"));
    }

    #[test]
    fn deck_serde_roundtrip() {
        let deck = deck_with(&["uno"]);
        let json = serde_json::to_string(&deck).unwrap();
        let back: Deck = serde_json::from_str(&json).unwrap();
        assert_eq!(back, deck);

        let minimal: Deck = serde_json::from_str(r#"{"owner":"a","name":"b"}"#).unwrap();
        assert!(minimal.cards.is_empty());
        assert!(!minimal.public);
    }
}
