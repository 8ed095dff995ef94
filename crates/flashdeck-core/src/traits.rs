//! Persistence capability for decks and review logs.
//!
//! Implemented by the `flashdeck-store` crate. The training service only
//! depends on this trait, so any storage technology can back it.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Card, Deck, DeckKey, DeckSummary, ReviewLog};

/// Storage backend for decks, their cards, and review history.
#[async_trait]
pub trait DeckStore: Send + Sync {
    /// Human-readable backend name (e.g. "json").
    fn name(&self) -> &str;

    /// Load a full deck.
    async fn load(&self, key: &DeckKey) -> Result<Deck, StoreError>;

    /// Persist one card's updated state. The card must already exist.
    async fn save_card(&self, key: &DeckKey, card: &Card) -> Result<(), StoreError>;

    /// Create or replace a deck.
    async fn save_deck(&self, deck: &Deck) -> Result<(), StoreError>;

    /// Remove a deck together with its review log.
    async fn remove_deck(&self, key: &DeckKey) -> Result<(), StoreError>;

    /// Summaries of all decks owned by `owner`, sorted by name.
    async fn list_decks(&self, owner: &str) -> Result<Vec<DeckSummary>, StoreError>;

    /// Append a review to the deck's log.
    async fn append_review(&self, review: &ReviewLog) -> Result<(), StoreError>;

    /// All reviews of a deck, oldest first.
    async fn reviews(&self, key: &DeckKey) -> Result<Vec<ReviewLog>, StoreError>;
}
