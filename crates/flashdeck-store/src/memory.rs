//! In-memory deck store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use flashdeck_core::error::StoreError;
use flashdeck_core::model::{Card, Deck, DeckKey, DeckSummary, ReviewLog};
use flashdeck_core::traits::DeckStore;

#[derive(Debug, Clone)]
struct StoredDeck {
    deck: Deck,
    reviews: Vec<ReviewLog>,
}

/// A [`DeckStore`] that keeps everything in a map. Contents are lost when
/// the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    decks: RwLock<HashMap<DeckKey, StoredDeck>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `decks`.
    pub fn with_decks(decks: impl IntoIterator<Item = Deck>) -> Self {
        let decks = decks
            .into_iter()
            .map(|deck| {
                (
                    deck.key(),
                    StoredDeck {
                        deck,
                        reviews: Vec::new(),
                    },
                )
            })
            .collect();
        Self {
            decks: RwLock::new(decks),
        }
    }

    /// Number of decks held, across all owners.
    pub async fn len(&self) -> usize {
        self.decks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.decks.read().await.is_empty()
    }
}

#[async_trait]
impl DeckStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, key: &DeckKey) -> Result<Deck, StoreError> {
        self.decks
            .read()
            .await
            .get(key)
            .map(|stored| stored.deck.clone())
            .ok_or_else(|| StoreError::DeckNotFound(key.clone()))
    }

    async fn save_card(&self, key: &DeckKey, card: &Card) -> Result<(), StoreError> {
        let mut decks = self.decks.write().await;
        let stored = decks
            .get_mut(key)
            .ok_or_else(|| StoreError::DeckNotFound(key.clone()))?;
        let slot = stored
            .deck
            .card_mut(card.id)
            .ok_or_else(|| StoreError::CardNotFound {
                deck: key.clone(),
                card_id: card.id,
            })?;
        *slot = card.clone();
        Ok(())
    }

    async fn save_deck(&self, deck: &Deck) -> Result<(), StoreError> {
        let mut decks = self.decks.write().await;
        decks
            .entry(deck.key())
            .and_modify(|stored| stored.deck = deck.clone())
            .or_insert_with(|| StoredDeck {
                deck: deck.clone(),
                reviews: Vec::new(),
            });
        Ok(())
    }

    async fn remove_deck(&self, key: &DeckKey) -> Result<(), StoreError> {
        self.decks
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::DeckNotFound(key.clone()))
    }

    async fn list_decks(&self, owner: &str) -> Result<Vec<DeckSummary>, StoreError> {
        let decks = self.decks.read().await;
        let mut summaries: Vec<DeckSummary> = decks
            .values()
            .filter(|stored| stored.deck.owner == owner)
            .map(|stored| stored.deck.summary())
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    async fn append_review(&self, review: &ReviewLog) -> Result<(), StoreError> {
        let mut decks = self.decks.write().await;
        let stored = decks
            .get_mut(&review.deck)
            .ok_or_else(|| StoreError::DeckNotFound(review.deck.clone()))?;
        stored.reviews.push(review.clone());
        Ok(())
    }

    async fn reviews(&self, key: &DeckKey) -> Result<Vec<ReviewLog>, StoreError> {
        self.decks
            .read()
            .await
            .get(key)
            .map(|stored| stored.reviews.clone())
            .ok_or_else(|| StoreError::DeckNotFound(key.clone()))
    }
}
