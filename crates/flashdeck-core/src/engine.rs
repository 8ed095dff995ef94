//! Training service.
//!
//! Composes a [`DeckStore`], the [`Scheduler`], and access rules into the
//! operations a front end needs: listing and describing decks, serving the
//! next card, recording feedback, editing decks, and computing statistics.
//!
//! Access rules: a deck is readable (and trainable) by its owner or, when
//! public, by anyone. Only the owner may view its full contents, edit it,
//! or remove it. Private decks are reported as missing to other callers.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{StoreError, TrainError};
use crate::model::{
    Caller, Card, Deck, DeckEdit, DeckKey, DeckLimits, DeckSummary, ReviewFeedback, ReviewLog,
};
use crate::scheduler::Scheduler;
use crate::statistics::{compute_deck_stats, DeckStats};
use crate::traits::DeckStore;

/// Front-end facing operations over a deck store.
pub struct TrainingService {
    store: Arc<dyn DeckStore>,
    scheduler: Scheduler,
    limits: DeckLimits,
}

impl TrainingService {
    pub fn new(store: Arc<dyn DeckStore>, scheduler: Scheduler, limits: DeckLimits) -> Self {
        Self {
            store,
            scheduler,
            limits,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn limits(&self) -> &DeckLimits {
        &self.limits
    }

    /// Decks of `owner` visible to `caller`.
    pub async fn list_decks(
        &self,
        caller: &Caller,
        owner: &str,
    ) -> Result<Vec<DeckSummary>, TrainError> {
        let decks = self.store.list_decks(owner).await?;
        Ok(decks
            .into_iter()
            .filter(|d| d.public || d.owner == caller.username)
            .collect())
    }

    /// Deck metadata for anyone who may read the deck.
    pub async fn deck_info(
        &self,
        caller: &Caller,
        key: &DeckKey,
    ) -> Result<DeckSummary, TrainError> {
        Ok(self.load_readable(caller, key).await?.summary())
    }

    /// Full deck contents, for editing. Owner only.
    pub async fn deck_contents(&self, caller: &Caller, key: &DeckKey) -> Result<Deck, TrainError> {
        self.load_owned(caller, key, "view").await
    }

    /// The next due card, or `None` when the session is over.
    pub async fn pull_next_card(
        &self,
        caller: &Caller,
        key: &DeckKey,
        as_of: NaiveDate,
    ) -> Result<Option<Card>, TrainError> {
        let deck = self.load_readable(caller, key).await?;
        Ok(self.scheduler.select_next(&deck, as_of).cloned())
    }

    /// Apply feedback, persist the card, and log the review.
    pub async fn post_feedback(
        &self,
        caller: &Caller,
        key: &DeckKey,
        feedback: &ReviewFeedback,
        as_of: NaiveDate,
    ) -> Result<Card, TrainError> {
        let mut deck = self.load_readable(caller, key).await?;
        let card = self.scheduler.record_feedback(&mut deck, feedback, as_of)?;

        self.store.save_card(key, &card).await?;
        let log = ReviewLog::new(key.clone(), caller, feedback, &card, as_of);
        self.store.append_review(&log).await?;

        tracing::info!(
            deck = %key,
            card_id = card.id,
            reviewer = %caller.username,
            success = feedback.success,
            next_due = %card.schedule.due,
            "review recorded"
        );
        Ok(card)
    }

    /// Statistics over the deck and the caller's own reviews of it.
    pub async fn deck_stats(
        &self,
        caller: &Caller,
        key: &DeckKey,
        as_of: NaiveDate,
    ) -> Result<DeckStats, TrainError> {
        let deck = self.load_readable(caller, key).await?;
        let reviews: Vec<ReviewLog> = self
            .store
            .reviews(key)
            .await?
            .into_iter()
            .filter(|r| r.reviewer == caller.username)
            .collect();
        Ok(compute_deck_stats(&deck, &reviews, as_of))
    }

    /// Create or update one of the caller's decks.
    ///
    /// `original_name` names the deck being edited (defaults to the edit's
    /// name). If it does not exist a new deck is created. Renames keep the
    /// review history.
    pub async fn update_deck(
        &self,
        caller: &Caller,
        original_name: Option<&str>,
        edit: DeckEdit,
        today: NaiveDate,
    ) -> Result<Deck, TrainError> {
        self.limits
            .check_username(&caller.username)
            .map_err(TrainError::InvalidInput)?;
        self.limits
            .check_deck_name(&edit.name)
            .map_err(TrainError::InvalidInput)?;
        self.limits.check_edit(&edit).map_err(TrainError::Limit)?;
        if let Some(card) = edit
            .cards
            .iter()
            .find(|c| c.question.trim().is_empty() || c.answer.trim().is_empty())
        {
            return Err(TrainError::InvalidInput(format!(
                "card with question '{}' has an empty side",
                card.question
            )));
        }

        let original_key = DeckKey::new(
            caller.username.clone(),
            original_name.unwrap_or(&edit.name).to_string(),
        );
        let target_key = DeckKey::new(caller.username.clone(), edit.name.clone());
        let initial_ease = self.scheduler.config().initial_ease;

        let existing = self.try_load(&original_key).await?;
        if target_key != original_key && self.try_load(&target_key).await?.is_some() {
            return Err(TrainError::InvalidInput(format!(
                "deck '{target_key}' already exists"
            )));
        }

        let renamed = existing.is_some() && target_key != original_key;
        let mut deck = match existing {
            Some(deck) => deck,
            None => {
                let owned = self.store.list_decks(&caller.username).await?.len();
                if owned >= self.limits.max_decks_per_user {
                    return Err(TrainError::Limit(format!(
                        "'{}' already has {} decks, the limit is {}",
                        caller.username, owned, self.limits.max_decks_per_user
                    )));
                }
                Deck::new(caller.username.clone(), edit.name.clone())
            }
        };

        deck.apply_edit(edit, initial_ease, today)
            .map_err(TrainError::InvalidInput)?;
        self.store.save_deck(&deck).await?;
        if renamed {
            if let Err(e) = self.finish_rename(&original_key, &target_key).await {
                self.undo_rename(&target_key).await;
                return Err(e);
            }
            tracing::info!(from = %original_key, to = %target_key, "deck renamed");
        }
        tracing::info!(deck = %target_key, cards = deck.cards.len(), "deck saved");
        Ok(deck)
    }

    /// Remove one of the caller's decks.
    pub async fn remove_deck(&self, caller: &Caller, key: &DeckKey) -> Result<(), TrainError> {
        self.load_owned(caller, key, "remove").await?;
        self.store.remove_deck(key).await?;
        tracing::info!(deck = %key, "deck removed");
        Ok(())
    }

    async fn load_readable(&self, caller: &Caller, key: &DeckKey) -> Result<Deck, TrainError> {
        let deck = self.store.load(key).await?;
        if deck.is_readable_by(caller) {
            Ok(deck)
        } else {
            Err(TrainError::DeckNotFound(key.clone()))
        }
    }

    async fn load_owned(
        &self,
        caller: &Caller,
        key: &DeckKey,
        action: &'static str,
    ) -> Result<Deck, TrainError> {
        if key.owner != caller.username {
            return Err(TrainError::AccessDenied {
                caller: caller.username.clone(),
                action,
                deck: key.clone(),
            });
        }
        Ok(self.store.load(key).await?)
    }

    async fn try_load(&self, key: &DeckKey) -> Result<Option<Deck>, TrainError> {
        match self.store.load(key).await {
            Ok(deck) => Ok(Some(deck)),
            Err(StoreError::DeckNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn finish_rename(&self, from: &DeckKey, to: &DeckKey) -> Result<(), TrainError> {
        for mut review in self.store.reviews(from).await? {
            review.deck = to.clone();
            self.store.append_review(&review).await?;
        }
        self.store.remove_deck(from).await?;
        Ok(())
    }

    /// Drop the half-renamed copy so the original deck stays the only one.
    async fn undo_rename(&self, renamed: &DeckKey) {
        match self.store.remove_deck(renamed).await {
            Ok(()) => tracing::warn!(deck = %renamed, "rename failed, new deck rolled back"),
            Err(e) => tracing::error!(
                deck = %renamed,
                error = %e,
                "rename failed and the new deck could not be rolled back"
            ),
        }
    }
}
