//! Error types for scheduling, storage, and training.
//!
//! Storage errors live here rather than in `flashdeck-store` so the training
//! service can classify them (missing deck vs. I/O failure) without string
//! matching.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{CardId, DeckKey};

/// Errors raised by the scheduler.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    /// Feedback dated before the card's last review.
    #[error("card {card_id}: review date {as_of} precedes last review on {last_reviewed}")]
    ReviewInPast {
        card_id: CardId,
        as_of: NaiveDate,
        last_reviewed: NaiveDate,
    },

    /// The card is not part of the deck being trained.
    #[error("card {card_id} does not belong to deck '{deck}'")]
    CardNotInDeck { card_id: CardId, deck: DeckKey },

    /// The computed due date does not fit in the calendar.
    #[error("card {card_id}: due date overflows {as_of} + {interval_days} days")]
    DueDateOverflow {
        card_id: CardId,
        as_of: NaiveDate,
        interval_days: u32,
    },

    /// Scheduler configuration failed validation.
    #[error("invalid scheduler config: {0}")]
    InvalidConfig(String),
}

impl SchedulerError {
    /// Returns `true` if the error describes a card/date combination the
    /// scheduler refuses to apply.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            SchedulerError::ReviewInPast { .. }
                | SchedulerError::CardNotInDeck { .. }
                | SchedulerError::DueDateOverflow { .. }
        )
    }
}

/// Errors returned by [`DeckStore`](crate::traits::DeckStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("deck not found: {0}")]
    DeckNotFound(DeckKey),

    #[error("card {card_id} not found in deck '{deck}'")]
    CardNotFound { deck: DeckKey, card_id: CardId },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored data could not be decoded.
    #[error("corrupt data at {}: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the error means the requested entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::DeckNotFound(_) | StoreError::CardNotFound { .. }
        )
    }
}

/// Errors returned by the [`TrainingService`](crate::engine::TrainingService).
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("deck not found: {0}")]
    DeckNotFound(DeckKey),

    #[error("access denied: '{caller}' cannot {action} deck '{deck}'")]
    AccessDenied {
        caller: String,
        action: &'static str,
        deck: DeckKey,
    },

    /// A configured size limit would be exceeded.
    #[error("limit exceeded: {0}")]
    Limit(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("storage error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for TrainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DeckNotFound(key) => TrainError::DeckNotFound(key),
            other => TrainError::Store(other),
        }
    }
}
