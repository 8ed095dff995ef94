//! SM-2 style spaced-repetition scheduler.
//!
//! The scheduler is a pure, synchronous computation: it picks the next due
//! card of a deck and maps `(old state, feedback, date)` to a new scheduling
//! state. It never performs I/O and never retries.
//!
//! Update rules:
//!
//! - success: `repetitions += 1`, ease grows by a grade-dependent increment
//!   (capped at the ceiling), `interval = round(interval * ease)` clamped to
//!   `[1, max_interval_days]`, due on `as_of + interval`;
//! - failure: `repetitions = 0`, ease shrinks (floored), `interval = 1`,
//!   due on `as_of + 1`.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;
use crate::model::{Card, CardId, Deck, ReviewFeedback, SchedulingState};

/// Tunable constants of the scheduling policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ease factor given to new cards.
    pub initial_ease: f64,
    /// Lowest ease factor a card can reach.
    pub ease_floor: f64,
    /// Highest ease factor a card can reach.
    pub ease_ceiling: f64,
    /// Ease increment for a normal successful review.
    pub success_increment: f64,
    /// Ease increment for a fast successful review.
    pub easy_increment: f64,
    /// Ease increment for a slow successful review.
    pub hard_increment: f64,
    /// Ease decrement applied on failure.
    pub failure_decrement: f64,
    /// Upper bound on any interval.
    pub max_interval_days: u32,
    /// Successful answers faster than this are graded easy.
    pub easy_response_ms: u64,
    /// Successful answers at least this slow are graded hard.
    pub hard_response_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            ease_floor: 1.3,
            ease_ceiling: 3.5,
            success_increment: 0.1,
            easy_increment: 0.15,
            hard_increment: 0.0,
            failure_decrement: 0.2,
            max_interval_days: 36_500,
            easy_response_ms: 2_000,
            hard_response_ms: 5_000,
        }
    }
}

impl SchedulerConfig {
    /// Check that the bounds are consistent and every step is non-negative.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        let invalid = |msg: String| -> Result<(), SchedulerError> {
            Err(SchedulerError::InvalidConfig(msg))
        };

        let reals = [
            ("initial_ease", self.initial_ease),
            ("ease_floor", self.ease_floor),
            ("ease_ceiling", self.ease_ceiling),
            ("success_increment", self.success_increment),
            ("easy_increment", self.easy_increment),
            ("hard_increment", self.hard_increment),
            ("failure_decrement", self.failure_decrement),
        ];
        for (name, value) in reals {
            if !value.is_finite() {
                return invalid(format!("{name} must be finite, got {value}"));
            }
        }
        for (name, value) in &reals[3..] {
            if *value < 0.0 {
                return invalid(format!("{name} must not be negative, got {value}"));
            }
        }

        if self.ease_floor <= 0.0 {
            return invalid(format!(
                "ease_floor must be positive, got {}",
                self.ease_floor
            ));
        }
        if !(self.ease_floor <= self.initial_ease && self.initial_ease <= self.ease_ceiling) {
            return invalid(format!(
                "expected ease_floor <= initial_ease <= ease_ceiling, got {} / {} / {}",
                self.ease_floor, self.initial_ease, self.ease_ceiling
            ));
        }
        if self.max_interval_days == 0 {
            return invalid("max_interval_days must be at least 1".into());
        }
        if self.easy_response_ms > self.hard_response_ms {
            return invalid(format!(
                "easy_response_ms ({}) exceeds hard_response_ms ({})",
                self.easy_response_ms, self.hard_response_ms
            ));
        }
        Ok(())
    }
}

/// Recall quality derived from pass/fail and response time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    /// Grade a review. Response time only refines a success; a missing
    /// measurement grades as `Good`.
    pub fn from_feedback(
        success: bool,
        response_time_ms: Option<u64>,
        config: &SchedulerConfig,
    ) -> Self {
        if !success {
            return Grade::Again;
        }
        match response_time_ms {
            Some(ms) if ms < config.easy_response_ms => Grade::Easy,
            Some(ms) if ms >= config.hard_response_ms => Grade::Hard,
            _ => Grade::Good,
        }
    }

    pub fn is_success(self) -> bool {
        self != Grade::Again
    }
}

/// The spaced-repetition scheduler.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a scheduler, rejecting an inconsistent configuration.
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Scheduling state for a card introduced on `today`.
    pub fn new_card_state(&self, today: NaiveDate) -> SchedulingState {
        SchedulingState::new(self.config.initial_ease, today)
    }

    /// Pick the card to present next, or `None` when nothing is due.
    ///
    /// Earliest due date wins; ties go to the card with the fewest
    /// repetitions, then to deck order.
    pub fn select_next<'a>(&self, deck: &'a Deck, as_of: NaiveDate) -> Option<&'a Card> {
        // min_by_key keeps the first of equal minima, which gives deck order.
        let next = deck
            .cards
            .iter()
            .filter(|c| c.schedule.is_due(as_of))
            .min_by_key(|c| (c.schedule.due, c.schedule.repetitions));

        match next {
            Some(card) => tracing::debug!(
                deck = %deck.key(),
                card_id = card.id,
                due = %card.schedule.due,
                "selected next card"
            ),
            None => tracing::debug!(deck = %deck.key(), %as_of, "no card due"),
        }
        next
    }

    pub fn grade(&self, feedback: &ReviewFeedback) -> Grade {
        Grade::from_feedback(feedback.success, feedback.response_time_ms, &self.config)
    }

    /// Compute the state that follows `state` after a review graded `grade`
    /// on `as_of`. Pure: the input is left untouched.
    pub fn next_state(
        &self,
        card_id: CardId,
        state: &SchedulingState,
        grade: Grade,
        as_of: NaiveDate,
    ) -> Result<SchedulingState, SchedulerError> {
        if let Some(last_reviewed) = state.last_reviewed {
            if as_of < last_reviewed {
                return Err(SchedulerError::ReviewInPast {
                    card_id,
                    as_of,
                    last_reviewed,
                });
            }
        }

        let cfg = &self.config;
        let ease = if state.ease.is_finite() {
            state.ease
        } else {
            cfg.initial_ease
        };

        let (ease, interval_days, repetitions) = match grade {
            Grade::Again => (
                (ease - cfg.failure_decrement).clamp(cfg.ease_floor, cfg.ease_ceiling),
                1,
                0,
            ),
            Grade::Hard | Grade::Good | Grade::Easy => {
                let increment = match grade {
                    Grade::Hard => cfg.hard_increment,
                    Grade::Easy => cfg.easy_increment,
                    _ => cfg.success_increment,
                };
                let ease = (ease + increment).clamp(cfg.ease_floor, cfg.ease_ceiling);
                let interval = (f64::from(state.interval_days) * ease)
                    .round()
                    .clamp(1.0, f64::from(cfg.max_interval_days)) as u32;
                (ease, interval, state.repetitions.saturating_add(1))
            }
        };

        let due = as_of
            .checked_add_days(Days::new(u64::from(interval_days)))
            .ok_or(SchedulerError::DueDateOverflow {
                card_id,
                as_of,
                interval_days,
            })?;

        Ok(SchedulingState {
            ease,
            interval_days,
            repetitions,
            due,
            last_reviewed: Some(as_of),
        })
    }

    /// Apply a graded review to `card` in place. On error the card is
    /// unchanged.
    pub fn review_card(
        &self,
        card: &mut Card,
        grade: Grade,
        as_of: NaiveDate,
    ) -> Result<(), SchedulerError> {
        let next = self.next_state(card.id, &card.schedule, grade, as_of)?;
        tracing::debug!(
            card_id = card.id,
            ?grade,
            repetitions = next.repetitions,
            interval_days = next.interval_days,
            ease = next.ease,
            due = %next.due,
            "card rescheduled"
        );
        card.schedule = next;
        Ok(())
    }

    /// Record feedback for a card of `deck` and return the updated card.
    pub fn record_feedback(
        &self,
        deck: &mut Deck,
        feedback: &ReviewFeedback,
        as_of: NaiveDate,
    ) -> Result<Card, SchedulerError> {
        let grade = self.grade(feedback);
        let key = deck.key();
        let card = deck
            .card_mut(feedback.card_id)
            .ok_or(SchedulerError::CardNotInDeck {
                card_id: feedback.card_id,
                deck: key,
            })?;
        self.review_card(card, grade, as_of)?;
        Ok(card.clone())
    }
}
