//! Deck statistics: phase counts, due load, review success, and a short
//! due-date forecast.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{CardId, CardPhase, Deck, DeckKey, ReviewLog};

/// Cards at or above this interval count as mature.
pub const MATURE_INTERVAL_DAYS: u32 = 21;

/// Number of days covered by [`DeckStats::forecast`], starting at `as_of`.
pub const FORECAST_DAYS: u64 = 7;

/// Aggregate statistics for one deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckStats {
    pub deck: DeckKey,
    /// Reference date the due counts are relative to.
    pub as_of: NaiveDate,
    pub total_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    /// Cards with a due date on or before `as_of`.
    pub due_now: usize,
    /// Cards with a due date strictly before `as_of`.
    pub overdue: usize,
    pub mature_cards: usize,
    /// Mean ease factor, 0 for an empty deck.
    pub average_ease: f64,
    pub reviews: ReviewTotals,
    pub forecast: Vec<ForecastDay>,
    /// Per-card breakdown, ordered by card id.
    pub cards: Vec<CardStats>,
}

/// Pass/fail totals over a set of reviews.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReviewTotals {
    pub total: usize,
    pub passes: usize,
    pub failures: usize,
    /// `passes / total`, 0 when there are no reviews.
    pub success_rate: f64,
}

impl ReviewTotals {
    fn from_reviews<'a>(reviews: impl IntoIterator<Item = &'a ReviewLog>) -> Self {
        let (mut total, mut passes) = (0usize, 0usize);
        for r in reviews {
            total += 1;
            if r.success {
                passes += 1;
            }
        }
        Self {
            total,
            passes,
            failures: total - passes,
            success_rate: if total == 0 {
                0.0
            } else {
                passes as f64 / total as f64
            },
        }
    }
}

/// Number of cards due on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub due: usize,
}

/// Statistics for a single card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardStats {
    pub card_id: CardId,
    pub question: String,
    pub phase: CardPhase,
    pub due: NaiveDate,
    pub interval_days: u32,
    pub ease: f64,
    pub reviews: ReviewTotals,
    pub last_reviewed: Option<NaiveDate>,
}

/// Compute statistics for `deck` as of `as_of`.
///
/// `reviews` may belong to any subset of reviewers; reviews of cards no
/// longer in the deck still count towards the deck totals.
pub fn compute_deck_stats(deck: &Deck, reviews: &[ReviewLog], as_of: NaiveDate) -> DeckStats {
    let mut by_card: HashMap<CardId, Vec<&ReviewLog>> = HashMap::new();
    for r in reviews {
        by_card.entry(r.card_id).or_default().push(r);
    }

    let mut phase_counts: HashMap<CardPhase, usize> = HashMap::new();
    for card in &deck.cards {
        *phase_counts.entry(card.schedule.phase()).or_default() += 1;
    }
    let phase = |p: CardPhase| phase_counts.get(&p).copied().unwrap_or(0);

    let due_now = deck
        .cards
        .iter()
        .filter(|c| c.schedule.is_due(as_of))
        .count();
    let overdue = deck
        .cards
        .iter()
        .filter(|c| c.schedule.due < as_of)
        .count();
    let mature_cards = deck
        .cards
        .iter()
        .filter(|c| c.schedule.interval_days >= MATURE_INTERVAL_DAYS)
        .count();

    let average_ease = if deck.cards.is_empty() {
        0.0
    } else {
        deck.cards.iter().map(|c| c.schedule.ease).sum::<f64>() / deck.cards.len() as f64
    };

    let forecast = (0..FORECAST_DAYS)
        .filter_map(|offset| as_of.checked_add_days(Days::new(offset)))
        .map(|date| {
            let due = deck
                .cards
                .iter()
                .filter(|c| {
                    if date == as_of {
                        c.schedule.due <= date
                    } else {
                        c.schedule.due == date
                    }
                })
                .count();
            ForecastDay { date, due }
        })
        .collect();

    let mut cards: Vec<CardStats> = deck
        .cards
        .iter()
        .map(|c| CardStats {
            card_id: c.id,
            question: c.question.clone(),
            phase: c.schedule.phase(),
            due: c.schedule.due,
            interval_days: c.schedule.interval_days,
            ease: c.schedule.ease,
            reviews: ReviewTotals::from_reviews(
                by_card.get(&c.id).into_iter().flatten().copied(),
            ),
            last_reviewed: c.schedule.last_reviewed,
        })
        .collect();
    cards.sort_by_key(|c| c.card_id);

    DeckStats {
        deck: deck.key(),
        as_of,
        total_cards: deck.cards.len(),
        new_cards: phase(CardPhase::New),
        learning_cards: phase(CardPhase::Learning),
        review_cards: phase(CardPhase::Review),
        due_now,
        overdue,
        mature_cards,
        average_ease,
        reviews: ReviewTotals::from_reviews(reviews),
        forecast,
        cards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Card, SchedulingState};
    use uuid::Uuid;

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .checked_add_days(Days::new(n))
            .unwrap()
    }

    fn card(id: CardId, due: u64, reps: u32, interval: u32, ease: f64) -> Card {
        Card {
            id,
            question: format!("q{id}"),
            answer: format!("a{id}"),
            schedule: SchedulingState {
                ease,
                interval_days: interval,
                repetitions: reps,
                due: day(due),
                last_reviewed: None,
            },
        }
    }

    fn review(card_id: CardId, success: bool) -> ReviewLog {
        ReviewLog {
            id: Uuid::new_v4(),
            deck: DeckKey::new("alice", "stats"),
            card_id,
            reviewer: "alice".into(),
            success,
            response_time_ms: None,
            reviewed_on: day(0),
            interval_after: 1,
            ease_after: 2.5,
        }
    }

    #[test]
    fn empty_deck() {
        let deck = Deck::new("alice", "stats");
        let stats = compute_deck_stats(&deck, &[], day(0));
        assert_eq!(stats.total_cards, 0);
        assert_eq!(stats.average_ease, 0.0);
        assert_eq!(stats.reviews.success_rate, 0.0);
        assert_eq!(stats.forecast.len(), FORECAST_DAYS as usize);
        assert!(stats.forecast.iter().all(|f| f.due == 0));
    }

    #[test]
    fn counts_and_forecast() {
        let mut deck = Deck::new("alice", "stats");
        deck.cards = vec![
            card(3, 0, 0, 0, 2.5),  // new, due today
            card(1, 2, 1, 1, 2.6),  // learning, due in 2 days
            card(2, 9, 5, 30, 2.9), // review, mature, beyond forecast
            card(4, 0, 3, 21, 2.0), // review, mature, overdue relative to day 1
        ];
        let stats = compute_deck_stats(&deck, &[], day(1));

        assert_eq!(stats.total_cards, 4);
        assert_eq!(stats.new_cards, 1);
        assert_eq!(stats.learning_cards, 1);
        assert_eq!(stats.review_cards, 2);
        assert_eq!(stats.due_now, 2);
        assert_eq!(stats.overdue, 2);
        assert_eq!(stats.mature_cards, 2);
        assert!((stats.average_ease - 2.5).abs() < 1e-9);

        assert_eq!(stats.forecast[0].date, day(1));
        assert_eq!(stats.forecast[0].due, 2);
        assert_eq!(stats.forecast[1].due, 1);
        assert_eq!(stats.forecast.iter().map(|f| f.due).sum::<usize>(), 3);

        let ids: Vec<CardId> = stats.cards.iter().map(|c| c.card_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn review_totals_per_deck_and_card() {
        let mut deck = Deck::new("alice", "stats");
        deck.cards = vec![card(1, 0, 0, 0, 2.5), card(2, 0, 0, 0, 2.5)];
        let reviews = vec![
            review(1, true),
            review(1, false),
            review(1, true),
            review(2, false),
            review(7, true),
        ];
        let stats = compute_deck_stats(&deck, &reviews, day(0));

        assert_eq!(stats.reviews.total, 5);
        assert_eq!(stats.reviews.passes, 3);
        assert_eq!(stats.reviews.failures, 2);
        assert!((stats.reviews.success_rate - 0.6).abs() < 1e-9);

        let first = &stats.cards[0];
        assert_eq!(first.reviews.total, 3);
        assert!((first.reviews.success_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.cards[1].reviews.passes, 0);
    }
}
