//! Review statistics

use chrono::{DateTime, Local, Utc};

use super::models::{CardStatus, ReviewStats, StoreData};
use super::storage::CardStore;

/// Compute summary counters. "Today" is the local calendar day containing `now`.
pub fn compute_stats(data: &StoreData, now: DateTime<Utc>) -> ReviewStats {
    let mut stats = ReviewStats {
        total_cards: data.cards.len(),
        ..Default::default()
    };

    for card in data.cards.values() {
        match card.state.status {
            CardStatus::New => stats.new_cards += 1,
            CardStatus::Learning | CardStatus::Relearning => stats.learning_cards += 1,
            CardStatus::Review => stats.review_cards += 1,
        }

        if card.state.is_due(now) {
            stats.due_cards += 1;
        }
    }

    let today = now.with_timezone(&Local).date_naive();
    let mut passed_today = 0;
    for review in &data.reviews {
        if review.reviewed_at.with_timezone(&Local).date_naive() == today {
            stats.reviews_today += 1;
            if review.rating.is_pass() {
                passed_today += 1;
            }
        }
    }

    if stats.reviews_today > 0 {
        stats.retention_rate = passed_today as f64 / stats.reviews_today as f64 * 100.0;
    }

    stats
}

/// Get review statistics for the whole store
pub fn review_stats(store: &CardStore, now: DateTime<Utc>) -> ReviewStats {
    store.with_data(|data| compute_stats(data, now))
}
