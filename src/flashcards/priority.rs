//! Due-card priority scoring

use chrono::{DateTime, Utc};

use super::models::{CardStatus, MemoryState};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Weight of the card's lifecycle phase. Cards mid-learning come first so
/// their short steps are not lost, then reviews, then unseen cards.
pub fn base_priority(status: CardStatus) -> f64 {
    match status {
        CardStatus::New => 1.0,
        CardStatus::Review => 2.0,
        CardStatus::Learning | CardStatus::Relearning => 3.0,
    }
}

/// Fractional days `now` is past `due` (negative when not yet due)
pub fn overdue_days(due: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - due).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Score a card for selection. Grows the longer a card is overdue and
/// shrinks the further in the future it is due.
pub fn priority(state: &MemoryState, now: DateTime<Utc>) -> f64 {
    let base = base_priority(state.status);
    let overdue = overdue_days(state.due, now);
    if overdue >= 0.0 {
        base * (1.0 + overdue * 0.1)
    } else {
        base / (1.0 - overdue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn state(status: CardStatus, due: DateTime<Utc>) -> MemoryState {
        let mut state = MemoryState::new(due);
        state.status = status;
        state
    }

    #[test]
    fn test_due_now_scores_base() {
        let now = Utc::now();
        assert_eq!(priority(&state(CardStatus::New, now), now), 1.0);
        assert_eq!(priority(&state(CardStatus::Review, now), now), 2.0);
        assert_eq!(priority(&state(CardStatus::Learning, now), now), 3.0);
        assert_eq!(priority(&state(CardStatus::Relearning, now), now), 3.0);
    }

    #[test]
    fn test_overdue_formula() {
        let now = Utc::now();
        let s = state(CardStatus::Review, now - Duration::days(5));
        assert!((priority(&s, now) - 3.0).abs() < 1e-9);

        let s = state(CardStatus::Review, now + Duration::days(1));
        assert!((priority(&s, now) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_more_overdue_ranks_higher() {
        let now = Utc::now();
        let mut last = f64::MIN;
        for hours in [0, 1, 12, 48, 24 * 30] {
            let p = priority(&state(CardStatus::Review, now - Duration::hours(hours)), now);
            assert!(p > last);
            last = p;
        }
    }

    #[test]
    fn test_further_future_ranks_lower() {
        let now = Utc::now();
        let mut last = f64::MAX;
        for hours in [1, 12, 48, 24 * 30] {
            let p = priority(&state(CardStatus::Learning, now + Duration::hours(hours)), now);
            assert!(p < last);
            last = p;
        }
    }

    #[test]
    fn test_status_order_at_equal_overdue() {
        let now = Utc::now();
        for hours in [0, 2, 72] {
            let due = now - Duration::hours(hours);
            let new = priority(&state(CardStatus::New, due), now);
            let review = priority(&state(CardStatus::Review, due), now);
            let learning = priority(&state(CardStatus::Learning, due), now);
            let relearning = priority(&state(CardStatus::Relearning, due), now);
            assert!(learning > review && review > new);
            assert_eq!(learning, relearning);
        }
    }
}
