//! Memory model contract
//!
//! A memory model maps (current memory state, rating, now) to the next memory
//! state. Every implementation must honour the same transition table:
//!
//! | from        | Again      | Hard     | Good     | Easy    |
//! |-------------|------------|----------|----------|---------|
//! | New         | Learning   | Learning | Learning | Review  |
//! | Learning    | Learning   | Learning | Review   | Review  |
//! | Review      | Relearning | Review   | Review   | Review  |
//! | Relearning  | Relearning | Relearning | Review | Review  |
//!
//! The resulting due time is strictly after `now`, and for a fixed starting
//! state the interval strictly grows with the rating. Good and Easy out of
//! Review always schedule further out than the previous interval.

use chrono::{DateTime, Duration, Utc};

use super::models::{MemoryState, Rating};

/// A spaced repetition algorithm. Implementations are pure: identical inputs
/// give identical outputs.
pub trait MemoryModel: Send + Sync {
    /// Short identifier used in logs and configuration
    fn name(&self) -> &'static str;

    /// Compute the memory state after reviewing with `rating` at `now`
    fn schedule(&self, state: &MemoryState, rating: Rating, now: DateTime<Utc>) -> MemoryState;
}

/// Largest configurable interval cap, in days
pub const MAX_INTERVAL_DAYS: i64 = 36500;

/// Hard limit on any scheduled step, far past any cap a model applies
const MAX_STEP_DAYS: i64 = 10 * MAX_INTERVAL_DAYS;

/// How far out a transition schedules the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Short (re)learning step, no day interval
    Minutes(i64),
    Days(i64),
}

impl Step {
    /// Write the due time and scheduled interval into `state`
    pub(crate) fn apply(self, state: &mut MemoryState, now: DateTime<Utc>) {
        match self {
            Step::Minutes(m) => {
                state.scheduled_days = 0;
                state.due = later(now, Duration::minutes(m.clamp(1, 24 * 60)));
            }
            Step::Days(d) => {
                let d = d.clamp(1, MAX_STEP_DAYS);
                state.scheduled_days = d;
                state.due = later(now, Duration::days(d));
            }
        }
    }
}

fn later(now: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Day intervals for Hard, Good and Easy out of Review.
///
/// Each candidate is capped at `maximum` first. Good is then pushed past the
/// `previous` interval and the three are forced strictly increasing, so at the
/// cap the higher ratings land a few days beyond it.
pub(crate) fn review_intervals(
    previous: i64,
    hard: i64,
    good: i64,
    easy: i64,
    maximum: i64,
) -> [i64; 3] {
    let cap = |days: i64| days.clamp(1, maximum.max(1));
    let good = cap(good).max(previous.saturating_add(1));
    let hard = cap(hard).min(good);
    let good = good.max(hard + 1);
    let easy = cap(easy).max(good.saturating_add(1));
    [hard, good, easy]
}

/// Whole days between the previous review and `now` (0 for never-reviewed cards)
pub fn elapsed_days(state: &MemoryState, now: DateTime<Utc>) -> i64 {
    state
        .last_review
        .map(|last| (now - last).num_days().max(0))
        .unwrap_or(0)
}

/// Calculate the interval each rating would give, indexed Again..Easy.
/// Used to show users what each button would do.
pub fn preview_intervals(
    model: &dyn MemoryModel,
    state: &MemoryState,
    now: DateTime<Utc>,
) -> [Duration; 4] {
    Rating::ALL.map(|rating| model.schedule(state, rating, now).due - now)
}

/// Format an interval to a short human-readable string
pub fn format_interval(interval: Duration) -> String {
    let minutes = interval.num_minutes();
    if minutes <= 0 {
        return "now".to_string();
    }
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = interval.num_hours();
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = interval.num_days();
    if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

/// Shared checks for the transition table, run against every model
#[cfg(test)]
pub(crate) mod contract {
    use super::*;
    use crate::flashcards::models::CardStatus;

    pub fn at(status: CardStatus, now: DateTime<Utc>) -> MemoryState {
        let mut state = MemoryState::new(now);
        if status == CardStatus::New {
            return state;
        }
        state.status = status;
        state.stability = 10.0;
        state.difficulty = 5.0;
        state.reps = 4;
        state.scheduled_days = 10;
        state.last_review = Some(now - Duration::days(10));
        state.due = now;
        state
    }

    pub fn assert_transitions(model: &dyn MemoryModel) {
        use CardStatus::*;
        let now = Utc::now();
        let table = [
            (New, [Learning, Learning, Learning, Review]),
            (Learning, [Learning, Learning, Review, Review]),
            (Review, [Relearning, Review, Review, Review]),
            (Relearning, [Relearning, Relearning, Review, Review]),
        ];

        for (from, expected) in table {
            let state = at(from, now);
            for (rating, want) in Rating::ALL.into_iter().zip(expected) {
                let next = model.schedule(&state, rating, now);
                assert_eq!(next.status, want, "{} from {:?} with {:?}", model.name(), from, rating);
                assert!(next.due > now, "{} scheduled into the past", model.name());
                assert_eq!(next.reps, state.reps + 1);
                assert_eq!(next.last_review, Some(now));
            }
        }
    }

    pub fn assert_monotonic(model: &dyn MemoryModel) {
        let now = Utc::now();
        for from in [CardStatus::New, CardStatus::Learning, CardStatus::Review, CardStatus::Relearning] {
            let intervals = preview_intervals(model, &at(from, now), now);
            for pair in intervals.windows(2) {
                assert!(pair[0] < pair[1], "{} not monotonic from {:?}: {:?}", model.name(), from, intervals);
            }
        }
    }

    pub fn assert_deterministic(model: &dyn MemoryModel) {
        let now = Utc::now();
        let state = at(CardStatus::Review, now);
        for rating in Rating::ALL {
            assert_eq!(model.schedule(&state, rating, now), model.schedule(&state, rating, now));
        }
    }

    pub fn assert_review_grows(model: &dyn MemoryModel) {
        let now = Utc::now();
        let state = at(CardStatus::Review, now);
        let before = state.due - state.last_review.unwrap_or(now);
        for rating in [Rating::Good, Rating::Easy] {
            let next = model.schedule(&state, rating, now);
            assert!(next.due - now > before, "{} {:?} did not grow the interval", model.name(), rating);
        }
    }

    /// A mature card at the interval cap, and one pushed there by repeated
    /// Easy answers, still get strictly increasing, growing intervals
    pub fn assert_capped_review(model: &dyn MemoryModel) {
        let now = Utc::now();
        let mut capped = at(CardStatus::Review, now);
        capped.stability = MAX_INTERVAL_DAYS as f64;
        capped.scheduled_days = MAX_INTERVAL_DAYS;
        capped.last_review = Some(now - Duration::days(MAX_INTERVAL_DAYS));

        let mut pushed = MemoryState::new(now);
        for _ in 0..20 {
            pushed = model.schedule(&pushed, Rating::Easy, now);
        }

        for state in [capped, pushed] {
            let intervals = preview_intervals(model, &state, now);
            for pair in intervals.windows(2) {
                assert!(pair[0] < pair[1], "{} not monotonic at cap: {:?}", model.name(), intervals);
            }
            for rating in [Rating::Good, Rating::Easy] {
                let next = model.schedule(&state, rating, now);
                assert!(
                    next.scheduled_days > state.scheduled_days,
                    "{} {:?} did not grow past {}",
                    model.name(),
                    rating,
                    state.scheduled_days
                );
            }
        }
    }

    pub fn assert_lapse_counted(model: &dyn MemoryModel) {
        let now = Utc::now();
        let state = at(CardStatus::Review, now);
        assert_eq!(model.schedule(&state, Rating::Again, now).lapses, state.lapses + 1);
        assert_eq!(model.schedule(&state, Rating::Good, now).lapses, state.lapses);
    }
}
