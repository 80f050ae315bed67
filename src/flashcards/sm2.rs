//! SM-2 Spaced Repetition Algorithm
//!
//! Implementation of the SuperMemo 2 algorithm for calculating
//! optimal review intervals based on user performance, with short
//! minute steps while a card is (re)learning.
//!
//! Memory state mapping:
//! - `stability` holds the current interval in days
//! - `difficulty` holds the ease factor (0 means not yet set)

use chrono::{DateTime, Utc};

use super::algorithm::{elapsed_days, review_intervals, MemoryModel, Step, MAX_INTERVAL_DAYS};
use super::models::{CardStatus, MemoryState, Rating};

/// Minimum ease factor allowed
const MIN_EASE_FACTOR: f64 = 1.3;
const DEFAULT_EASE_FACTOR: f64 = 2.5;

const AGAIN_STEP_MINUTES: i64 = 1;
const HARD_STEP_MINUTES: i64 = 6;
const GOOD_STEP_MINUTES: i64 = 10;
const RELEARN_STEP_MINUTES: i64 = 10;

const GRADUATING_INTERVAL: i64 = 1;
const EASY_INTERVAL: i64 = 4;
const HARD_MULTIPLIER: f64 = 1.2;
const EASY_BONUS: f64 = 1.3;

#[derive(Debug, Clone, Copy, Default)]
pub struct Sm2;

/// Map UI rating (1-4: Again, Hard, Good, Easy) to SM-2 quality (0-5)
pub fn rating_to_quality(rating: Rating) -> i32 {
    match rating {
        Rating::Again => 1, // incorrect but recognized
        Rating::Hard => 3,  // correct with difficulty
        Rating::Good => 4,  // correct with hesitation
        Rating::Easy => 5,  // perfect
    }
}

/// EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), floored at 1.3
fn adjust_ease(ease_factor: f64, quality: i32) -> f64 {
    let miss = (5 - quality) as f64;
    (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR)
}

impl MemoryModel for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn schedule(&self, state: &MemoryState, rating: Rating, now: DateTime<Utc>) -> MemoryState {
        let quality = rating_to_quality(rating);
        let ease_factor = if state.difficulty > 0.0 {
            state.difficulty.max(MIN_EASE_FACTOR)
        } else {
            DEFAULT_EASE_FACTOR
        };
        let interval = (state.stability.round() as i64).max(1);

        let mut out = state.clone();
        out.elapsed_days = elapsed_days(state, now);
        out.reps = state.reps + 1;
        out.last_review = Some(now);
        out.difficulty = ease_factor;

        let step = match (state.status, rating) {
            (CardStatus::New | CardStatus::Learning, Rating::Again) => {
                out.status = CardStatus::Learning;
                Step::Minutes(AGAIN_STEP_MINUTES)
            }
            (CardStatus::New | CardStatus::Learning, Rating::Hard) => {
                out.status = CardStatus::Learning;
                Step::Minutes(HARD_STEP_MINUTES)
            }
            (CardStatus::New, Rating::Good) => {
                out.status = CardStatus::Learning;
                Step::Minutes(GOOD_STEP_MINUTES)
            }
            (CardStatus::Relearning, Rating::Again) => Step::Minutes(AGAIN_STEP_MINUTES),
            (CardStatus::Relearning, Rating::Hard) => Step::Minutes(HARD_STEP_MINUTES),
            (CardStatus::Learning | CardStatus::Relearning, Rating::Good) => {
                out.status = CardStatus::Review;
                Step::Days(GRADUATING_INTERVAL)
            }
            (CardStatus::New | CardStatus::Learning | CardStatus::Relearning, Rating::Easy) => {
                out.status = CardStatus::Review;
                out.difficulty = adjust_ease(ease_factor, quality);
                Step::Days(EASY_INTERVAL)
            }

            // Incorrect response - back to relearning
            (CardStatus::Review, Rating::Again) => {
                out.status = CardStatus::Relearning;
                out.lapses = state.lapses + 1;
                out.difficulty = (ease_factor - 0.2).max(MIN_EASE_FACTOR);
                out.stability = 1.0;
                Step::Minutes(RELEARN_STEP_MINUTES)
            }
            (CardStatus::Review, _) => {
                let scaled = |factor: f64| (interval as f64 * factor).round() as i64;
                let [hard, good, easy] = review_intervals(
                    interval,
                    scaled(HARD_MULTIPLIER),
                    scaled(ease_factor),
                    scaled(ease_factor * EASY_BONUS),
                    MAX_INTERVAL_DAYS,
                );
                out.status = CardStatus::Review;
                out.difficulty = adjust_ease(ease_factor, quality);
                Step::Days(match rating {
                    Rating::Hard => hard,
                    Rating::Good => good,
                    _ => easy,
                })
            }
        };

        let step = match step {
            Step::Days(days) => {
                out.stability = days as f64;
                Step::Days(days)
            }
            minutes => minutes,
        };
        step.apply(&mut out, now);
        out
    }
}
