//! FSRS-4.5 memory model
//!
//! Stability is the number of days until recall probability decays to 90%;
//! difficulty lives in [1, 10]. New cards go through minute learning steps,
//! then day intervals derived from stability and the requested retention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::algorithm::{elapsed_days, review_intervals, MemoryModel, Step, MAX_INTERVAL_DAYS};
use super::error::{FlashcardError, Result};
use super::models::{CardStatus, MemoryState, Rating};

const DECAY: f64 = -0.5;
/// Chosen so that retrievability is 0.9 when elapsed time equals stability
const FACTOR: f64 = 19.0 / 81.0;

const MIN_STABILITY: f64 = 0.1;
const MIN_DIFFICULTY: f64 = 1.0;
const MAX_DIFFICULTY: f64 = 10.0;

pub const DEFAULT_WEIGHTS: [f64; 17] = [
    0.4872, 1.4003, 3.7145, 13.8206, 5.1618, 1.2298, 0.8975, 0.031, 1.6474, 0.1367, 1.0461,
    2.1072, 0.0793, 0.3246, 1.587, 0.2272, 2.8755,
];

/// Tunable FSRS parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct FsrsParameters {
    /// Target probability of recall at the due date
    pub request_retention: f64,
    /// Cap on the interval stability alone can produce, in days (at most
    /// 36500). Out of Review, Good and Easy still land past the previous
    /// interval and above lower ratings, so they may pass the cap by a few days.
    pub maximum_interval: i64,
    pub weights: [f64; 17],
}

impl Default for FsrsParameters {
    fn default() -> Self {
        Self {
            request_retention: 0.9,
            maximum_interval: MAX_INTERVAL_DAYS,
            weights: DEFAULT_WEIGHTS,
        }
    }
}

impl FsrsParameters {
    pub fn validate(&self) -> Result<()> {
        if !(self.request_retention > 0.0 && self.request_retention < 1.0) {
            return Err(FlashcardError::Validation(format!(
                "request_retention must be in (0, 1), got {}",
                self.request_retention
            )));
        }
        if !(1..=MAX_INTERVAL_DAYS).contains(&self.maximum_interval) {
            return Err(FlashcardError::Validation(format!(
                "maximum_interval must be between 1 and {} days, got {}",
                MAX_INTERVAL_DAYS, self.maximum_interval
            )));
        }
        if self.weights.iter().any(|w| !w.is_finite()) {
            return Err(FlashcardError::Validation("weights must be finite".to_string()));
        }
        Ok(())
    }
}

/// Stability and difficulty candidates for each rating
#[derive(Debug, Clone, Copy)]
struct Candidate {
    stability: f64,
    difficulty: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Fsrs {
    params: FsrsParameters,
}

impl Fsrs {
    pub fn new(params: FsrsParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    fn w(&self, i: usize) -> f64 {
        self.params.weights[i]
    }

    fn init_stability(&self, rating: Rating) -> f64 {
        self.w(rating.value() as usize - 1).max(MIN_STABILITY)
    }

    fn init_difficulty(&self, rating: Rating) -> f64 {
        constrain_difficulty(self.w(4) - self.w(5) * (rating.value() - 3) as f64)
    }

    fn next_difficulty(&self, difficulty: f64, rating: Rating) -> f64 {
        let next = difficulty - self.w(6) * (rating.value() - 3) as f64;
        // mean reversion towards the initial Good difficulty
        constrain_difficulty(self.w(7) * self.w(4) + (1.0 - self.w(7)) * next)
    }

    fn next_recall_stability(&self, d: f64, s: f64, r: f64, rating: Rating) -> f64 {
        let hard_penalty = if rating == Rating::Hard { self.w(15) } else { 1.0 };
        let easy_bonus = if rating == Rating::Easy { self.w(16) } else { 1.0 };
        s * (1.0
            + self.w(8).exp()
                * (11.0 - d)
                * s.powf(-self.w(9))
                * (((1.0 - r) * self.w(10)).exp() - 1.0)
                * hard_penalty
                * easy_bonus)
    }

    fn next_forget_stability(&self, d: f64, s: f64, r: f64) -> f64 {
        self.w(11)
            * d.powf(-self.w(12))
            * ((s + 1.0).powf(self.w(13)) - 1.0)
            * ((1.0 - r) * self.w(14)).exp()
    }

    /// Interval in days that brings retrievability down to the requested retention
    fn next_interval(&self, stability: f64) -> i64 {
        let interval =
            stability / FACTOR * (self.params.request_retention.powf(1.0 / DECAY) - 1.0);
        (interval.round() as i64).clamp(1, self.params.maximum_interval)
    }

    fn candidate(&self, state: &MemoryState, elapsed: i64, rating: Rating) -> Candidate {
        if state.status == CardStatus::New {
            return Candidate {
                stability: self.init_stability(rating),
                difficulty: self.init_difficulty(rating),
            };
        }

        let s = state.stability.max(MIN_STABILITY);
        let d = constrain_difficulty(state.difficulty);
        let r = forgetting_curve(elapsed as f64, s);
        let stability = match rating {
            Rating::Again => self.next_forget_stability(d, s, r),
            _ => self.next_recall_stability(d, s, r, rating),
        };
        Candidate {
            stability: stability.max(MIN_STABILITY),
            difficulty: self.next_difficulty(d, rating),
        }
    }
}

impl MemoryModel for Fsrs {
    fn name(&self) -> &'static str {
        "fsrs"
    }

    fn schedule(&self, state: &MemoryState, rating: Rating, now: DateTime<Utc>) -> MemoryState {
        let elapsed = elapsed_days(state, now);
        let next = self.candidate(state, elapsed, rating);

        let mut out = state.clone();
        out.stability = next.stability;
        out.difficulty = next.difficulty;
        out.elapsed_days = elapsed;
        out.reps = state.reps + 1;
        out.last_review = Some(now);

        let (status, step) = match (state.status, rating) {
            (CardStatus::New, Rating::Again) => (CardStatus::Learning, Step::Minutes(1)),
            (CardStatus::New, Rating::Hard) => (CardStatus::Learning, Step::Minutes(5)),
            (CardStatus::New, Rating::Good) => (CardStatus::Learning, Step::Minutes(10)),
            (CardStatus::New, Rating::Easy) => {
                (CardStatus::Review, Step::Days(self.next_interval(next.stability)))
            }

            (CardStatus::Learning | CardStatus::Relearning, Rating::Again) => {
                (state.status, Step::Minutes(5))
            }
            (CardStatus::Learning | CardStatus::Relearning, Rating::Hard) => {
                (state.status, Step::Minutes(10))
            }
            (CardStatus::Learning | CardStatus::Relearning, Rating::Good) => {
                (CardStatus::Review, Step::Days(self.next_interval(next.stability)))
            }
            (CardStatus::Learning | CardStatus::Relearning, Rating::Easy) => {
                let good = self.candidate(state, elapsed, Rating::Good);
                let good_interval = self.next_interval(good.stability);
                let easy_interval = self.next_interval(next.stability).max(good_interval + 1);
                (CardStatus::Review, Step::Days(easy_interval))
            }

            (CardStatus::Review, Rating::Again) => {
                out.lapses = state.lapses + 1;
                (CardStatus::Relearning, Step::Minutes(5))
            }
            (CardStatus::Review, _) => {
                let [hard, good, easy] = [Rating::Hard, Rating::Good, Rating::Easy]
                    .map(|r| self.next_interval(self.candidate(state, elapsed, r).stability));
                let [hard, good, easy] = review_intervals(
                    state.scheduled_days,
                    hard,
                    good,
                    easy,
                    self.params.maximum_interval,
                );
                let days = match rating {
                    Rating::Hard => hard,
                    Rating::Good => good,
                    _ => easy,
                };
                (CardStatus::Review, Step::Days(days))
            }
        };

        out.status = status;
        step.apply(&mut out, now);
        out
    }
}

/// Probability of recall after `elapsed_days` for a card with `stability`
pub fn forgetting_curve(elapsed_days: f64, stability: f64) -> f64 {
    (1.0 + FACTOR * elapsed_days / stability).powf(DECAY)
}

fn constrain_difficulty(d: f64) -> f64 {
    d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::algorithm::contract;
    use chrono::Duration;

    #[test]
    fn test_transition_table() {
        contract::assert_transitions(&Fsrs::default());
    }

    #[test]
    fn test_monotonic_intervals() {
        contract::assert_monotonic(&Fsrs::default());
    }

    #[test]
    fn test_deterministic() {
        contract::assert_deterministic(&Fsrs::default());
    }

    #[test]
    fn test_review_interval_grows() {
        contract::assert_review_grows(&Fsrs::default());
    }

    #[test]
    fn test_lapse_counted() {
        contract::assert_lapse_counted(&Fsrs::default());
    }

    #[test]
    fn test_capped_review() {
        contract::assert_capped_review(&Fsrs::default());
    }

    #[test]
    fn test_new_card_learning_steps() {
        let fsrs = Fsrs::default();
        let now = Utc::now();
        let state = MemoryState::new(now);

        let good = fsrs.schedule(&state, Rating::Good, now);
        assert_eq!(good.status, CardStatus::Learning);
        assert_eq!(good.due - now, Duration::minutes(10));
        assert_eq!(good.scheduled_days, 0);
        assert!((good.stability - DEFAULT_WEIGHTS[2]).abs() < 1e-9);

        let easy = fsrs.schedule(&state, Rating::Easy, now);
        assert_eq!(easy.status, CardStatus::Review);
        assert_eq!(easy.scheduled_days, 14);
    }

    #[test]
    fn test_retention_at_stability() {
        let r = forgetting_curve(10.0, 10.0);
        assert!((r - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_difficulty_stays_in_range() {
        let fsrs = Fsrs::default();
        let now = Utc::now();
        let mut state = contract::at(CardStatus::Review, now);
        for _ in 0..20 {
            state = fsrs.schedule(&state, Rating::Again, now);
            assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&state.difficulty));
        }
        for _ in 0..20 {
            state = fsrs.schedule(&state, Rating::Easy, now);
            assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&state.difficulty));
        }
    }

    #[test]
    fn test_maximum_interval_caps() {
        let fsrs = Fsrs::new(FsrsParameters {
            maximum_interval: 30,
            ..Default::default()
        })
        .unwrap();
        let now = Utc::now();
        let mut state = contract::at(CardStatus::Review, now);
        state.stability = 500.0;
        let days: Vec<i64> = [Rating::Hard, Rating::Good, Rating::Easy]
            .into_iter()
            .map(|r| fsrs.schedule(&state, r, now).scheduled_days)
            .collect();
        // soft cap: higher ratings still get strictly longer intervals
        assert_eq!(days, vec![30, 31, 32]);
    }

    #[test]
    fn test_huge_stability_does_not_panic() {
        let fsrs = Fsrs::default();
        let now = Utc::now();
        let mut state = contract::at(CardStatus::Review, now);
        state.stability = 1e12;
        state.scheduled_days = i64::MAX;
        for rating in Rating::ALL {
            assert!(fsrs.schedule(&state, rating, now).due > now);
        }
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let bad = FsrsParameters {
            request_retention: 1.5,
            ..Default::default()
        };
        assert!(matches!(Fsrs::new(bad), Err(FlashcardError::Validation(_))));

        for maximum_interval in [0, MAX_INTERVAL_DAYS + 1, 1_000_000_000] {
            let bad = FsrsParameters {
                maximum_interval,
                ..Default::default()
            };
            assert!(matches!(Fsrs::new(bad), Err(FlashcardError::Validation(_))));
        }
    }
}
