//! Data models for the flashcard system

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::FlashcardError;

/// Status of a card in the spaced repetition system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CardStatus {
    /// Never reviewed
    #[default]
    New,
    /// In initial learning phase
    Learning,
    /// Regular spaced review
    Review,
    /// Failed and re-learning
    Relearning,
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Review => "review",
            Self::Relearning => "relearning",
        };
        f.write_str(name)
    }
}

/// Learner's self-assessment of recall quality.
///
/// Serialized as its ordinal (1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn value(self) -> i32 {
        self as i32
    }

    /// Whether the rating counts as a successful recall
    pub fn is_pass(self) -> bool {
        self >= Rating::Good
    }
}

impl TryFrom<i32> for Rating {
    type Error = FlashcardError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Again),
            2 => Ok(Self::Hard),
            3 => Ok(Self::Good),
            4 => Ok(Self::Easy),
            other => Err(FlashcardError::Validation(format!(
                "rating must be between 1 and 4, got {}",
                other
            ))),
        }
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        };
        f.write_str(name)
    }
}

/// Memory-state block of a card.
///
/// `stability` and `difficulty` belong to the memory model that produced them;
/// nothing outside `algorithm`, `fsrs` and `sm2` interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
    #[serde(default)]
    pub status: CardStatus,
    #[serde(default)]
    pub stability: f64,
    #[serde(default)]
    pub difficulty: f64,
    /// Days between the previous review and the latest one
    #[serde(default)]
    pub elapsed_days: i64,
    /// Interval in days chosen by the latest review (0 for minute steps)
    #[serde(default)]
    pub scheduled_days: i64,
    /// Total number of reviews
    #[serde(default)]
    pub reps: u32,
    /// Number of times the card was forgotten from review
    #[serde(default)]
    pub lapses: u32,
    /// When the card is due for review
    pub due: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,
}

impl MemoryState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            status: CardStatus::New,
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            due: now,
            last_review: None,
        }
    }

    /// Check if the card is due for review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due <= now
    }
}

/// A flashcard with question (front) and answer (back)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub state: MemoryState,
}

impl Card {
    pub fn new(front: String, back: String, tags: BTreeSet<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            front,
            back,
            tags,
            created_at: now,
            updated_at: now,
            state: MemoryState::new(now),
        }
    }

    /// True when the card carries every tag in `filter` (an empty filter matches all)
    pub fn has_all_tags(&self, filter: &BTreeSet<String>) -> bool {
        filter.is_subset(&self.tags)
    }
}

/// Trim tags, drop empty ones and collapse duplicates
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// A record of a single review event. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub card_id: Uuid,
    pub rating: Rating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub reviewed_at: DateTime<Utc>,
    /// Status the card ended up in after this review
    pub status: CardStatus,
    pub scheduled_days: i64,
    pub elapsed_days: i64,
}

impl Review {
    pub fn new(
        card_id: Uuid,
        rating: Rating,
        answer: Option<String>,
        reviewed_at: DateTime<Utc>,
        outcome: &MemoryState,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            rating,
            answer,
            reviewed_at,
            status: outcome.status,
            scheduled_days: outcome.scheduled_days,
            elapsed_days: outcome.elapsed_days,
        }
    }
}

/// Summary counters for the whole collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub due_cards: usize,
    pub reviews_today: usize,
    /// Percentage of today's reviews rated Good or Easy
    pub retention_rate: f64,
    pub new_cards: usize,
    /// Learning and relearning cards
    pub learning_cards: usize,
    pub review_cards: usize,
}

/// A card selected for review, with the collection stats at selection time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueCard {
    pub card: Card,
    pub priority: f64,
    pub stats: ReviewStats,
}

/// The persisted document: every card keyed by ID, the review log in append
/// order, and the time of the last mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreData {
    #[serde(default)]
    pub cards: BTreeMap<Uuid, Card>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    pub last_modified: DateTime<Utc>,
}

impl StoreData {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            cards: BTreeMap::new(),
            reviews: Vec::new(),
            last_modified: now,
        }
    }
}
