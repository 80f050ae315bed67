//! Flashcard operations exposed to callers
//!
//! Every operation takes string IDs and plain values, and returns either the
//! payload or a serializable `CommandError` carrying the failure kind.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::flashcards::algorithm::{format_interval, preview_intervals};
use crate::flashcards::error::ErrorKind;
use crate::flashcards::stats::review_stats;
use crate::flashcards::{
    normalize_tags, Card, DueCard, FlashcardError, Rating, Review, ReviewStats,
};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
    /// Present for the "nothing to review" outcomes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ReviewStats>,
}

impl From<FlashcardError> for CommandError {
    fn from(err: FlashcardError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            stats: err.stats().cloned(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

pub type CommandResult<T> = Result<T, CommandError>;

/// What a rating would schedule, for display before answering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPreview {
    pub rating: Rating,
    pub due: DateTime<Utc>,
    pub interval: String,
}

fn parse_card_id(card_id: &str) -> CommandResult<Uuid> {
    Uuid::parse_str(card_id.trim()).map_err(|e| {
        FlashcardError::Validation(format!("Invalid card ID '{}': {}", card_id, e)).into()
    })
}

// ==================== Card Commands ====================

/// Create a new card. Empty front, back and tags are accepted.
pub fn create_card(
    state: &AppState,
    front: String,
    back: String,
    tags: Option<Vec<String>>,
) -> CommandResult<Card> {
    state
        .store
        .create_card(front, back, tags.unwrap_or_default())
        .map_err(Into::into)
}

/// Get a specific card
pub fn get_card(state: &AppState, card_id: String) -> CommandResult<Card> {
    let id = parse_card_id(&card_id)?;
    state.store.get_card(id).map_err(Into::into)
}

/// Update a card's content; omitted fields are kept
pub fn update_card(
    state: &AppState,
    card_id: String,
    front: Option<String>,
    back: Option<String>,
    tags: Option<Vec<String>>,
) -> CommandResult<Card> {
    let id = parse_card_id(&card_id)?;
    let mut card = state.store.get_card(id)?;

    if let Some(new_front) = front {
        card.front = new_front;
    }
    if let Some(new_back) = back {
        card.back = new_back;
    }
    if let Some(new_tags) = tags {
        card.tags = normalize_tags(new_tags);
    }

    state.store.update_card(&card).map_err(Into::into)
}

/// Delete a card. Its review history is kept.
pub fn delete_card(state: &AppState, card_id: String) -> CommandResult<()> {
    let id = parse_card_id(&card_id)?;
    state.store.delete_card(id).map_err(Into::into)
}

/// List cards, optionally only those carrying every given tag
pub fn list_cards(state: &AppState, tags: Option<Vec<String>>) -> CommandResult<Vec<Card>> {
    let filter = normalize_tags(tags.unwrap_or_default());
    Ok(state.store.list_cards(&filter))
}

// ==================== Review Commands ====================

/// Get the next card to review with the current stats
pub fn get_due_card(state: &AppState, tags: Option<Vec<String>>) -> CommandResult<DueCard> {
    let filter = normalize_tags(tags.unwrap_or_default());
    state
        .scheduler
        .next_due(&filter, Utc::now())
        .map_err(Into::into)
}

/// Submit a review for a card. `rating` must be 1 (Again) to 4 (Easy).
pub fn submit_review(
    state: &AppState,
    card_id: String,
    rating: i32,
    answer: Option<String>,
) -> CommandResult<Card> {
    let id = parse_card_id(&card_id)?;
    let rating = Rating::try_from(rating).map_err(|e| {
        log::warn!("Rejected review of {}: {}", card_id, e);
        CommandError::from(e)
    })?;

    let (card, _review) = state.reviews.submit(id, rating, answer, Utc::now())?;
    Ok(card)
}

/// Get the review history of a card, oldest first
pub fn get_card_reviews(state: &AppState, card_id: String) -> CommandResult<Vec<Review>> {
    let id = parse_card_id(&card_id)?;
    Ok(state.store.get_card_reviews(id))
}

/// Get review statistics
pub fn get_review_stats(state: &AppState) -> CommandResult<ReviewStats> {
    Ok(review_stats(&state.store, Utc::now()))
}

/// Get preview intervals for each rating option
pub fn preview_review_intervals(
    state: &AppState,
    card_id: String,
) -> CommandResult<Vec<RatingPreview>> {
    let id = parse_card_id(&card_id)?;
    let card = state.store.get_card(id)?;
    let now = Utc::now();

    let intervals = preview_intervals(state.reviews.model(), &card.state, now);
    Ok(Rating::ALL
        .into_iter()
        .zip(intervals)
        .map(|(rating, interval)| RatingPreview {
            rating,
            due: now + interval,
            interval: format_interval(interval),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::{CardStatus, Fsrs};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::open(temp_dir.path().join("cards.json"), Arc::new(Fsrs::default()))
            .unwrap();
        (state, temp_dir)
    }

    fn tags(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn test_create_review_flow() {
        let (state, _temp) = create_test_state();
        let before = Utc::now();

        let card = create_card(&state, "Q".into(), "A".into(), None).unwrap();
        assert_eq!(card.state.status, CardStatus::New);
        assert!(card.state.due <= Utc::now());

        let due = get_due_card(&state, None).unwrap();
        assert_eq!(due.card.id, card.id);
        assert_eq!(due.stats.total_cards, 1);

        let reviewed = submit_review(&state, card.id.to_string(), 3, Some("A".into())).unwrap();
        assert_eq!(reviewed.state.status, CardStatus::Learning);
        assert!(reviewed.state.due > before);
        assert!(reviewed.state.due > Utc::now());

        let stats = get_review_stats(&state).unwrap();
        assert_eq!(stats.reviews_today, 1);
        assert_eq!(stats.retention_rate, 100.0);
    }

    #[test]
    fn test_empty_card_does_not_hang() {
        let (state, _temp) = create_test_state();
        let start = Instant::now();
        let result = create_card(&state, String::new(), String::new(), Some(Vec::new()));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(result.is_ok());
    }

    #[test]
    fn test_update_card_partial() {
        let (state, _temp) = create_test_state();
        let card = create_card(&state, "Q".into(), "A".into(), tags(&["a"])).unwrap();

        let updated = update_card(&state, card.id.to_string(), None, Some("B".into()), None).unwrap();
        assert_eq!(updated.front, "Q");
        assert_eq!(updated.back, "B");
        assert_eq!(updated.tags, card.tags);

        let updated = update_card(&state, card.id.to_string(), None, None, tags(&["x", "y"])).unwrap();
        assert_eq!(updated.tags, normalize_tags(["x", "y"]));
        assert_eq!(updated.state, card.state);
    }

    #[test]
    fn test_delete_then_get() {
        let (state, _temp) = create_test_state();
        let card = create_card(&state, "Q".into(), "A".into(), None).unwrap();
        let keep = create_card(&state, "Q2".into(), "A2".into(), None).unwrap();
        submit_review(&state, card.id.to_string(), 1, None).unwrap();

        delete_card(&state, card.id.to_string()).unwrap();

        let err = get_card(&state, card.id.to_string()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let listed = list_cards(&state, None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep.id);
        assert_eq!(get_card_reviews(&state, card.id.to_string()).unwrap().len(), 1);
    }

    #[test]
    fn test_list_cards_by_tags() {
        let (state, _temp) = create_test_state();
        create_card(&state, "1".into(), "".into(), tags(&["a", "b"])).unwrap();
        create_card(&state, "2".into(), "".into(), tags(&["a"])).unwrap();

        assert_eq!(list_cards(&state, None).unwrap().len(), 2);
        assert_eq!(list_cards(&state, tags(&["a"])).unwrap().len(), 2);
        let both = list_cards(&state, tags(&["a", "b"])).unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].front, "1");
    }

    #[test]
    fn test_no_tag_match_carries_stats() {
        let (state, _temp) = create_test_state();
        create_card(&state, "Q".into(), "A".into(), tags(&["a"])).unwrap();

        let err = get_due_card(&state, tags(&["nonexistent-tag"])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoTagMatch);
        let stats = err.stats.unwrap();
        assert_eq!(stats.total_cards, 1);
        assert_eq!(stats.due_cards, 1);
    }

    #[test]
    fn test_no_cards_due_carries_stats() {
        let (state, _temp) = create_test_state();
        let err = get_due_card(&state, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoCardsDue);
        assert_eq!(err.stats.unwrap().total_cards, 0);

        let json = serde_json::to_value(&CommandError::from(FlashcardError::NoCardsDue {
            stats: ReviewStats::default(),
        }))
        .unwrap();
        assert_eq!(json["kind"], "noCardsDue");
        assert_eq!(json["stats"]["totalCards"], 0);
    }

    #[test]
    fn test_invalid_rating_and_id() {
        let (state, _temp) = create_test_state();
        let card = create_card(&state, "Q".into(), "A".into(), None).unwrap();

        for rating in [0, 5, -1] {
            let err = submit_review(&state, card.id.to_string(), rating, None).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation);
        }
        assert!(get_card_reviews(&state, card.id.to_string()).unwrap().is_empty());

        let err = get_card(&state, "not-a-uuid".into()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = submit_review(&state, Uuid::new_v4().to_string(), 3, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_failed_save_reported_as_io() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("data");
        let state = AppState::open(dir.join("cards.json"), Arc::new(Fsrs::default())).unwrap();
        let card = create_card(&state, "Q".into(), "A".into(), None).unwrap();

        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::write(&dir, "").unwrap();

        let err = submit_review(&state, card.id.to_string(), 3, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(err.stats.is_none());

        let err = create_card(&state, "Q2".into(), "A2".into(), None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[test]
    fn test_preview_intervals() {
        let (state, _temp) = create_test_state();
        let card = create_card(&state, "Q".into(), "A".into(), None).unwrap();

        let preview = preview_review_intervals(&state, card.id.to_string()).unwrap();
        let labels: Vec<&str> = preview.iter().map(|p| p.interval.as_str()).collect();
        assert_eq!(labels, vec!["1m", "5m", "10m", "2w"]);
        assert!(preview.windows(2).all(|w| w[0].due < w[1].due));
    }
}
