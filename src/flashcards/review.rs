//! Review submission

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::algorithm::MemoryModel;
use super::error::Result;
use super::models::{Card, Rating, Review};
use super::storage::CardStore;

/// Applies ratings to cards through the configured memory model
pub struct ReviewProcessor {
    store: Arc<CardStore>,
    model: Arc<dyn MemoryModel>,
}

impl ReviewProcessor {
    pub fn new(store: Arc<CardStore>, model: Arc<dyn MemoryModel>) -> Self {
        Self { store, model }
    }

    pub fn model(&self) -> &dyn MemoryModel {
        self.model.as_ref()
    }

    /// Submit a review for a card.
    ///
    /// The new memory state and the review record are written together and
    /// persisted before returning. On an IO error the rating must be treated as
    /// not recorded.
    pub fn submit(
        &self,
        card_id: Uuid,
        rating: Rating,
        answer: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(Card, Review)> {
        let answer = answer.filter(|a| !a.trim().is_empty());
        let model = Arc::clone(&self.model);

        let result = self
            .store
            .apply_review(card_id, rating, answer, now, |state| model.schedule(state, rating, now));

        match &result {
            Ok((card, _)) => log::info!(
                "Reviewed card {} as {} with {}: {} -> due {}",
                card_id,
                rating,
                model.name(),
                card.state.status,
                card.state.due
            ),
            Err(e) => log::warn!("Review of card {} failed: {}", card_id, e),
        }
        result
    }
}
