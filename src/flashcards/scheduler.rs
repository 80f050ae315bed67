//! Due-card selection

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::error::{FlashcardError, Result};
use super::models::{Card, DueCard};
use super::priority::priority;
use super::stats::compute_stats;
use super::storage::CardStore;

/// Picks the next card to review
pub struct Scheduler {
    store: Arc<CardStore>,
}

impl Scheduler {
    pub fn new(store: Arc<CardStore>) -> Self {
        Self { store }
    }

    /// Select the highest-priority due card carrying every tag in `tags`.
    ///
    /// Fails with `NoCardsDue` when nothing is due (or nothing due carries the
    /// tags), and with `NoTagMatch` when no card at all carries the tags. Both
    /// failures carry the current stats.
    pub fn next_due(&self, tags: &BTreeSet<String>, now: DateTime<Utc>) -> Result<DueCard> {
        self.store.with_data(|data| {
            let stats = compute_stats(data, now);

            let due: Vec<&Card> = data.cards.values().filter(|c| c.state.is_due(now)).collect();
            if due.is_empty() {
                return Err(FlashcardError::NoCardsDue { stats });
            }

            if !tags.is_empty() && !data.cards.values().any(|c| c.has_all_tags(tags)) {
                log::debug!("No card carries tags {:?}", tags);
                return Err(FlashcardError::NoTagMatch {
                    tags: tags.iter().cloned().collect(),
                    stats,
                });
            }

            match select_best(due.into_iter().filter(|c| c.has_all_tags(tags)), now) {
                Some((card, priority)) => {
                    log::debug!("Selected card {} with priority {:.3}", card.id, priority);
                    Ok(DueCard {
                        card: card.clone(),
                        priority,
                        stats,
                    })
                }
                None => Err(FlashcardError::NoCardsDue { stats }),
            }
        })
    }
}

/// Highest-scoring card. On equal scores the first card wins, so callers
/// passing cards in ID order get the lowest ID.
pub fn select_best<'a, I>(cards: I, now: DateTime<Utc>) -> Option<(&'a Card, f64)>
where
    I: IntoIterator<Item = &'a Card>,
{
    let mut best: Option<(&Card, f64)> = None;
    for card in cards {
        let score = priority(&card.state, now);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((card, score)),
        }
    }
    best
}
