//! Persistent card store
//!
//! The whole collection lives in one JSON document:
//! ```text
//! {
//!   "cards":        { "<card-id>": Card, ... },
//!   "reviews":      [ Review, ... ],        # append-only, oldest first
//!   "lastModified": "<rfc3339>"
//! }
//! ```
//!
//! Reads share a reader/writer lock. Every mutation holds the save mutex from
//! the in-memory change until its bytes are on disk, so saves land in order
//! and a concurrent `load` never discards an acknowledged change. Saves
//! serialize under the read lock and write the bytes outside of it (write to
//! `.tmp`, fsync, rename).
//!
//! One process owns the file. Nothing guards against another process writing
//! the same document concurrently.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use super::error::{FlashcardError, Result};
use super::models::*;

/// Storage manager for cards and their review history
pub struct CardStore {
    path: PathBuf,
    data: RwLock<StoreData>,
    /// Serializes disk writes so a later snapshot never lands before an earlier one
    save_lock: Mutex<()>,
}

impl CardStore {
    /// Open the store backed by `path`. A missing file yields an empty store.
    pub fn open(path: PathBuf) -> Result<Self> {
        let data = read_document(&path)?;
        log::info!(
            "Opened card store {} ({} cards, {} reviews)",
            path.display(),
            data.cards.len(),
            data.reviews.len()
        );
        Ok(Self {
            path,
            data: RwLock::new(data),
            save_lock: Mutex::new(()),
        })
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ==================== Persistence ====================

    /// Re-read the backing document, replacing in-memory state.
    /// Waits for any in-flight mutation to finish persisting first.
    pub fn load(&self) -> Result<()> {
        let _guard = self.save_lock.lock();
        let data = read_document(&self.path)?;
        *self.data.write() = data;
        Ok(())
    }

    /// Write the current state to disk atomically
    pub fn save(&self) -> Result<()> {
        let _guard = self.save_lock.lock();
        self.persist()
    }

    /// Apply `f` under the write lock and persist the result. The save mutex
    /// is held throughout. A failed write leaves the change in memory.
    fn mutate<R>(&self, f: impl FnOnce(&mut StoreData) -> Result<R>) -> Result<R> {
        let _guard = self.save_lock.lock();
        let result = f(&mut self.data.write())?;
        self.persist()?;
        Ok(result)
    }

    /// Caller must hold `save_lock`
    fn persist(&self) -> Result<()> {
        let bytes = {
            let data = self.data.read();
            serde_json::to_vec_pretty(&*data)?
        };
        write_atomic(&self.path, &bytes)?;
        log::debug!("Saved card store ({} bytes) to {}", bytes.len(), self.path.display());
        Ok(())
    }

    /// Run `f` against the store under the read lock
    pub fn with_data<R>(&self, f: impl FnOnce(&StoreData) -> R) -> R {
        f(&self.data.read())
    }

    /// Copy of the entire store
    pub fn snapshot(&self) -> StoreData {
        self.data.read().clone()
    }

    // ==================== Card Operations ====================

    /// Create a new card, immediately due. Empty fields are accepted.
    pub fn create_card(&self, front: String, back: String, tags: Vec<String>) -> Result<Card> {
        self.create_card_at(front, back, tags, Utc::now())
    }

    pub fn create_card_at(
        &self,
        front: String,
        back: String,
        tags: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Card> {
        let card = Card::new(front, back, normalize_tags(tags), now);
        self.mutate(|data| {
            data.cards.insert(card.id, card.clone());
            data.last_modified = now;
            Ok(())
        })?;
        log::info!("Created card {}", card.id);
        Ok(card)
    }

    /// Get a specific card
    pub fn get_card(&self, card_id: Uuid) -> Result<Card> {
        self.data
            .read()
            .cards
            .get(&card_id)
            .cloned()
            .ok_or(FlashcardError::CardNotFound(card_id))
    }

    /// Replace the content fields (front, back, tags) of an existing card.
    /// The memory state is left untouched.
    pub fn update_card(&self, card: &Card) -> Result<Card> {
        let now = Utc::now();
        self.mutate(|data| {
            let existing = data
                .cards
                .get_mut(&card.id)
                .ok_or(FlashcardError::CardNotFound(card.id))?;
            existing.front = card.front.clone();
            existing.back = card.back.clone();
            existing.tags = normalize_tags(&card.tags);
            existing.updated_at = now;
            let updated = existing.clone();
            data.last_modified = now;
            Ok(updated)
        })
    }

    /// Delete a card. Its reviews stay in the log.
    pub fn delete_card(&self, card_id: Uuid) -> Result<()> {
        self.mutate(|data| {
            if data.cards.remove(&card_id).is_none() {
                return Err(FlashcardError::CardNotFound(card_id));
            }
            data.last_modified = Utc::now();
            Ok(())
        })?;
        log::info!("Deleted card {}", card_id);
        Ok(())
    }

    /// List cards carrying every tag in `tags` (all cards for an empty filter),
    /// oldest first
    pub fn list_cards(&self, tags: &BTreeSet<String>) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .data
            .read()
            .cards
            .values()
            .filter(|c| c.has_all_tags(tags))
            .cloned()
            .collect();
        cards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        cards
    }

    // ==================== Review Operations ====================

    /// Append a review for an existing card, recording its current schedule
    pub fn add_review(&self, card_id: Uuid, rating: Rating, answer: Option<String>) -> Result<Review> {
        let now = Utc::now();
        self.mutate(|data| {
            let card = data
                .cards
                .get(&card_id)
                .ok_or(FlashcardError::CardNotFound(card_id))?;
            let review = Review::new(card_id, rating, answer, now, &card.state);
            data.reviews.push(review.clone());
            data.last_modified = now;
            Ok(review)
        })
    }

    /// Update a card's memory state with `schedule` and append the matching
    /// review in one critical section, then persist.
    pub fn apply_review<F>(
        &self,
        card_id: Uuid,
        rating: Rating,
        answer: Option<String>,
        now: DateTime<Utc>,
        schedule: F,
    ) -> Result<(Card, Review)>
    where
        F: FnOnce(&MemoryState) -> MemoryState,
    {
        self.mutate(|data| {
            let card = data
                .cards
                .get_mut(&card_id)
                .ok_or(FlashcardError::CardNotFound(card_id))?;
            card.state = schedule(&card.state);
            card.updated_at = now;
            let card = card.clone();
            let review = Review::new(card_id, rating, answer, now, &card.state);
            data.reviews.push(review.clone());
            data.last_modified = now;
            Ok((card, review))
        })
    }

    /// All reviews recorded for a card ID, oldest first. Works for deleted cards.
    pub fn get_card_reviews(&self, card_id: Uuid) -> Vec<Review> {
        self.data
            .read()
            .reviews
            .iter()
            .filter(|r| r.card_id == card_id)
            .cloned()
            .collect()
    }

    /// Insert a card as-is, bypassing creation defaults
    #[cfg(test)]
    pub(crate) fn insert_card(&self, card: Card) -> Result<()> {
        self.mutate(|data| {
            data.cards.insert(card.id, card);
            Ok(())
        })
    }
}

fn read_document(path: &Path) -> Result<StoreData> {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).map_err(|source| FlashcardError::Corrupt {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("No store at {}, starting empty", path.display());
            Ok(StoreData::empty(Utc::now()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Write to a sibling `.tmp` file, flush it, then rename over `path`
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = tmp_path(path);
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
