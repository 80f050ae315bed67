//! Flashcard and spaced repetition system for Recall
//!
//! This module provides:
//! - Card CRUD with tag filtering, persisted atomically to one JSON document
//! - Pluggable memory models (FSRS by default, SM-2 as an alternative)
//! - Due-card selection by priority
//! - Review submission and an append-only review log
//! - Review statistics

pub mod algorithm;
pub mod error;
pub mod fsrs;
pub mod models;
pub mod priority;
pub mod review;
pub mod scheduler;
pub mod sm2;
pub mod stats;
pub mod storage;

pub use algorithm::MemoryModel;
pub use error::{ErrorKind, FlashcardError};
pub use fsrs::{Fsrs, FsrsParameters};
pub use models::*;
pub use review::ReviewProcessor;
pub use scheduler::Scheduler;
pub use sm2::Sm2;
pub use storage::CardStore;
