use std::path::PathBuf;
use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod flashcards;

use config::RecallConfig;
use flashcards::{CardStore, FlashcardError, MemoryModel, ReviewProcessor, Scheduler};

/// Shared handles for every operation on one store document
pub struct AppState {
    pub store: Arc<CardStore>,
    pub scheduler: Scheduler,
    pub reviews: ReviewProcessor,
}

impl AppState {
    pub fn new(store: Arc<CardStore>, model: Arc<dyn MemoryModel>) -> Self {
        Self {
            scheduler: Scheduler::new(Arc::clone(&store)),
            reviews: ReviewProcessor::new(Arc::clone(&store), model),
            store,
        }
    }

    /// Open the store at `data_file`, creating an empty one if absent
    pub fn open(data_file: PathBuf, model: Arc<dyn MemoryModel>) -> Result<Self, FlashcardError> {
        let store = CardStore::open(data_file)?;
        log::debug!("Scheduling with the {} memory model", model.name());
        Ok(Self::new(Arc::new(store), model))
    }

    /// Open the store named by the config, or by `data_file` when given
    pub fn from_config(
        config: &RecallConfig,
        data_file: Option<PathBuf>,
    ) -> Result<Self, config::ConfigError> {
        let path = config.resolve_data_file(data_file)?;
        let model = config.memory_model()?;
        Ok(Self::open(path, model)?)
    }
}
