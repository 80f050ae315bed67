//! Configuration file handling
//!
//! ```toml
//! data_file = "/home/me/cards.json"
//! memory_model = "fsrs"        # or "sm2"
//!
//! [fsrs]
//! request_retention = 0.9
//! maximum_interval = 36500
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flashcards::{FlashcardError, Fsrs, FsrsParameters, MemoryModel, Sm2};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] FlashcardError),

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which memory model schedules reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryModelKind {
    #[default]
    Fsrs,
    Sm2,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    /// Store document location; falls back to the platform data directory
    pub data_file: Option<PathBuf>,
    pub memory_model: MemoryModelKind,
    pub fsrs: FsrsParameters,
}

impl RecallConfig {
    /// `<config_dir>/recall/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("recall").join("config.toml"))
    }

    /// `<data_local_dir>/recall/cards.json`
    pub fn default_data_file() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("recall").join("cards.json"))
            .ok_or(ConfigError::DataDirNotFound)
    }

    /// Load a config file. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.fsrs.validate()?;
        Ok(())
    }

    /// Store location: explicit override, then `data_file`, then the default
    pub fn resolve_data_file(&self, override_path: Option<PathBuf>) -> Result<PathBuf> {
        match override_path.or_else(|| self.data_file.clone()) {
            Some(path) => Ok(path),
            None => Self::default_data_file(),
        }
    }

    /// Build the configured memory model
    pub fn memory_model(&self) -> Result<Arc<dyn MemoryModel>> {
        let model: Arc<dyn MemoryModel> = match self.memory_model {
            MemoryModelKind::Fsrs => Arc::new(Fsrs::new(self.fsrs.clone())?),
            MemoryModelKind::Sm2 => Arc::new(Sm2),
        };
        Ok(model)
    }
}
