use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use recall_lib::config::RecallConfig;
use recall_lib::AppState;

/// Shared application state for CLI commands
pub struct App {
    pub state: AppState,
}

impl App {
    /// Load the config and open the card store it points at
    pub fn new(config_path: Option<&Path>, data_file: Option<PathBuf>) -> Result<Self> {
        let config = match config_path.map(Path::to_path_buf).or_else(RecallConfig::default_path) {
            Some(path) => RecallConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RecallConfig::default(),
        };

        let state = AppState::from_config(&config, data_file)
            .context("Failed to open card store")?;

        Ok(Self { state })
    }

    /// Split a comma-separated tag argument
    pub fn parse_tags(tags: Option<&str>) -> Option<Vec<String>> {
        tags.map(|tag_str| {
            tag_str
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
    }

    /// Accept a rating by name or by number
    pub fn parse_rating(rating: &str) -> i32 {
        match rating.trim().to_lowercase().as_str() {
            "again" | "a" => 1,
            "hard" | "h" => 2,
            "good" | "g" => 3,
            "easy" | "e" => 4,
            // out-of-range values are rejected by submit_review
            other => other.parse().unwrap_or(0),
        }
    }
}
