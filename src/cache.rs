use crate::error::AppError;
use crate::model::Dataset;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Last dataset fetched from a project, kept on disk between runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetCache {
    pub project: String,
    /// Store URL and database the dataset came from.
    #[serde(default)]
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub dataset: Dataset,
}

impl DatasetCache {
    pub fn new(project: &str, source: &str, dataset: Dataset) -> Self {
        DatasetCache {
            project: project.to_string(),
            source: source.to_string(),
            fetched_at: Utc::now(),
            dataset,
        }
    }

    /// Usable for `source` when it was fetched from the same store and is
    /// younger than `max_age_mins`.
    pub fn is_fresh_for(&self, source: &str, max_age_mins: u64) -> bool {
        self.source == source && !self.is_stale(max_age_mins)
    }

    pub fn get_cache_path(project: &str) -> PathBuf {
        let cache_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".smash_tracker");

        let file_name: String = project
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        cache_dir.join(format!("{}.json", file_name))
    }

    /// `None` when no cache was written for this project yet.
    pub fn load(project: &str) -> Result<Option<Self>, AppError> {
        Self::load_from(&Self::get_cache_path(project))
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, AppError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                debug!("No cache at {}", path.display());
                return Ok(None);
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| AppError::JsonError(format!("Failed to parse cache: {}", e)))
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::get_cache_path(&self.project))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::JsonError(format!("Failed to serialize cache: {}", e)))?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn is_stale(&self, max_age_mins: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.fetched_at);
        age.num_minutes() >= max_age_mins as i64
    }
}

/// Reads a dataset snapshot written by `export`.
pub fn read_snapshot(path: &Path) -> Result<Dataset, AppError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        AppError::JsonError(format!("Failed to parse snapshot {}: {}", path.display(), e))
    })
}

pub fn write_snapshot(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(dataset)
        .map_err(|e| AppError::JsonError(format!("Failed to serialize snapshot: {}", e)))?;
    fs::write(path, json)?;
    Ok(())
}
