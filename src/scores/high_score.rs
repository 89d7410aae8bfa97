use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Persistence for the single best score across sessions
pub trait HighScoreStore {
    fn load(&self) -> Result<u32>;
    fn save(&mut self, score: u32) -> Result<()>;
}

/// Save `score` if it beats the stored one. Returns whether it was written.
pub fn record_high_score(store: &mut dyn HighScoreStore, score: u32) -> Result<bool> {
    if score <= store.load()? {
        return Ok(false);
    }
    store.save(score)?;
    Ok(true)
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHighScore {
    score: u32,
}

impl MemoryHighScore {
    pub fn new(score: u32) -> Self {
        Self { score }
    }
}

impl HighScoreStore for MemoryHighScore {
    fn load(&self) -> Result<u32> {
        Ok(self.score)
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.score = score;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct HighScoreFile {
    high_score: u32,
}

/// High score kept in a small JSON file. A missing file reads as zero.
#[derive(Debug, Clone)]
pub struct JsonHighScoreStore {
    path: PathBuf,
}

impl JsonHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonHighScoreStore {
    fn load(&self) -> Result<u32> {
        if !self.path.exists() {
            return Ok(0);
        }

        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read high score from {}", self.path.display()))?;
        let file: HighScoreFile =
            serde_json::from_str(&json).context("Failed to parse high score file")?;
        Ok(file.high_score)
    }

    fn save(&mut self, score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create high score directory")?;
            }
        }

        let json = serde_json::to_string_pretty(&HighScoreFile { high_score: score })
            .context("Failed to serialize high score")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write high score to {}", self.path.display()))?;
        Ok(())
    }
}
