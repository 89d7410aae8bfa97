//! Shared leaderboard of per-player best scores

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Longest accepted player name, in characters
pub const MAX_NAME_LEN: usize = 20;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard storage failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("leaderboard data is corrupt: {0}")]
    Format(#[from] serde_json::Error),

    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),
}

/// A validated player name: trimmed, at most twenty characters, never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn parse(raw: &str) -> Option<Self> {
        let name: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
        let name = name.trim_end().to_string();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One stored submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: u64,
    pub username: String,
    pub score: u32,
    pub level: u32,
}

/// A ranked row of the leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub id: u64,
    pub username: String,
    pub score: u32,
    pub level: u32,
    /// 1-based
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Stored, and better than anything the player had before
    NewHigh,
    Submitted,
    /// No player name was given
    NotSubmitted,
    /// The leaderboard could not be read or written
    Failed(String),
}

pub trait Leaderboard {
    fn submit(&mut self, player: &PlayerName, score: u32, level: u32) -> Result<(), LeaderboardError>;

    fn fetch_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;

    /// Best score stored for `player`, if any
    fn best_for(&self, player: &PlayerName) -> Result<Option<u32>, LeaderboardError>;
}

/// Collapse to each player's best record, order by score descending and
/// rank by position. Equal scores keep submission order.
pub fn rank_entries(records: &[ScoreRecord], n: usize) -> Vec<LeaderboardEntry> {
    let mut best: HashMap<&str, &ScoreRecord> = HashMap::new();
    for record in records {
        best.entry(record.username.as_str())
            .and_modify(|current| {
                if record.score > current.score {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    let mut rows: Vec<&ScoreRecord> = best.into_values().collect();
    rows.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));

    rows.into_iter()
        .take(n)
        .enumerate()
        .map(|(i, record)| LeaderboardEntry {
            id: record.id,
            username: record.username.clone(),
            score: record.score,
            level: record.level,
            rank: i + 1,
        })
        .collect()
}

/// Submit a finished game. Storage failures are logged and come back as
/// `Failed` for the player to see; they never end the game.
pub fn submit_score(
    board: &mut dyn Leaderboard,
    player: Option<&PlayerName>,
    score: u32,
    level: u32,
) -> SubmissionStatus {
    let Some(player) = player else {
        return SubmissionStatus::NotSubmitted;
    };

    let previous = match board.best_for(player) {
        Ok(best) => best.unwrap_or(0),
        Err(e) => {
            warn!("Failed to read leaderboard for {}: {}", player.as_str(), e);
            return SubmissionStatus::Failed(e.to_string());
        }
    };

    if let Err(e) = board.submit(player, score, level) {
        warn!("Score submission failed: {}", e);
        return SubmissionStatus::Failed(e.to_string());
    }

    info!("Submitted score {} (level {}) for {}", score, level, player.as_str());
    if score > previous {
        SubmissionStatus::NewHigh
    } else {
        SubmissionStatus::Submitted
    }
}

/// Leaderboard held in memory, optionally mirrored to a JSON file
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboard {
    records: Vec<ScoreRecord>,
    next_id: u64,
    path: Option<PathBuf>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a file-backed leaderboard. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LeaderboardError> {
        let path = path.into();
        let records: Vec<ScoreRecord> = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            Vec::new()
        };
        let next_id = records.iter().map(|r| r.id + 1).max().unwrap_or(0);

        Ok(Self {
            records,
            next_id,
            path: Some(path),
        })
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    fn persist(&self) -> Result<(), LeaderboardError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(&self.records)?)?;
        Ok(())
    }
}

impl Leaderboard for MemoryLeaderboard {
    fn submit(&mut self, player: &PlayerName, score: u32, level: u32) -> Result<(), LeaderboardError> {
        self.records.push(ScoreRecord {
            id: self.next_id,
            username: player.as_str().to_string(),
            score,
            level,
        });
        self.next_id += 1;

        if let Err(e) = self.persist() {
            self.records.pop();
            self.next_id -= 1;
            return Err(e);
        }
        Ok(())
    }

    fn fetch_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(rank_entries(&self.records, n))
    }

    fn best_for(&self, player: &PlayerName) -> Result<Option<u32>, LeaderboardError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.username == player.as_str())
            .map(|r| r.score)
            .max())
    }
}
