//! Score collaborators: the persisted high score and the leaderboard

pub mod high_score;
pub mod leaderboard;

pub use high_score::{record_high_score, HighScoreStore, JsonHighScoreStore, MemoryHighScore};
pub use leaderboard::{
    rank_entries, submit_score, Leaderboard, LeaderboardEntry, LeaderboardError,
    MemoryLeaderboard, PlayerName, ScoreRecord, SubmissionStatus,
};
