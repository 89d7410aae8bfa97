use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use knapsnake::game::{GameConfig, GameSession};
use knapsnake::modes::HumanMode;
use knapsnake::scores::{
    HighScoreStore, JsonHighScoreStore, Leaderboard, MemoryLeaderboard, PlayerName,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "knapsnake")]
#[command(version, about = "Snake with a knapsack: collect, carry and sell treasure")]
struct Cli {
    /// Grid width (overrides the config file)
    #[arg(long)]
    width: Option<usize>,

    /// Grid height (overrides the config file)
    #[arg(long)]
    height: Option<usize>,

    /// JSON game configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Name to submit scores under; without it nothing is submitted
    #[arg(long)]
    player: Option<String>,

    #[arg(long, default_value = "knapsnake_high_score.json")]
    high_score_file: PathBuf,

    #[arg(long, default_value = "knapsnake_leaderboard.json")]
    leaderboard_file: PathBuf,

    /// The terminal belongs to the UI, so logs go here
    #[arg(long, default_value = "knapsnake.log")]
    log_file: PathBuf,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "knapsnake=info".into()),
        )
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(width) = cli.width {
        config.grid_width = width;
    }
    if let Some(height) = cli.height {
        config.grid_height = height;
    }

    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let config = load_config(&cli)?;

    let high_scores = JsonHighScoreStore::new(&cli.high_score_file);
    let high_score = high_scores.load().unwrap_or_else(|e| {
        warn!("Ignoring unreadable high score: {:#}", e);
        0
    });

    let leaderboard: Box<dyn Leaderboard> = match MemoryLeaderboard::open(&cli.leaderboard_file) {
        Ok(board) => Box::new(board),
        Err(e) => {
            warn!("Leaderboard unavailable, scores stay in memory: {}", e);
            Box::new(MemoryLeaderboard::new())
        }
    };

    let player = match cli.player.as_deref() {
        Some(raw) => {
            let name = PlayerName::parse(raw);
            if name.is_none() {
                warn!("Player name {:?} is empty; scores will not be submitted", raw);
            }
            name
        }
        None => None,
    };

    let session = match cli.seed {
        Some(seed) => GameSession::seeded(config, seed, high_score),
        None => GameSession::new(config, high_score),
    }
    .context("Failed to set up the board")?;

    info!("Starting knapsnake");
    let mut human_mode = HumanMode::new(session, Box::new(high_scores), leaderboard, player);
    human_mode.run().await?;

    Ok(())
}
