use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::algorithms::SortOrder;
use crate::game::{GameEvent, GameSession, GameStatus};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{Renderer, TraceReplay, View};
use crate::scheduler::{TickHandle, TickScheduler};
use crate::scores::{
    HighScoreStore, Leaderboard, LeaderboardEntry, PlayerName, SubmissionStatus, record_high_score,
    submit_score,
};

const NOTICE_TTL: Duration = Duration::from_millis(2500);
const REPLAY_STEP: Duration = Duration::from_millis(90);
const LEADERBOARD_ROWS: usize = 5;

struct Notice {
    text: String,
    /// None keeps the notice until it is replaced
    expires: Option<Instant>,
}

pub struct HumanMode {
    session: GameSession,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    high_scores: Box<dyn HighScoreStore>,
    leaderboard: Box<dyn Leaderboard>,
    player: Option<PlayerName>,
    top_scores: Vec<LeaderboardEntry>,
    selected: Option<usize>,
    sort_order: SortOrder,
    replay: Option<TraceReplay>,
    notice: Option<Notice>,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(
        session: GameSession,
        high_scores: Box<dyn HighScoreStore>,
        leaderboard: Box<dyn Leaderboard>,
        player: Option<PlayerName>,
    ) -> Self {
        let mut mode = Self {
            session,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            high_scores,
            leaderboard,
            player,
            top_scores: Vec::new(),
            selected: None,
            sort_order: SortOrder::default(),
            replay: None,
            notice: None,
            should_quit: false,
        };
        mode.refresh_leaderboard();
        mode
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Game ticks follow the session's interval and only run while playing
        let mut ticker: Option<TickHandle> = None;

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        let mut replay_timer = interval(REPLAY_STEP);

        loop {
            self.sync_ticker(&mut ticker);

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Game logic tick
                _ = next_tick(&mut ticker) => {
                    self.update_game();
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    self.expire_notice();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.view());
                    }).context("Failed to draw frame")?;
                }

                _ = replay_timer.tick() => {
                    self.advance_replay();
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        self.save_high_score();
        Ok(())
    }

    /// Keep the ticker armed at the current interval while playing and
    /// cancel it otherwise
    fn sync_ticker(&self, ticker: &mut Option<TickHandle>) {
        if self.session.status() != GameStatus::Playing {
            *ticker = None;
            return;
        }

        let period = self.session.tick_interval();
        if ticker.as_ref().map(TickHandle::period) != Some(period) {
            debug!("Tick interval set to {:?}", period);
            *ticker = Some(TickScheduler::schedule(period));
        }
    }

    fn view(&self) -> View<'_> {
        View {
            state: self.session.state(),
            ctx: self.session.context(),
            threshold: self.session.capacity_threshold(),
            hint_route: self.session.hint_route(),
            metrics: &self.metrics,
            selected: self.selected,
            replay: self.replay.as_ref(),
            notice: self.notice.as_ref().map(|n| n.text.as_str()),
            leaderboard: &self.top_scores,
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let action = self.input_handler.handle_key_event(key);
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Move(dir) => {
                self.session.queue_direction(dir);
            }
            KeyAction::Start => {
                let before = self.session.status();
                match self.session.start() {
                    Ok(()) => match before {
                        GameStatus::Playing => {}
                        GameStatus::Paused => self.metrics.resume_clock(),
                        _ => {
                            self.clear_panel();
                            self.notice = None;
                            self.metrics.on_game_start();
                        }
                    },
                    Err(e) => self.notify(e.to_string()),
                }
            }
            KeyAction::TogglePause => match self.session.status() {
                GameStatus::Playing => {
                    if self.session.pause().is_ok() {
                        self.metrics.pause_clock();
                        self.notify("Paused");
                    }
                }
                GameStatus::Paused => {
                    if self.session.resume().is_ok() {
                        self.metrics.resume_clock();
                        self.notify("Resumed");
                    }
                }
                _ => {}
            },
            KeyAction::ToggleHint => match self.session.toggle_hint() {
                Ok(true) => self.notify("Hint on"),
                Ok(false) => self.notify("Hint off"),
                Err(e) => self.notify(e.to_string()),
            },
            KeyAction::Restart => self.restart(),
            KeyAction::UpgradeCapacity => match self.session.upgrade_capacity() {
                Ok(capacity) => self.notify(format!("Capacity upgraded to {}", capacity)),
                Err(e) => self.notify(e.to_string()),
            },
            KeyAction::SelectNextItem => {
                let len = self.session.state().inventory.len();
                self.selected = match (self.selected, len) {
                    (_, 0) => None,
                    (Some(i), _) => Some((i + 1) % len),
                    (None, _) => Some(0),
                };
            }
            KeyAction::SellSelected => self.sell_selected(),
            KeyAction::Sort(key) => {
                self.sort_order = self.sort_order.toggled();
                let steps = self.session.sort_inventory(key, self.sort_order);
                let order = match self.sort_order {
                    SortOrder::Ascending => "asc",
                    SortOrder::Descending => "desc",
                };
                self.replay = TraceReplay::sort(format!("Sorted by {} ({})", key.name(), order), steps);
                if self.replay.is_none() {
                    self.notify("Nothing to sort");
                }
            }
            KeyAction::Search(kind) => {
                let steps = self.session.search_inventory(kind.name());
                self.replay = TraceReplay::search(format!("Search: {}", kind.name()), steps);
                if self.replay.is_none() {
                    self.notify("Inventory is empty");
                }
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    fn sell_selected(&mut self) {
        let Some(item) = self
            .selected
            .and_then(|i| self.session.state().inventory.items().get(i))
            .cloned()
        else {
            self.notify("No item selected");
            return;
        };

        match self.session.sell_item(item.id) {
            Ok(coins) => {
                self.notify(format!("Sold {} for {} coins", item.kind, coins));
                self.replay = None;
                self.clamp_selection();
            }
            Err(e) => self.notify(e.to_string()),
        }
    }

    fn update_game(&mut self) {
        let result = self.session.tick();

        // A recorded trace no longer matches the inventory once it changes
        if result.consumed {
            self.replay = None;
            self.clamp_selection();
        }

        for event in &result.events {
            match event {
                GameEvent::InventoryFull { .. } => self.notify("Inventory full! Item lost"),
                GameEvent::LevelUp {
                    level,
                    bonus,
                    efficiency,
                } => self.notify(format!(
                    "Level {}! +{} bonus ({:.0}% efficiency)",
                    level,
                    bonus,
                    efficiency * 100.0
                )),
                _ => {}
            }
        }

        if result.terminated {
            self.on_game_finished(&result.events);
        }
    }

    fn on_game_finished(&mut self, events: &[GameEvent]) {
        let stats = self.session.stats().clone();
        let won = self.session.status() == GameStatus::Win;
        self.metrics.on_game_over(stats.level, won);
        self.save_high_score();

        let outcome = events
            .iter()
            .find_map(|event| match event {
                GameEvent::GameOver(reason) => Some(reason.to_string()),
                GameEvent::Won { bonus } => Some(format!("You win! Final bonus +{}", bonus)),
                _ => None,
            })
            .unwrap_or_else(|| "Game over".to_string());

        let submission = submit_score(
            self.leaderboard.as_mut(),
            self.player.as_ref(),
            stats.score,
            stats.level,
        );
        let suffix = match submission {
            SubmissionStatus::NewHigh => " | New high score submitted to leaderboard!".to_string(),
            SubmissionStatus::Submitted => " | Score submitted to leaderboard!".to_string(),
            SubmissionStatus::NotSubmitted => String::new(),
            SubmissionStatus::Failed(reason) => format!(" | Score not submitted: {}", reason),
        };
        self.refresh_leaderboard();

        info!("Game finished: score {} at level {}", stats.score, stats.level);
        self.notice = Some(Notice {
            text: format!("{}{}", outcome, suffix),
            expires: None,
        });
    }

    fn restart(&mut self) {
        self.save_high_score();
        if let Err(e) = self.session.reset() {
            self.notify(e.to_string());
            return;
        }
        self.clear_panel();
        self.notice = None;
        self.metrics.on_game_reset();
    }

    fn save_high_score(&mut self) {
        let score = self.session.stats().high_score;
        match record_high_score(self.high_scores.as_mut(), score) {
            Ok(true) => info!("New high score saved: {}", score),
            Ok(false) => {}
            Err(e) => warn!("Failed to save high score: {:#}", e),
        }
    }

    fn refresh_leaderboard(&mut self) {
        match self.leaderboard.fetch_top(LEADERBOARD_ROWS) {
            Ok(rows) => self.top_scores = rows,
            Err(e) => warn!("Failed to load leaderboard: {}", e),
        }
    }

    fn advance_replay(&mut self) {
        let Some(replay) = self.replay.as_mut() else {
            return;
        };
        // Sorted order is already applied; a finished search stays on screen
        if !replay.advance() && replay.is_sort() {
            self.replay = None;
        }
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            expires: Some(Instant::now() + NOTICE_TTL),
        });
    }

    fn expire_notice(&mut self) {
        let expired = self
            .notice
            .as_ref()
            .and_then(|n| n.expires)
            .is_some_and(|at| Instant::now() >= at);
        if expired {
            self.notice = None;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.session.state().inventory.len();
        self.selected = match self.selected {
            Some(_) if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => None,
        };
    }

    fn clear_panel(&mut self) {
        self.selected = None;
        self.replay = None;
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

/// Resolves on the next game tick, or never when no ticker is armed
async fn next_tick(ticker: &mut Option<TickHandle>) {
    match ticker {
        Some(handle) => {
            handle.tick().await;
        }
        None => std::future::pending().await,
    }
}
