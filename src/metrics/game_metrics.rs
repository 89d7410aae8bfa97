use std::time::{Duration, Instant};

/// Per-process play statistics shown in the header. The clock only runs
/// while a game is being played.
pub struct GameMetrics {
    running_since: Option<Instant>,
    accumulated: Duration,
    pub elapsed_time: Duration,
    pub games_played: u32,
    pub games_won: u32,
    pub best_level: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            running_since: None,
            accumulated: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            games_played: 0,
            games_won: 0,
            best_level: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.accumulated
            + self
                .running_since
                .map_or(Duration::ZERO, |since| since.elapsed());
    }

    /// Start or continue the clock
    pub fn resume_clock(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn pause_clock(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
        self.update();
    }

    pub fn on_game_start(&mut self) {
        self.running_since = Some(Instant::now());
        self.accumulated = Duration::ZERO;
        self.elapsed_time = Duration::ZERO;
    }

    /// Reset the clock for a new board that has not started yet
    pub fn on_game_reset(&mut self) {
        self.running_since = None;
        self.accumulated = Duration::ZERO;
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, level: u32, won: bool) {
        self.pause_clock();
        self.games_played += 1;
        if won {
            self.games_won += 1;
        }
        self.best_level = self.best_level.max(level);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(0);
        assert_eq!(metrics.format_time(), "00:00");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_game_tracking() {
        let mut metrics = GameMetrics::new();

        metrics.on_game_over(3, false);
        assert_eq!(metrics.games_played, 1);
        assert_eq!(metrics.best_level, 3);

        metrics.on_game_over(2, false);
        assert_eq!(metrics.best_level, 3); // Should not decrease

        metrics.on_game_over(10, true);
        assert_eq!(metrics.games_played, 3);
        assert_eq!(metrics.games_won, 1);
        assert_eq!(metrics.best_level, 10);
    }

    #[test]
    fn test_clock_stops_while_paused() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start();
        std::thread::sleep(Duration::from_millis(50));
        metrics.pause_clock();
        let paused_at = metrics.elapsed_time;
        assert!(paused_at.as_millis() >= 50);

        std::thread::sleep(Duration::from_millis(50));
        metrics.update();
        assert_eq!(metrics.elapsed_time, paused_at);

        metrics.resume_clock();
        std::thread::sleep(Duration::from_millis(10));
        metrics.update();
        assert!(metrics.elapsed_time > paused_at);
    }

    #[test]
    fn test_game_start_resets_time() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start();
        std::thread::sleep(Duration::from_millis(50));
        metrics.update();

        assert!(metrics.elapsed_time.as_millis() >= 50);

        metrics.on_game_start();
        metrics.update();
        assert!(metrics.elapsed_time.as_millis() < 50);
    }
}
