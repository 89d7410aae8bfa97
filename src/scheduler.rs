//! Periodic tick timer for the game loop

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

pub struct TickScheduler;

impl TickScheduler {
    /// Start a ticker whose first tick fires one full `period` from now.
    /// Dropping the handle cancels it.
    pub fn schedule(period: Duration) -> TickHandle {
        let mut interval = interval_at(Instant::now() + period, period);
        // A slow frame delays the next tick instead of bursting to catch up
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        TickHandle { interval, period }
    }
}

pub struct TickHandle {
    interval: Interval,
    period: Duration,
}

impl TickHandle {
    /// Wait for the next tick
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
