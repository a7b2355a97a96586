//! Shared request rate limiter
//!
//! Fixed-window admission gate: at most `max_per_window` acquisitions are
//! admitted per window. The first window opens on the first `acquire()`, not
//! at construction. It resets when the first caller observes that it has
//! elapsed, or after a full caller waits out the remainder.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::info;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct WindowState {
    /// `None` until the first acquisition
    started: Option<Instant>,
    count: u32,
}

/// Thread-safe limiter shared by all workers of a run
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

impl RateLimiter {
    /// Limiter admitting `max_per_minute` requests per 60-second window.
    pub fn per_minute(max_per_minute: u32) -> Self {
        Self::with_window(max_per_minute, WINDOW)
    }

    pub fn with_window(max_per_window: u32, window: Duration) -> Self {
        Self {
            max_per_window: max_per_window.max(1),
            window,
            state: Mutex::new(WindowState {
                started: None,
                count: 0,
            }),
        }
    }

    pub fn max_per_window(&self) -> u32 {
        self.max_per_window
    }

    /// Wait until one request may be issued. Never fails, only delays.
    ///
    /// The state lock is held across the wait, so callers queue in FIFO
    /// order behind a full window and no two callers can take the same slot.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;

        let now = Instant::now();
        let started = match state.started {
            Some(started) if now.duration_since(started) < self.window => started,
            _ => {
                state.started = Some(now);
                state.count = 0;
                now
            }
        };

        if state.count >= self.max_per_window {
            let wait = self.window.saturating_sub(started.elapsed());
            if !wait.is_zero() {
                info!(
                    wait_secs = wait.as_secs_f64(),
                    limit = self.max_per_window,
                    "Rate limit reached, waiting for next window"
                );
                sleep(wait).await;
            }
            state.started = Some(Instant::now());
            state.count = 0;
        }

        state.count += 1;
    }
}
