use std::time::Duration;

use backoff::backoff::Backoff;

/// Reconnect delays read from a fixed table.
///
/// Attempt `n` (0-based) waits `delays[min(n, len - 1)]`. With a cap set,
/// `next_backoff` returns `None` once `max_attempts` delays were handed out.
#[derive(Debug, Clone)]
pub struct TableBackoff {
    delays: Vec<Duration>,
    attempt: u32,
    max_attempts: Option<u32>,
}

impl TableBackoff {
    /// An empty table falls back to a single one-second step.
    pub fn new(delays: Vec<Duration>, max_attempts: Option<u32>) -> Self {
        let delays = if delays.is_empty() {
            vec![Duration::from_secs(1)]
        } else {
            delays
        };

        Self {
            delays,
            attempt: 0,
            max_attempts,
        }
    }

    /// Number of delays handed out since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_attempts.is_some_and(|max| self.attempt >= max)
    }
}

impl Backoff for TableBackoff {
    fn reset(&mut self) {
        self.attempt = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        let index = (self.attempt as usize).min(self.delays.len() - 1);
        self.attempt = self.attempt.saturating_add(1);
        Some(self.delays[index])
    }
}
