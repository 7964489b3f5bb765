use std::time::Duration;

use rand::Rng;

/// Random pause simulating work between pipeline operations.
///
/// Pauses are always taken outside of any stage or quota lock.
#[derive(Debug, Clone, Copy)]
pub struct WorkJitter {
    max_ms: u64,
}

impl WorkJitter {
    /// Pauses for a uniformly random duration in `0..=max_ms` milliseconds.
    pub fn new(max_ms: u64) -> Self {
        Self { max_ms }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn is_enabled(&self) -> bool {
        self.max_ms > 0
    }

    pub async fn pause(&self) {
        if !self.is_enabled() {
            return;
        }

        // The thread-local generator is not `Send`, so it must not live across the await.
        let millis = rand::thread_rng().gen_range(0..=self.max_ms);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

impl Default for WorkJitter {
    fn default() -> Self {
        Self::disabled()
    }
}
