//! Fixed-interval pacing for outbound registry calls.

use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};

/// Hands out at most one permit per period.
///
/// The first permit is immediate. A zero period disables pacing.
pub struct Pacer {
    interval: Option<Interval>,
}

impl Pacer {
    /// Must be called from within a Tokio runtime.
    pub fn new(period: Duration) -> Self {
        let interval = (!period.is_zero()).then(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        Self { interval }
    }

    pub async fn ready(&mut self) {
        if let Some(interval) = &mut self.interval {
            interval.tick().await;
        }
    }
}
