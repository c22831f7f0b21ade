use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Default)]
/// Produces human-like pauses between navigations to reduce automation signals.
pub struct BehavioralEngine {}

impl BehavioralEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Sleep for a random duration between `min` and `max` milliseconds.
    pub async fn random_delay(&self, min: u64, max: u64) {
        sleep(Duration::from_millis(Self::pick(min, max))).await;
    }

    fn pick(min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        OsRng.gen_range(min..=max)
    }
}
