use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Accumulated counters and timings across processed batches.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct TurnMetrics {
    pub batches: u64,
    pub players_processed: u64,
    pub players_skipped: u64,
    pub players_failed: u64,
    /// Conflicts that succeeded on retry.
    pub conflicts_retried: u64,
    pub operations_resolved: u64,
    pub total_time: Duration,
}

impl TurnMetrics {
    pub fn batch_avg_ms(&self) -> f64 {
        if self.batches == 0 {
            0.0
        } else {
            self.total_time.as_secs_f64() * 1000.0 / self.batches as f64
        }
    }

    pub fn players_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() == 0.0 {
            0.0
        } else {
            self.players_processed as f64 / self.total_time.as_secs_f64()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_averages_handle_empty() {
        let metrics = TurnMetrics::default();
        assert_eq!(metrics.batch_avg_ms(), 0.0);
        assert_eq!(metrics.players_per_second(), 0.0);
    }

    #[test]
    fn test_batch_average() {
        let metrics = TurnMetrics {
            batches: 4,
            total_time: Duration::from_millis(100),
            ..Default::default()
        };
        assert!((metrics.batch_avg_ms() - 25.0).abs() < 1e-9);
    }
}
