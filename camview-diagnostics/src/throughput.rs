//! Recording throughput measurement
//!
//! The recorder's buffered size is sampled at a fixed interval; the difference
//! between consecutive samples over the interval is the incoming byte rate.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// Default sampling interval
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(3);

/// Result of one sampling tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSample {
    /// Recorded size at this tick
    pub total_bytes: usize,
    /// Bytes per second since the previous tick
    pub bytes_per_second: f64,
}

impl ThroughputSample {
    /// Rate in KiB per second
    pub fn kilobytes_per_second(&self) -> f64 {
        self.bytes_per_second / 1024.0
    }
}

/// Turns periodic size samples into a byte rate
#[derive(Debug, Clone)]
pub struct ThroughputMeter {
    interval: Duration,
    previous: usize,
    last: ThroughputSample,
}

impl ThroughputMeter {
    /// Create a meter for samples taken every `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            previous: 0,
            last: ThroughputSample::default(),
        }
    }

    /// Sampling interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record one tick. `None` means no recording is active, which resets the
    /// baseline and reports a zero rate.
    ///
    /// A recording smaller than the baseline (a new recording started between
    /// ticks) reports a zero rate.
    pub fn sample(&mut self, size: Option<usize>) -> ThroughputSample {
        let sample = match size {
            Some(size) => {
                let seconds = self.interval.as_secs_f64();
                let delta = size.saturating_sub(self.previous) as f64;
                self.previous = size;
                ThroughputSample {
                    total_bytes: size,
                    bytes_per_second: if seconds > 0.0 { delta / seconds } else { 0.0 },
                }
            }
            None => {
                self.previous = 0;
                ThroughputSample::default()
            }
        };

        trace!(
            "Throughput sample: {} bytes, {:.1} B/s",
            sample.total_bytes,
            sample.bytes_per_second
        );
        self.last = sample;
        sample
    }

    /// Most recent sample
    pub fn last(&self) -> ThroughputSample {
        self.last
    }

    /// Most recent rate in bytes per second
    pub fn rate(&self) -> f64 {
        self.last.bytes_per_second
    }

    /// Forget the baseline and the last rate
    pub fn reset(&mut self) {
        self.previous = 0;
        self.last = ThroughputSample::default();
    }
}

impl Default for ThroughputMeter {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_INTERVAL)
    }
}
