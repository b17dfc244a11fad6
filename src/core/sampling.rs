//! Per-level probabilistic sampling
//!
//! Each level has a keep probability `p` (default 1). A rate of exactly 0
//! always drops, exactly 1 always keeps, and anything else keeps the entry
//! when a uniform draw in `[0, 1)` falls below `p`. Rates outside `[0, 1]`
//! are not clamped: above 1 keeps everything, below 0 drops everything.

use super::log_level::LogLevel;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Decide whether to keep an entry given its rate and a uniform draw
#[inline]
pub fn keep(rate: f64, draw: f64) -> bool {
    if rate == 0.0 {
        false
    } else if rate == 1.0 {
        true
    } else {
        draw < rate
    }
}

/// Kept/dropped counters, one pair per level
///
/// Only entries that passed the level threshold reach the sampler, so
/// `total_count` is the number of sampling decisions made.
#[derive(Debug, Default)]
pub struct SamplerMetrics {
    kept: [AtomicU64; 4],
    dropped: [AtomicU64; 4],
}

impl SamplerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kept_at(&self, level: LogLevel) -> u64 {
        self.kept[level.rank() as usize].load(Ordering::Relaxed)
    }

    pub fn dropped_at(&self, level: LogLevel) -> u64 {
        self.dropped[level.rank() as usize].load(Ordering::Relaxed)
    }

    /// Entries kept across all levels
    pub fn sampled_count(&self) -> u64 {
        sum(&self.kept)
    }

    /// Entries dropped across all levels
    pub fn dropped_count(&self) -> u64 {
        sum(&self.dropped)
    }

    pub fn total_count(&self) -> u64 {
        self.sampled_count() + self.dropped_count()
    }

    fn record(&self, level: LogLevel, kept: bool) {
        let slot = if kept { &self.kept } else { &self.dropped };
        slot[level.rank() as usize].fetch_add(1, Ordering::Relaxed);
    }

    /// Observed keep ratio for one level; 1.0 before any decision
    pub fn observed_rate(&self, level: LogLevel) -> f64 {
        let kept = self.kept_at(level);
        match kept + self.dropped_at(level) {
            0 => 1.0,
            total => kept as f64 / total as f64,
        }
    }

    pub fn reset(&self) {
        for counter in self.kept.iter().chain(self.dropped.iter()) {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

fn sum(counters: &[AtomicU64; 4]) -> u64 {
    counters.iter().map(|c| c.load(Ordering::Relaxed)).sum()
}

/// Sampler shared by every logger of one state
///
/// The rate is read from the live config on each call, so the sampler only
/// owns the random draw and the counters.
#[derive(Debug, Default)]
pub struct LogSampler {
    metrics: SamplerMetrics,
}

impl LogSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw once and decide whether an entry at `level` survives `rate`
    pub fn should_sample(&self, level: LogLevel, rate: f64) -> bool {
        let kept = keep(rate, rand::thread_rng().gen::<f64>());
        self.metrics.record(level, kept);
        kept
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }
}
