// Copyright 2024 The Corvus Authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Turns a UCI `go wtime/winc` budget into a per-move search timeout.
//!
//! The allocation is deliberately simple: spend a fixed fraction of the remaining clock plus a
//! fixed fraction of the increment. It does not attempt to model how many moves remain in the
//! game; iterative deepening's per-depth check absorbs most of the risk of misjudging a budget,
//! since the last fully-completed depth's result is always available as a fallback.

use std::time::Duration;

#[derive(Copy, Clone, Debug)]
pub struct TimeManagerConfig {
    pub time_weight: f64,
    pub increment_weight: f64,
}

impl Default for TimeManagerConfig {
    fn default() -> Self {
        TimeManagerConfig {
            time_weight: 0.1,
            increment_weight: 0.01,
        }
    }
}

pub struct TimeManager {
    config: TimeManagerConfig,
}

impl TimeManager {
    pub fn new(config: TimeManagerConfig) -> TimeManager {
        TimeManager { config }
    }

    /// Computes a search timeout from the remaining `time` and `increment`, both in milliseconds.
    pub fn get_timeout(&self, time: Duration, increment: Duration) -> Duration {
        let millis = self.config.time_weight * time.as_secs_f64() * 1000.0
            + self.config.increment_weight * increment.as_secs_f64() * 1000.0;
        Duration::from_secs_f64((millis.max(0.0)) / 1000.0)
    }
}

impl Default for TimeManager {
    fn default() -> Self {
        TimeManager::new(TimeManagerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_match_formula() {
        let manager = TimeManager::default();
        let timeout = manager.get_timeout(Duration::from_secs(60), Duration::from_secs(1));
        // 0.1 * 60000ms + 0.01 * 1000ms == 6010ms
        assert_eq!(Duration::from_millis(6010), timeout);
    }

    #[test]
    fn zero_time_and_increment_gives_zero_timeout() {
        let manager = TimeManager::default();
        let timeout = manager.get_timeout(Duration::ZERO, Duration::ZERO);
        assert_eq!(Duration::ZERO, timeout);
    }
}
