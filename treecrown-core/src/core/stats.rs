//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Statistics collector

use stats::{MinMax, OnlineStats};
use std::collections::BTreeMap;
use std::fmt;

struct StatCollector {
    online: OnlineStats,
    minmax: MinMax<f64>,
}

pub struct StatResults {
    pub len: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
}

/// Measurements grouped by key
pub struct Statistics(BTreeMap<String, StatCollector>);

impl Statistics {
    pub fn new() -> Statistics {
        Statistics(BTreeMap::new())
    }
    fn collector(&mut self, key: &str) -> &mut StatCollector {
        self.0.entry(key.to_string()).or_insert(StatCollector {
            online: OnlineStats::new(),
            minmax: MinMax::new(),
        })
    }
    pub fn add(&mut self, key: &str, value: f64) {
        if value.is_nan() {
            return;
        }
        let collector = self.collector(key);
        collector.online.add(value);
        collector.minmax.add(value);
    }
    /// Return the current results.
    pub fn results(&self, key: &str) -> StatResults {
        if let Some(collector) = self.0.get(key) {
            StatResults {
                len: collector.minmax.len(),
                min: *collector.minmax.min().unwrap_or(&0.0),
                max: *collector.minmax.max().unwrap_or(&0.0),
                mean: collector.online.mean(),
                stddev: collector.online.stddev(),
            }
        } else {
            StatResults {
                len: 0,
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                stddev: 0.0,
            }
        }
    }
}

impl fmt::Debug for StatResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#measurements: {}, min: {:.3}, max: {:.3}, mean: {:.3} +/- {:.3}",
            self.len, self.min, self.max, self.mean, self.stddev
        )
    }
}

impl fmt::Debug for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in self.0.keys() {
            let res = self.results(&key);
            writeln!(f, "{}: {:?}", key, res)?;
        }
        Ok(())
    }
}

#[test]
fn usage() {
    let mut stats = Statistics::new();
    stats.add("diameter", 1.0);
    assert_eq!(stats.results("diameter").mean, 1.0);
    stats.add("diameter", 2.0);
    assert_eq!(stats.results("diameter").mean, 1.5);
    stats.add("score", 0.5);
    assert_eq!(stats.results("score").mean, 0.5);
    stats.add("diameter", 3.0);
    stats.add("diameter", f64::NAN);
    assert_eq!(stats.results("diameter").mean, 2.0);
    assert_eq!(stats.results("diameter").stddev, 0.816496580927726);
    assert_eq!(stats.results("diameter").len, 3);
    assert_eq!(stats.results("diameter").min, 1.0);
    assert_eq!(stats.results("diameter").max, 3.0);

    assert_eq!(stats.results("height").mean, 0.0);
    assert_eq!(
        format!("{:?}", stats),
        "diameter: #measurements: 3, min: 1.000, max: 3.000, mean: 2.000 +/- 0.816\n\
         score: #measurements: 1, min: 0.500, max: 0.500, mean: 0.500 +/- 0.000\n"
    );
}
