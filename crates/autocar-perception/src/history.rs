//! Rolling window of front distance readings.

use std::collections::VecDeque;

/// Readings required before [`DistanceHistory::stats`] reports anything.
pub const MIN_READINGS_FOR_STATS: usize = 5;

/// Summary of the readings currently in a [`DistanceHistory`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceStats {
    pub count: usize,
    pub mean: f32,
    pub median: f32,
    pub min: f32,
    pub max: f32,
    /// Sample standard deviation (n − 1 denominator).
    pub stdev: f32,
}

/// Bounded FIFO of distances; the oldest reading is evicted when full.
#[derive(Debug, Clone)]
pub struct DistanceHistory {
    readings: VecDeque<f32>,
    capacity: usize,
}

impl DistanceHistory {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, distance_cm: f32) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(distance_cm);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `None` until [`MIN_READINGS_FOR_STATS`] readings are held.
    pub fn stats(&self) -> Option<DistanceStats> {
        let count = self.readings.len();
        if count < MIN_READINGS_FOR_STATS {
            return None;
        }

        let mut sorted: Vec<f32> = self.readings.iter().copied().collect();
        sorted.sort_by(f32::total_cmp);

        let n = count as f32;
        let mean = sorted.iter().sum::<f32>() / n;
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };
        let variance = sorted.iter().map(|d| (d - mean).powi(2)).sum::<f32>() / (n - 1.0);

        Some(DistanceStats {
            count,
            mean,
            median,
            min: sorted[0],
            max: sorted[count - 1],
            stdev: variance.sqrt(),
        })
    }
}
