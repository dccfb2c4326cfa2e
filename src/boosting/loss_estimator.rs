//! Adaptive windowed estimate of the per-instance training loss.
//!
//! [`LossChangeEstimator`] keeps a variable-length window of recent losses
//! compressed into an exponential histogram: row `i` holds buckets that each
//! summarise `2^i` consecutive observations. Every few observations the
//! window is checked for a split into an older and a newer part whose means
//! differ by more than a Hoeffding-style bound; when one is found the oldest
//! buckets are dropped until no such split remains. Mean and variance are
//! always those of the current window.

use std::collections::VecDeque;

use crate::core::constants::DEFAULT_LOSS_ESTIMATOR_DELTA;

/// Buckets kept per row before the two oldest are merged.
const MAX_BUCKETS_PER_ROW: usize = 5;

/// Observations between change checks.
const CHECK_PERIOD: u64 = 32;

/// Window width required before change checks start.
const MIN_WINDOW_WIDTH: u64 = 10;

/// Minimum number of observations on each side of a candidate split.
const MIN_SUB_WINDOW_LENGTH: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bucket {
    total: f64,
    variance: f64,
}

/// Windowed mean/variance estimator with change detection.
#[derive(Debug, Clone)]
pub struct LossChangeEstimator {
    delta: f64,
    // rows[i]: buckets of size 2^i, oldest at the front
    rows: Vec<VecDeque<Bucket>>,
    width: u64,
    total: f64,
    variance: f64,
    time: u64,
    num_changes: u64,
    last_change_detected: bool,
}

impl Default for LossChangeEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_LOSS_ESTIMATOR_DELTA)
    }
}

impl LossChangeEstimator {
    /// Create an empty estimator with confidence parameter `delta`.
    pub fn new(delta: f64) -> Self {
        LossChangeEstimator {
            delta,
            rows: vec![VecDeque::with_capacity(MAX_BUCKETS_PER_ROW + 1)],
            width: 0,
            total: 0.0,
            variance: 0.0,
            time: 0,
            num_changes: 0,
            last_change_detected: false,
        }
    }

    /// Confidence parameter
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Number of observations in the current window
    pub fn width(&self) -> u64 {
        self.width
    }

    /// Mean of the window, 0 when empty
    pub fn mean(&self) -> f64 {
        if self.width > 0 {
            self.total / self.width as f64
        } else {
            0.0
        }
    }

    /// Variance of the window, 0 when empty
    pub fn variance(&self) -> f64 {
        if self.width > 0 {
            self.variance / self.width as f64
        } else {
            0.0
        }
    }

    /// Standard deviation of the window
    pub fn std_dev(&self) -> f64 {
        self.variance().max(0.0).sqrt()
    }

    /// Number of changes detected so far
    pub fn num_changes(&self) -> u64 {
        self.num_changes
    }

    /// Whether the last observation triggered a change
    pub fn change_detected(&self) -> bool {
        self.last_change_detected
    }

    /// Number of buckets currently stored
    pub fn num_buckets(&self) -> usize {
        self.rows.iter().map(VecDeque::len).sum()
    }

    fn bucket_size(row: usize) -> u64 {
        1u64 << row
    }

    /// Add an observation. Returns whether a change was detected.
    pub fn observe(&mut self, value: f64) -> bool {
        self.insert(value);
        self.last_change_detected = self.check_change();
        if self.last_change_detected {
            self.num_changes += 1;
            log::debug!(
                "Loss change detected: window width {}, mean {:.6}",
                self.width,
                self.mean()
            );
        }
        self.last_change_detected
    }

    fn insert(&mut self, value: f64) {
        self.width += 1;
        self.rows[0].push_back(Bucket {
            total: value,
            variance: 0.0,
        });

        if self.width > 1 {
            let w = self.width as f64;
            let previous_mean = self.total / (w - 1.0);
            self.variance += (w - 1.0) * (value - previous_mean) * (value - previous_mean) / w;
        }
        self.total += value;

        self.compress();
    }

    fn compress(&mut self) {
        let mut row = 0;
        while self.rows[row].len() > MAX_BUCKETS_PER_ROW {
            let (Some(b1), Some(b2)) = (self.rows[row].pop_front(), self.rows[row].pop_front()) else {
                break;
            };
            let n = Self::bucket_size(row) as f64;
            let u1 = b1.total / n;
            let u2 = b2.total / n;
            let inc_variance = n * n * (u1 - u2) * (u1 - u2) / (n + n);

            if row + 1 == self.rows.len() {
                self.rows.push(VecDeque::with_capacity(MAX_BUCKETS_PER_ROW + 1));
            }
            self.rows[row + 1].push_back(Bucket {
                total: b1.total + b2.total,
                variance: b1.variance + b2.variance + inc_variance,
            });
            row += 1;
        }
    }

    /// Drop the oldest bucket, returning its size.
    fn delete_oldest(&mut self) -> u64 {
        let Some(row) = self.rows.iter().rposition(|r| !r.is_empty()) else {
            return 0;
        };
        let Some(bucket) = self.rows[row].pop_front() else {
            return 0;
        };

        let n1 = Self::bucket_size(row);
        self.width -= n1;
        self.total -= bucket.total;

        if self.width > 0 {
            let n1f = n1 as f64;
            let w = self.width as f64;
            let u1 = bucket.total / n1f;
            let mean = self.total / w;
            self.variance -= bucket.variance + n1f * w * (u1 - mean) * (u1 - mean) / (n1f + w);
        } else {
            self.variance = 0.0;
        }

        if self.rows[row].is_empty() && row > 0 {
            self.rows.truncate(row);
        }
        n1
    }

    fn check_change(&mut self) -> bool {
        self.time += 1;
        if self.time % CHECK_PERIOD != 0 || self.width <= MIN_WINDOW_WIDTH {
            return false;
        }

        let mut change = false;
        let mut reduce_width = true;
        while reduce_width {
            reduce_width = false;

            let mut n0 = 0u64;
            let mut n1 = self.width;
            let mut u0 = 0.0;
            let mut u1 = self.total;

            'scan: for row in (0..self.rows.len()).rev() {
                let size = Self::bucket_size(row);
                let num_in_row = self.rows[row].len();
                for k in 0..num_in_row {
                    let bucket_total = self.rows[row][k].total;
                    n0 += size;
                    n1 -= size;
                    u0 += bucket_total;
                    u1 -= bucket_total;

                    // the newest bucket closes the scan
                    if row == 0 && k == num_in_row - 1 {
                        break 'scan;
                    }

                    if n1 > MIN_SUB_WINDOW_LENGTH + 1
                        && n0 > MIN_SUB_WINDOW_LENGTH + 1
                        && self.is_cut(n0, n1, u0, u1)
                    {
                        change = true;
                        if self.width > 0 {
                            self.delete_oldest();
                            reduce_width = true;
                        }
                        break 'scan;
                    }
                }
            }
        }
        change
    }

    fn is_cut(&self, n0: u64, n1: u64, u0: f64, u1: f64) -> bool {
        let n = self.width as f64;
        let difference = u0 / n0 as f64 - u1 / n1 as f64;
        let dd = (2.0 * n.ln() / self.delta).ln();
        let v = self.variance();
        let min_len = MIN_SUB_WINDOW_LENGTH as f64;
        let m = 1.0 / (n0 as f64 - min_len + 1.0) + 1.0 / (n1 as f64 - min_len + 1.0);
        let epsilon = (2.0 * m * v * dd).sqrt() + 2.0 / 3.0 * dd * m;
        difference.abs() > epsilon
    }
}
