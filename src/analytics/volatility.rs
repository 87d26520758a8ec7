/// Running mean and squared-deviation sum (Welford), with removal so it can
/// follow a sliding window of mid prices.
/// Fraction of `m2` that must survive a removal for the running value to be trusted.
const CANCELLATION_LIMIT: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Builds the accumulator from scratch over `values`.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut stats = Self::new();
        for x in values {
            stats.push(x);
        }
        stats
    }

    /// Removes a value previously pushed. Used when the window evicts its oldest point.
    ///
    /// Returns `false` when the subtraction cancelled nearly all of `m2`, which
    /// happens when an outlier leaves the window. The result is then only a
    /// rough approximation and the caller should rebuild from the window.
    pub fn remove(&mut self, x: f64) -> bool {
        match self.count {
            0 => true,
            1 => {
                *self = Self::default();
                true
            }
            n => {
                let prev_mean = self.mean;
                let prev_m2 = self.m2;
                self.mean = (n as f64 * prev_mean - x) / (n - 1) as f64;
                self.m2 -= (x - self.mean) * (x - prev_mean);
                self.count = n - 1;

                let precise = self.m2 >= prev_m2 * CANCELLATION_LIMIT;
                if self.m2 < 0.0 {
                    self.m2 = 0.0;
                }
                precise
            }
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Bessel-corrected variance; zero with fewer than two observations.
    pub fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn sample_std_dev(&self) -> f64 {
        self.sample_variance().sqrt()
    }
}

/// Two-pass sample standard deviation over a full series.
/// Zero with fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (n - 1.0)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn fewer_than_two_points_is_zero() {
        assert_eq!(sample_std_dev(&[]), 0.0);
        assert_eq!(sample_std_dev(&[100.0]), 0.0);

        let mut stats = RunningStats::new();
        assert_eq!(stats.sample_std_dev(), 0.0);
        stats.push(100.0);
        assert_eq!(stats.sample_std_dev(), 0.0);
    }

    #[test]
    fn two_points_use_bessel_correction() {
        let expected = 2.0_f64.sqrt();
        assert!((sample_std_dev(&[100.0, 102.0]) - expected).abs() < EPS);

        let mut stats = RunningStats::new();
        stats.push(100.0);
        stats.push(102.0);
        assert!((stats.sample_std_dev() - expected).abs() < EPS);
        assert!((stats.mean() - 101.0).abs() < EPS);
    }

    #[test]
    fn running_matches_batch() {
        let series = [100.0, 100.5, 99.75, 101.25, 100.0, 102.5, 98.0];
        let mut stats = RunningStats::new();
        for x in series {
            stats.push(x);
        }
        assert_eq!(stats.count(), series.len());
        assert!((stats.sample_std_dev() - sample_std_dev(&series)).abs() < EPS);
    }

    #[test]
    fn removal_tracks_a_sliding_window() {
        let series = [100.0, 100.5, 99.75, 101.25, 100.0, 102.5, 98.0, 97.5];
        let window = 3;
        let mut stats = RunningStats::new();

        for (i, x) in series.iter().enumerate() {
            stats.push(*x);
            if i >= window {
                stats.remove(series[i - window]);
            }
            let start = (i + 1).saturating_sub(window);
            let expected = sample_std_dev(&series[start..=i]);
            assert!(
                (stats.sample_std_dev() - expected).abs() < 1e-6,
                "window ending at {i}: {} vs {expected}",
                stats.sample_std_dev()
            );
        }
    }

    #[test]
    fn removing_the_last_value_resets() {
        let mut stats = RunningStats::new();
        stats.push(5.0);
        assert!(stats.remove(5.0));
        assert_eq!(stats, RunningStats::default());
    }

    #[test]
    fn removing_an_outlier_reports_lost_precision() {
        let mut stats = RunningStats::new();
        stats.push(1e9);
        for i in 0..10 {
            stats.push(65_000.0 + (i % 2) as f64 * 0.01);
        }
        assert!(!stats.remove(1e9));

        let rebuilt =
            RunningStats::from_values((0..10).map(|i| 65_000.0 + (i % 2) as f64 * 0.01));
        let expected = sample_std_dev(
            &(0..10)
                .map(|i| 65_000.0 + (i % 2) as f64 * 0.01)
                .collect::<Vec<_>>(),
        );
        assert!((rebuilt.sample_std_dev() - expected).abs() < EPS);
    }

    #[test]
    fn ordinary_removal_stays_precise() {
        let mut stats = RunningStats::from_values([100.0, 100.5, 99.75, 101.25]);
        assert!(stats.remove(100.0));
        assert_eq!(stats.count(), 3);
    }
}
