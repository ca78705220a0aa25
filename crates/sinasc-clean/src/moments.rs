//! Running mean and variance, mergeable across chunks.

use std::collections::BTreeMap;

/// Welford accumulator for count, mean and the sum of squared deviations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    /// Combine with moments accumulated elsewhere (Chan et al.).
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        let (n_a, n_b, n) = (self.count as f64, other.count as f64, total as f64);
        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.count = total;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean, or `None` before any value was pushed.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Sample standard deviation (n - 1), or `None` below two values.
    pub fn sample_std(&self) -> Option<f64> {
        (self.count > 1).then(|| (self.m2 / (self.count - 1) as f64).sqrt())
    }

    pub fn moments(&self) -> ColumnMoments {
        ColumnMoments {
            count: self.count,
            mean: self.mean().unwrap_or(f64::NAN),
            std: self.sample_std(),
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        for value in iter {
            stats.push(value);
        }
        stats
    }
}

/// Frozen moments used to score values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnMoments {
    pub count: u64,
    pub mean: f64,
    pub std: Option<f64>,
}

impl ColumnMoments {
    /// `(mean - value) / std`, zero when the spread is zero or undefined.
    pub fn z_score(&self, value: f64) -> f64 {
        match self.std {
            Some(std) if std > 0.0 && std.is_finite() => (self.mean - value) / std,
            _ => 0.0,
        }
    }
}

/// Accumulators keyed by column name.
pub type ColumnStats = BTreeMap<String, RunningStats>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_matches_two_pass_moments() {
        let stats: RunningStats = [1.0, 2.0, 3.0, 4.0, 100.0].into_iter().collect();
        assert_eq!(stats.count(), 5);
        assert!((stats.mean().unwrap() - 22.0).abs() < 1e-12);
        // sum of squared deviations: 441 + 400 + 361 + 324 + 6084 = 7610
        let expected = (7610.0f64 / 4.0).sqrt();
        assert!((stats.sample_std().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn merge_equals_single_pass() {
        let values = [3.0, 7.5, -2.0, 11.0, 4.25, 0.0, 9.0];
        let whole: RunningStats = values.iter().copied().collect();
        let mut left: RunningStats = values[..3].iter().copied().collect();
        let right: RunningStats = values[3..].iter().copied().collect();
        left.merge(&right);

        assert_eq!(left.count(), whole.count());
        assert!((left.mean().unwrap() - whole.mean().unwrap()).abs() < 1e-12);
        assert!((left.sample_std().unwrap() - whole.sample_std().unwrap()).abs() < 1e-12);
    }

    #[test]
    fn degenerate_moments_score_zero() {
        let single: RunningStats = [5.0].into_iter().collect();
        assert_eq!(single.sample_std(), None);
        assert_eq!(single.moments().z_score(100.0), 0.0);

        let constant: RunningStats = [2.0, 2.0, 2.0].into_iter().collect();
        assert_eq!(constant.moments().z_score(2.0), 0.0);

        assert_eq!(RunningStats::new().mean(), None);
    }
}
