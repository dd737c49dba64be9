use itertools::Itertools;
use nalgebra::distance;

use crate::spatial_database::SampleSet;

pub const DEFAULT_N_LAGS: usize = 6;

/// Binned semivariance of all sample pairs.
///
/// Pair distances are split into `n_lags` equal-width bins between the
/// smallest and largest pair distance. Each non-empty bin reports the mean
/// distance and mean semivariance `0.5 * (z_i - z_j)^2` of its pairs; empty
/// bins are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentalVariogram {
    pub lags: Vec<f64>,
    pub semivariance: Vec<f64>,
    pub counts: Vec<u32>,
}

impl ExperimentalVariogram {
    pub fn compute(samples: &SampleSet, n_lags: usize) -> Self {
        let n_lags = n_lags.max(1);

        let pairs = samples
            .points
            .iter()
            .zip(samples.data.iter())
            .tuple_combinations()
            .map(|((p1, v1), (p2, v2))| (distance(p1, p2), 0.5 * (v1 - v2) * (v1 - v2)))
            .collect::<Vec<_>>();

        let Some((d_min, d_max)) = pairs
            .iter()
            .map(|(d, _)| *d)
            .minmax_by(|a, b| a.total_cmp(b))
            .into_option()
        else {
            return Self {
                lags: Vec::new(),
                semivariance: Vec::new(),
                counts: Vec::new(),
            };
        };

        let width = (d_max - d_min) / n_lags as f64;

        let mut lag_sums = vec![0f64; n_lags];
        let mut semivar_sums = vec![0f64; n_lags];
        let mut counts = vec![0u32; n_lags];

        for (d, g) in pairs {
            let bin = if width > 0f64 {
                (((d - d_min) / width).floor() as usize).min(n_lags - 1)
            } else {
                0
            };
            lag_sums[bin] += d;
            semivar_sums[bin] += g;
            counts[bin] += 1;
        }

        let mut lags = Vec::with_capacity(n_lags);
        let mut semivariance = Vec::with_capacity(n_lags);
        let mut kept_counts = Vec::with_capacity(n_lags);
        for ((lag_sum, semivar_sum), count) in lag_sums.into_iter().zip(semivar_sums).zip(counts) {
            if count == 0 {
                continue;
            }
            lags.push(lag_sum / count as f64);
            semivariance.push(semivar_sum / count as f64);
            kept_counts.push(count);
        }

        Self {
            lags,
            semivariance,
            counts: kept_counts,
        }
    }

    pub fn len(&self) -> usize {
        self.lags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }
}
