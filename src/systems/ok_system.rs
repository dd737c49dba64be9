use itertools::Itertools;
use nalgebra::{distance, DMatrix, Dyn, Point2, LU};
use rayon::prelude::*;

use crate::kriging::KrigingError;
use crate::variography::model_variograms::{IsoVariogramModel, IsoVariogramType};

/// Query points solved per right-hand-side batch.
const QUERY_BATCH: usize = 256;

/// Distances at or below this snap to the coinciding sample.
const EXACT_DISTANCE: f64 = 1e-10;

/// Factored ordinary kriging system for a fixed set of conditioning points.
///
/// The (n + 1) x (n + 1) matrix holds the semivariance between every pair of
/// conditioning points, bordered by ones for the unbiasedness constraint:
/// ```text
/// [ g(x1,x1) ... g(x1,xn) 1 ] [ w1 ]   [ g(x1,x0) ]
/// [   ...          ...    . ] [ .. ] = [   ...    ]
/// [ g(xn,x1) ... g(xn,xn) 1 ] [ wn ]   [ g(xn,x0) ]
/// [    1     ...    1     0 ] [ mu ]   [    1     ]
/// ```
/// It is factored once and solved for batches of query points.
pub struct SolvedOKSystem {
    pub points: Vec<Point2<f64>>,
    pub values: Vec<f64>,
    pub variogram: IsoVariogramType,
    lu: LU<f64, Dyn, Dyn>,
}

impl SolvedOKSystem {
    pub fn build(
        points: Vec<Point2<f64>>,
        values: Vec<f64>,
        variogram: IsoVariogramType,
    ) -> Result<Self, KrigingError> {
        // coincident locations give identical rows
        if points
            .iter()
            .tuple_combinations()
            .any(|(p1, p2)| distance(p1, p2) <= EXACT_DISTANCE)
        {
            return Err(KrigingError::SingularSystem);
        }

        let n_cond = points.len();
        let n_total = n_cond + 1;

        let mat = DMatrix::from_fn(n_total, n_total, |i, j| {
            if i == n_cond && j == n_cond {
                0f64
            } else if i == n_cond || j == n_cond {
                1f64
            } else if i == j {
                0f64
            } else {
                variogram.variogram(distance(&points[i], &points[j]))
            }
        });

        if mat.iter().any(|v| !v.is_finite()) {
            return Err(KrigingError::SingularSystem);
        }

        let lu = mat.lu();
        if !lu.is_invertible() {
            return Err(KrigingError::SingularSystem);
        }

        Ok(Self {
            points,
            values,
            variogram,
            lu,
        })
    }

    pub fn n_cond(&self) -> usize {
        self.points.len()
    }

    /// Estimate and kriging variance at each query point, in query order.
    pub fn solve(&self, queries: &[Point2<f64>]) -> Result<Vec<(f64, f64)>, KrigingError> {
        let batches = queries
            .par_chunks(QUERY_BATCH)
            .map(|batch| self.solve_batch(batch))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(batches.into_iter().flatten().collect())
    }

    fn solve_batch(&self, batch: &[Point2<f64>]) -> Result<Vec<(f64, f64)>, KrigingError> {
        let n_cond = self.n_cond();

        let rhs = DMatrix::from_fn(n_cond + 1, batch.len(), |i, j| {
            if i == n_cond {
                return 1f64;
            }
            let h = distance(&self.points[i], &batch[j]);
            if h <= EXACT_DISTANCE {
                0f64
            } else {
                self.variogram.variogram(h)
            }
        });

        let weights = self.lu.solve(&rhs).ok_or(KrigingError::SingularSystem)?;

        let estimates = (0..batch.len())
            .map(|j| {
                let w = weights.column(j);
                let b = rhs.column(j);

                let estimate = (0..n_cond).map(|i| w[i] * self.values[i]).sum::<f64>();
                // sigma^2 = sum(w_i * g_i0) + mu
                let variance = (0..n_cond).map(|i| w[i] * b[i]).sum::<f64>() + w[n_cond];

                (estimate, variance)
            })
            .collect();

        Ok(estimates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variography::model_variograms::iso_linear::IsoLinear;
    use approx::assert_relative_eq;

    fn square() -> (Vec<Point2<f64>>, Vec<f64>) {
        (
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
                Point2::new(1.0, 1.0),
            ],
            vec![1.0, 2.0, 3.0, 4.0],
        )
    }

    #[test]
    fn exact_at_conditioning_points() {
        let (points, values) = square();
        let system = SolvedOKSystem::build(
            points.clone(),
            values.clone(),
            IsoVariogramType::Linear(IsoLinear::new(1.0, 0.1)),
        )
        .unwrap();
        let result = system.solve(&points).unwrap();
        for ((estimate, variance), value) in result.iter().zip(values.iter()) {
            assert_relative_eq!(*estimate, *value, epsilon = 1e-9);
            assert_relative_eq!(*variance, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn symmetric_center_is_the_mean() {
        let (points, values) = square();
        let system = SolvedOKSystem::build(
            points,
            values,
            IsoVariogramType::Linear(IsoLinear::new(1.0, 0.0)),
        )
        .unwrap();
        let result = system.solve(&[Point2::new(0.5, 0.5)]).unwrap();
        assert_relative_eq!(result[0].0, 2.5, epsilon = 1e-9);
        assert!(result[0].1 > 0.0);
    }

    #[test]
    fn weights_sum_to_one_so_constants_are_reproduced() {
        let (points, _) = square();
        let system = SolvedOKSystem::build(
            points,
            vec![7.0; 4],
            IsoVariogramType::Linear(IsoLinear::new(0.3, 0.05)),
        )
        .unwrap();
        let queries = (0..600)
            .map(|k| Point2::new(k as f64 * 0.01 - 2.0, 0.3))
            .collect::<Vec<_>>();
        let result = system.solve(&queries).unwrap();
        assert_eq!(result.len(), queries.len());
        for (estimate, _) in result {
            assert_relative_eq!(estimate, 7.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn duplicate_points_are_singular() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
        ];
        let result = SolvedOKSystem::build(
            points,
            vec![1.0, 1.5, 2.0],
            IsoVariogramType::Linear(IsoLinear::new(1.0, 0.0)),
        );
        assert!(matches!(result, Err(KrigingError::SingularSystem)));
    }

    #[test]
    fn zero_variogram_is_singular() {
        let (points, values) = square();
        let result = SolvedOKSystem::build(
            points,
            values,
            IsoVariogramType::Linear(IsoLinear::new(0.0, 0.0)),
        );
        assert!(matches!(result, Err(KrigingError::SingularSystem)));
    }

    #[test]
    fn weights_do_not_depend_on_value_scale() {
        let (mut points, mut values) = square();
        points.push(Point2::new(0.4, 2.5));
        values.push(2.5);
        let queries = [Point2::new(0.5, 0.5), Point2::new(-1.0, 3.0), Point2::new(2.0, 0.2)];

        let base = SolvedOKSystem::build(
            points.clone(),
            values.clone(),
            IsoVariogramType::Linear(IsoLinear::new(1.0, 0.1)),
        )
        .unwrap()
        .solve(&queries)
        .unwrap();

        for scale in [1e4, 1e6] {
            // semivariance grows with the square of the value scale
            let scaled = SolvedOKSystem::build(
                points.clone(),
                values.iter().map(|v| v * scale).collect(),
                IsoVariogramType::Linear(IsoLinear::new(scale * scale, 0.1 * scale * scale)),
            )
            .unwrap()
            .solve(&queries)
            .unwrap();

            for ((estimate, variance), (base_estimate, base_variance)) in
                scaled.iter().zip(base.iter())
            {
                assert_relative_eq!(estimate / scale, *base_estimate, max_relative = 1e-9);
                assert_relative_eq!(
                    variance / (scale * scale),
                    *base_variance,
                    max_relative = 1e-9
                );
            }
        }
    }
}
