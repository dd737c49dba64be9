use nalgebra::Point2;
use tracing::{debug, info};

use crate::spatial_database::SampleSet;
use crate::systems::ok_system::SolvedOKSystem;
use crate::variography::experimental_variogram::{ExperimentalVariogram, DEFAULT_N_LAGS};
use crate::variography::model_variograms::iso_fitter::{FitError, IsoVariogramFitter};
use crate::variography::model_variograms::VariogramModelKind;

use super::{KrigingBuilder, KrigingError, KrigingPredictor, Prediction};

/// Ordinary kriging with a variogram fitted to the samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrdinaryKriging {
    pub n_lags: usize,
}

impl Default for OrdinaryKriging {
    fn default() -> Self {
        Self {
            n_lags: DEFAULT_N_LAGS,
        }
    }
}

impl OrdinaryKriging {
    pub fn new(n_lags: usize) -> Self {
        Self {
            n_lags: n_lags.max(1),
        }
    }
}

pub enum OrdinaryKrigingModel {
    /// Every sample carries the same value; the surface is flat and exact.
    Constant(f64),
    System(SolvedOKSystem),
}

impl KrigingBuilder for OrdinaryKriging {
    type Model = OrdinaryKrigingModel;

    fn fit(
        &self,
        x: &[f64],
        y: &[f64],
        z: &[f64],
        variogram_model: VariogramModelKind,
    ) -> Result<Self::Model, KrigingError> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(KrigingError::MismatchedSamples {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }
        if x.len() < 2 {
            return Err(KrigingError::TooFewSamples {
                found: x.len(),
                required: 2,
            });
        }

        let samples = SampleSet::new(
            x.iter().zip(y).map(|(x, y)| Point2::new(*x, *y)).collect(),
            z.to_vec(),
        );

        let experimental = ExperimentalVariogram::compute(&samples, self.n_lags);
        debug!(
            lags = ?experimental.lags,
            semivariance = ?experimental.semivariance,
            "experimental variogram"
        );

        let variogram = match IsoVariogramFitter::new(&experimental, variogram_model) {
            Ok(fitter) => fitter.fit(),
            Err(FitError::NoSill) => {
                info!(value = z[0], "samples are constant, using a flat surface");
                return Ok(OrdinaryKrigingModel::Constant(z[0]));
            }
            Err(e) => return Err(e.into()),
        };
        info!(%variogram, n_samples = samples.len(), "fitted variogram");

        let system = SolvedOKSystem::build(samples.points, samples.data, variogram)?;

        Ok(OrdinaryKrigingModel::System(system))
    }
}

impl KrigingPredictor for OrdinaryKrigingModel {
    fn predict(&self, x: &[f64], y: &[f64]) -> Result<Prediction, KrigingError> {
        if x.len() != y.len() {
            return Err(KrigingError::MismatchedQueries {
                x: x.len(),
                y: y.len(),
            });
        }

        match self {
            OrdinaryKrigingModel::Constant(value) => Ok(Prediction {
                z: vec![*value; x.len()],
                variance: vec![0f64; x.len()],
            }),
            OrdinaryKrigingModel::System(system) => {
                let queries = x
                    .iter()
                    .zip(y)
                    .map(|(x, y)| Point2::new(*x, *y))
                    .collect::<Vec<_>>();

                let (z, variance): (Vec<_>, Vec<_>) = system.solve(&queries)?.into_iter().unzip();

                if let Some(index) = z.iter().position(|v| !v.is_finite()) {
                    return Err(KrigingError::NonFinitePrediction { index });
                }

                Ok(Prediction { z, variance })
            }
        }
    }
}
