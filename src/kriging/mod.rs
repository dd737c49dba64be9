//! Spatial prediction capability consumed by the interpolation pipeline.
//!
//! A [`KrigingBuilder`] fits a model from scattered samples; the fitted
//! [`KrigingPredictor`] evaluates it at independent query points. The
//! pipeline only depends on these two traits, so tests can substitute an
//! analytic model for [`ordinary_kriging::OrdinaryKriging`].

use thiserror::Error;

use crate::variography::model_variograms::iso_fitter::FitError;
use crate::variography::model_variograms::VariogramModelKind;

pub mod ordinary_kriging;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KrigingError {
    #[error("sample arrays differ in length (x: {x}, y: {y}, z: {z})")]
    MismatchedSamples { x: usize, y: usize, z: usize },
    #[error("query arrays differ in length (x: {x}, y: {y})")]
    MismatchedQueries { x: usize, y: usize },
    #[error("at least {required} samples are required to fit a model, got {found}")]
    TooFewSamples { found: usize, required: usize },
    #[error("kriging system is singular; samples may be duplicated or degenerate")]
    SingularSystem,
    #[error("variogram fit failed: {0}")]
    VariogramFit(#[from] FitError),
    #[error("prediction at query {index} is not finite")]
    NonFinitePrediction { index: usize },
}

/// Predicted values and prediction variances, one per query point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prediction {
    pub z: Vec<f64>,
    pub variance: Vec<f64>,
}

impl Prediction {
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
}

pub trait KrigingBuilder {
    type Model: KrigingPredictor;

    fn fit(
        &self,
        x: &[f64],
        y: &[f64],
        z: &[f64],
        variogram_model: VariogramModelKind,
    ) -> Result<Self::Model, KrigingError>;
}

pub trait KrigingPredictor {
    fn predict(&self, x: &[f64], y: &[f64]) -> Result<Prediction, KrigingError>;
}
