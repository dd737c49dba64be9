//! Grid interpolation over a resolved domain frame.
//!
//! Samples are moved into the frame (when its placement requires it), a
//! kriging model is fit on them, a resolution-stepped grid of query points is
//! predicted and the predictions are moved back to global coordinates.

use nalgebra::Point3;
use thiserror::Error;

use crate::geometry::frame::{FrameError, DEFAULT_ORTHOGONALITY_TOLERANCE};
use crate::kriging::KrigingError;
use crate::spatial_database::SampleError;
use crate::variography::model_variograms::VariogramModelKind;

pub mod grid;
pub mod pipeline;

pub use grid::{GridIndex, GridSpec};
pub use pipeline::{interpolate, interpolate_domain};

/// Kriging needs at least this many samples to produce a meaningful surface.
pub const MIN_SAMPLES: usize = 3;

pub const DEFAULT_MAX_GRID_POINTS: usize = 4_000_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("at least {required} samples are required, got {found}")]
    InsufficientSamples { found: usize, required: usize },
    #[error("resolution must be a positive finite number, got {0}")]
    InvalidResolution(f64),
    #[error(transparent)]
    InvalidSample(#[from] SampleError),
    #[error("grid of {points} points exceeds the limit of {limit}")]
    GridTooLarge { points: usize, limit: usize },
    #[error("kriging returned {found} predictions for {expected} query points")]
    PredictionCount { expected: usize, found: usize },
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Kriging(#[from] KrigingError),
}

/// Knobs of the interpolation pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationSettings {
    pub variogram_model: VariogramModelKind,
    pub orthogonality_tolerance: f64,
    pub max_grid_points: usize,
    /// Keep the kriging variance of every predicted point.
    pub include_variance: bool,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        Self {
            variogram_model: VariogramModelKind::default(),
            orthogonality_tolerance: DEFAULT_ORTHOGONALITY_TOLERANCE,
            max_grid_points: DEFAULT_MAX_GRID_POINTS,
            include_variance: false,
        }
    }
}

/// One interpolated grid point in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedPoint {
    pub index: GridIndex,
    pub position: Point3<f64>,
    pub variance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationResult {
    /// Predicted points in i-major grid order.
    pub points: Vec<PredictedPoint>,
    pub max_i: usize,
    pub max_j: usize,
    pub resolution: f64,
}

impl InterpolationResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
