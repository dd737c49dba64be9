use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

use crate::geometry::frame::DEFAULT_ORTHOGONALITY_TOLERANCE;
use crate::interpolation::{InterpolationSettings, DEFAULT_MAX_GRID_POINTS};
use crate::variography::experimental_variogram::DEFAULT_N_LAGS;
use crate::variography::model_variograms::VariogramModelKind;

pub const DEFAULT_LOG_FILTER: &str = "topokrig=warn";

/// Settings shared by every request handled by the gateway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatewayConfig {
    /// Used when a request does not name a model.
    pub variogram_model: VariogramModelKind,
    pub n_lags: usize,
    pub orthogonality_tolerance: f64,
    pub max_grid_points: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            variogram_model: VariogramModelKind::default(),
            n_lags: DEFAULT_N_LAGS,
            orthogonality_tolerance: DEFAULT_ORTHOGONALITY_TOLERANCE,
            max_grid_points: DEFAULT_MAX_GRID_POINTS,
        }
    }
}

impl GatewayConfig {
    /// Pipeline settings for one request, with its optional overrides applied.
    pub fn interpolation_settings(
        &self,
        variogram_model: Option<VariogramModelKind>,
        include_variance: bool,
    ) -> InterpolationSettings {
        InterpolationSettings {
            variogram_model: variogram_model.unwrap_or(self.variogram_model),
            orthogonality_tolerance: self.orthogonality_tolerance,
            max_grid_points: self.max_grid_points,
            include_variance,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "topokrig", version)]
#[command(about = "Krige a topographic grid over an oriented domain from scattered points")]
pub struct Cli {
    /// Read the request from this JSON file instead of standard input
    #[arg(value_name = "REQUEST_FILE")]
    pub request_file: Option<PathBuf>,

    /// Variogram model used when a request does not name one
    #[arg(
        long,
        value_enum,
        env = "TOPOKRIG_VARIOGRAM_MODEL",
        default_value_t = VariogramModelKind::Linear
    )]
    pub variogram_model: VariogramModelKind,

    /// Number of lag bins of the experimental variogram
    #[arg(
        long,
        env = "TOPOKRIG_NLAGS",
        default_value_t = NonZeroUsize::new(DEFAULT_N_LAGS).unwrap_or(NonZeroUsize::MIN)
    )]
    pub nlags: NonZeroUsize,

    /// Largest |dot(unitX, unitY)| accepted for corner-form domains
    #[arg(
        long,
        env = "TOPOKRIG_ORTHOGONALITY_TOLERANCE",
        default_value_t = DEFAULT_ORTHOGONALITY_TOLERANCE
    )]
    pub orthogonality_tolerance: f64,

    /// Largest number of grid points a request may ask for
    #[arg(
        long,
        env = "TOPOKRIG_MAX_GRID_POINTS",
        default_value_t = NonZeroUsize::new(DEFAULT_MAX_GRID_POINTS).unwrap_or(NonZeroUsize::MAX)
    )]
    pub max_grid_points: NonZeroUsize,

    /// Worker threads for batch prediction (defaults to one per core)
    #[arg(long, env = "TOPOKRIG_THREADS")]
    pub threads: Option<NonZeroUsize>,

    /// Log filter directives, e.g. `topokrig=debug` (falls back to RUST_LOG)
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn config(&self) -> GatewayConfig {
        GatewayConfig {
            variogram_model: self.variogram_model,
            n_lags: self.nlags.get(),
            orthogonality_tolerance: self.orthogonality_tolerance,
            max_grid_points: self.max_grid_points.get(),
        }
    }
}
