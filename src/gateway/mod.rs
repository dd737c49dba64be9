//! Process boundary: one JSON request in, one JSON response out.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use nalgebra::Point3;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::geometry::{DomainDescriptor, FrameError};
use crate::interpolation::{interpolate_domain, InterpolationError};
use crate::kriging::ordinary_kriging::OrdinaryKriging;
use crate::kriging::KrigingBuilder;

use self::message::{
    round3, Action, CalculateTopoArgs, Envelope, JobResult, OutputPoint, Response, ResultFile,
    TopoJobResult,
};
use self::persistence::{persist_result, PersistenceError};

pub mod message;
pub mod persistence;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("JSON Decode Error: {0}")]
    InputParse(String),
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("no request received")]
    EmptyInput,
}

impl GatewayError {
    /// Stable name reported as `errorKind` in failure responses.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::InputParse(_) => "InputParseError",
            GatewayError::UnsupportedAction(_) => "UnsupportedActionError",
            GatewayError::InvalidArguments(_) => "InvalidArgumentsError",
            GatewayError::Persistence(_) => "PersistenceError",
            GatewayError::EmptyInput => "EmptyInputError",
            GatewayError::Interpolation(e) => match e {
                InterpolationError::InsufficientSamples { .. } => "InsufficientSamplesError",
                InterpolationError::InvalidResolution(_) => "InvalidResolutionError",
                InterpolationError::InvalidSample(_) => "InvalidSampleError",
                InterpolationError::GridTooLarge { .. } => "GridTooLargeError",
                InterpolationError::Frame(FrameError::InvalidDomain(_)) => "InvalidDomainError",
                InterpolationError::Frame(FrameError::NonOrthogonalDomain { .. }) => {
                    "NonOrthogonalDomainError"
                }
                InterpolationError::Kriging(_) | InterpolationError::PredictionCount { .. } => {
                    "ModelFitFailure"
                }
            },
        }
    }
}

/// Stateless dispatcher from a request line to a response.
pub struct Gateway<B = OrdinaryKriging> {
    config: GatewayConfig,
    builder: B,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        let builder = OrdinaryKriging::new(config.n_lags);
        Self { config, builder }
    }
}

impl<B: KrigingBuilder> Gateway<B> {
    /// Use a different kriging capability.
    pub fn with_builder(config: GatewayConfig, builder: B) -> Self {
        Self { config, builder }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Handle one request. Failures are reported in the response, never raised.
    pub fn process_message(&self, message: &str) -> Response {
        let data = match serde_json::from_str::<Value>(message) {
            Ok(data) => data,
            Err(e) => {
                let error = GatewayError::InputParse(e.to_string());
                warn!(%error, "failed to parse request");
                return Response::failure(&error, None);
            }
        };

        match self.dispatch(data.clone()) {
            Ok(job_result) => Response::success(data, job_result),
            Err(error) => {
                warn!(kind = error.kind(), %error, "request failed");
                Response::failure(&error, Some(data))
            }
        }
    }

    fn dispatch(&self, data: Value) -> Result<JobResult, GatewayError> {
        let envelope = serde_json::from_value::<Envelope>(data)
            .map_err(|e| GatewayError::InvalidArguments(e.to_string()))?;
        debug!(action = %envelope.action, "dispatching request");

        match Action::try_from(envelope)? {
            Action::Test => Ok(JobResult::test()),
            Action::CalculateTopo(args) => self.calculate_topo(args).map(JobResult::Topo),
        }
    }

    fn calculate_topo(&self, args: CalculateTopoArgs) -> Result<TopoJobResult, GatewayError> {
        let start = Instant::now();

        let descriptor = DomainDescriptor::try_from(args.obb)?;
        let samples = args.points.into_iter().map(Point3::from).collect::<Vec<_>>();
        let settings = self
            .config
            .interpolation_settings(args.variogram_model, args.include_variance);
        info!(
            samples = samples.len(),
            resolution = args.resolution,
            variogram_model = %settings.variogram_model,
            "calculating topography"
        );

        let result = interpolate_domain(
            &descriptor,
            &samples,
            args.resolution,
            &settings,
            &self.builder,
        )?;

        let points = result
            .points
            .iter()
            .map(|p| OutputPoint::from_predicted(p, args.output))
            .collect::<Vec<_>>();
        let count = points.len();

        let (points, point_file_path) = match &args.runtime_path {
            Some(runtime_path) => {
                let path = persist_result(
                    runtime_path,
                    &ResultFile {
                        points: &points,
                        max_i: result.max_i,
                        max_j: result.max_j,
                        resolution: result.resolution,
                    },
                )?;
                (None, Some(path.to_string_lossy().into_owned()))
            }
            None => (Some(points), None),
        };

        Ok(TopoJobResult {
            duration: round3(start.elapsed().as_secs_f64()),
            count,
            max_i: result.max_i,
            max_j: result.max_j,
            resolution: result.resolution,
            points,
            point_file_path,
        })
    }
}

/// Next non-blank line from `reader`, trimmed, or `None` at end of input.
pub fn read_request<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
}

/// Write `response` as a single JSON line and flush.
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
