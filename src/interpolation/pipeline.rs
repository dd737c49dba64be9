use nalgebra::{Point2, Point3};
use tracing::{debug, info};

use crate::geometry::{DomainDescriptor, Frame};
use crate::kriging::{KrigingBuilder, KrigingPredictor};
use crate::spatial_database::SampleSet;

use super::{
    GridSpec, InterpolationError, InterpolationResult, InterpolationSettings, PredictedPoint,
    MIN_SAMPLES,
};

/// Resolve `descriptor` into a frame and interpolate over it.
pub fn interpolate_domain<B: KrigingBuilder>(
    descriptor: &DomainDescriptor,
    samples: &[Point3<f64>],
    resolution: f64,
    settings: &InterpolationSettings,
    builder: &B,
) -> Result<InterpolationResult, InterpolationError> {
    let frame = Frame::resolve_with_tolerance(descriptor, settings.orthogonality_tolerance)?;
    interpolate(&frame, samples, resolution, settings, builder)
}

/// Predict elevation on the regular grid laid over `frame` with spacing `resolution`.
///
/// Points are returned in i-major order with exactly one point per grid index;
/// `max_i` and `max_j` are the largest indices.
///
/// # Errors
/// * [`InterpolationError::InvalidResolution`] if `resolution` is not positive and finite.
/// * [`InterpolationError::InsufficientSamples`] for fewer than [`MIN_SAMPLES`] samples.
/// * [`InterpolationError::InvalidSample`] if a sample has a non-finite coordinate.
/// * [`InterpolationError::GridTooLarge`] if the grid exceeds `settings.max_grid_points`.
/// * [`InterpolationError::Kriging`] if the model cannot be fit or evaluated.
pub fn interpolate<B: KrigingBuilder>(
    frame: &Frame,
    samples: &[Point3<f64>],
    resolution: f64,
    settings: &InterpolationSettings,
    builder: &B,
) -> Result<InterpolationResult, InterpolationError> {
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(InterpolationError::InvalidResolution(resolution));
    }
    if samples.len() < MIN_SAMPLES {
        return Err(InterpolationError::InsufficientSamples {
            found: samples.len(),
            required: MIN_SAMPLES,
        });
    }
    let samples = SampleSet::try_from_points(samples)?;

    let grid = GridSpec::new(frame.extent_x, frame.extent_y, resolution).ok_or(
        InterpolationError::GridTooLarge {
            points: usize::MAX,
            limit: settings.max_grid_points,
        },
    )?;
    let num_points = grid.num_points().unwrap_or(usize::MAX);
    if num_points > settings.max_grid_points {
        return Err(InterpolationError::GridTooLarge {
            points: num_points,
            limit: settings.max_grid_points,
        });
    }
    debug!(n1 = grid.n1, n2 = grid.n2, num_points, "built query grid");

    // fit in the coordinates the frame walks its grid in
    let local = samples.to_frame(frame);
    let model = builder.fit(
        &local.xs(),
        &local.ys(),
        &local.data,
        settings.variogram_model,
    )?;

    let indices = grid.indices().collect::<Vec<_>>();
    let queries = indices
        .iter()
        .map(|index| {
            let (u, v) = grid.offset(*index);
            frame.query_location(u, v)
        })
        .collect::<Vec<Point2<f64>>>();

    let query_x = queries.iter().map(|q| q.x).collect::<Vec<_>>();
    let query_y = queries.iter().map(|q| q.y).collect::<Vec<_>>();
    let prediction = model.predict(&query_x, &query_y)?;

    if prediction.z.len() != queries.len() || prediction.variance.len() != queries.len() {
        return Err(InterpolationError::PredictionCount {
            expected: queries.len(),
            found: prediction.z.len().min(prediction.variance.len()),
        });
    }

    let points = indices
        .into_iter()
        .zip(queries)
        .zip(prediction.z.into_iter().zip(prediction.variance))
        .map(|((index, query), (z, variance))| {
            let global = frame.to_global(&query);
            PredictedPoint {
                index,
                position: Point3::new(global.x, global.y, z),
                variance: settings.include_variance.then_some(variance),
            }
        })
        .collect::<Vec<_>>();

    info!(
        points = points.len(),
        max_i = grid.n1,
        max_j = grid.n2,
        resolution,
        "interpolated grid"
    );

    Ok(InterpolationResult {
        points,
        max_i: grid.n1,
        max_j: grid.n2,
        resolution,
    })
}
