use nalgebra::{Point2, Point3};
use thiserror::Error;

use crate::geometry::Frame;

pub mod coordinate_system;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("sample {index} has a non-finite coordinate ({x}, {y}, {z})")]
    NonFinite { index: usize, x: f64, y: f64, z: f64 },
}

/// Scattered samples: planar locations with an elevation value each.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    pub points: Vec<Point2<f64>>,
    pub data: Vec<f64>,
}

impl SampleSet {
    pub fn new(points: Vec<Point2<f64>>, data: Vec<f64>) -> Self {
        debug_assert_eq!(points.len(), data.len());
        Self { points, data }
    }

    /// Split 3D samples into planar locations and elevation values.
    ///
    /// Sample order is preserved.
    pub fn try_from_points(samples: &[Point3<f64>]) -> Result<Self, SampleError> {
        let mut points = Vec::with_capacity(samples.len());
        let mut data = Vec::with_capacity(samples.len());

        for (index, p) in samples.iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(SampleError::NonFinite {
                    index,
                    x: p.x,
                    y: p.y,
                    z: p.z,
                });
            }
            points.push(Point2::new(p.x, p.y));
            data.push(p.z);
        }

        Ok(Self::new(points, data))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Samples expressed in the frame's local coordinates. Values are unchanged.
    pub fn to_frame(&self, frame: &Frame) -> Self {
        Self {
            points: self.points.iter().map(|p| frame.to_local(p)).collect(),
            data: self.data.clone(),
        }
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}
