//! Resolution of a target domain descriptor into a canonical planar frame.
//!
//! A domain is a possibly rotated rectangle. It is described either by its
//! extents, centroid and local x axis ([`DomainDescriptor::Axis`]) or by three
//! of its corners ([`DomainDescriptor::Corner`]). Both forms resolve to a
//! [`Frame`]: an origin corner, two unit axes and the extent along each axis.

use nalgebra::{Point2, Unit, Vector2};
use thiserror::Error;
use tracing::debug;

use crate::spatial_database::coordinate_system::CoordinateSystem;

/// Lengths at or below this are treated as zero.
const LENGTH_EPSILON: f64 = 1e-12;

/// Default bound on `|dot(unit_x, unit_y)|` for corner-form domains.
pub const DEFAULT_ORTHOGONALITY_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
    #[error("domain axes are not orthogonal: |dot(unitX, unitY)| = {dot:.6} exceeds {tolerance}")]
    NonOrthogonalDomain { dot: f64, tolerance: f64 },
}

/// Target domain as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainDescriptor {
    /// Extents centered on `centroid`, local x axis along `x_axis`.
    Axis {
        domain_x: f64,
        domain_y: f64,
        centroid: Point2<f64>,
        x_axis: Vector2<f64>,
    },
    /// Origin corner `p0`, the corner along local x `p1` and the corner along local y `p3`.
    Corner {
        p0: Point2<f64>,
        p1: Point2<f64>,
        p3: Point2<f64>,
    },
}

/// How a frame was placed, which decides where samples and queries live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FramePlacement {
    /// Axis-form domain. Samples are moved into the frame's local axis aligned
    /// coordinates and predictions are moved back to global coordinates.
    Centered { coordinate_system: CoordinateSystem },
    /// Corner-form domain. Samples stay in global coordinates and the query
    /// grid is walked along the frame axes in global coordinates.
    Cornered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub origin: Point2<f64>,
    pub unit_x: Unit<Vector2<f64>>,
    pub unit_y: Unit<Vector2<f64>>,
    pub extent_x: f64,
    pub extent_y: f64,
    pub placement: FramePlacement,
}

impl Frame {
    /// Resolve a descriptor using the default orthogonality tolerance.
    pub fn resolve(descriptor: &DomainDescriptor) -> Result<Self, FrameError> {
        Self::resolve_with_tolerance(descriptor, DEFAULT_ORTHOGONALITY_TOLERANCE)
    }

    /// Resolve a descriptor into a frame.
    ///
    /// # Errors
    /// * [`FrameError::InvalidDomain`] for non-positive or non-finite extents, a zero
    ///   length axis vector or coincident corners.
    /// * [`FrameError::NonOrthogonalDomain`] when corner-form axes deviate from
    ///   perpendicular by more than `tolerance` (measured as `|dot(unit_x, unit_y)|`).
    pub fn resolve_with_tolerance(
        descriptor: &DomainDescriptor,
        tolerance: f64,
    ) -> Result<Self, FrameError> {
        let frame = match descriptor {
            DomainDescriptor::Axis {
                domain_x,
                domain_y,
                centroid,
                x_axis,
            } => Self::from_axis(*domain_x, *domain_y, *centroid, *x_axis)?,
            DomainDescriptor::Corner { p0, p1, p3 } => {
                Self::from_corners(*p0, *p1, *p3, tolerance)?
            }
        };

        debug!(
            origin = ?frame.origin,
            unit_x = ?frame.unit_x.into_inner(),
            unit_y = ?frame.unit_y.into_inner(),
            extent_x = frame.extent_x,
            extent_y = frame.extent_y,
            "resolved domain frame"
        );

        Ok(frame)
    }

    fn from_axis(
        domain_x: f64,
        domain_y: f64,
        centroid: Point2<f64>,
        x_axis: Vector2<f64>,
    ) -> Result<Self, FrameError> {
        check_extent("domainX", domain_x)?;
        check_extent("domainY", domain_y)?;
        if !centroid.x.is_finite() || !centroid.y.is_finite() {
            return Err(FrameError::InvalidDomain(format!(
                "centroid ({}, {}) is not finite",
                centroid.x, centroid.y
            )));
        }
        if !x_axis.x.is_finite() || !x_axis.y.is_finite() || x_axis.norm() <= LENGTH_EPSILON {
            return Err(FrameError::InvalidDomain(format!(
                "xAxis ({}, {}) has zero length",
                x_axis.x, x_axis.y
            )));
        }

        let theta = x_axis.y.atan2(x_axis.x);
        let (sin, cos) = theta.sin_cos();
        // unit_y is unit_x rotated by +90 degrees
        let unit_x = Unit::new_unchecked(Vector2::new(cos, sin));
        let unit_y = Unit::new_unchecked(Vector2::new(-sin, cos));

        let origin = centroid - unit_x.into_inner() * (domain_x / 2.0)
            - unit_y.into_inner() * (domain_y / 2.0);

        Ok(Self {
            origin,
            unit_x,
            unit_y,
            extent_x: domain_x,
            extent_y: domain_y,
            placement: FramePlacement::Centered {
                coordinate_system: CoordinateSystem::from_origin_and_angle(origin, theta),
            },
        })
    }

    fn from_corners(
        p0: Point2<f64>,
        p1: Point2<f64>,
        p3: Point2<f64>,
        tolerance: f64,
    ) -> Result<Self, FrameError> {
        for (name, p) in [("p0", p0), ("p1", p1), ("p3", p3)] {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(FrameError::InvalidDomain(format!(
                    "corner {name} ({}, {}) is not finite",
                    p.x, p.y
                )));
            }
        }

        let v1 = p1 - p0;
        let v2 = p3 - p0;
        let extent_x = v1.norm();
        let extent_y = v2.norm();

        if extent_x <= LENGTH_EPSILON {
            return Err(FrameError::InvalidDomain(
                "corners p0 and p1 coincide".to_string(),
            ));
        }
        if extent_y <= LENGTH_EPSILON {
            return Err(FrameError::InvalidDomain(
                "corners p0 and p3 coincide".to_string(),
            ));
        }

        let unit_x = Unit::new_normalize(v1);
        let unit_y = Unit::new_normalize(v2);

        let dot = unit_x.dot(unit_y.as_ref()).abs();
        if dot > tolerance {
            return Err(FrameError::NonOrthogonalDomain { dot, tolerance });
        }

        Ok(Self {
            origin: p0,
            unit_x,
            unit_y,
            extent_x,
            extent_y,
            placement: FramePlacement::Cornered,
        })
    }

    /// Global position of the point `(u, v)` measured along the frame axes from the origin.
    pub fn walk(&self, u: f64, v: f64) -> Point2<f64> {
        self.origin + self.unit_x.into_inner() * u + self.unit_y.into_inner() * v
    }

    /// Move a global point into the frame's local coordinates.
    ///
    /// Only centered frames transform; cornered frames work in global coordinates.
    pub fn to_local(&self, point: &Point2<f64>) -> Point2<f64> {
        match &self.placement {
            FramePlacement::Centered { coordinate_system } => {
                coordinate_system.global_to_local(point)
            }
            FramePlacement::Cornered => *point,
        }
    }

    /// Inverse of [`Frame::to_local`].
    pub fn to_global(&self, point: &Point2<f64>) -> Point2<f64> {
        match &self.placement {
            FramePlacement::Centered { coordinate_system } => {
                coordinate_system.local_to_global(point)
            }
            FramePlacement::Cornered => *point,
        }
    }

    /// Query location for the grid step `(u, v)` in the coordinates the model is fit in.
    pub fn query_location(&self, u: f64, v: f64) -> Point2<f64> {
        match &self.placement {
            FramePlacement::Centered { .. } => Point2::new(u, v),
            FramePlacement::Cornered => self.walk(u, v),
        }
    }

    /// Rotation of the local x axis relative to the global x axis, in (-pi, pi].
    pub fn angle(&self) -> f64 {
        self.unit_x.y.atan2(self.unit_x.x)
    }
}

fn check_extent(name: &str, value: f64) -> Result<(), FrameError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FrameError::InvalidDomain(format!(
            "{name} must be a positive finite extent, got {value}"
        )))
    }
}
