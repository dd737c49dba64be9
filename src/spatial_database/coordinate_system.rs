use nalgebra::{Isometry2, Point2, Translation2, UnitComplex};

/// Planar rigid coordinate system.
///
/// The local frame has its origin at `translation` and its x axis rotated by
/// `rotation` relative to the global x axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CoordinateSystem {
    pub translation: Translation2<f64>,
    pub rotation: UnitComplex<f64>,
    pub world_to_local: Isometry2<f64>,
    pub local_to_world: Isometry2<f64>,
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::new(Translation2::identity(), UnitComplex::identity())
    }
}

impl CoordinateSystem {
    /// Creates a new coordinate system from a translation and a rotation
    /// # Arguments
    /// * `translation` - translation component (origin of the coordinate system)
    /// * `rotation` - rotation component of the coordinate system
    pub fn new(translation: Translation2<f64>, rotation: UnitComplex<f64>) -> Self {
        let local_to_world = Isometry2::from_parts(translation, rotation);
        let world_to_local = local_to_world.inverse();
        Self {
            translation,
            rotation,
            world_to_local,
            local_to_world,
        }
    }

    /// Create a new coordinate system from an origin and a counter-clockwise angle in radians
    pub fn from_origin_and_angle(origin: Point2<f64>, angle: f64) -> Self {
        Self::new(
            Translation2::new(origin.x, origin.y),
            UnitComplex::new(angle),
        )
    }

    /// Rotation angle of the local x axis in radians, in (-pi, pi]
    pub fn angle(&self) -> f64 {
        self.rotation.angle()
    }

    /// Convert a point from global to local coordinates
    pub fn global_to_local(&self, point: &Point2<f64>) -> Point2<f64> {
        self.world_to_local.transform_point(point)
    }

    /// Convert a point from local to global coordinates
    pub fn local_to_global(&self, point: &Point2<f64>) -> Point2<f64> {
        self.local_to_world.transform_point(point)
    }
}
