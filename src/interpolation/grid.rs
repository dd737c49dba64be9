use itertools::Itertools;

/// Integer position of a query point: `i` steps along the frame x axis, `j` along y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridIndex {
    pub i: usize,
    pub j: usize,
}

impl GridIndex {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}

/// Shape of the query grid laid over a frame.
///
/// `n1 = floor(extent_x / resolution)` and `n2 = floor(extent_y / resolution)`.
/// Indices run over `0..=n1` and `0..=n2`; the last row and column are not
/// snapped to the extent, so they may fall short of it by less than one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub n1: usize,
    pub n2: usize,
    pub resolution: f64,
}

impl GridSpec {
    /// Returns `None` when the step count along either axis is not representable.
    pub fn new(extent_x: f64, extent_y: f64, resolution: f64) -> Option<Self> {
        let n1 = steps(extent_x, resolution)?;
        let n2 = steps(extent_y, resolution)?;
        Some(Self { n1, n2, resolution })
    }

    /// Number of grid points, `(n1 + 1) * (n2 + 1)`, or `None` on overflow.
    pub fn num_points(&self) -> Option<usize> {
        (self.n1.checked_add(1)?).checked_mul(self.n2.checked_add(1)?)
    }

    /// All indices in i-major order: outer loop over `i`, inner over `j`.
    pub fn indices(&self) -> impl Iterator<Item = GridIndex> {
        (0..=self.n1)
            .cartesian_product(0..=self.n2)
            .map(|(i, j)| GridIndex::new(i, j))
    }

    /// Distance of an index from the grid origin along each frame axis.
    pub fn offset(&self, index: GridIndex) -> (f64, f64) {
        (
            index.i as f64 * self.resolution,
            index.j as f64 * self.resolution,
        )
    }
}

fn steps(extent: f64, resolution: f64) -> Option<usize> {
    let n = (extent / resolution).floor();
    if n.is_finite() && n >= 0.0 && n < usize::MAX as f64 {
        Some(n as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_step_counts() {
        let spec = GridSpec::new(7.0, 5.0, 3.0).unwrap();
        assert_eq!((spec.n1, spec.n2), (2, 1));
        assert_eq!(spec.num_points(), Some(6));
        // last column stops short of the extent
        assert_eq!(spec.offset(GridIndex::new(2, 1)), (6.0, 3.0));
    }

    #[test]
    fn resolution_equal_to_extent_gives_two_steps() {
        let spec = GridSpec::new(5.0, 5.0, 5.0).unwrap();
        assert_eq!((spec.n1, spec.n2), (1, 1));
        assert_eq!(spec.indices().count(), 4);
    }

    #[test]
    fn resolution_larger_than_extent_gives_single_step() {
        let spec = GridSpec::new(2.0, 2.0, 5.0).unwrap();
        assert_eq!(spec.indices().collect::<Vec<_>>(), vec![GridIndex::new(0, 0)]);
    }

    #[test]
    fn indices_are_i_major() {
        let spec = GridSpec::new(2.0, 1.0, 1.0).unwrap();
        let indices = spec
            .indices()
            .map(|GridIndex { i, j }| (i, j))
            .collect::<Vec<_>>();
        assert_eq!(indices, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
    }

    #[test]
    fn unrepresentable_step_count() {
        assert!(GridSpec::new(1e300, 1.0, 1e-300).is_none());
        assert!(GridSpec::new(f64::INFINITY, 1.0, 1.0).is_none());
    }
}
