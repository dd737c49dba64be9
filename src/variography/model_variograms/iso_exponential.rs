use super::IsoVariogramModel;

/// Exponential model, `range` is the practical range (about 95% of the sill).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IsoExponential {
    pub psill: f64,
    pub range: f64,
    pub nugget: f64,
}

impl IsoExponential {
    pub fn new(psill: f64, range: f64, nugget: f64) -> Self {
        Self {
            psill,
            range,
            nugget,
        }
    }

    pub fn variogram(&self, h: f64) -> f64 {
        if h == 0f64 {
            return 0f64;
        }
        self.psill * (1f64 - (-h / (self.range / 3f64)).exp()) + self.nugget
    }

    pub fn parameter_names() -> Vec<&'static str> {
        vec!["psill", "range", "nugget"]
    }

    pub fn params(&self) -> Vec<f64> {
        vec![self.psill, self.range, self.nugget]
    }

    pub fn update_from_slice(&mut self, params: &[f64]) {
        self.psill = params[0];
        self.range = params[1];
        self.nugget = params[2];
    }
}

impl IsoVariogramModel for IsoExponential {
    fn variogram(&self, h: f64) -> f64 {
        IsoExponential::variogram(self, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn practical_range() {
        let model = IsoExponential::new(1.0, 30.0, 0.0);
        assert_relative_eq!(model.variogram(30.0), 1.0 - (-3f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn monotone_towards_sill() {
        let model = IsoExponential::new(4.0, 12.0, 1.0);
        let values = (1..50).map(|h| model.variogram(h as f64)).collect::<Vec<_>>();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert!(values.iter().all(|v| *v < 5.0));
        assert_relative_eq!(model.variogram(1e3), 5.0, epsilon = 1e-12);
    }
}
