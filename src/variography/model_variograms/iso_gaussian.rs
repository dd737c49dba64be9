use super::IsoVariogramModel;

/// Gaussian model, `range` is the practical range (about 95% of the sill).
#[derive(Debug, Clone, Default, Copy, PartialEq)]
pub struct IsoGaussian {
    pub psill: f64,
    pub range: f64,
    pub nugget: f64,
}

impl IsoGaussian {
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
        let a = self.range * 4f64 / 7f64;
        self.psill * (1f64 - (-(h * h) / (a * a)).exp()) + self.nugget
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

impl IsoVariogramModel for IsoGaussian {
    fn variogram(&self, h: f64) -> f64 {
        IsoGaussian::variogram(self, h)
    }
}
