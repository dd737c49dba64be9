use super::IsoVariogramModel;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IsoLinear {
    pub slope: f64,
    pub nugget: f64,
}

impl IsoLinear {
    pub fn new(slope: f64, nugget: f64) -> Self {
        Self { slope, nugget }
    }

    pub fn variogram(&self, h: f64) -> f64 {
        if h == 0f64 {
            return 0f64;
        }
        self.slope * h + self.nugget
    }

    pub fn parameter_names() -> Vec<&'static str> {
        vec!["slope", "nugget"]
    }

    pub fn params(&self) -> Vec<f64> {
        vec![self.slope, self.nugget]
    }

    pub fn update_from_slice(&mut self, params: &[f64]) {
        self.slope = params[0];
        self.nugget = params[1];
    }
}

impl IsoVariogramModel for IsoLinear {
    fn variogram(&self, h: f64) -> f64 {
        IsoLinear::variogram(self, h)
    }
}
