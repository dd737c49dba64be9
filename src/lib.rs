pub mod config;
pub mod gateway;
pub mod geometry;
pub mod interpolation;
pub mod kriging;
pub mod spatial_database;
pub mod systems;
pub mod variography;

pub mod prelude {

    pub mod re_exports {
        pub use nalgebra;
    }

    pub use crate::config::GatewayConfig;
    pub use crate::gateway::Gateway;
    pub use crate::geometry::{DomainDescriptor, Frame};
    pub use crate::interpolation::{
        interpolate, interpolate_domain, InterpolationResult, InterpolationSettings,
    };
    pub use crate::kriging::{
        ordinary_kriging::OrdinaryKriging, KrigingBuilder, KrigingPredictor, Prediction,
    };
    pub use crate::variography::model_variograms::VariogramModelKind;
}
