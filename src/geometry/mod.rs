pub mod frame;

pub use frame::{DomainDescriptor, Frame, FrameError, FramePlacement};
