//! Scene state: camera and lighting

pub mod camera;
pub mod lighting;

pub use camera::{Camera, CameraInput};
pub use lighting::Lighting;
