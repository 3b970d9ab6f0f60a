//! morphview - a real-time blendshape morphing viewer
//!
//! Loads a base triangle mesh and a set of morph targets sharing its
//! topology, precomputes per-vertex delta buffers, and blends them on the
//! GPU as `base + Σ weight_k · delta_k` with the weights driven by UI
//! sliders. A free-fly camera and Blinn-Phong shading round out the scene.
//!
//! The library half holds everything testable: mesh loading and
//! expansion, delta computation, camera math and the renderer's data
//! layout. The binary wires it to a window.

pub mod app;
pub mod asset;
pub mod error;
pub mod mesh;
pub mod morph;
pub mod renderer;
pub mod scene;
pub mod ui;
pub mod window;

pub use app::{run, ViewerConfig};
pub use asset::{BlendshapeDesc, TextureData};
pub use error::{ViewerError, ViewerResult};
pub use mesh::MeshAsset;
pub use morph::{DeltaBuffer, MorphEngine};
pub use renderer::{ModelTransform, Renderer, MAX_BLENDSHAPES};
pub use scene::{Camera, CameraInput, Lighting};
