//! Rendering for the flight demo: glTF models lit by a spotlight, plus a
//! screen-space overlay, on wgpu.

pub mod camera;
pub mod gltf_loader;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod texture;
pub mod vertex;

pub use camera::*;
pub use gltf_loader::*;
pub use mesh::*;
pub use pipeline::*;
pub use renderer::*;
pub use texture::*;
pub use vertex::*;
