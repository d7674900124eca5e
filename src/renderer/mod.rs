pub mod camera;
pub mod gpu;
pub mod point_cloud;

pub use camera::{Camera, CameraMode};
pub use gpu::{GpuState, MapUniforms, RenderError, SceneLayers, generate_grid_vertices};
