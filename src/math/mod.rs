pub mod contour;
pub mod engine;
pub mod functions;
pub mod grid;
pub mod mesh;
pub mod sampler;

pub use engine::{PlotEngine, PlotKind, PlotRequest, PlotResult};
pub use functions::{FunctionChoice, LEVEL_FUNCTION, SURFACE_FUNCTIONS};
