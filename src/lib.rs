pub mod geometry;
pub mod grid;
pub mod input;
pub mod tracer;
mod util;

pub use grid::{ConstructionError, Grid, GridConfig};
pub use tracer::{TraceSettings, trace_rays};
