use crate::{
    geometry::{Ray, WorldPoint},
    grid::Grid,
    tracer::HitCollector,
};

/// Per thread state, hits of a whole chunk are buffered before handing them to the collector.
pub struct Worker {
    buffer: Vec<WorldPoint>,
}

impl Worker {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn trace_chunk(&mut self, grid: &Grid, rays: &[Ray], collector: &impl HitCollector) {
        for ray in rays {
            self.buffer.extend(grid.intersect(ray));
        }
        collector.extend(self.buffer.drain(..));
    }
}
