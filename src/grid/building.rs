use index_vec::IndexVec;
use itertools::iproduct;

use crate::geometry::{FloatType, Triangle, WorldBox, WorldVector};

use super::{CellCoords, ConstructionError, Grid, GridConfig, TriangleIdx};

impl Grid {
    /// Builds the grid over the triangles.
    /// `bounds` must contain bounding boxes of all triangles, usually it is their union.
    pub fn new(
        triangles: Vec<Triangle>,
        bounds: &WorldBox,
        config: &GridConfig,
    ) -> Result<Grid, ConstructionError> {
        if triangles.is_empty() {
            return Err(ConstructionError::EmptyScene);
        }
        if triangles.len() > TriangleIdx::MAX_INDEX {
            return Err(ConstructionError::TooManyTriangles {
                count: triangles.len(),
            });
        }
        if !bounds.is_finite() || bounds.is_empty() {
            return Err(ConstructionError::NonFiniteBounds {
                bounds: bounds.clone(),
            });
        }
        if let Some((index, triangle)) = triangles
            .iter()
            .enumerate()
            .find(|(_, t)| !bounds.contains_box(t.bounding_box()))
        {
            return Err(ConstructionError::TriangleOutsideBounds {
                index,
                triangle_box: triangle.bounding_box().clone(),
                bounds: bounds.clone(),
            });
        }

        let triangles: IndexVec<TriangleIdx, Triangle> = IndexVec::from_vec(triangles);

        let (scene_box, grid_box) = compute_boxes(bounds, config.expand_increment);
        if !has_margins(bounds, &scene_box, &grid_box) {
            return Err(ConstructionError::DegenerateGrid {
                bounds: bounds.clone(),
                increment: config.expand_increment,
            });
        }
        let cell_counts = choose_cell_counts(&grid_box, triangles.len(), config.density);

        let cell_size = grid_box
            .size()
            .zip_map(&cell_counts, |extent, count| extent / (count as FloatType));
        let inv_cell_size = cell_size.map(|x| 1.0 / x);
        let coordinates = std::array::from_fn(|axis| {
            coordinate_table(grid_box.min[axis], grid_box.max[axis], cell_counts[axis])
        });

        log::debug!(
            "Building grid with {}x{}x{} cells for {} triangles",
            cell_counts.x,
            cell_counts.y,
            cell_counts.z,
            triangles.len()
        );

        let mut grid = Grid {
            config: *config,

            scene_box,
            grid_box,

            cell_counts,
            cell_size,
            inv_cell_size,

            coordinates,

            cell_offsets: Vec::new(),
            cell_triangles: Vec::new(),

            triangles,
        };
        grid.bin_triangles();

        log::debug!(
            "Grid built, {} triangle references",
            grid.cell_triangles.len()
        );

        Ok(grid)
    }

    /// Builds the grid over the triangles, using union of their bounding boxes as the bounds.
    pub fn from_triangles(
        triangles: Vec<Triangle>,
        config: &GridConfig,
    ) -> Result<Grid, ConstructionError> {
        let mut bounds = WorldBox::empty();
        for t in &triangles {
            bounds.extend_box(t.bounding_box());
        }
        Self::new(triangles, &bounds, config)
    }

    /// Inclusive range of cells overlapped by the triangle bounding box.
    fn triangle_cell_range(&self, triangle: &Triangle) -> (CellCoords, CellCoords) {
        let b = triangle.bounding_box();
        assert2::assert!(
            self.grid_box.contains_box(b),
            "Triangle must be inside grid box"
        );

        let start = self.cell_coords_clamped(&b.min);
        let end = self.cell_coords_clamped(&b.max);
        assert2::assert!(start.iter().zip(end.iter()).all(|(s, e)| s <= e));

        (start, end)
    }

    /// Linear indices of all cells overlapped by the triangle bounding box.
    fn triangle_cells(&self, triangle: &Triangle) -> impl Iterator<Item = usize> {
        let (start, end) = self.triangle_cell_range(triangle);
        iproduct!(start.z..=end.z, start.y..=end.y, start.x..=end.x)
            .map(move |(z, y, x)| self.cell_index(&CellCoords::new(x, y, z)))
    }

    /// Counting sort of triangle references into cells.
    /// First pass counts triangles per cell, prefix sum turns the counts into slice ends,
    /// second pass fills the slices from the back, leaving the offsets at slice starts.
    fn bin_triangles(&mut self) {
        let cell_count = self.total_cell_count();
        let mut offsets = vec![0usize; cell_count + 1];

        for triangle in self.triangles.iter() {
            for cell in self.triangle_cells(triangle) {
                offsets[cell] += 1;
            }
        }

        for i in 1..offsets.len() {
            offsets[i] += offsets[i - 1];
        }

        let reference_count = offsets[cell_count];
        let mut cell_triangles = vec![TriangleIdx::from_raw(0); reference_count];

        for (index, triangle) in self.triangles.iter_enumerated() {
            for cell in self.triangle_cells(triangle) {
                offsets[cell] -= 1;
                cell_triangles[offsets[cell]] = index;
            }
        }

        debug_assert!(offsets[0] == 0);
        debug_assert!(offsets.windows(2).all(|w| w[0] <= w[1]));

        self.cell_offsets = offsets;
        self.cell_triangles = cell_triangles;
    }
}

/// Returns (scene box, grid box) for the given triangle bounds.
fn compute_boxes(bounds: &WorldBox, increment: FloatType) -> (WorldBox, WorldBox) {
    (bounds.expanded(increment), bounds.expanded(2.0 * increment))
}

/// Scene box must lie strictly between the bounds and the grid box on every axis.
/// Fails when the increment is lost to rounding at the magnitude of the bounds.
fn has_margins(bounds: &WorldBox, scene_box: &WorldBox, grid_box: &WorldBox) -> bool {
    grid_box.is_finite()
        && (0..3).all(|axis| {
            grid_box.min[axis] < scene_box.min[axis]
                && scene_box.min[axis] < bounds.min[axis]
                && bounds.max[axis] < scene_box.max[axis]
                && scene_box.max[axis] < grid_box.max[axis]
        })
}

/// Picks the number of cells along each axis, so that the cells are roughly cubical
/// and their total count is close to `triangle_count * density`.
fn choose_cell_counts(grid_box: &WorldBox, triangle_count: usize, density: FloatType) -> CellCoords {
    let extent: WorldVector = grid_box.size();
    let mut remaining = ((triangle_count as FloatType * density) as usize).max(1);

    let s = (extent.x * extent.y * extent.z / remaining as FloatType).cbrt();
    let nx = axis_cell_count(extent.x, s);
    remaining = remaining.div_ceil(nx);

    let s = (extent.y * extent.z / remaining as FloatType).sqrt();
    let ny = axis_cell_count(extent.y, s);
    remaining = remaining.div_ceil(ny);

    CellCoords::new(nx, ny, remaining)
}

fn axis_cell_count(extent: FloatType, cell_size: FloatType) -> usize {
    if extent <= cell_size {
        1
    } else {
        ((extent / cell_size).ceil() as usize).max(1)
    }
}

/// Evenly spaced cell boundaries, last one is exactly `max`.
fn coordinate_table(min: FloatType, max: FloatType, count: usize) -> Vec<FloatType> {
    let cell_size = (max - min) / (count as FloatType);
    (0..count)
        .map(|i| min + cell_size * (i as FloatType))
        .chain(std::iter::once(max))
        .collect()
}
