mod building;
mod statistics;
mod traversal;

use bon::bon;
use index_vec::IndexVec;
use nalgebra::Vector3;
use thiserror::Error;

use crate::geometry::{FloatType, PreparedRay, Ray, Triangle, WorldBox, WorldPoint, WorldVector};

pub use statistics::GridStatistics;
pub use traversal::{CellSegment, CellWalk, GridHits};

/// Number of cells along each axis, or integer coordinates of a single cell.
pub type CellCoords = Vector3<usize>;

index_vec::define_index_type! {
    pub struct TriangleIdx = u32;
}

/// Uniform grid over a static set of triangles.
/// Immutable once built, queries only need a shared reference.
#[derive(Clone, Debug)]
pub struct Grid {
    config: GridConfig,

    /// Bounds of the triangles with a margin, used to clip incoming rays.
    scene_box: WorldBox,
    /// Bounds of the cell lattice, larger than scene_box.
    grid_box: WorldBox,

    cell_counts: CellCoords,
    cell_size: WorldVector,
    inv_cell_size: WorldVector,

    /// Cell boundary coordinates for each axis, cell_counts[axis] + 1 items each.
    coordinates: [Vec<FloatType>; 3],

    /// Triangles of cell `i` are `cell_triangles[cell_offsets[i]..cell_offsets[i + 1]]`.
    cell_offsets: Vec<usize>,
    cell_triangles: Vec<TriangleIdx>,

    triangles: IndexVec<TriangleIdx, Triangle>,
}

/// Tuning parameters of the grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Target number of cells per triangle.
    pub density: FloatType,
    /// Margin between the triangles bounding box and the scene box.
    /// Grid box gets twice this margin.
    pub expand_increment: FloatType,
    /// Tolerance for parallel ray tests.
    pub epsilon: FloatType,
}

#[bon]
impl GridConfig {
    #[builder]
    pub fn new(
        #[builder(default = 2.0)] density: FloatType,
        #[builder(default = 1.0)] expand_increment: FloatType,
        #[builder(default = crate::geometry::EPSILON)] epsilon: FloatType,
    ) -> Self {
        assert2::assert!(density.is_finite() && density > 0.0);
        assert2::assert!(expand_increment.is_finite() && expand_increment > 0.0);
        assert2::assert!(epsilon.is_finite() && epsilon >= 0.0);

        GridConfig {
            density,
            expand_increment,
            epsilon,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig::builder().build()
    }
}

#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("Cannot build a grid without triangles")]
    EmptyScene,

    #[error("Scene bounds are not finite: {bounds:?}")]
    NonFiniteBounds { bounds: WorldBox },

    #[error("Triangle {index} ({triangle_box:?}) is outside of scene bounds {bounds:?}")]
    TriangleOutsideBounds {
        index: usize,
        triangle_box: WorldBox,
        bounds: WorldBox,
    },

    #[error("Too many triangles: {count}")]
    TooManyTriangles { count: usize },

    #[error("Margin {increment} vanishes around scene bounds {bounds:?}")]
    DegenerateGrid {
        bounds: WorldBox,
        increment: FloatType,
    },
}

impl Grid {
    /// Calculates the ray constants needed to walk this grid.
    pub fn prepare_ray(&self, ray: &Ray) -> PreparedRay {
        PreparedRay::new(ray, &self.cell_size, self.config.epsilon)
    }

    /// Returns a lazy iterator of all intersections of the ray with the triangles.
    /// Each intersected triangle is reported once, order follows the ray.
    pub fn query<'a>(&'a self, ray: &PreparedRay) -> GridHits<'a> {
        GridHits::new(self, ray)
    }

    /// Prepare the ray and query it.
    pub fn intersect<'a>(&'a self, ray: &Ray) -> GridHits<'a> {
        self.query(&self.prepare_ray(ray))
    }

    /// Iterates over the cells the ray passes through, in order along the ray.
    pub fn cell_walk(&self, ray: &PreparedRay) -> CellWalk<'_> {
        CellWalk::new(self, ray)
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn scene_box(&self) -> &WorldBox {
        &self.scene_box
    }

    pub fn grid_box(&self) -> &WorldBox {
        &self.grid_box
    }

    pub fn cell_counts(&self) -> CellCoords {
        self.cell_counts
    }

    pub fn total_cell_count(&self) -> usize {
        self.cell_counts.product()
    }

    pub fn cell_size(&self) -> &WorldVector {
        &self.cell_size
    }

    /// Cell boundary coordinates along the axis.
    pub fn coordinates(&self, axis: usize) -> &[FloatType] {
        &self.coordinates[axis]
    }

    pub fn triangles(&self) -> &IndexVec<TriangleIdx, Triangle> {
        &self.triangles
    }

    /// Indices of triangles whose bounding box overlaps the cell.
    pub fn cell_triangles(&self, cell: &CellCoords) -> &[TriangleIdx] {
        self.cell_triangles_by_index(self.cell_index(cell))
    }

    fn cell_triangles_by_index(&self, index: usize) -> &[TriangleIdx] {
        &self.cell_triangles[self.cell_offsets[index]..self.cell_offsets[index + 1]]
    }

    /// Linear index of the cell, x changes first, then y, then z.
    fn cell_index(&self, cell: &CellCoords) -> usize {
        debug_assert!(self.contains_cell(cell));
        (cell.z * self.cell_counts.y + cell.y) * self.cell_counts.x + cell.x
    }

    fn contains_cell(&self, cell: &CellCoords) -> bool {
        cell.iter().zip(self.cell_counts.iter()).all(|(c, n)| c < n)
    }

    /// Cell coordinates of the point, without checking that they are inside the lattice.
    /// Negative coordinates saturate to zero.
    fn cell_coords_unchecked(&self, point: &WorldPoint) -> CellCoords {
        (point - self.grid_box.min)
            .component_mul(&self.inv_cell_size)
            .map(|x| x.floor() as usize)
    }

    /// Cell coordinates of a point inside the grid box.
    /// Points rounding onto the far boundary go to the last cell.
    fn cell_coords_clamped(&self, point: &WorldPoint) -> CellCoords {
        self.cell_coords_unchecked(point)
            .zip_map(&self.cell_counts, |c, n| c.min(n - 1))
    }

    /// Cell containing the point, None if the point is outside of the lattice.
    pub fn cell_coords(&self, point: &WorldPoint) -> Option<CellCoords> {
        if !self.grid_box.contains_point(point) {
            return None;
        }
        let cell = self.cell_coords_unchecked(point);
        self.contains_cell(&cell).then_some(cell)
    }

    /// Bounding box of a single cell, taken from the coordinate tables.
    pub fn cell_box(&self, cell: &CellCoords) -> WorldBox {
        WorldBox::new(
            WorldPoint::new(
                self.coordinates[0][cell.x],
                self.coordinates[1][cell.y],
                self.coordinates[2][cell.z],
            ),
            WorldPoint::new(
                self.coordinates[0][cell.x + 1],
                self.coordinates[1][cell.y + 1],
                self.coordinates[2][cell.z + 1],
            ),
        )
    }
}
