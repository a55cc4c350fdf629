use crate::geometry::{
    AxisSign, FloatType, PreparedRay, RayIntersectionExt as _, WorldPoint, WorldVector,
};

use super::{CellCoords, Grid, TriangleIdx};

/// Subtracted from every segment length before testing triangles.
const SEGMENT_GUARD: FloatType = 1e-16;

/// Part of the ray inside a single cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellSegment {
    pub cell: CellCoords,
    /// Point where the ray enters the cell (or the scene, for the first cell).
    pub start: WorldPoint,
    /// Distance along the ray of the entry and exit points.
    pub t_start: FloatType,
    pub t_end: FloatType,
    /// Bound for triangle tests starting at `start`, guarded and never negative.
    pub length: FloatType,
}

/// 3D-DDA walk over the grid cells pierced by a ray.
#[derive(Clone, Debug)]
pub struct CellWalk<'a> {
    grid: &'a Grid,
    ray: PreparedRay,

    /// Where the ray enters the scene box, all distances below are relative to this point.
    entry: WorldPoint,
    t_entry: FloatType,

    /// Current cell, None once the walk left the lattice (or never entered it).
    cell: Option<CellCoords>,
    /// Distance of the next boundary crossing on each axis.
    next_crossing: WorldVector,
    t_near: FloatType,
}

impl<'a> CellWalk<'a> {
    pub fn new(grid: &'a Grid, ray: &PreparedRay) -> CellWalk<'a> {
        let mut walk = CellWalk {
            grid,
            ray: *ray,
            entry: ray.origin,
            t_entry: 0.0,
            cell: None,
            next_crossing: WorldVector::repeat(FloatType::INFINITY),
            t_near: 0.0,
        };

        if ray.is_degenerate() {
            return walk;
        }

        let t_entry = if grid.scene_box.contains_point(&ray.origin) {
            0.0
        } else {
            match grid.scene_box.intersect(ray) {
                Some(t) => t,
                None => return walk,
            }
        };
        let entry = ray.point_at(t_entry);

        // Rounding may put the entry just past the lattice
        let cell = grid.cell_coords_clamped(&entry);

        for axis in 0..3 {
            let boundary = match ray.sign[axis] {
                AxisSign::Positive => grid.coordinates[axis][cell[axis] + 1],
                AxisSign::Negative => grid.coordinates[axis][cell[axis]],
                AxisSign::Parallel => continue,
            };
            walk.next_crossing[axis] = (boundary - entry[axis]) * ray.inv_direction[axis];
        }

        walk.entry = entry;
        walk.t_entry = t_entry;
        walk.cell = Some(cell);
        walk
    }

    /// Axis of the nearest boundary crossing, ties go to the lower axis.
    fn min_axis(&self) -> usize {
        let mut axis = 0;
        for i in 1..3 {
            if self.next_crossing[i] < self.next_crossing[axis] {
                axis = i;
            }
        }
        axis
    }
}

impl Iterator for CellWalk<'_> {
    type Item = CellSegment;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.cell?;

        let axis = self.min_axis();
        let t_far = self.next_crossing[axis];
        debug_assert!(t_far.is_finite());

        let length = (t_far - self.t_near) - SEGMENT_GUARD;
        let segment = CellSegment {
            cell,
            start: self.entry + self.ray.direction * self.t_near,
            t_start: self.t_entry + self.t_near,
            t_end: self.t_entry + t_far,
            length: if length < 0.0 { 0.0 } else { length },
        };

        self.t_near = t_far;
        self.next_crossing[axis] += self.ray.cell_step[axis];

        let mut next_cell = cell;
        next_cell[axis] = cell[axis].wrapping_add_signed(self.ray.sign[axis].step());
        self.cell = self.grid.contains_cell(&next_cell).then_some(next_cell);

        Some(segment)
    }
}

/// Intersections of a ray with the grid triangles, nearest cells first.
#[derive(Clone, Debug)]
pub struct GridHits<'a> {
    walk: CellWalk<'a>,
    /// Hits found in the current cell, farthest first.
    pending: Vec<(FloatType, WorldPoint)>,
    /// Triangles that were already hit, a triangle spanning several cells is reported only once.
    reported: Vec<TriangleIdx>,
}

impl<'a> GridHits<'a> {
    pub fn new(grid: &'a Grid, ray: &PreparedRay) -> GridHits<'a> {
        GridHits {
            walk: CellWalk::new(grid, ray),
            pending: Vec::new(),
            reported: Vec::new(),
        }
    }

    fn test_cell(&mut self, segment: &CellSegment) {
        let grid = self.walk.grid;
        for &index in grid.cell_triangles(&segment.cell) {
            if self.reported.contains(&index) {
                continue;
            }
            if let Some(hit) = grid.triangles[index].intersect_bounded(
                &segment.start,
                &self.walk.ray.direction,
                segment.length,
                grid.config.epsilon,
            ) {
                self.reported.push(index);
                self.pending.push((hit.t, hit.point));
            }
        }
        self.pending.sort_by(|a, b| b.0.total_cmp(&a.0));
    }
}

impl Iterator for GridHits<'_> {
    type Item = WorldPoint;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((_, point)) = self.pending.pop() {
                return Some(point);
            }
            let segment = self.walk.next()?;
            self.test_cell(&segment);
        }
    }
}
