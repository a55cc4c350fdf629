use std::fmt::Display;

use crate::util::Stats;

use super::{CellCoords, Grid};

/// Summary of how the triangles are spread over the cells.
#[derive(Clone, Debug, PartialEq)]
pub struct GridStatistics {
    pub cell_counts: CellCoords,
    pub triangle_count: usize,
    /// Total length of all cell triangle lists.
    pub reference_count: usize,
    /// Triangles per cell, also counts the empty cells.
    pub occupancy: Stats,
}

impl GridStatistics {
    pub fn empty_cells(&self) -> usize {
        self.occupancy.zeros
    }

    /// Average number of cells referencing each triangle.
    pub fn references_per_triangle(&self) -> f32 {
        self.reference_count as f32 / self.triangle_count as f32
    }
}

impl Display for GridStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Cells: {}x{}x{} ({} total)",
            self.cell_counts.x,
            self.cell_counts.y,
            self.cell_counts.z,
            self.occupancy.count
        )?;
        writeln!(
            f,
            "Triangles: {}; {} references, {:.2} per triangle",
            self.triangle_count,
            self.reference_count,
            self.references_per_triangle()
        )?;
        write!(f, "Triangles per cell: {}", self.occupancy)
    }
}

impl Grid {
    pub fn statistics(&self) -> GridStatistics {
        GridStatistics {
            cell_counts: self.cell_counts,
            triangle_count: self.triangles.len(),
            reference_count: self.cell_triangles.len(),
            occupancy: (0..self.total_cell_count())
                .map(|i| self.cell_triangles_by_index(i).len())
                .collect(),
        }
    }

    pub fn log_statistics(&self) {
        for line in self.statistics().to_string().lines() {
            log::info!("{line}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Triangle, WorldPoint};
    use crate::grid::GridConfig;
    use crate::grid::test::random_grid;

    use assert2::assert;

    #[test]
    fn single_triangle() {
        let t = Triangle::new(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(1.0, 0.0, 0.0),
            WorldPoint::new(0.0, 1.0, 0.0),
        );
        let grid = Grid::from_triangles(vec![t], &GridConfig::default()).unwrap();
        let stats = grid.statistics();

        assert!(stats.triangle_count == 1);
        assert!(stats.occupancy.count == grid.total_cell_count());
        assert!(stats.occupancy.max == 1);
        assert!(stats.empty_cells() == stats.occupancy.count - stats.reference_count);
    }

    #[test]
    fn references_add_up() {
        let grid = random_grid(5, 500);
        let stats = grid.statistics();

        assert!(stats.cell_counts == grid.cell_counts());
        assert!(stats.reference_count >= stats.triangle_count);
        assert!(stats.references_per_triangle() >= 1.0);

        let total = stats.occupancy.avg * stats.occupancy.count as f32;
        assert!((total - stats.reference_count as f32).abs() / total < 1e-3);
    }

    #[test]
    fn display() {
        let grid = random_grid(6, 50);
        let text = grid.statistics().to_string();
        assert!(text.lines().count() == 3);
        assert!(text.contains("Triangles: 50;"));
    }
}
