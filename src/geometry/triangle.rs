use std::ops::Index;

use super::{WorldBox, WorldPoint, WorldVector};

/// Triangle with its bounding box precomputed.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    vertices: [WorldPoint; 3],
    bounding_box: WorldBox,
}

impl Triangle {
    pub fn new(a: WorldPoint, b: WorldPoint, c: WorldPoint) -> Triangle {
        let vertices = [a, b, c];
        let mut bounding_box = WorldBox::empty();
        for v in &vertices {
            bounding_box.extend_point(v);
        }

        Triangle {
            vertices,
            bounding_box,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldPoint> {
        self.vertices.iter()
    }

    pub fn bounding_box(&self) -> &WorldBox {
        &self.bounding_box
    }

    /// Returns edge vectors, coming from self[0]
    pub fn edges(&self) -> [WorldVector; 2] {
        [
            self.vertices[1] - self.vertices[0],
            self.vertices[2] - self.vertices[0],
        ]
    }
}

impl Index<usize> for Triangle {
    type Output = WorldPoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.vertices[index]
    }
}

impl From<[WorldPoint; 3]> for Triangle {
    fn from(value: [WorldPoint; 3]) -> Self {
        let [a, b, c] = value;
        Triangle::new(a, b, c)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::test::TriangleWrapper;

    use assert2::assert;
    use test_strategy::proptest;

    #[proptest]
    fn bounding_box_is_tight(triangle: TriangleWrapper) {
        let b = triangle.bounding_box();
        for v in triangle.iter() {
            assert!(b.contains_point(v));
        }
        for axis in 0..3 {
            assert!(triangle.iter().any(|v| v[axis] == b.min[axis]));
            assert!(triangle.iter().any(|v| v[axis] == b.max[axis]));
        }
    }

    #[test]
    fn edges() {
        let t = Triangle::new(
            WorldPoint::new(1.0, 1.0, 1.0),
            WorldPoint::new(2.0, 1.0, 1.0),
            WorldPoint::new(1.0, 3.0, 1.0),
        );
        let [e1, e2] = t.edges();
        assert!(e1 == WorldVector::new(1.0, 0.0, 0.0));
        assert!(e2 == WorldVector::new(0.0, 2.0, 0.0));
        assert!(t[2] == WorldPoint::new(1.0, 3.0, 1.0));
    }
}
