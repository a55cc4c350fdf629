use super::{AxisSign, FloatType, PreparedRay, WorldBox};

pub trait RayIntersectionExt {
    /// Calculate the distance along the ray where it enters the box.
    /// Returns None if the ray misses the box or if the box is entirely behind the origin.
    fn intersect(&self, ray: &PreparedRay) -> Option<FloatType>;
}

impl RayIntersectionExt for WorldBox {
    /// Slab test using the precomputed ray signs.
    /// Parallel axes only check that the origin is inside the slab.
    fn intersect(&self, ray: &PreparedRay) -> Option<FloatType> {
        let mut t_near = FloatType::NEG_INFINITY;
        let mut t_far = FloatType::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let (near_corner, far_corner) = match ray.sign[axis] {
                AxisSign::Parallel => {
                    if origin < self.min[axis] || origin > self.max[axis] {
                        return None;
                    }
                    continue;
                }
                AxisSign::Positive => (self.min[axis], self.max[axis]),
                AxisSign::Negative => (self.max[axis], self.min[axis]),
            };

            let t1 = (near_corner - origin) * ray.inv_direction[axis];
            let t2 = (far_corner - origin) * ray.inv_direction[axis];

            t_near = t_near.max(t1);
            t_far = t_far.min(t2);

            if t_far < 0.0 || t_near > t_far {
                return None;
            }
        }

        Some(t_near)
    }
}

#[cfg(test)]
pub mod test {
    use assert2::{assert, let_assert};
    use test_case::{test_case, test_matrix};

    use super::*;

    use crate::geometry::{EPSILON, Ray, WorldPoint, WorldVector};

    fn prepare(origin: WorldPoint, direction: WorldVector) -> PreparedRay {
        PreparedRay::new(
            &Ray::new(origin, direction),
            &WorldVector::repeat(1.0),
            EPSILON,
        )
    }

    #[test]
    fn unit_box_hit() {
        let b = WorldBox::new(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 1.0, 1.0));
        let r = prepare(
            WorldPoint::new(-1.0, 0.5, 0.5),
            WorldVector::new(1.0, 0.0, 0.0),
        );
        assert!(b.intersect(&r) == Some(1.0));
    }

    #[test]
    fn unit_box_miss_behind() {
        let b = WorldBox::new(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 1.0, 1.0));
        let r = prepare(WorldPoint::new(2.0, 0.5, 0.5), WorldVector::new(1.0, 0.0, 0.0));
        assert!(b.intersect(&r) == None);
    }

    /// Checks cases when the ray hits the box, including some corner cases.
    #[test_matrix(
        [5.0, 7.0, 10.0],
        [5.0, 7.0, 10.0],
        [5.0, 7.0, 10.0],
        [-1.0, 0.0, 2.0],
        [-1.0, 0.0, 2.0],
        [-1.0, 0.0, 2.0],
        [-10.0, -1.0, 0.0]
    )]
    fn hit(
        px: FloatType,
        py: FloatType,
        pz: FloatType,
        dx: FloatType,
        dy: FloatType,
        dz: FloatType,
        origin_pos: FloatType,
    ) {
        if dx == 0.0 && dy == 0.0 && dz == 0.0 {
            return;
        }

        let b = WorldBox::new([5.0, 5.0, 5.0].into(), [10.0, 10.0, 10.0].into());

        let p = WorldPoint::new(px, py, pz);
        let d = WorldVector::new(dx, dy, dz);
        let origin = Ray::new(p, d).point_at(origin_pos);
        let r = prepare(origin, d);

        let_assert!(
            Some(t) = b.intersect(&r),
            "The ray passes through {p:?} on the box, it has to hit"
        );

        let entry = r.point_at(t);
        assert!(t <= -origin_pos + 1e-3);
        assert!(
            point_is_on_box_surface(&entry, &b),
            "{entry:?} must be on {b:?}"
        );
    }

    /// Just a manual example of ray grazing along an edge.
    #[test]
    fn hit_along_edge() {
        let b = WorldBox::new([5.0, 5.0, 5.0].into(), [10.0, 10.0, 10.0].into());
        let r = prepare(
            WorldPoint::new(5.0, 5.0, 0.0),
            WorldVector::new(0.0, 0.0, 1.0),
        );
        assert!(b.intersect(&r) == Some(5.0));
    }

    /// Rays that lie parallel to one axis and start outside the corresponding slab
    /// must miss, even if they move toward the box on other axes.
    #[test_case( 0.0,  7.0,  7.0,   0.0, 1.0, 0.0 ; "low_x_parallel_miss")]
    #[test_case(12.0,  7.0,  7.0,   0.0, 1.0, 0.0 ; "high_x_parallel_miss")]
    #[test_case( 7.0,  0.0,  7.0,   1.0, 0.0, 0.0 ; "low_y_parallel_miss")]
    #[test_case( 7.0, 12.0,  7.0,   1.0, 0.0, 0.0 ; "high_y_parallel_miss")]
    #[test_case( 7.0,  7.0,  0.0,   1.0, 0.0, 0.0 ; "low_z_parallel_miss")]
    #[test_case( 7.0,  7.0, 12.0,   1.0, 0.0, 0.0 ; "high_z_parallel_miss")]
    #[test_case( 0.0,  5.0,  7.0,   1.0, 0.0, 1.0 ; "corner_miss")]
    #[test_case( 0.0,  0.0,  0.0,  -1.0, 1.0, 1.0 ; "corner_miss2")]
    #[test_case(12.0, 12.0, 12.0,   1.0, 1.0, 1.0 ; "pointing_away")]
    fn only_misses(
        px: FloatType,
        py: FloatType,
        pz: FloatType,
        dx: FloatType,
        dy: FloatType,
        dz: FloatType,
    ) {
        let b = WorldBox::new([5.0, 5.0, 5.0].into(), [10.0, 10.0, 10.0].into());
        let r = prepare(WorldPoint::new(px, py, pz), WorldVector::new(dx, dy, dz));
        assert!(b.intersect(&r) == None);
    }

    /// Origin inside the box gives a negative entry distance.
    #[test]
    fn origin_inside() {
        let b = WorldBox::new([5.0, 5.0, 5.0].into(), [10.0, 10.0, 10.0].into());
        let r = prepare(WorldPoint::new(7.0, 7.0, 7.0), WorldVector::new(0.0, 0.0, 1.0));
        assert!(b.intersect(&r) == Some(-2.0));
    }

    fn point_is_on_box_surface(p: &WorldPoint, b: &WorldBox) -> bool {
        const TOLERANCE: FloatType = 1e-3;

        let inside = (0..3)
            .all(|axis| p[axis] >= b.min[axis] - TOLERANCE && p[axis] <= b.max[axis] + TOLERANCE);
        let on_face = (0..3).any(|axis| {
            (p[axis] - b.min[axis]).abs() <= TOLERANCE || (p[axis] - b.max[axis]).abs() <= TOLERANCE
        });

        inside && on_face
    }
}
