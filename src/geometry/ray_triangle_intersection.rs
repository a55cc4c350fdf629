use super::{FloatType, Triangle, WorldPoint, WorldVector};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleHit {
    /// Distance along the ray, in multiples of the ray direction.
    pub t: FloatType,
    pub point: WorldPoint,
}

impl Triangle {
    /// Calculates intersection of the (two sided) triangle with the ray segment
    /// `origin + t * direction` for `t` in `[0, max_t]`.
    /// Triangles closer than `epsilon` to parallel with the ray are never hit.
    ///
    /// Adapted from https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm
    /// The bounds are checked on values scaled by the determinant, division only happens
    /// for confirmed hits.
    pub fn intersect_bounded(
        &self,
        origin: &WorldPoint,
        direction: &WorldVector,
        max_t: FloatType,
        epsilon: FloatType,
    ) -> Option<TriangleHit> {
        let [e1, e2] = self.edges();

        let ray_cross_e2 = direction.cross(&e2);
        let det = e1.dot(&ray_cross_e2);

        if det.abs() <= epsilon {
            return None;
        }

        // Back side hits (negative determinant) have all the scaled values negated.
        let (abs_det, det_sign) = if det > 0.0 { (det, 1.0) } else { (-det, -1.0) };

        let s = origin - self[0];
        let u = det_sign * s.dot(&ray_cross_e2);
        if u < 0.0 || u > abs_det {
            return None;
        }

        let s_cross_e1 = s.cross(&e1);
        let v = det_sign * direction.dot(&s_cross_e1);
        if v < 0.0 || u + v > abs_det {
            return None;
        }

        let t = det_sign * e2.dot(&s_cross_e1);
        if t < 0.0 || t > max_t * abs_det {
            return None;
        }

        let t = t / abs_det;
        Some(TriangleHit {
            t,
            point: origin + direction * t,
        })
    }

    /// Intersection with the segment from `origin` to `origin + direction`.
    pub fn intersect_unit(
        &self,
        origin: &WorldPoint,
        direction: &WorldVector,
        epsilon: FloatType,
    ) -> Option<TriangleHit> {
        self.intersect_bounded(origin, direction, 1.0, epsilon)
    }
}
