mod aabb;
mod ray;
mod ray_box_intersection;
mod ray_triangle_intersection;
mod triangle;

pub use aabb::AABB;
pub use ray::{AxisSign, PreparedRay, Ray};
pub use ray_box_intersection::RayIntersectionExt;
pub use ray_triangle_intersection::TriangleHit;
pub use triangle::Triangle;

pub type FloatType = f32;

/// Default tolerance for parallelism tests (ray vs. axis, ray vs. triangle plane).
pub const EPSILON: FloatType = 1e-6;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldBox = AABB<WorldPoint>;
