use super::{FloatType, WorldPoint, WorldVector};

/// Ray as supplied by the caller.
/// Direction is not normalized, distances along the ray are measured in multiples of it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: WorldPoint,
    pub direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray { origin, direction }
    }

    pub fn point_at(&self, t: FloatType) -> WorldPoint {
        self.origin + self.direction * t
    }
}

/// Direction class of a ray along a single axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AxisSign {
    Negative,
    /// Direction component is below epsilon, the ray never crosses a boundary on this axis.
    Parallel,
    Positive,
}

impl AxisSign {
    /// Cell coordinate increment when crossing a boundary on this axis.
    pub fn step(self) -> isize {
        match self {
            AxisSign::Negative => -1,
            AxisSign::Parallel => 0,
            AxisSign::Positive => 1,
        }
    }
}

/// Ray with the per-axis constants needed by the box test and the grid walk.
#[derive(Copy, Clone, Debug)]
pub struct PreparedRay {
    pub origin: WorldPoint,
    pub direction: WorldVector,

    /// Componentwise inverse of the direction, infinity on parallel axes.
    pub inv_direction: WorldVector,
    pub sign: [AxisSign; 3],

    /// Distance along the ray needed to cross one cell on each axis.
    /// Always positive, infinity on parallel axes.
    pub cell_step: WorldVector,
}

impl PreparedRay {
    pub fn new(ray: &Ray, cell_size: &WorldVector, epsilon: FloatType) -> PreparedRay {
        let mut inv_direction = WorldVector::repeat(FloatType::INFINITY);
        let mut cell_step = WorldVector::repeat(FloatType::INFINITY);
        let mut sign = [AxisSign::Parallel; 3];

        for axis in 0..3 {
            let d = ray.direction[axis];
            if d.abs() < epsilon {
                continue;
            }
            inv_direction[axis] = 1.0 / d;
            sign[axis] = if d > 0.0 {
                AxisSign::Positive
            } else {
                AxisSign::Negative
            };
            cell_step[axis] = cell_size[axis] * inv_direction[axis].abs();
        }

        PreparedRay {
            origin: ray.origin,
            direction: ray.direction,
            inv_direction,
            sign,
            cell_step,
        }
    }

    /// True if the direction is below epsilon on every axis.
    pub fn is_degenerate(&self) -> bool {
        self.sign.iter().all(|s| *s == AxisSign::Parallel)
    }

    pub fn point_at(&self, t: FloatType) -> WorldPoint {
        self.origin + self.direction * t
    }
}
