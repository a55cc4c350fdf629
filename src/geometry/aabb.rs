use std::ops::Sub;

use nalgebra::{Point3, Scalar, SimdPartialOrd};
use num_traits::Float;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }
}

impl<Point: Sub + Copy> AABB<Point> {
    pub fn size(&self) -> Point::Output {
        self.max - self.min
    }
}

impl<T: Scalar + Float + SimdPartialOrd> AABB<Point3<T>> {
    /// Box that contains nothing, neutral element of `extend_point` and `extend_box`.
    pub fn empty() -> Self {
        AABB {
            min: Point3::new(T::infinity(), T::infinity(), T::infinity()),
            max: Point3::new(T::neg_infinity(), T::neg_infinity(), T::neg_infinity()),
        }
    }

    /// Smallest box containing all the points, None if the iterator is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<T>>) -> Option<Self> {
        let mut ret = Self::empty();
        for p in points {
            ret.extend_point(p);
        }
        if ret.is_empty() { None } else { Some(ret) }
    }

    pub fn extend_point(&mut self, point: &Point3<T>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn extend_box(&mut self, other: &Self) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// True if the box contains no points (min > max on some axis).
    pub fn is_empty(&self) -> bool {
        self.min
            .coords
            .iter()
            .zip(self.max.coords.iter())
            .any(|(min, max)| min > max)
    }

    /// True if every coordinate of both corners is finite.
    pub fn is_finite(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|x| x.is_finite())
    }

    /// Closed interval test on all three axes.
    pub fn contains_point(&self, point: &Point3<T>) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    pub fn contains_box(&self, other: &Self) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Returns the box grown by `increment` on every side.
    pub fn expanded(&self, increment: T) -> Self {
        AABB {
            min: self.min.map(|x| x - increment),
            max: self.max.map(|x| x + increment),
        }
    }
}
