//! Geometric primitives and sector shapes.

pub mod cuboid;
pub mod cylinder;
pub mod sphere;

pub use self::{cuboid::Cuboid, cylinder::Cylinder, sphere::Sphere};

use crate::constants::{GEOMETRY_PRECISION, PARTICLE_POSITION_RESOLUTION};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Add, Mul, Neg, Sub},
};

/// A 3D vector with Cartesian `f64` components.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec3([f64; 3]);

impl Vec3 {
    /// Creates a new 3D vector given the three components.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    /// Creates a new zero vector.
    pub fn zero() -> Self {
        Self([0.0; 3])
    }

    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    pub fn z(&self) -> f64 {
        self.0[2]
    }

    /// Computes the squared length of the vector.
    pub fn squared_length(&self) -> f64 {
        self.dot(self)
    }

    /// Computes the length of the vector.
    pub fn length(&self) -> f64 {
        self.squared_length().sqrt()
    }

    /// Computes the dot product of the vector with another vector.
    pub fn dot(&self, other: &Self) -> f64 {
        self.x() * other.x() + self.y() * other.y() + self.z() * other.z()
    }

    /// Returns the vector scaled to unit length.
    pub fn normalized(&self) -> Self {
        let length = self.length();
        assert!(length != 0.0, "Cannot normalize a zero vector");
        self * (1.0 / length)
    }
}

impl<'a> Add<&'a Vec3> for &'a Vec3 {
    type Output = Vec3;
    fn add(self, other: Self) -> Self::Output {
        Vec3::new(
            self.x() + other.x(),
            self.y() + other.y(),
            self.z() + other.z(),
        )
    }
}

impl Add<Vec3> for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self::Output {
        &self + &other
    }
}

impl<'a> Sub<&'a Vec3> for &'a Vec3 {
    type Output = Vec3;
    fn sub(self, other: Self) -> Self::Output {
        Vec3::new(
            self.x() - other.x(),
            self.y() - other.y(),
            self.z() - other.z(),
        )
    }
}

impl Sub<Vec3> for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self::Output {
        &self - &other
    }
}

impl Mul<f64> for &Vec3 {
    type Output = Vec3;
    fn mul(self, factor: f64) -> Self::Output {
        Vec3::new(factor * self.x(), factor * self.y(), factor * self.z())
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, factor: f64) -> Self::Output {
        &self * factor
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x(), self.y(), self.z())
    }
}

/// A 3D spatial position [cm].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point3([f64; 3]);

impl Point3 {
    /// Creates a new 3D point given the three coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    /// Creates a new point at the origin.
    pub fn origin() -> Self {
        Self([0.0; 3])
    }

    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    pub fn z(&self) -> f64 {
        self.0[2]
    }

    /// Returns the point reached by moving the given distance along
    /// the given direction.
    pub fn translated(&self, direction: &Vec3, distance: f64) -> Self {
        Self::new(
            self.x() + distance * direction.x(),
            self.y() + distance * direction.y(),
            self.z() + distance * direction.z(),
        )
    }

    /// Computes the distance to another point.
    pub fn distance_to(&self, other: &Self) -> f64 {
        (other - self).length()
    }
}

impl<'a> Sub<&'a Point3> for &'a Point3 {
    type Output = Vec3;
    fn sub(self, other: Self) -> Self::Output {
        Vec3::new(
            self.x() - other.x(),
            self.y() - other.y(),
            self.z() - other.z(),
        )
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x(), self.y(), self.z())
    }
}

/// A closed shape delimiting one propagation sector.
///
/// All distance queries take the current particle direction, which
/// must have unit length.
pub trait Geometry: fmt::Debug + Send + Sync {
    /// Rank deciding which sector wins where shapes overlap.
    fn hierarchy(&self) -> u32;

    /// Returns the placement of the shape.
    fn center(&self) -> &Point3;

    /// Radius of a sphere around the center that fully contains the
    /// shape.
    fn bounding_radius(&self) -> f64;

    /// Computes the distances along `direction` from `position` to the
    /// first and second crossing of the shape surface.
    ///
    /// A crossing that does not exist in the forward direction is
    /// reported as `-1`.
    fn distance_to_border(&self, position: &Point3, direction: &Vec3) -> (f64, f64);

    /// Computes the shortest distance from the given position to any
    /// point of the shape, or zero if the position lies within it.
    fn distance_to_point(&self, position: &Point3) -> f64;

    /// Whether the given position lies inside the shape.
    fn is_inside(&self, position: &Point3, direction: &Vec3) -> bool {
        let (first, second) = self.distance_to_border(position, direction);
        first > 0.0 && second < 0.0
    }

    /// Computes a step length from the given position that cannot
    /// carry a particle through the whole shape unnoticed, up to the
    /// given cap.
    fn adaptive_steplength(&self, position: &Point3, steplength: f64) -> f64 {
        let distance_from_center = position.distance_to(self.center());
        if steplength <= distance_from_center - self.bounding_radius() {
            return steplength;
        }
        // The added resolution lets the step reach just past the
        // surface instead of stalling in front of it.
        self.distance_to_point(position) + PARTICLE_POSITION_RESOLUTION
    }
}

/// Records a surface crossing unless it lies behind the position or
/// closer than the geometry precision.
pub(crate) fn push_crossing(crossings: &mut Vec<f64>, distance: f64) {
    if distance >= GEOMETRY_PRECISION {
        crossings.push(distance);
    }
}

/// Sorts collected surface crossings and maps them onto the
/// `(first, second)` contract of [`Geometry::distance_to_border`].
///
/// An odd number of crossings means the position lies inside the
/// shape, so only the exit distance is reported.
pub(crate) fn crossings_to_distances(mut crossings: Vec<f64>) -> (f64, f64) {
    crossings.sort_unstable_by(f64::total_cmp);
    match crossings.len() {
        0 => (-1.0, -1.0),
        n if n % 2 == 1 => (crossings[0], -1.0),
        _ => (crossings[0], crossings[1]),
    }
}
