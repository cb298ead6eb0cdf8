//! Spherical sector shape.

use super::{crossings_to_distances, push_crossing, Geometry, Point3, Vec3};
use crate::error::{TransportError, TransportResult};

/// A sphere, optionally hollowed out to a shell by an inner radius.
#[derive(Clone, Debug)]
pub struct Sphere {
    center: Point3,
    radius: f64,
    inner_radius: f64,
    hierarchy: u32,
}

impl Sphere {
    /// Creates a solid sphere with the given center and radius [cm].
    pub fn new(center: Point3, radius: f64, hierarchy: u32) -> TransportResult<Self> {
        Self::shell(center, radius, 0.0, hierarchy)
    }

    /// Creates a spherical shell between the two radii [cm].
    pub fn shell(
        center: Point3,
        radius: f64,
        inner_radius: f64,
        hierarchy: u32,
    ) -> TransportResult<Self> {
        if radius <= 0.0 {
            return Err(TransportError::Config(format!(
                "sphere radius must be positive, got {}",
                radius
            )));
        }
        if inner_radius < 0.0 || inner_radius >= radius {
            return Err(TransportError::Config(format!(
                "sphere inner radius {} must lie in [0, {})",
                inner_radius, radius
            )));
        }
        Ok(Self {
            center,
            radius,
            inner_radius,
            hierarchy,
        })
    }

    /// Records the forward crossings of the sphere of the given radius
    /// around the center.
    fn collect_crossings(
        crossings: &mut Vec<f64>,
        offset: &Vec3,
        direction: &Vec3,
        radius: f64,
    ) {
        let b = offset.dot(direction);
        let discriminant = b * b - (offset.squared_length() - radius * radius);
        if discriminant > 0.0 {
            let width = discriminant.sqrt();
            push_crossing(crossings, -b - width);
            push_crossing(crossings, -b + width);
        }
    }
}

impl Geometry for Sphere {
    fn hierarchy(&self) -> u32 {
        self.hierarchy
    }

    fn center(&self) -> &Point3 {
        &self.center
    }

    fn bounding_radius(&self) -> f64 {
        self.radius
    }

    fn distance_to_border(&self, position: &Point3, direction: &Vec3) -> (f64, f64) {
        let offset = position - &self.center;
        let mut crossings = Vec::with_capacity(4);
        Self::collect_crossings(&mut crossings, &offset, direction, self.radius);
        if self.inner_radius > 0.0 {
            Self::collect_crossings(&mut crossings, &offset, direction, self.inner_radius);
        }
        crossings_to_distances(crossings)
    }

    fn distance_to_point(&self, position: &Point3) -> f64 {
        let distance_from_center = position.distance_to(&self.center);
        f64::max(
            distance_from_center - self.radius,
            f64::max(self.inner_radius - distance_from_center, 0.0),
        )
    }
}
