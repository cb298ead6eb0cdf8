//! Cylindrical sector shape.

use super::{crossings_to_distances, push_crossing, Geometry, Point3, Vec3};
use crate::error::{TransportError, TransportResult};

/// A cylinder aligned with the z-axis, optionally hollowed out to a
/// tube by an inner radius.
#[derive(Clone, Debug)]
pub struct Cylinder {
    center: Point3,
    radius: f64,
    inner_radius: f64,
    half_height: f64,
    hierarchy: u32,
}

impl Cylinder {
    /// Creates a solid cylinder with the given center, radius and full
    /// height [cm].
    pub fn new(center: Point3, radius: f64, height: f64, hierarchy: u32) -> TransportResult<Self> {
        Self::tube(center, radius, 0.0, height, hierarchy)
    }

    /// Creates a tube between the two radii [cm].
    pub fn tube(
        center: Point3,
        radius: f64,
        inner_radius: f64,
        height: f64,
        hierarchy: u32,
    ) -> TransportResult<Self> {
        if radius <= 0.0 || height <= 0.0 {
            return Err(TransportError::Config(format!(
                "cylinder radius and height must be positive, got {} and {}",
                radius, height
            )));
        }
        if inner_radius < 0.0 || inner_radius >= radius {
            return Err(TransportError::Config(format!(
                "cylinder inner radius {} must lie in [0, {})",
                inner_radius, radius
            )));
        }
        Ok(Self {
            center,
            radius,
            inner_radius,
            half_height: 0.5 * height,
            hierarchy,
        })
    }

    /// Records the forward crossings of the lateral surface with the
    /// given radius, keeping only those within the height range.
    fn collect_shell_crossings(
        &self,
        crossings: &mut Vec<f64>,
        offset: &Vec3,
        direction: &Vec3,
        radius: f64,
    ) {
        let a = direction.x() * direction.x() + direction.y() * direction.y();
        if a == 0.0 {
            // Trajectory is parallel to the cylinder axis.
            return;
        }
        let b = offset.x() * direction.x() + offset.y() * direction.y();
        let c = offset.x() * offset.x() + offset.y() * offset.y() - radius * radius;
        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return;
        }
        let width = discriminant.sqrt();
        for t in [(-b - width) / a, (-b + width) / a] {
            if (offset.z() + t * direction.z()).abs() <= self.half_height {
                push_crossing(crossings, t);
            }
        }
    }

    /// Records the forward crossings of the two cap surfaces, keeping
    /// only those within the radial range.
    fn collect_cap_crossings(&self, crossings: &mut Vec<f64>, offset: &Vec3, direction: &Vec3) {
        if direction.z() == 0.0 {
            return;
        }
        for cap in [-self.half_height, self.half_height] {
            let t = (cap - offset.z()) / direction.z();
            let x = offset.x() + t * direction.x();
            let y = offset.y() + t * direction.y();
            let squared_radius = x * x + y * y;
            if squared_radius <= self.radius * self.radius
                && squared_radius >= self.inner_radius * self.inner_radius
            {
                push_crossing(crossings, t);
            }
        }
    }
}

impl Geometry for Cylinder {
    fn hierarchy(&self) -> u32 {
        self.hierarchy
    }

    fn center(&self) -> &Point3 {
        &self.center
    }

    fn bounding_radius(&self) -> f64 {
        f64::sqrt(self.radius * self.radius + self.half_height * self.half_height)
    }

    fn distance_to_border(&self, position: &Point3, direction: &Vec3) -> (f64, f64) {
        let offset = position - &self.center;
        let mut crossings = Vec::with_capacity(6);
        self.collect_shell_crossings(&mut crossings, &offset, direction, self.radius);
        if self.inner_radius > 0.0 {
            self.collect_shell_crossings(&mut crossings, &offset, direction, self.inner_radius);
        }
        self.collect_cap_crossings(&mut crossings, &offset, direction);
        crossings_to_distances(crossings)
    }

    fn distance_to_point(&self, position: &Point3) -> f64 {
        let offset = position - &self.center;
        let radial = f64::hypot(offset.x(), offset.y());
        let radial_excess = f64::max(
            radial - self.radius,
            f64::max(self.inner_radius - radial, 0.0),
        );
        let axial_excess = f64::max(offset.z().abs() - self.half_height, 0.0);
        f64::hypot(radial_excess, axial_excess)
    }
}
