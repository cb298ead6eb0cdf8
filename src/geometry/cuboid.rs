//! Rectangular box sector shape.

use super::{crossings_to_distances, push_crossing, Geometry, Point3, Vec3};
use crate::error::{TransportError, TransportResult};

/// An axis-aligned rectangular box.
#[derive(Clone, Debug)]
pub struct Cuboid {
    center: Point3,
    half_extents: [f64; 3],
    hierarchy: u32,
}

impl Cuboid {
    /// Creates a box with the given center and full side lengths [cm].
    pub fn new(center: Point3, size: Vec3, hierarchy: u32) -> TransportResult<Self> {
        if size.x() <= 0.0 || size.y() <= 0.0 || size.z() <= 0.0 {
            return Err(TransportError::Config(format!(
                "cuboid side lengths must be positive, got {}",
                size
            )));
        }
        Ok(Self {
            center,
            half_extents: [0.5 * size.x(), 0.5 * size.y(), 0.5 * size.z()],
            hierarchy,
        })
    }
}

impl Geometry for Cuboid {
    fn hierarchy(&self) -> u32 {
        self.hierarchy
    }

    fn center(&self) -> &Point3 {
        &self.center
    }

    fn bounding_radius(&self) -> f64 {
        let [hx, hy, hz] = self.half_extents;
        f64::sqrt(hx * hx + hy * hy + hz * hz)
    }

    fn distance_to_border(&self, position: &Point3, direction: &Vec3) -> (f64, f64) {
        let offset = position - &self.center;
        let offsets = [offset.x(), offset.y(), offset.z()];
        let components = [direction.x(), direction.y(), direction.z()];
        let mut crossings = Vec::with_capacity(6);
        for axis in 0..3 {
            if components[axis] == 0.0 {
                // Trajectory is parallel to this face pair.
                continue;
            }
            for face in [-self.half_extents[axis], self.half_extents[axis]] {
                let t = (face - offsets[axis]) / components[axis];
                let hits_face = (0..3).filter(|&other| other != axis).all(|other| {
                    let coordinate = offsets[other] + t * components[other];
                    coordinate.abs() <= self.half_extents[other]
                });
                if hits_face {
                    push_crossing(&mut crossings, t);
                }
            }
        }
        crossings_to_distances(crossings)
    }

    fn distance_to_point(&self, position: &Point3) -> f64 {
        let offset = position - &self.center;
        let offsets = [offset.x(), offset.y(), offset.z()];
        let mut squared_distance = 0.0;
        for axis in 0..3 {
            let excess = f64::max(offsets[axis].abs() - self.half_extents[axis], 0.0);
            squared_distance += excess * excess;
        }
        squared_distance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PARTICLE_POSITION_RESOLUTION;
    use approx::assert_relative_eq;

    fn unit_x() -> Vec3 {
        Vec3::new(1.0, 0.0, 0.0)
    }

    fn ten_cube() -> Cuboid {
        Cuboid::new(Point3::origin(), Vec3::new(10.0, 10.0, 10.0), 0).unwrap()
    }

    #[test]
    fn ray_from_outside_crosses_both_faces() {
        let (first, second) =
            ten_cube().distance_to_border(&Point3::new(-10.0, 0.0, 0.0), &unit_x());
        assert_relative_eq!(first, 5.0, max_relative = 1e-12);
        assert_relative_eq!(second, 15.0, max_relative = 1e-12);
    }

    #[test]
    fn ray_from_inside_only_crosses_the_exit_face() {
        let cuboid = ten_cube();
        let position = Point3::new(1.0, 2.0, -3.0);
        let (first, second) = cuboid.distance_to_border(&position, &unit_x());
        assert_relative_eq!(first, 4.0, max_relative = 1e-12);
        assert_eq!(second, -1.0);
        assert!(cuboid.is_inside(&position, &unit_x()));
    }

    #[test]
    fn ray_beside_the_box_misses() {
        let (first, second) =
            ten_cube().distance_to_border(&Point3::new(-10.0, 7.0, 0.0), &unit_x());
        assert_eq!((first, second), (-1.0, -1.0));
    }

    #[test]
    fn distance_to_point_vanishes_inside() {
        let cuboid =
            Cuboid::new(Point3::new(5.0, 5.0, 5.0), Vec3::new(10.0, 10.0, 10.0), 0).unwrap();
        assert_eq!(cuboid.distance_to_point(&Point3::new(5.0, 5.0, 3.0)), 0.0);
    }

    #[test]
    fn distance_to_point_measures_to_the_nearest_face_or_edge() {
        let cuboid = ten_cube();
        assert_relative_eq!(
            cuboid.distance_to_point(&Point3::new(7.0, 0.0, 0.0)),
            2.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            cuboid.distance_to_point(&Point3::new(8.0, 9.0, 0.0)),
            5.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn adaptive_steplength_honors_the_bounding_sphere_shortcut() {
        let cuboid = ten_cube();
        let position = Point3::new(-30.0, 0.0, 0.0);
        assert_eq!(cuboid.adaptive_steplength(&position, 10.0), 10.0);
        assert_relative_eq!(
            cuboid.adaptive_steplength(&position, 100.0),
            25.0 + PARTICLE_POSITION_RESOLUTION,
            max_relative = 1e-12
        );
    }

    #[test]
    fn degenerate_sizes_are_rejected() {
        assert!(Cuboid::new(Point3::origin(), Vec3::new(1.0, 0.0, 1.0), 0).is_err());
        assert!(Cuboid::new(Point3::origin(), Vec3::new(-1.0, 1.0, 1.0), 0).is_err());
    }
}
