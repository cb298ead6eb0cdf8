//! Mass density profiles imposed on top of a sector medium.
//!
//! A profile maps between geometric path length and traversed grammage
//! along a straight segment, which is what every continuous-loss and
//! sampling routine of the transport loop actually consumes.

use crate::error::{TransportError, TransportResult};
use crate::geometry::{Point3, Vec3};
use std::fmt;

/// A spatial mass density distribution.
///
/// All implementations must keep `calculate` and `correct` exact
/// inverses of each other along a fixed ray.
pub trait DensityDistribution: fmt::Debug + Send + Sync {
    /// Local mass density at the given position [g/cm^3].
    fn evaluate(&self, position: &Point3) -> f64;

    /// Grammage accumulated along `distance` [cm] of straight travel
    /// from `position` in `direction` [g/cm^2].
    fn calculate(&self, position: &Point3, direction: &Vec3, distance: f64) -> f64;

    /// Distance [cm] that accumulates the given grammage from
    /// `position` in `direction`, clipped to `max_distance`.
    ///
    /// When the ray cannot accumulate the requested grammage within
    /// any finite distance, `max_distance` is returned.
    fn correct(&self, position: &Point3, direction: &Vec3, grammage: f64, max_distance: f64)
        -> f64;
}

/// Uniform density filling the whole sector.
#[derive(Clone, Debug)]
pub struct Homogeneous {
    mass_density: f64,
}

impl Homogeneous {
    /// Creates a uniform profile with the given density [g/cm^3].
    pub fn new(mass_density: f64) -> TransportResult<Self> {
        if mass_density <= 0.0 {
            return Err(TransportError::Config(format!(
                "mass density must be positive, got {}",
                mass_density
            )));
        }
        Ok(Self { mass_density })
    }
}

impl DensityDistribution for Homogeneous {
    fn evaluate(&self, _position: &Point3) -> f64 {
        self.mass_density
    }

    fn calculate(&self, _position: &Point3, _direction: &Vec3, distance: f64) -> f64 {
        self.mass_density * distance
    }

    fn correct(
        &self,
        _position: &Point3,
        _direction: &Vec3,
        grammage: f64,
        max_distance: f64,
    ) -> f64 {
        f64::min(grammage / self.mass_density, max_distance)
    }
}

/// Density falling or rising exponentially along a fixed axis, as in a
/// barometric atmosphere profile.
///
/// The density equals `reference_density` on the plane through the
/// origin normal to `axis` and changes by a factor `e` per
/// `scale_length` of displacement along the axis.
#[derive(Clone, Debug)]
pub struct Exponential {
    axis: Vec3,
    scale_length: f64,
    reference_density: f64,
}

impl Exponential {
    /// Creates an exponential profile from its axis, scale length [cm]
    /// and density at the origin [g/cm^3].
    pub fn new(axis: Vec3, scale_length: f64, reference_density: f64) -> TransportResult<Self> {
        if axis.length() == 0.0 {
            return Err(TransportError::Config(
                "exponential density axis must not be the zero vector".to_string(),
            ));
        }
        if scale_length <= 0.0 || reference_density <= 0.0 {
            return Err(TransportError::Config(format!(
                "exponential density scale length and reference density must be positive, \
                 got {} and {}",
                scale_length, reference_density
            )));
        }
        Ok(Self {
            axis: axis.normalized(),
            scale_length,
            reference_density,
        })
    }

    /// Rate of change of the log density along `direction` [1/cm].
    fn slope_along(&self, direction: &Vec3) -> f64 {
        direction.dot(&self.axis) / self.scale_length
    }
}

impl DensityDistribution for Exponential {
    fn evaluate(&self, position: &Point3) -> f64 {
        let elevation = (position - &Point3::origin()).dot(&self.axis);
        self.reference_density * f64::exp(elevation / self.scale_length)
    }

    fn calculate(&self, position: &Point3, direction: &Vec3, distance: f64) -> f64 {
        let local_density = self.evaluate(position);
        let slope = self.slope_along(direction);
        if slope == 0.0 {
            // The ray runs within a plane of constant density.
            return local_density * distance;
        }
        local_density * f64::exp_m1(slope * distance) / slope
    }

    fn correct(
        &self,
        position: &Point3,
        direction: &Vec3,
        grammage: f64,
        max_distance: f64,
    ) -> f64 {
        let local_density = self.evaluate(position);
        let slope = self.slope_along(direction);
        if slope == 0.0 {
            return f64::min(grammage / local_density, max_distance);
        }
        let scaled = grammage * slope / local_density;
        if scaled <= -1.0 {
            // A decaying profile holds only a finite column of matter,
            // which the requested grammage exceeds.
            return max_distance;
        }
        f64::min(f64::ln_1p(scaled) / slope, max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Integrator;
    use approx::assert_relative_eq;

    #[test]
    fn homogeneous_profile_is_linear_in_distance() {
        let density = Homogeneous::new(2.65).unwrap();
        let position = Point3::origin();
        let direction = Vec3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(
            density.calculate(&position, &direction, 100.0),
            265.0,
            max_relative = 1e-14
        );
        assert_relative_eq!(
            density.correct(&position, &direction, 265.0, 1e10),
            100.0,
            max_relative = 1e-14
        );
    }

    #[test]
    fn homogeneous_correction_is_clipped_at_the_maximum_distance() {
        let density = Homogeneous::new(1.0).unwrap();
        let position = Point3::origin();
        let direction = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(density.correct(&position, &direction, 500.0, 20.0), 20.0);
    }

    #[test]
    fn exponential_grammage_matches_numerical_integration() {
        let axis = Vec3::new(0.0, 0.0, 1.0);
        let density = Exponential::new(axis, 8.0e5, 1.205e-3).unwrap();
        let position = Point3::new(0.0, 0.0, 2.0e5);
        let direction = Vec3::new(0.0, 0.6, 0.8);
        let distance = 3.0e5;

        let integrator = Integrator::default();
        let expected = integrator.integrate_closed(
            |step| density.evaluate(&position.translated(&direction, step)),
            0.0,
            distance,
        );
        assert_relative_eq!(
            density.calculate(&position, &direction, distance),
            expected,
            max_relative = 1e-6
        );
    }

    #[test]
    fn exponential_correction_inverts_the_grammage() {
        let axis = Vec3::new(0.0, 0.0, 1.0);
        let density = Exponential::new(axis, 8.0e5, 1.205e-3).unwrap();
        let position = Point3::new(0.0, 0.0, 1.0e5);
        for direction in [Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0)] {
            let grammage = density.calculate(&position, &direction, 2.0e5);
            assert_relative_eq!(
                density.correct(&position, &direction, grammage, 1e10),
                2.0e5,
                max_relative = 1e-10
            );
        }
    }

    #[test]
    fn exhausted_exponential_column_returns_the_maximum_distance() {
        let axis = Vec3::new(0.0, 0.0, 1.0);
        let density = Exponential::new(axis, 1.0e5, 1.0e-3).unwrap();
        let position = Point3::origin();
        // Heading down the profile, the total remaining column is
        // rho * scale_length.
        let direction = Vec3::new(0.0, 0.0, -1.0);
        let total_column = 1.0e-3 * 1.0e5;
        assert_eq!(
            density.correct(&position, &direction, 2.0 * total_column, 7.5e7),
            7.5e7
        );
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        assert!(Homogeneous::new(0.0).is_err());
        assert!(Exponential::new(Vec3::zero(), 1.0, 1.0).is_err());
        assert!(Exponential::new(Vec3::new(0.0, 0.0, 1.0), -2.0, 1.0).is_err());
    }
}
