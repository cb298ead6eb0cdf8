//! Multiple scattering of charged particles on propagation steps.
//!
//! A continuous step deflects the particle twice: the direction of the
//! straight line connecting the endpoints of the step, and the
//! direction of flight at the end of the step. Both are drawn from the
//! angular distribution accumulated over the traversed grammage.

use crate::geometry::Vec3;
use crate::math::normal_quantile;
use crate::medium::Medium;
use crate::particle::ParticleDef;
use std::fmt;

/// Directions emerging from a scattered propagation step.
#[derive(Clone, Copy, Debug)]
pub struct Directions {
    /// Direction of the straight line connecting the endpoints of the
    /// step.
    pub mean: Vec3,
    /// Direction of flight at the end of the step.
    pub sampled: Vec3,
}

/// Angular offsets drawn for one propagation step, in the frame whose
/// z-axis is the initial direction of flight.
#[derive(Clone, Copy, Debug, Default)]
pub struct OffsetAngles {
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

/// Models the angular deflection accumulated on a continuous step.
pub trait Scattering: fmt::Debug + Send + Sync {
    /// Draws the offset angles for a step of the given grammage
    /// [g/cm^2] from four uniform random numbers.
    fn offset_angles(
        &self,
        grammage: f64,
        energy_initial: f64,
        energy_final: f64,
        random_numbers: [f64; 4],
    ) -> OffsetAngles;

    /// Draws the mean and final direction of a step starting along
    /// `direction`.
    fn scatter(
        &self,
        grammage: f64,
        energy_initial: f64,
        energy_final: f64,
        direction: &Vec3,
        random_numbers: [f64; 4],
    ) -> Directions {
        let angles = self.offset_angles(grammage, energy_initial, energy_final, random_numbers);

        // Orthonormal triad completing the initial direction.
        let cos_theta = direction.z();
        let sin_theta = f64::sqrt(f64::max(1.0 - cos_theta * cos_theta, 0.0));
        let (sin_phi, cos_phi) = if sin_theta > 0.0 {
            (direction.y() / sin_theta, direction.x() / sin_theta)
        } else {
            (0.0, 1.0)
        };
        let rotated_x = Vec3::new(cos_theta * cos_phi, cos_theta * sin_phi, -sin_theta);
        let rotated_y = Vec3::new(-sin_phi, cos_phi, 0.0);

        let sz = f64::sqrt(f64::max(
            1.0 - angles.sx * angles.sx - angles.sy * angles.sy,
            0.0,
        ));
        let tz = f64::sqrt(f64::max(
            1.0 - angles.tx * angles.tx - angles.ty * angles.ty,
            0.0,
        ));
        let mean =
            (direction * sz + rotated_x * angles.sx + rotated_y * angles.sy).normalized();
        let sampled =
            (direction * tz + rotated_x * angles.tx + rotated_y * angles.ty).normalized();
        Directions { mean, sampled }
    }
}

/// Gaussian multiple scattering with the Highland standard deviation.
#[derive(Clone, Debug)]
pub struct Highland {
    particle: ParticleDef,
    radiation_length: f64,
}

impl Highland {
    /// Creates Highland scattering of the given particle in the given
    /// medium.
    pub fn new(particle: ParticleDef, medium: &Medium) -> Self {
        Self {
            particle,
            radiation_length: medium.radiation_length(),
        }
    }

    /// Computes the standard deviation of the projected deflection
    /// angle over the given grammage [g/cm^2].
    fn theta0(&self, grammage: f64, energy: f64) -> f64 {
        let momentum_squared =
            (energy - self.particle.mass) * (energy + self.particle.mass);
        if grammage <= 0.0 || momentum_squared <= 0.0 {
            return 0.0;
        }
        let radiation_lengths = grammage / self.radiation_length;
        let theta0 = 13.6 / (momentum_squared / energy)
            * self.particle.charge.abs()
            * f64::sqrt(radiation_lengths)
            * (1.0 + 0.088 * f64::log10(radiation_lengths));
        f64::max(theta0, 0.0)
    }
}

impl Scattering for Highland {
    fn offset_angles(
        &self,
        grammage: f64,
        energy_initial: f64,
        _energy_final: f64,
        random_numbers: [f64; 4],
    ) -> OffsetAngles {
        let theta0 = self.theta0(grammage, energy_initial);
        if theta0 == 0.0 {
            return OffsetAngles::default();
        }
        let inv_sqrt_3 = 1.0 / f64::sqrt(3.0);

        let rnd1 = theta0 * normal_quantile(random_numbers[0]);
        let rnd2 = theta0 * normal_quantile(random_numbers[1]);
        let sx = 0.5 * (rnd1 * inv_sqrt_3 + rnd2);
        let tx = rnd2;

        let rnd1 = theta0 * normal_quantile(random_numbers[2]);
        let rnd2 = theta0 * normal_quantile(random_numbers[3]);
        let sy = 0.5 * (rnd1 * inv_sqrt_3 + rnd2);
        let ty = rnd2;

        OffsetAngles { sx, sy, tx, ty }
    }
}

/// Propagation without angular deflection.
#[derive(Clone, Copy, Debug)]
pub struct NoScattering;

impl Scattering for NoScattering {
    fn offset_angles(
        &self,
        _grammage: f64,
        _energy_initial: f64,
        _energy_final: f64,
        _random_numbers: [f64; 4],
    ) -> OffsetAngles {
        OffsetAngles::default()
    }
}
