//! Direct electron pair production in the Coulomb field of atomic nuclei.
//!
//! Implements the Kelner, Kokoulin and Petrukhin parametrization of the
//! doubly differential cross section. The asymmetry parameter of the
//! produced pair is integrated out numerically for every evaluation of
//! the singly differential cross section.

use super::bremsstrahlung::log_constant;
use super::{KinematicLimits, Parametrization};
use crate::constants::{ALPHA, M_ELECTRON, R_ELECTRON, SQRT_E};
use crate::math::Integrator;
use crate::medium::{Component, Medium};
use crate::particle::{EventType, ParticleDef};

/// Electron pair production on atomic nuclei after Kelner, Kokoulin
/// and Petrukhin.
#[derive(Clone, Debug)]
pub struct EpairProduction {
    asymmetry_integrator: Integrator,
}

impl EpairProduction {
    /// Creates a new pair production parametrization.
    pub fn new() -> Self {
        Self {
            asymmetry_integrator: Integrator::default(),
        }
    }

    /// Computes the cross section differential in the relative energy
    /// loss `v` and the pair asymmetry `rho`, in cm^2 per atom.
    fn asymmetry_differential_cross_section(
        particle: &ParticleDef,
        component: &Component,
        energy: f64,
        v: f64,
        rho: f64,
    ) -> f64 {
        let mass = particle.mass;
        let nuclear_charge = component.nuclear_charge;
        let log_con = log_constant(nuclear_charge);
        let z13 = nuclear_charge.powf(-1.0 / 3.0);

        let rho2 = rho * rho;
        let xi = (mass * v / (2.0 * M_ELECTRON)).powi(2) * (1.0 - rho2) / (1.0 - v);
        let beta = v * v / (2.0 * (1.0 - v));

        // Screening of the electron diagram term.
        let y_e = (5.0 - rho2 + 4.0 * beta * (1.0 + rho2))
            / (2.0 * (1.0 + 3.0 * beta) * f64::ln(3.0 + 1.0 / xi) - rho2
                - 2.0 * beta * (2.0 - rho2));
        let atomic_cutoff = 2.0 * M_ELECTRON * SQRT_E * log_con * z13 * (1.0 + xi) * (1.0 + y_e)
            / (energy * v * (1.0 - rho2));
        let nuclear_size = 1.5 * M_ELECTRON / (mass * z13);
        let l_e = f64::ln(log_con * z13 * f64::sqrt((1.0 + xi) * (1.0 + y_e)) / (1.0 + atomic_cutoff))
            - 0.5 * f64::ln(1.0 + nuclear_size * nuclear_size * (1.0 + xi) * (1.0 + y_e));
        let phi_e = f64::max(
            (((2.0 + rho2) * (1.0 + beta) + xi * (3.0 + rho2)) * f64::ln(1.0 + 1.0 / xi)
                + (1.0 - rho2 - beta) / (1.0 + xi)
                - (3.0 + rho2))
                * l_e,
            0.0,
        );

        // Screening of the lepton diagram term.
        let y_mu = (4.0 + rho2 + 3.0 * beta * (1.0 + rho2))
            / ((1.0 + rho2) * (1.5 + 2.0 * beta) * f64::ln(3.0 + xi) + 1.0 - 1.5 * rho2);
        let atomic_cutoff = 2.0 * M_ELECTRON * SQRT_E * log_con * z13 * (1.0 + xi) * (1.0 + y_mu)
            / (energy * v * (1.0 - rho2));
        let l_mu = f64::ln(
            mass / M_ELECTRON * (2.0 / 3.0) * log_con * z13 * z13 / (1.0 + atomic_cutoff),
        );
        let phi_mu = f64::max(
            (((1.0 + rho2) * (1.0 + 1.5 * beta) - (1.0 + 2.0 * beta) * (1.0 - rho2) / xi)
                * f64::ln(1.0 + xi)
                + xi * (1.0 - rho2 - beta) / (1.0 + xi)
                + (1.0 + 2.0 * beta) * (1.0 - rho2))
                * l_mu,
            0.0,
        );

        let charge_term = nuclear_charge * ALPHA * R_ELECTRON;
        2.0 / (3.0 * crate::constants::PI)
            * (charge_term * charge_term)
            * ((1.0 - v) / v)
            * (phi_e + (M_ELECTRON / mass).powi(2) * phi_mu)
    }
}

impl Default for EpairProduction {
    fn default() -> Self {
        Self::new()
    }
}

impl Parametrization for EpairProduction {
    fn name(&self) -> &'static str {
        "epair_kelner_kokoulin_petrukhin"
    }

    fn process(&self) -> EventType {
        EventType::EpairProduction
    }

    fn differential_cross_section(
        &self,
        particle: &ParticleDef,
        medium: &Medium,
        component: &Component,
        energy: f64,
        v: f64,
    ) -> f64 {
        let limits = self.kinematic_limits(particle, medium, component, energy);
        if v <= limits.v_min || v >= limits.v_max {
            return 0.0;
        }
        let mass = particle.mass;
        let aux = 1.0 - 6.0 * mass * mass / (energy * energy * (1.0 - v));
        let rho_max =
            f64::max(aux, 0.0) * f64::sqrt(1.0 - 4.0 * M_ELECTRON / (energy * v));
        if rho_max <= 0.0 {
            return 0.0;
        }
        2.0 * self.asymmetry_integrator.integrate_opened(
            |rho| Self::asymmetry_differential_cross_section(particle, component, energy, v, rho),
            0.0,
            rho_max,
        )
    }

    fn kinematic_limits(
        &self,
        particle: &ParticleDef,
        _medium: &Medium,
        component: &Component,
        energy: f64,
    ) -> KinematicLimits {
        let v_min = 4.0 * M_ELECTRON / energy;
        let v_max = 1.0
            - 0.75 * SQRT_E * (particle.mass / energy) * component.nuclear_charge.powf(1.0 / 3.0);
        if v_max < v_min {
            KinematicLimits {
                v_min,
                v_max: v_min,
            }
        } else {
            KinematicLimits { v_min, v_max }
        }
    }
}
