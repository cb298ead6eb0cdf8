//! Ionization energy loss on atomic electrons.
//!
//! Sub-cut losses follow the restricted Bethe-Bloch stopping power
//! with the Sternheimer density correction, losses above the cut are
//! sampled as free-electron knock-on (delta ray) collisions.

use super::{EnergyCutSettings, KinematicLimits, Parametrization};
use crate::constants::{IONIZATION_K, M_ELECTRON, N_AVOGADRO};
use crate::math::Integrator;
use crate::medium::{Component, Medium};
use crate::particle::{EventType, ParticleDef};

#[derive(Clone, Copy, Debug, Default)]
pub struct Ionization;

impl Ionization {
    /// Mean ionization potential of the medium [MeV].
    fn potential(medium: &Medium) -> f64 {
        1e-6 * medium.ionization_potential()
    }
}

impl Parametrization for Ionization {
    fn name(&self) -> &'static str {
        "ionization"
    }

    fn process(&self) -> EventType {
        EventType::Ionization
    }

    fn differential_cross_section(
        &self,
        particle: &ParticleDef,
        medium: &Medium,
        component: &Component,
        energy: f64,
        v: f64,
    ) -> f64 {
        let gamma = energy / particle.mass;
        let beta_sq = 1.0 - 1.0 / (gamma * gamma);
        let limits = self.kinematic_limits(particle, medium, component, energy);
        if beta_sq <= 0.0 || limits.v_max <= limits.v_min {
            return 0.0;
        }
        let spin_term = 0.5 * (v / (1.0 + 1.0 / gamma)).powi(2);
        let bracket = f64::max(1.0 - beta_sq * v / limits.v_max + spin_term, 0.0);
        0.5 * (IONIZATION_K / N_AVOGADRO)
            * component.nuclear_charge
            * particle.charge
            * particle.charge
            * bracket
            / (beta_sq * energy * v * v)
    }

    fn kinematic_limits(
        &self,
        particle: &ParticleDef,
        medium: &Medium,
        _component: &Component,
        energy: f64,
    ) -> KinematicLimits {
        let gamma = energy / particle.mass;
        let v_min = Self::potential(medium) / energy;
        if gamma <= 1.0 {
            return KinematicLimits {
                v_min,
                v_max: v_min,
            };
        }
        let mass_ratio = M_ELECTRON / particle.mass;
        let v_max = 2.0 * M_ELECTRON * (gamma * gamma - 1.0)
            / ((1.0 + 2.0 * gamma * mass_ratio + mass_ratio * mass_ratio) * energy);
        let v_max = f64::min(v_max, 1.0 - particle.mass / energy);
        KinematicLimits {
            v_min,
            v_max: f64::max(v_max, v_min),
        }
    }

    /// Energy at which the Bethe logarithm crosses zero and the
    /// stopping power formula switches off.
    fn lower_energy_limit(&self, particle: &ParticleDef, medium: &Medium) -> f64 {
        particle.mass * f64::sqrt(1.0 + Self::potential(medium) / (2.0 * M_ELECTRON))
    }

    /// Restricted Bethe-Bloch stopping power, counting transfers up to
    /// the effective cut as continuous.
    fn dedx(
        &self,
        particle: &ParticleDef,
        medium: &Medium,
        cuts: &EnergyCutSettings,
        _integrator: &Integrator,
        energy: f64,
    ) -> f64 {
        if energy <= self.lower_energy_limit(particle, medium) {
            return 0.0;
        }
        let gamma = energy / particle.mass;
        let beta_sq = 1.0 - 1.0 / (gamma * gamma);
        let limits = self.kinematic_limits(particle, medium, &medium.components()[0], energy);
        if limits.v_max <= limits.v_min {
            return 0.0;
        }
        let v_up = cuts.cut_clamped(&limits, energy);
        let transfer_up = v_up * energy;
        let transfer_max = limits.v_max * energy;
        let potential = Self::potential(medium);

        let beta_gamma = f64::sqrt(beta_sq) * gamma;
        let delta = medium.density_correction().evaluate(beta_gamma.log10());
        let bracket = 0.5
            * f64::ln(2.0 * M_ELECTRON * beta_sq * gamma * gamma * transfer_up
                / (potential * potential))
            - 0.5 * beta_sq * (1.0 + transfer_up / transfer_max)
            - 0.5 * delta
            + 0.125 * (transfer_up / energy).powi(2);
        if bracket <= 0.0 {
            return 0.0;
        }
        IONIZATION_K
            * particle.charge
            * particle.charge
            * (medium.sum_charge() / medium.molecular_weight())
            * bracket
            / beta_sq
    }
}
