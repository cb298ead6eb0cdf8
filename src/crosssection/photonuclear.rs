//! Inelastic interaction of charged leptons with atomic nuclei.
//!
//! Implements the Bezrukov and Bugaev parametrization of the
//! photonuclear cross section, with the parametrized photon nucleon
//! cross section and a nuclear shadowing factor for heavy targets.

use super::{KinematicLimits, Parametrization};
use crate::constants::{ALPHA, M_PION, M_PROTON, PI};
use crate::medium::{Component, Medium};
use crate::particle::{EventType, ParticleDef};

// Effective vector meson masses squared, in GeV^2.
const M1_SQUARED: f64 = 0.54;
const M2_SQUARED: f64 = 1.80;

/// Computes the absorption cross section of a real photon on a single
/// nucleon in microbarn, for a photon energy `nu` in GeV.
fn photon_nucleon_cross_section(nu: f64) -> f64 {
    let aux = f64::ln(0.0213 * nu);
    114.3 + 1.647 * aux * aux
}

/// Computes the nuclear shadowing factor of a target with `atomic_num`
/// nucleons for a photon nucleon cross section `sgn` in microbarn.
fn shadowing_factor(nuclear_charge: f64, atomic_num: f64, sgn: f64) -> f64 {
    if nuclear_charge == 1.0 {
        return 1.0;
    }
    let x = 0.00282 * atomic_num.powf(1.0 / 3.0) * sgn;
    3.0 / (x * x * x) * (0.5 * x * x - 1.0 + f64::exp(-x) * (1.0 + x))
}

/// Photonuclear interaction after Bezrukov and Bugaev.
#[derive(Clone, Copy, Debug)]
pub struct Photonuclear;

impl Parametrization for Photonuclear {
    fn name(&self) -> &'static str {
        "photonuclear_bezrukov_bugaev"
    }

    fn process(&self) -> EventType {
        EventType::Photonuclear
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

        // The parametrization is stated in GeV based units.
        let mass = 1e-3 * particle.mass;
        let nu = 1e-3 * v * energy;
        let sgn = photon_nucleon_cross_section(nu);
        let shadow = shadowing_factor(component.nuclear_charge, component.atomic_num, sgn);

        let t = mass * mass * v * v / (1.0 - v);
        let kappa = 1.0 - 2.0 / v + 2.0 / (v * v);

        let mut psi = 0.75
            * shadow
            * (kappa * f64::ln(1.0 + M1_SQUARED / t) - kappa * M1_SQUARED / (M1_SQUARED + t)
                - 2.0 * mass * mass / t);
        psi += 0.25 * (kappa * f64::ln(1.0 + M2_SQUARED / t) - 2.0 * mass * mass / t);
        psi += mass * mass / (2.0 * t)
            * (0.75 * shadow * M1_SQUARED / (M1_SQUARED + t)
                + 0.25 * M2_SQUARED / t * f64::ln(1.0 + t / M2_SQUARED));
        if psi <= 0.0 {
            return 0.0;
        }

        ALPHA / (8.0 * PI) * component.atomic_num * sgn * v * psi * 1e-30
    }

    fn kinematic_limits(
        &self,
        particle: &ParticleDef,
        _medium: &Medium,
        _component: &Component,
        energy: f64,
    ) -> KinematicLimits {
        let v_min = (M_PION + M_PION * M_PION / (2.0 * M_PROTON)) / energy;
        let v_max = 1.0 - particle.mass / energy;
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
