//! Bremsstrahlung photon emission.
//!
//! Kelner-Kokoulin-Petrukhin parametrization with elastic nuclear and
//! atomic form factors plus the contribution of radiation on the
//! atomic electrons.

use super::{KinematicLimits, Parametrization};
use crate::constants::{ALPHA, M_ELECTRON, R_ELECTRON, SQRT_E};
use crate::medium::{Component, Medium};
use crate::particle::{EventType, ParticleDef};

/// Elastic radiation logarithm constant of an element.
pub(crate) fn log_constant(nuclear_charge: f64) -> f64 {
    match nuclear_charge.round() as i64 {
        1 => 202.4,
        2 => 151.9,
        3 => 159.9,
        4 => 172.3,
        5 => 177.9,
        6 => 178.3,
        7 => 176.6,
        8 => 173.4,
        _ => 182.7,
    }
}

/// Inelastic radiation logarithm constant of an element.
fn b_log_constant(nuclear_charge: f64) -> f64 {
    if nuclear_charge.round() as i64 == 1 {
        446.0
    } else {
        1429.0
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Bremsstrahlung;

impl Parametrization for Bremsstrahlung {
    fn name(&self) -> &'static str {
        "bremsstrahlung"
    }

    fn process(&self) -> EventType {
        EventType::Bremsstrahlung
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
        let charge_number = component.nuclear_charge;
        let z_third = charge_number.powf(-1.0 / 3.0);

        // Minimum momentum transfer to the target.
        let delta = mass * mass * v / (2.0 * energy * (1.0 - v));

        // Elastic scattering off the screened nucleus, corrected for
        // its finite size.
        let nuclear_size = 1.54 * component.atomic_num.powf(0.27);
        let nuclear_size = nuclear_size.powf(1.0 - 1.0 / charge_number);
        let screening = log_constant(charge_number) * z_third;
        let phi_nucleus = f64::max(
            f64::ln(
                screening * (mass + delta * (nuclear_size * SQRT_E - 2.0))
                    / (nuclear_size * (M_ELECTRON + delta * SQRT_E * screening)),
            ),
            0.0,
        );

        // Radiation on the atomic electrons, kinematically bounded by
        // the light target.
        let v_max_electron = 1.0 / (1.0 + mass * mass / (2.0 * M_ELECTRON * energy));
        let phi_electron = if v >= v_max_electron {
            0.0
        } else {
            let screening_inelastic = b_log_constant(charge_number) * z_third * z_third;
            f64::max(
                f64::ln(
                    screening_inelastic * mass
                        / ((1.0 + delta * mass / (M_ELECTRON * M_ELECTRON * SQRT_E))
                            * (M_ELECTRON + delta * SQRT_E * screening_inelastic)),
                ),
                0.0,
            )
        };

        let splitting = (4.0 / 3.0) * (1.0 - v) + v * v;
        let scale = 2.0 * charge_number * (M_ELECTRON / mass) * R_ELECTRON;
        ALPHA * particle.charge * particle.charge * scale * scale * splitting
            * (phi_nucleus + phi_electron / charge_number)
            / v
    }

    fn kinematic_limits(
        &self,
        particle: &ParticleDef,
        _medium: &Medium,
        component: &Component,
        energy: f64,
    ) -> KinematicLimits {
        let v_max = 1.0
            - 0.75 * SQRT_E * (particle.mass / energy) * component.nuclear_charge.powf(1.0 / 3.0);
        KinematicLimits {
            v_min: 0.0,
            v_max: f64::max(v_max, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crosssection::{CrossSection, EnergyCutSettings};
    use crate::medium::STANDARD_ROCK;
    use crate::particle::MUON_MINUS;

    fn open_section() -> CrossSection {
        CrossSection::integral(
            Box::new(Bremsstrahlung),
            MUON_MINUS,
            STANDARD_ROCK.clone(),
            EnergyCutSettings::new(f64::INFINITY, 1.0, false).unwrap(),
            1.0,
        )
    }

    #[test]
    fn radiative_loss_scales_roughly_linearly_with_energy() {
        let section = open_section();
        let at_tev = section.dedx(1e6);
        let at_ten_tev = section.dedx(1e7);
        // b = dE/dx / E is a few times 1e-6 per g/cm^2 for rock.
        let b = at_tev / 1e6;
        assert!(
            (5e-7..5e-6).contains(&b),
            "b_brems = {} cm^2/g at 1 TeV",
            b
        );
        let growth = at_ten_tev / at_tev;
        assert!(
            (5.0..15.0).contains(&growth),
            "dE/dx grew by {} per decade",
            growth
        );
    }

    #[test]
    fn photon_spectrum_falls_off_as_the_inverse_loss() {
        let brems = Bremsstrahlung;
        let component = &STANDARD_ROCK.components()[0];
        let energy = 1e6;
        let soft = brems.differential_cross_section(
            &MUON_MINUS,
            &STANDARD_ROCK,
            component,
            energy,
            1e-4,
        );
        let hard = brems.differential_cross_section(
            &MUON_MINUS,
            &STANDARD_ROCK,
            component,
            energy,
            1e-2,
        );
        let ratio = soft / hard;
        assert!(
            (50.0..200.0).contains(&ratio),
            "spectrum ratio over two decades is {}",
            ratio
        );
    }

    #[test]
    fn emission_is_kinematically_forbidden_near_the_rest_energy() {
        let brems = Bremsstrahlung;
        let component = &STANDARD_ROCK.components()[0];
        let limits = brems.kinematic_limits(
            &MUON_MINUS,
            &STANDARD_ROCK,
            component,
            1.01 * MUON_MINUS.mass,
        );
        assert_eq!(limits.v_max, 0.0);
        let limits = brems.kinematic_limits(&MUON_MINUS, &STANDARD_ROCK, component, 1e6);
        assert!(limits.v_max > 0.99 && limits.v_max < 1.0);
    }
}
