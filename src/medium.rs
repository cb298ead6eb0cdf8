//! Media definitions and their atomic composition.

use crate::constants::{LOG_10, N_AVOGADRO};
use crate::error::{TransportError, TransportResult};
use crate::interpolation::cache::hash_combine;
use lazy_static::lazy_static;

/// A single atomic component of a medium.
#[derive(Clone, Debug)]
pub struct Component {
    pub name: String,
    /// Nuclear charge Z.
    pub nuclear_charge: f64,
    /// Atomic weight A [g/mol].
    pub atomic_num: f64,
    /// Number of atoms of this kind in one molecule of the medium.
    pub atoms_in_molecule: f64,
}

impl Component {
    pub fn new(name: &str, nuclear_charge: f64, atomic_num: f64, atoms_in_molecule: f64) -> Self {
        Self {
            name: name.to_string(),
            nuclear_charge,
            atomic_num,
            atoms_in_molecule,
        }
    }
}

/// Parameters of the Sternheimer density correction to the mean
/// ionization loss.
#[derive(Clone, Debug)]
pub struct DensityCorrection {
    pub c: f64,
    pub a: f64,
    pub m: f64,
    pub x0: f64,
    pub x1: f64,
    pub d0: f64,
}

impl DensityCorrection {
    /// Evaluates the correction at `x = log10(beta * gamma)`.
    pub fn evaluate(&self, x: f64) -> f64 {
        if x < self.x0 {
            if self.d0 > 0.0 {
                self.d0 * f64::powf(10.0, 2.0 * (x - self.x0))
            } else {
                0.0
            }
        } else if x < self.x1 {
            2.0 * LOG_10 * x + self.c + self.a * f64::powf(self.x1 - x, self.m)
        } else {
            2.0 * LOG_10 * x + self.c
        }
    }
}

/// Matter traversed by propagated particles.
#[derive(Clone, Debug)]
pub struct Medium {
    name: String,
    components: Vec<Component>,
    mass_density: f64,
    ionization_potential: f64,
    density_correction: DensityCorrection,
    radiation_length: f64,
    molecular_weight: f64,
    sum_charge: f64,
}

impl Medium {
    /// Creates a medium from its components, mass density [g/cm^3],
    /// mean ionization potential [eV], density correction and
    /// radiation length [g/cm^2].
    pub fn new(
        name: &str,
        components: Vec<Component>,
        mass_density: f64,
        ionization_potential: f64,
        density_correction: DensityCorrection,
        radiation_length: f64,
    ) -> Self {
        let molecular_weight = components
            .iter()
            .map(|component| component.atoms_in_molecule * component.atomic_num)
            .sum();
        let sum_charge = components
            .iter()
            .map(|component| component.atoms_in_molecule * component.nuclear_charge)
            .sum();
        Self {
            name: name.to_string(),
            components,
            mass_density,
            ionization_potential,
            density_correction,
            radiation_length,
            molecular_weight,
            sum_charge,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Mass density [g/cm^3].
    pub fn mass_density(&self) -> f64 {
        self.mass_density
    }

    /// Mean ionization potential [eV].
    pub fn ionization_potential(&self) -> f64 {
        self.ionization_potential
    }

    pub fn density_correction(&self) -> &DensityCorrection {
        &self.density_correction
    }

    /// Radiation length [g/cm^2].
    pub fn radiation_length(&self) -> f64 {
        self.radiation_length
    }

    /// Weight of one molecule of the medium [g/mol].
    pub fn molecular_weight(&self) -> f64 {
        self.molecular_weight
    }

    /// Total nuclear charge of one molecule of the medium.
    pub fn sum_charge(&self) -> f64 {
        self.sum_charge
    }

    /// Number of atoms of the given component in one gram of medium.
    pub fn atoms_per_gram(&self, component: &Component) -> f64 {
        N_AVOGADRO * component.atoms_in_molecule / self.molecular_weight
    }

    /// Number of electrons in one gram of medium.
    pub fn electrons_per_gram(&self) -> f64 {
        N_AVOGADRO * self.sum_charge / self.molecular_weight
    }

    /// Folds every property entering cross section values into the
    /// given hash state.
    pub fn hash_into(&self, state: &mut u64) {
        for component in &self.components {
            hash_combine(state, component.nuclear_charge.to_bits());
            hash_combine(state, component.atomic_num.to_bits());
            hash_combine(state, component.atoms_in_molecule.to_bits());
        }
        hash_combine(state, self.mass_density.to_bits());
        hash_combine(state, self.ionization_potential.to_bits());
        hash_combine(state, self.density_correction.c.to_bits());
        hash_combine(state, self.density_correction.a.to_bits());
        hash_combine(state, self.density_correction.m.to_bits());
        hash_combine(state, self.density_correction.x0.to_bits());
        hash_combine(state, self.density_correction.x1.to_bits());
        hash_combine(state, self.density_correction.d0.to_bits());
        hash_combine(state, self.radiation_length.to_bits());
    }
}

lazy_static! {
    /// Standard rock, the conventional reference medium for
    /// underground propagation.
    pub static ref STANDARD_ROCK: Medium = Medium::new(
        "standard_rock",
        vec![Component::new("standard_rock", 11.0, 22.0, 1.0)],
        2.650,
        136.4,
        DensityCorrection {
            c: -3.7738,
            a: 0.08301,
            m: 3.4120,
            x0: 0.0492,
            x1: 3.0549,
            d0: 0.0,
        },
        26.54,
    );

    /// Liquid water.
    pub static ref WATER: Medium = Medium::new(
        "water",
        vec![
            Component::new("hydrogen", 1.0, 1.00794, 2.0),
            Component::new("oxygen", 8.0, 15.9994, 1.0),
        ],
        1.000,
        75.0,
        DensityCorrection {
            c: -3.5017,
            a: 0.09116,
            m: 3.4773,
            x0: 0.2400,
            x1: 2.8004,
            d0: 0.0,
        },
        36.08,
    );

    /// Glacial ice.
    pub static ref ICE: Medium = Medium::new(
        "ice",
        vec![
            Component::new("hydrogen", 1.0, 1.00794, 2.0),
            Component::new("oxygen", 8.0, 15.9994, 1.0),
        ],
        0.917,
        75.0,
        DensityCorrection {
            c: -3.5873,
            a: 0.09116,
            m: 3.4773,
            x0: 0.2400,
            x1: 2.8004,
            d0: 0.0,
        },
        36.08,
    );

    /// Dry air at sea level.
    pub static ref AIR: Medium = Medium::new(
        "air",
        vec![
            Component::new("nitrogen", 7.0, 14.0067, 1.562380),
            Component::new("oxygen", 8.0, 15.9994, 0.419956),
            Component::new("argon", 18.0, 39.948, 0.009340),
        ],
        1.205e-3,
        85.7,
        DensityCorrection {
            c: -10.5961,
            a: 0.10914,
            m: 3.3994,
            x0: 1.7418,
            x1: 4.2759,
            d0: 0.0,
        },
        36.62,
    );
}

/// Looks up a predefined medium by its configuration name.
pub fn medium_by_name(name: &str) -> TransportResult<Medium> {
    match name {
        "standard_rock" => Ok(STANDARD_ROCK.clone()),
        "water" => Ok(WATER.clone()),
        "ice" => Ok(ICE.clone()),
        "air" => Ok(AIR.clone()),
        _ => Err(TransportError::Config(format!(
            "unknown medium \"{}\"",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn water_has_the_expected_molecular_weight() {
        assert_relative_eq!(WATER.molecular_weight(), 18.01528, max_relative = 1e-5);
        assert_relative_eq!(WATER.sum_charge(), 10.0, max_relative = 1e-12);
    }

    #[test]
    fn standard_rock_has_half_charge_to_mass_ratio() {
        let ratio = STANDARD_ROCK.sum_charge() / STANDARD_ROCK.molecular_weight();
        assert_relative_eq!(ratio, 0.5, max_relative = 1e-12);
    }

    #[test]
    fn density_correction_reaches_the_asymptotic_form() {
        let correction = STANDARD_ROCK.density_correction();
        let x = correction.x1 + 1.0;
        assert_relative_eq!(
            correction.evaluate(x),
            2.0 * LOG_10 * x + correction.c,
            max_relative = 1e-12
        );
        assert_eq!(correction.evaluate(correction.x0 - 0.5), 0.0);
    }

    #[test]
    fn unknown_medium_name_is_a_configuration_error() {
        assert!(medium_by_name("lead").is_err());
        assert!(medium_by_name("ice").is_ok());
    }

    #[test]
    fn equal_media_hash_equally_and_different_media_differently() {
        let mut ice_state = 0;
        ICE.hash_into(&mut ice_state);
        let mut ice_again = 0;
        ICE.hash_into(&mut ice_again);
        let mut water_state = 0;
        WATER.hash_into(&mut water_state);
        assert_eq!(ice_state, ice_again);
        assert_ne!(ice_state, water_state);
    }
}
