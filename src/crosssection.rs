//! Energy loss processes of charged leptons in matter.
//!
//! Each process is described by a [`Parametrization`] giving its
//! differential cross section per target atom, and wrapped in a
//! [`CrossSection`] that turns it into the per-grammage loss rates the
//! transport loop consumes. A cross section either integrates the
//! parametrization on every call or evaluates interpolation tables
//! built once through the [`TableCache`].

pub mod bremsstrahlung;
pub mod epair;
pub mod ionization;
pub mod photonuclear;

use crate::error::{TransportError, TransportResult};
use crate::interpolation::cache::{hash_combine, hash_str, TableCache};
use crate::interpolation::{Axis, Interpolant1, Interpolant2};
use crate::io::Verbose;
use crate::math::{invert_monotone, Integrator};
use crate::medium::{Component, Medium};
use crate::particle::{EventType, ParticleDef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Relative precision of stochastic loss inversions in the relative
/// energy loss.
const LOSS_INVERSION_PRECISION: f64 = 1e-9;

/// Boundary between continuous and stochastic treatment of energy
/// losses.
///
/// Relative losses below the effective cut `min(e_cut / E, v_cut)` are
/// accounted for by the mean loss rate, losses above it are sampled
/// individually.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnergyCutSettings {
    e_cut: f64,
    v_cut: f64,
    continuous_randomization: bool,
}

impl EnergyCutSettings {
    /// Creates cut settings from an absolute cut [MeV] and a relative
    /// cut.
    ///
    /// Either cut may be disabled by setting it to `f64::INFINITY`
    /// respectively `1.0`.
    pub fn new(e_cut: f64, v_cut: f64, continuous_randomization: bool) -> TransportResult<Self> {
        if e_cut <= 0.0 {
            return Err(TransportError::Config(format!(
                "absolute energy cut must be positive, got {}",
                e_cut
            )));
        }
        if v_cut <= 0.0 || v_cut > 1.0 {
            return Err(TransportError::Config(format!(
                "relative energy cut must lie in (0, 1], got {}",
                v_cut
            )));
        }
        Ok(Self {
            e_cut,
            v_cut,
            continuous_randomization,
        })
    }

    /// Absolute energy cut [MeV].
    pub fn e_cut(&self) -> f64 {
        self.e_cut
    }

    /// Relative energy cut.
    pub fn v_cut(&self) -> f64 {
        self.v_cut
    }

    /// Whether continuous losses are smeared by their tabulated
    /// variance.
    pub fn continuous_randomization(&self) -> bool {
        self.continuous_randomization
    }

    /// Effective relative cut at the given energy.
    pub fn cut(&self, energy: f64) -> f64 {
        f64::min(self.e_cut / energy, self.v_cut)
    }

    /// Effective relative cut clamped into the kinematic range of a
    /// process.
    pub fn cut_clamped(&self, limits: &KinematicLimits, energy: f64) -> f64 {
        f64::min(f64::max(limits.v_min, self.cut(energy)), limits.v_max)
    }

    /// Folds the cut values into the given hash state.
    pub fn hash_into(&self, state: &mut u64) {
        hash_combine(state, self.e_cut.to_bits());
        hash_combine(state, self.v_cut.to_bits());
        hash_combine(state, self.continuous_randomization as u64);
    }
}

/// Range of the relative energy loss kinematically allowed for one
/// process on one component at a fixed energy.
#[derive(Clone, Copy, Debug)]
pub struct KinematicLimits {
    pub v_min: f64,
    pub v_max: f64,
}

/// Differential description of one energy loss process.
///
/// Implementations provide the cross section per target atom,
/// differential in the relative energy loss `v`, plus the kinematic
/// range of `v`. The continuous moments default to numerical
/// integration of the differential cross section and may be overridden
/// where a closed form exists.
pub trait Parametrization: fmt::Debug + Send + Sync {
    /// Identifier entering table file names and hashes.
    fn name(&self) -> &'static str;

    /// Event tag recorded when this process fires stochastically.
    fn process(&self) -> EventType;

    /// Cross section per target atom, differential in the relative
    /// energy loss [cm^2].
    fn differential_cross_section(
        &self,
        particle: &ParticleDef,
        medium: &Medium,
        component: &Component,
        energy: f64,
        v: f64,
    ) -> f64;

    /// Kinematically allowed range of the relative energy loss.
    ///
    /// A collapsed range with `v_max <= v_min` means the process is
    /// switched off at this energy.
    fn kinematic_limits(
        &self,
        particle: &ParticleDef,
        medium: &Medium,
        component: &Component,
        energy: f64,
    ) -> KinematicLimits;

    /// Energy below which the process contributes nothing.
    fn lower_energy_limit(&self, particle: &ParticleDef, _medium: &Medium) -> f64 {
        particle.mass
    }

    /// Folds the parametrization identity into the given hash state.
    fn hash_into(&self, state: &mut u64) {
        hash_str(state, self.name());
    }

    /// Mean energy loss per grammage from sub-cut losses [MeV cm^2/g].
    fn dedx(
        &self,
        particle: &ParticleDef,
        medium: &Medium,
        cuts: &EnergyCutSettings,
        integrator: &Integrator,
        energy: f64,
    ) -> f64 {
        self.continuous_moment(particle, medium, cuts, integrator, energy, 1) * energy
    }

    /// Variance rate of sub-cut losses per grammage [MeV^2 cm^2/g].
    fn de2dx(
        &self,
        particle: &ParticleDef,
        medium: &Medium,
        cuts: &EnergyCutSettings,
        integrator: &Integrator,
        energy: f64,
    ) -> f64 {
        self.continuous_moment(particle, medium, cuts, integrator, energy, 2) * energy * energy
    }

    /// Moment of the differential cross section over the sub-cut loss
    /// range, summed over the medium components [cm^2/g].
    fn continuous_moment(
        &self,
        particle: &ParticleDef,
        medium: &Medium,
        cuts: &EnergyCutSettings,
        integrator: &Integrator,
        energy: f64,
        power: i32,
    ) -> f64 {
        medium
            .components()
            .iter()
            .map(|component| {
                let limits = self.kinematic_limits(particle, medium, component, energy);
                let v_up = cuts.cut_clamped(&limits, energy);
                if v_up <= limits.v_min {
                    return 0.0;
                }
                let integrand = |v: f64| {
                    v.powi(power)
                        * self.differential_cross_section(particle, medium, component, energy, v)
                };
                let integral = if limits.v_min > 0.0 {
                    integrator.integrate_with_log(integrand, limits.v_min, v_up)
                } else {
                    integrator.integrate_opened(integrand, limits.v_min, v_up)
                };
                medium.atoms_per_gram(component) * integral
            })
            .sum()
    }
}

/// Resolution of the interpolation tables backing cross sections and
/// propagation utilities.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableSettings {
    /// Number of energy nodes of cross section tables.
    #[serde(default = "TableSettings::default_nodes_cross_section")]
    pub nodes_cross_section: usize,
    /// Number of energy nodes of cumulative utility tables.
    #[serde(default = "TableSettings::default_nodes_utility")]
    pub nodes_utility: usize,
    /// Upper end of every tabulated energy axis [MeV].
    #[serde(default = "TableSettings::default_max_energy")]
    pub max_energy: f64,
}

impl TableSettings {
    fn default_nodes_cross_section() -> usize {
        100
    }

    fn default_nodes_utility() -> usize {
        200
    }

    fn default_max_energy() -> f64 {
        1e14
    }
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            nodes_cross_section: Self::default_nodes_cross_section(),
            nodes_utility: Self::default_nodes_utility(),
            max_energy: Self::default_max_energy(),
        }
    }
}

/// Interpolation tables of one cross section over one medium.
#[derive(Debug)]
struct CrossSectionTables {
    dedx: Arc<Interpolant1>,
    de2dx: Arc<Interpolant1>,
    /// Per component, the rate of losses between the cut and a scaled
    /// upper loss, cumulative along the second axis.
    dndx: Vec<Arc<Interpolant2>>,
}

/// One energy loss process bound to a particle species, a medium and
/// cut settings.
#[derive(Debug)]
pub struct CrossSection {
    parametrization: Box<dyn Parametrization>,
    particle: ParticleDef,
    medium: Medium,
    cuts: EnergyCutSettings,
    multiplier: f64,
    integrator: Integrator,
    tables: Option<CrossSectionTables>,
}

impl CrossSection {
    /// Creates a cross section that integrates the parametrization on
    /// every evaluation.
    pub fn integral(
        parametrization: Box<dyn Parametrization>,
        particle: ParticleDef,
        medium: Medium,
        cuts: EnergyCutSettings,
        multiplier: f64,
    ) -> Self {
        Self {
            parametrization,
            particle,
            medium,
            cuts,
            multiplier,
            integrator: Integrator::default(),
            tables: None,
        }
    }

    /// Creates a cross section backed by interpolation tables, built
    /// through the given cache.
    pub fn interpolant(
        parametrization: Box<dyn Parametrization>,
        particle: ParticleDef,
        medium: Medium,
        cuts: EnergyCutSettings,
        multiplier: f64,
        settings: &TableSettings,
        cache: &TableCache,
        verbose: Verbose,
    ) -> Self {
        let mut section = Self::integral(parametrization, particle, medium, cuts, multiplier);

        let energy_axis = Axis::log(
            section.lower_energy_limit(),
            settings.max_energy,
            settings.nodes_cross_section,
        );
        let label = section.parametrization.name();

        let dedx_axis = energy_axis.clone().with_rational_fit();
        let dedx = cache.get_or_build_1d(
            &format!("{}_dedx", label),
            section.table_hash("dedx", &dedx_axis, None),
            verbose,
            || {
                Interpolant1::build(dedx_axis.clone(), true, |energy| {
                    section.parametrization.dedx(
                        &section.particle,
                        &section.medium,
                        &section.cuts,
                        &section.integrator,
                        energy,
                    )
                })
            },
        );

        let de2dx = cache.get_or_build_1d(
            &format!("{}_de2dx", label),
            section.table_hash("de2dx", &energy_axis, None),
            verbose,
            || {
                Interpolant1::build(energy_axis.clone(), false, |energy| {
                    section.parametrization.de2dx(
                        &section.particle,
                        &section.medium,
                        &section.cuts,
                        &section.integrator,
                        energy,
                    )
                })
            },
        );

        let fraction_axis = Axis::linear(0.0, 1.0, settings.nodes_cross_section);
        let dndx = (0..section.medium.components().len())
            .map(|index| {
                cache.get_or_build_2d(
                    &format!("{}_dndx_{}", label, section.medium.components()[index].name),
                    section.table_hash("dndx", &energy_axis, Some(index)),
                    verbose,
                    || {
                        Interpolant2::build(
                            energy_axis.clone(),
                            fraction_axis.clone(),
                            false,
                            |energy, fraction| section.rate_below_fraction(index, energy, fraction),
                        )
                    },
                )
            })
            .collect();

        section.tables = Some(CrossSectionTables { dedx, de2dx, dndx });
        section
    }

    /// Hash identifying one table of this cross section, covering the
    /// full physics configuration and the axis layout.
    fn table_hash(&self, label: &str, axis: &Axis, component_index: Option<usize>) -> u64 {
        let mut state = 0;
        hash_str(&mut state, label);
        self.parametrization.hash_into(&mut state);
        self.particle.hash_into(&mut state);
        self.medium.hash_into(&mut state);
        self.cuts.hash_into(&mut state);
        hash_combine(&mut state, self.multiplier.to_bits());
        axis.hash_into(&mut state);
        if let Some(index) = component_index {
            hash_combine(&mut state, index as u64);
        }
        state
    }

    /// Rate of losses with a relative loss between the cut and the
    /// scaled upper loss `v_up * (v_max / v_up)^fraction`, on one
    /// component [1/(g/cm^2)].
    fn rate_below_fraction(&self, component_index: usize, energy: f64, fraction: f64) -> f64 {
        let component = &self.medium.components()[component_index];
        let limits =
            self.parametrization
                .kinematic_limits(&self.particle, &self.medium, component, energy);
        let v_up = self.cuts.cut_clamped(&limits, energy);
        if v_up >= limits.v_max {
            return 0.0;
        }
        let v = v_up * f64::exp(fraction * f64::ln(limits.v_max / v_up));
        self.rate_below(component_index, energy, v_up, v)
    }

    /// Rate of losses with a relative loss in `[v_up, v]` on one
    /// component, by direct integration [1/(g/cm^2)].
    fn rate_below(&self, component_index: usize, energy: f64, v_up: f64, v: f64) -> f64 {
        let component = &self.medium.components()[component_index];
        if v <= v_up {
            return 0.0;
        }
        let integral = self.integrator.integrate_with_log(
            |w| {
                self.parametrization.differential_cross_section(
                    &self.particle,
                    &self.medium,
                    component,
                    energy,
                    w,
                )
            },
            v_up,
            v,
        );
        self.medium.atoms_per_gram(component) * integral
    }

    /// Whether the given energy falls below the tabulated range, where
    /// evaluation falls back to the direct formulas.
    fn below_tables(&self, energy: f64) -> bool {
        match &self.tables {
            Some(tables) => energy < tables.dedx.axis().min(),
            None => true,
        }
    }

    /// Mean continuous energy loss per grammage [MeV cm^2/g].
    pub fn dedx(&self, energy: f64) -> f64 {
        match &self.tables {
            Some(tables) if !self.below_tables(energy) => {
                self.multiplier * f64::max(tables.dedx.evaluate(energy), 0.0)
            }
            _ => {
                self.multiplier
                    * self.parametrization.dedx(
                        &self.particle,
                        &self.medium,
                        &self.cuts,
                        &self.integrator,
                        energy,
                    )
            }
        }
    }

    /// Variance rate of continuous losses per grammage [MeV^2 cm^2/g].
    pub fn de2dx(&self, energy: f64) -> f64 {
        match &self.tables {
            Some(tables) if !self.below_tables(energy) => {
                self.multiplier * f64::max(tables.de2dx.evaluate(energy), 0.0)
            }
            _ => {
                self.multiplier
                    * self.parametrization.de2dx(
                        &self.particle,
                        &self.medium,
                        &self.cuts,
                        &self.integrator,
                        energy,
                    )
            }
        }
    }

    /// Total rate of stochastic losses per grammage [1/(g/cm^2)].
    pub fn dndx(&self, energy: f64) -> f64 {
        (0..self.medium.components().len())
            .map(|index| self.dndx_component(energy, index))
            .sum()
    }

    /// Rate of stochastic losses on one component per grammage
    /// [1/(g/cm^2)].
    pub fn dndx_component(&self, energy: f64, component_index: usize) -> f64 {
        match &self.tables {
            Some(tables) if !self.below_tables(energy) => {
                self.multiplier
                    * f64::max(tables.dndx[component_index].evaluate(energy, 1.0), 0.0)
            }
            _ => {
                let component = &self.medium.components()[component_index];
                let limits = self.parametrization.kinematic_limits(
                    &self.particle,
                    &self.medium,
                    component,
                    energy,
                );
                let v_up = self.cuts.cut_clamped(&limits, energy);
                self.multiplier * self.rate_below(component_index, energy, v_up, limits.v_max)
            }
        }
    }

    /// Samples the relative loss of a stochastic interaction on one
    /// component.
    ///
    /// `portion` is the fraction of this component's total rate
    /// accumulated by the sampled loss, uniform in `(0, 1)`.
    pub fn sample_loss(&self, energy: f64, component_index: usize, portion: f64) -> f64 {
        let component = &self.medium.components()[component_index];
        let limits =
            self.parametrization
                .kinematic_limits(&self.particle, &self.medium, component, energy);
        let v_up = self.cuts.cut_clamped(&limits, energy);
        if v_up >= limits.v_max {
            return 0.0;
        }
        match &self.tables {
            Some(tables) if !self.below_tables(energy) => {
                let table = &tables.dndx[component_index];
                let rate = table.evaluate(energy, 1.0);
                if rate <= 0.0 {
                    return 0.0;
                }
                let fraction = invert_monotone(
                    |fraction| table.evaluate(energy, fraction),
                    0.0,
                    1.0,
                    portion * rate,
                    LOSS_INVERSION_PRECISION,
                );
                v_up * f64::exp(fraction * f64::ln(limits.v_max / v_up))
            }
            _ => {
                let rate = self.rate_below(component_index, energy, v_up, limits.v_max);
                if rate <= 0.0 {
                    return 0.0;
                }
                invert_monotone(
                    |v| self.rate_below(component_index, energy, v_up, v),
                    v_up,
                    limits.v_max,
                    portion * rate,
                    (limits.v_max - v_up) * LOSS_INVERSION_PRECISION,
                )
            }
        }
    }

    /// Event tag of the wrapped process.
    pub fn process(&self) -> EventType {
        self.parametrization.process()
    }

    /// Energy below which the process contributes nothing.
    pub fn lower_energy_limit(&self) -> f64 {
        self.parametrization
            .lower_energy_limit(&self.particle, &self.medium)
    }

    pub fn particle(&self) -> &ParticleDef {
        &self.particle
    }

    pub fn medium(&self) -> &Medium {
        &self.medium
    }

    pub fn cuts(&self) -> &EnergyCutSettings {
        &self.cuts
    }

    /// Folds the full physics configuration of this cross section into
    /// the given hash state.
    pub fn hash_into(&self, state: &mut u64) {
        self.parametrization.hash_into(state);
        self.particle.hash_into(state);
        self.medium.hash_into(state);
        self.cuts.hash_into(state);
        hash_combine(state, self.multiplier.to_bits());
    }
}

/// Builds the standard set of muon and tau energy loss processes:
/// ionization, bremsstrahlung, electron pair production and
/// photonuclear interaction.
#[allow(clippy::too_many_arguments)]
pub fn standard_cross_sections(
    particle: ParticleDef,
    medium: &Medium,
    cuts: &EnergyCutSettings,
    interpolate: bool,
    settings: &TableSettings,
    cache: &TableCache,
    verbose: Verbose,
) -> Vec<CrossSection> {
    let parametrizations: Vec<Box<dyn Parametrization>> = vec![
        Box::new(ionization::Ionization),
        Box::new(bremsstrahlung::Bremsstrahlung),
        Box::new(epair::EpairProduction::default()),
        Box::new(photonuclear::Photonuclear),
    ];
    parametrizations
        .into_iter()
        .map(|parametrization| {
            if interpolate {
                CrossSection::interpolant(
                    parametrization,
                    particle,
                    medium.clone(),
                    cuts.clone(),
                    1.0,
                    settings,
                    cache,
                    verbose,
                )
            } else {
                CrossSection::integral(parametrization, particle, medium.clone(), cuts.clone(), 1.0)
            }
        })
        .collect()
}
