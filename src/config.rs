//! Declarative configuration of complete propagation setups.

use crate::crosssection::{standard_cross_sections, EnergyCutSettings, TableSettings};
use crate::density::{DensityDistribution, Exponential, Homogeneous};
use crate::error::{TransportError, TransportResult};
use crate::geometry::{Cuboid, Cylinder, Geometry, Point3, Sphere, Vec3};
use crate::interpolation::cache::TableCache;
use crate::io::Verbose;
use crate::medium::{medium_by_name, Medium};
use crate::particle::{particle_by_name, ParticleDef};
use crate::propagation::{Propagator, Sector};
use crate::scattering::{Highland, NoScattering, Scattering};
use crate::utility::{Utility, UtilityOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Complete description of a propagation setup, deserialized from JSON
/// and turned into a ready [`Propagator`] with [`build`](Self::build).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Name of the propagated particle species.
    pub particle: String,
    /// Settings shared by all sectors.
    #[serde(default)]
    pub global: GlobalConfig,
    /// The sectors making up the propagation volume.
    pub sectors: Vec<SectorConfig>,
}

/// Settings applying to every sector of a setup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Whether to evaluate cross sections and propagation integrals
    /// from interpolation tables rather than by exact integration.
    #[serde(default = "GlobalConfig::default_do_interpolation")]
    pub do_interpolation: bool,
    /// Whether to obtain elapsed times from the exact time integral
    /// rather than assuming propagation at the speed of light.
    #[serde(default = "GlobalConfig::default_exact_time")]
    pub exact_time: bool,
    /// Name of the multiple scattering model, `"highland"` or `"none"`.
    #[serde(default = "GlobalConfig::default_scattering")]
    pub scattering: String,
    /// Thresholds separating continuous from stochastic energy losses.
    #[serde(default)]
    pub cuts: CutConfig,
    /// Directory where interpolation tables are persisted, or `null`
    /// to keep them in memory only.
    #[serde(default)]
    pub table_directory: Option<PathBuf>,
    /// Resolution of the interpolation tables.
    #[serde(default)]
    pub interpolation: TableSettings,
}

impl GlobalConfig {
    fn default_do_interpolation() -> bool {
        true
    }

    fn default_exact_time() -> bool {
        true
    }

    fn default_scattering() -> String {
        "highland".to_string()
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            do_interpolation: Self::default_do_interpolation(),
            exact_time: Self::default_exact_time(),
            scattering: Self::default_scattering(),
            cuts: CutConfig::default(),
            table_directory: None,
            interpolation: TableSettings::default(),
        }
    }
}

/// Energy cut thresholds, with `null` disabling the respective cut.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CutConfig {
    /// Absolute energy cut [MeV], or `null` for no absolute cut.
    #[serde(default = "CutConfig::default_e_cut")]
    pub e_cut: Option<f64>,
    /// Relative energy cut, or `null` for no relative cut.
    #[serde(default = "CutConfig::default_v_cut")]
    pub v_cut: Option<f64>,
    /// Whether continuous losses are randomized over each step.
    #[serde(default)]
    pub continuous_randomization: bool,
}

impl CutConfig {
    fn default_e_cut() -> Option<f64> {
        Some(500.0)
    }

    fn default_v_cut() -> Option<f64> {
        Some(0.05)
    }

    fn build(&self) -> TransportResult<EnergyCutSettings> {
        EnergyCutSettings::new(
            self.e_cut.unwrap_or(f64::INFINITY),
            self.v_cut.unwrap_or(1.0),
            self.continuous_randomization,
        )
    }
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            e_cut: Self::default_e_cut(),
            v_cut: Self::default_v_cut(),
            continuous_randomization: false,
        }
    }
}

/// One sector of the propagation volume.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SectorConfig {
    /// Name of the medium filling the sector.
    pub medium: String,
    /// Rank deciding which sector wins where geometries overlap.
    pub hierarchy: u32,
    /// Shape of the sector.
    pub geometry: GeometryConfig,
    /// Mass density profile over the sector, homogeneous by default.
    #[serde(default)]
    pub density: DensityConfig,
}

/// Shape of a sector. Distances are in cm, with cylinders aligned
/// with the z axis.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum GeometryConfig {
    Sphere {
        center: [f64; 3],
        radius: f64,
        #[serde(default)]
        inner_radius: f64,
    },
    Cuboid {
        center: [f64; 3],
        size: [f64; 3],
    },
    Cylinder {
        center: [f64; 3],
        radius: f64,
        #[serde(default)]
        inner_radius: f64,
        height: f64,
    },
}

impl GeometryConfig {
    fn build(&self, hierarchy: u32) -> TransportResult<Arc<dyn Geometry>> {
        match self {
            Self::Sphere {
                center,
                radius,
                inner_radius,
            } => Ok(Arc::new(Sphere::shell(
                point(center),
                *radius,
                *inner_radius,
                hierarchy,
            )?)),
            Self::Cuboid { center, size } => {
                Ok(Arc::new(Cuboid::new(point(center), vector(size), hierarchy)?))
            }
            Self::Cylinder {
                center,
                radius,
                inner_radius,
                height,
            } => Ok(Arc::new(Cylinder::tube(
                point(center),
                *radius,
                *inner_radius,
                *height,
                hierarchy,
            )?)),
        }
    }
}

/// Mass density profile of a sector, scaled so that the profile at the
/// origin matches the nominal density of the sector medium.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "profile", rename_all = "snake_case")]
pub enum DensityConfig {
    #[default]
    Homogeneous,
    Exponential {
        axis: [f64; 3],
        scale_length: f64,
    },
}

impl DensityConfig {
    fn build(&self, medium: &Medium) -> TransportResult<Arc<dyn DensityDistribution>> {
        match self {
            Self::Homogeneous => Ok(Arc::new(Homogeneous::new(medium.mass_density())?)),
            Self::Exponential { axis, scale_length } => Ok(Arc::new(Exponential::new(
                vector(axis),
                *scale_length,
                medium.mass_density(),
            )?)),
        }
    }
}

fn point(coords: &[f64; 3]) -> Point3 {
    Point3::new(coords[0], coords[1], coords[2])
}

fn vector(components: &[f64; 3]) -> Vec3 {
    Vec3::new(components[0], components[1], components[2])
}

fn scattering_by_name(
    name: &str,
    particle: ParticleDef,
    medium: &Medium,
) -> TransportResult<Box<dyn Scattering>> {
    match name {
        "highland" => Ok(Box::new(Highland::new(particle, medium))),
        "none" => Ok(Box::new(NoScattering)),
        _ => Err(TransportError::Config(format!(
            "unknown scattering model {:?}, expected \"highland\" or \"none\"",
            name
        ))),
    }
}

impl PropagationConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> TransportResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> TransportResult<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Assembles the propagator this configuration describes.
    ///
    /// All interpolation tables are built (or loaded from the table
    /// directory) here, so the returned propagator transports particles
    /// without further setup work. Sectors sharing a medium also share
    /// their propagation utilities.
    pub fn build(&self, verbose: Verbose) -> TransportResult<Propagator> {
        let particle = particle_by_name(&self.particle)?;
        let cuts = self.global.cuts.build()?;
        if let Some(directory) = &self.global.table_directory {
            fs::create_dir_all(directory)?;
        }
        let cache = TableCache::new(self.global.table_directory.clone());
        let options = UtilityOptions {
            do_interpolation: self.global.do_interpolation,
            exact_time: self.global.exact_time,
        };

        let mut utilities: HashMap<String, Arc<Utility>> = HashMap::new();
        let mut sectors = Vec::with_capacity(self.sectors.len());
        for sector in &self.sectors {
            let medium = medium_by_name(&sector.medium)?;
            let utility = match utilities.get(&sector.medium) {
                Some(utility) => Arc::clone(utility),
                None => {
                    let cross_sections = standard_cross_sections(
                        particle,
                        &medium,
                        &cuts,
                        self.global.do_interpolation,
                        &self.global.interpolation,
                        &cache,
                        verbose,
                    );
                    let scattering =
                        scattering_by_name(&self.global.scattering, particle, &medium)?;
                    let utility = Arc::new(Utility::new(
                        particle,
                        cross_sections,
                        scattering,
                        &options,
                        &self.global.interpolation,
                        &cache,
                        verbose,
                    )?);
                    utilities.insert(sector.medium.clone(), Arc::clone(&utility));
                    utility
                }
            };
            sectors.push(Sector {
                geometry: sector.geometry.build(sector.hierarchy)?,
                utility,
                density: sector.density.build(&medium)?,
            });
        }
        Propagator::new(sectors)
    }
}
