use lazy_static::lazy_static;
use overburden::crosssection::{
    ionization::Ionization, CrossSection, EnergyCutSettings, TableSettings,
};
use overburden::density::Homogeneous;
use overburden::geometry::{Point3, Sphere, Vec3};
use overburden::interpolation::cache::TableCache;
use overburden::io::Verbose;
use overburden::medium::{Medium, STANDARD_ROCK};
use overburden::particle::{EventType, ParticleDef, ParticleState, Track, MUON_MINUS};
use overburden::propagation::Sector;
use overburden::scattering::NoScattering;
use overburden::utility::{Utility, UtilityOptions};
use std::sync::Arc;

/// Builds propagation utilities with ionization as the only energy
/// loss process, evaluated by exact integration and without multiple
/// scattering.
pub fn ionization_utility(
    particle: ParticleDef,
    medium: &Medium,
    cuts: EnergyCutSettings,
    exact_time: bool,
) -> Arc<Utility> {
    let section = CrossSection::integral(Box::new(Ionization), particle, medium.clone(), cuts, 1.0);
    Arc::new(
        Utility::new(
            particle,
            vec![section],
            Box::new(NoScattering),
            &UtilityOptions {
                do_interpolation: false,
                exact_time,
            },
            &TableSettings::default(),
            &TableCache::new(None),
            Verbose::No,
        )
        .unwrap(),
    )
}

/// Cut settings that leave every energy loss continuous.
pub fn continuous_cuts() -> EnergyCutSettings {
    EnergyCutSettings::new(f64::INFINITY, 1.0, false).unwrap()
}

/// Cut settings treating losses above the given absolute threshold
/// [MeV] as stochastic.
pub fn stochastic_cuts(e_cut: f64) -> EnergyCutSettings {
    EnergyCutSettings::new(e_cut, 1.0, false).unwrap()
}

/// A homogeneous sector bounded by a sphere around the origin.
pub fn sphere_sector(
    utility: &Arc<Utility>,
    medium: &Medium,
    radius: f64,
    hierarchy: u32,
) -> Sector {
    Sector {
        geometry: Arc::new(Sphere::new(Point3::origin(), radius, hierarchy).unwrap()),
        utility: Arc::clone(utility),
        density: Arc::new(Homogeneous::new(medium.mass_density()).unwrap()),
    }
}

/// A muon starting from the origin along the z axis with the given
/// total energy [MeV].
pub fn muon_along_z(energy: f64) -> ParticleState {
    ParticleState::new(
        MUON_MINUS,
        Point3::origin(),
        Vec3::new(0.0, 0.0, 1.0),
        energy,
    )
}

lazy_static! {
    /// Muons in standard rock with purely continuous energy losses.
    pub static ref CONTINUOUS_ROCK: Arc<Utility> =
        ionization_utility(MUON_MINUS, &STANDARD_ROCK, continuous_cuts(), false);
}

/// Asserts the bookkeeping every recorded track obeys: the first
/// state is the initial one, directions stay normalized, energy never
/// grows and distance and time never shrink.
pub fn assert_track_is_consistent(track: &Track) {
    let states = track.states();
    assert!(!states.is_empty(), "Track holds no states");
    assert!(
        matches!(states[0].event, EventType::Initial),
        "First track state carries event {:?} instead of the initial event",
        states[0].event
    );
    for (index, state) in states.iter().enumerate() {
        assert!(
            (state.direction.length() - 1.0).abs() < 1e-9,
            "Direction of state {} has length {}",
            index,
            state.direction.length()
        );
        assert!(
            state.energy >= state.particle.mass,
            "Energy {} of state {} lies below the rest mass",
            state.energy,
            index
        );
    }
    for (index, pair) in states.windows(2).enumerate() {
        assert!(
            pair[1].energy <= pair[0].energy,
            "Energy grew from {} to {} between states {} and {}",
            pair[0].energy,
            pair[1].energy,
            index,
            index + 1
        );
        assert!(
            pair[1].propagated_distance >= pair[0].propagated_distance,
            "Distance shrank from {} to {} between states {} and {}",
            pair[0].propagated_distance,
            pair[1].propagated_distance,
            index,
            index + 1
        );
        assert!(
            pair[1].time >= pair[0].time,
            "Time ran backwards from {} to {} between states {} and {}",
            pair[0].time,
            pair[1].time,
            index,
            index + 1
        );
    }
}
