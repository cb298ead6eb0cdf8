//! Propagated particle species and their recorded states.

use crate::constants::{M_ELECTRON, M_MUON, M_TAU, TAU_MUON, TAU_TAU};
use crate::error::{TransportError, TransportResult};
use crate::geometry::{Point3, Vec3};
use crate::interpolation::cache::hash_combine;
use serde::Serialize;

/// Static properties of a propagated particle species.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ParticleDef {
    pub name: &'static str,
    /// Rest mass [MeV].
    pub mass: f64,
    /// Electric charge in units of the elementary charge.
    pub charge: f64,
    /// Mean lifetime at rest [ns], or `None` for stable particles.
    pub lifetime: Option<f64>,
}

pub const MUON_MINUS: ParticleDef = ParticleDef {
    name: "mu_minus",
    mass: M_MUON,
    charge: -1.0,
    lifetime: Some(TAU_MUON),
};

pub const MUON_PLUS: ParticleDef = ParticleDef {
    name: "mu_plus",
    mass: M_MUON,
    charge: 1.0,
    lifetime: Some(TAU_MUON),
};

pub const TAU_MINUS: ParticleDef = ParticleDef {
    name: "tau_minus",
    mass: M_TAU,
    charge: -1.0,
    lifetime: Some(TAU_TAU),
};

pub const TAU_PLUS: ParticleDef = ParticleDef {
    name: "tau_plus",
    mass: M_TAU,
    charge: 1.0,
    lifetime: Some(TAU_TAU),
};

pub const ELECTRON: ParticleDef = ParticleDef {
    name: "e_minus",
    mass: M_ELECTRON,
    charge: -1.0,
    lifetime: None,
};

pub const POSITRON: ParticleDef = ParticleDef {
    name: "e_plus",
    mass: M_ELECTRON,
    charge: 1.0,
    lifetime: None,
};

impl ParticleDef {
    /// Folds the properties entering cross section values into the
    /// given hash state.
    pub fn hash_into(&self, state: &mut u64) {
        hash_combine(state, self.mass.to_bits());
        hash_combine(state, self.charge.to_bits());
        hash_combine(state, self.lifetime.is_some() as u64);
        hash_combine(state, self.lifetime.unwrap_or(0.0).to_bits());
    }
}

/// Looks up a particle species by its configuration name.
pub fn particle_by_name(name: &str) -> TransportResult<ParticleDef> {
    match name {
        "mu_minus" => Ok(MUON_MINUS),
        "mu_plus" => Ok(MUON_PLUS),
        "tau_minus" => Ok(TAU_MINUS),
        "tau_plus" => Ok(TAU_PLUS),
        "e_minus" => Ok(ELECTRON),
        "e_plus" => Ok(POSITRON),
        _ => Err(TransportError::Config(format!(
            "unknown particle {:?}, expected one of mu_minus, mu_plus, tau_minus, \
             tau_plus, e_minus, e_plus",
            name
        ))),
    }
}

/// The event that produced a recorded particle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EventType {
    /// The state the propagation started from.
    Initial,
    /// A continuous advance between two discrete events.
    ContinuousEnergyLoss,
    /// A sampled delta-ray knock-on loss.
    Ionization,
    /// A sampled bremsstrahlung photon emission.
    Bremsstrahlung,
    /// A sampled electron pair production.
    EpairProduction,
    /// A sampled photonuclear interaction.
    Photonuclear,
    /// The particle decayed in flight.
    Decay,
    /// The particle energy fell to the propagation energy floor.
    BelowMinimalEnergy,
    /// The particle covered the full requested distance.
    MaxDistanceReached,
}

/// One recorded state of a particle along its track.
#[derive(Clone, Debug, Serialize)]
pub struct ParticleState {
    pub particle: ParticleDef,
    pub position: Point3,
    /// Unit direction of motion.
    pub direction: Vec3,
    /// Total energy including the rest mass [MeV].
    pub energy: f64,
    /// Path length covered since the initial state [cm].
    pub propagated_distance: f64,
    /// Time elapsed since the initial state [ns].
    pub time: f64,
    /// The event that produced this state.
    pub event: EventType,
}

impl ParticleState {
    /// Creates an initial state at the given position, moving along
    /// `direction` with the given total energy [MeV].
    pub fn new(particle: ParticleDef, position: Point3, direction: Vec3, energy: f64) -> Self {
        assert!(
            energy >= particle.mass,
            "Total energy {} lies below the rest mass {} of {}",
            energy,
            particle.mass,
            particle.name
        );
        Self {
            particle,
            position,
            direction: direction.normalized(),
            energy,
            propagated_distance: 0.0,
            time: 0.0,
            event: EventType::Initial,
        }
    }

    /// Momentum of the particle [MeV].
    pub fn momentum(&self) -> f64 {
        f64::sqrt(f64::max(
            self.energy * self.energy - self.particle.mass * self.particle.mass,
            0.0,
        ))
    }
}

/// The ordered sequence of states a propagated particle went through.
///
/// States are only ever appended, one per notable event, so the first
/// entry is the initial state and the last one carries the reason the
/// propagation ended.
#[derive(Clone, Debug, Serialize)]
pub struct Track {
    states: Vec<ParticleState>,
}

impl Track {
    pub fn new(initial: ParticleState) -> Self {
        Self {
            states: vec![initial],
        }
    }

    pub fn push(&mut self, state: ParticleState) {
        debug_assert!(
            (state.direction.length() - 1.0).abs() < 1e-9,
            "Track state direction {} is not a unit vector",
            state.direction
        );
        debug_assert!(state.energy >= 0.0);
        debug_assert!(state.propagated_distance >= self.terminal().propagated_distance);
        self.states.push(state);
    }

    pub fn states(&self) -> &[ParticleState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn initial(&self) -> &ParticleState {
        &self.states[0]
    }

    pub fn terminal(&self) -> &ParticleState {
        self.states.last().expect("Track should never be empty")
    }

    /// Replaces the event tag of the terminal state, recording why the
    /// propagation ended.
    pub fn set_terminal_event(&mut self, event: EventType) {
        self.states
            .last_mut()
            .expect("Track should never be empty")
            .event = event;
    }
}
