//! The transport loop stepping particles through a sectored world.
//!
//! A [`Propagator`] owns a list of [`Sector`]s, each pairing a shape
//! with the propagation utilities of its medium and a density profile.
//! Propagation alternates continuous advances with discrete events
//! until the particle decays, falls below the energy floor or covers
//! the requested distance. Each advance is limited by the most
//! restrictive of the continuous energy loss, the remaining distance
//! budget and the sector geometry.

use crate::constants::PARTICLE_POSITION_RESOLUTION;
use crate::density::DensityDistribution;
use crate::error::{TransportError, TransportResult};
use crate::geometry::{Geometry, Point3, Vec3};
use crate::particle::{EventType, ParticleState, Track};
use crate::random::{RandomSource, SeededRandom};
use crate::utility::Utility;
use rayon::prelude::*;
use std::sync::Arc;

/// Cap on fixed-point iterations of the border crossing search.
const MAX_BORDER_ITERATIONS: usize = 100;

/// What limited a continuous advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Advancement {
    ReachedInteraction,
    ReachedMaxDistance,
    ReachedAdaptiveSteplength,
    ReachedBorder,
}

/// One region of the propagation world.
#[derive(Clone, Debug)]
pub struct Sector {
    /// Shape delimiting the region.
    pub geometry: Arc<dyn Geometry>,
    /// Propagation utilities of the region's medium.
    pub utility: Arc<Utility>,
    /// Mass density profile inside the region.
    pub density: Arc<dyn DensityDistribution>,
}

/// Transports particles of one species through a sectored world.
#[derive(Debug)]
pub struct Propagator {
    sectors: Vec<Sector>,
}

impl Propagator {
    /// Creates a propagator from the sectors making up the world.
    ///
    /// All sectors must carry utilities of the same particle species.
    pub fn new(sectors: Vec<Sector>) -> TransportResult<Self> {
        let Some(first) = sectors.first() else {
            return Err(TransportError::Config(
                "a propagator needs at least one sector".to_string(),
            ));
        };
        let particle = first.utility.particle().name;
        for sector in &sectors {
            if sector.utility.particle().name != particle {
                return Err(TransportError::Config(format!(
                    "sectors mix particle species {} and {}",
                    particle,
                    sector.utility.particle().name
                )));
            }
        }
        Ok(Self { sectors })
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Propagates a particle until it decays, falls below the energy
    /// floor or covers `max_distance` [cm].
    ///
    /// The effective floor is the largest of `min_energy`, the rest
    /// mass and the lower limit of the active sector's energy loss
    /// description. Fails when no sector contains the particle
    /// position.
    pub fn propagate<R: RandomSource>(
        &self,
        initial: &ParticleState,
        max_distance: f64,
        min_energy: f64,
        random: &mut R,
    ) -> TransportResult<Track> {
        let mut track = Track::new(initial.clone());

        loop {
            let (position, direction, energy, propagated_distance) = {
                let state = track.terminal();
                (
                    state.position,
                    state.direction,
                    state.energy,
                    state.propagated_distance,
                )
            };

            let sector = self.choose_sector(&position, &direction)?;
            let floor = f64::max(
                f64::max(min_energy, initial.particle.mass),
                sector.utility.lower_limit(),
            );
            if energy <= floor {
                track.set_terminal_event(EventType::BelowMinimalEnergy);
                break;
            }
            if max_distance - propagated_distance <= 0.0 {
                track.set_terminal_event(EventType::MaxDistanceReached);
                break;
            }

            // Candidate interaction energies, in tie-break order: the
            // energy floor, decay and stochastic loss. The highest
            // candidate needs the least energy loss and fires first.
            let local_density = sector.density.evaluate(&position);
            let candidates = [
                floor,
                sector
                    .utility
                    .energy_decay(energy, random.uniform(), local_density),
                sector.utility.energy_interaction(energy, random.uniform()),
            ];
            let winner = maximize(&candidates);

            let advancement =
                self.advance_particle(&mut track, sector, candidates[winner], max_distance, random)?;

            match advancement {
                Advancement::ReachedBorder | Advancement::ReachedAdaptiveSteplength => continue,
                Advancement::ReachedMaxDistance => {
                    track.set_terminal_event(EventType::MaxDistanceReached);
                    break;
                }
                Advancement::ReachedInteraction => match winner {
                    0 => {
                        track.set_terminal_event(EventType::BelowMinimalEnergy);
                        break;
                    }
                    1 => {
                        let mut decayed = track.terminal().clone();
                        decayed.event = EventType::Decay;
                        track.push(decayed);
                        break;
                    }
                    _ => {
                        let current = track.terminal().clone();
                        match sector
                            .utility
                            .energy_stochastic_loss(current.energy, random.uniform())
                        {
                            Some(sampled) => {
                                let mut after = current;
                                after.energy -= sampled.loss;
                                after.event = sampled.process;
                                track.push(after);
                                if track.terminal().energy <= floor {
                                    break;
                                }
                            }
                            None => {
                                track.set_terminal_event(EventType::BelowMinimalEnergy);
                                break;
                            }
                        }
                    }
                },
            }
        }
        Ok(track)
    }

    /// Propagates `count` particles from the same initial state with
    /// per-track seeds derived from `base_seed`, in parallel.
    pub fn propagate_batch(
        &self,
        initial: &ParticleState,
        count: usize,
        max_distance: f64,
        min_energy: f64,
        base_seed: u64,
    ) -> TransportResult<Vec<Track>> {
        (0..count as u64)
            .into_par_iter()
            .map(|index| {
                let mut random = SeededRandom::new(base_seed.wrapping_add(index));
                self.propagate(initial, max_distance, min_energy, &mut random)
            })
            .collect()
    }

    /// Advances the terminal track state continuously towards
    /// `target_energy`, limited by the distance budget and the sector
    /// geometry, and appends the reached state.
    fn advance_particle<R: RandomSource>(
        &self,
        track: &mut Track,
        sector: &Sector,
        target_energy: f64,
        max_distance: f64,
        random: &mut R,
    ) -> TransportResult<Advancement> {
        let mut state = track.terminal().clone();
        let energy = state.energy;
        let budget = max_distance - state.propagated_distance;
        let density = &sector.density;

        // A fixed number of draws per advance keeps tracks reproducible
        // across scattering models.
        let scatter_draws = [
            random.uniform(),
            random.uniform(),
            random.uniform(),
            random.uniform(),
        ];
        let randomize_draw = random.uniform();

        // Candidate grammages, in tie-break order: continuous loss down
        // to the target energy, the distance budget and the adaptive
        // step near foreign geometry. The smallest wins.
        let adaptive_cap = self.adaptive_steplength(&state.position, sector, budget);
        let grammages = [
            sector.utility.length_continuous(energy, target_energy),
            density.calculate(&state.position, &state.direction, budget),
            density.calculate(&state.position, &state.direction, adaptive_cap),
        ];
        let choice = minimize(&grammages);
        let mut grammage = grammages[choice];
        let mut advancement = match choice {
            0 => Advancement::ReachedInteraction,
            1 => Advancement::ReachedMaxDistance,
            _ => Advancement::ReachedAdaptiveSteplength,
        };

        let mut energy_final = if choice == 0 {
            target_energy
        } else {
            sector.utility.energy_distance(energy, grammage)
        };
        let mut directions = sector.utility.directions_scatter(
            grammage,
            energy,
            energy_final,
            &state.direction,
            scatter_draws,
        );
        let mut distance = match advancement {
            Advancement::ReachedInteraction => {
                density.correct(&state.position, &directions.mean, grammage, budget)
            }
            Advancement::ReachedMaxDistance => budget,
            _ => adaptive_cap,
        };

        // When the step ends in another sector, re-solve it against the
        // border. Direction depends on step length and the border
        // depends on direction, so the crossing is found by fixed-point
        // iteration, reusing the drawn scattering numbers.
        let position = state.position.translated(&directions.mean, distance);
        let crossed = !Arc::ptr_eq(
            &self.choose_sector(&position, &directions.sampled)?.geometry,
            &sector.geometry,
        );
        if crossed {
            advancement = Advancement::ReachedBorder;
            let mut iterations = 0;
            loop {
                distance = self.distance_to_border(&state.position, &directions.mean, sector);
                grammage = density.calculate(&state.position, &state.direction, distance);
                energy_final = sector.utility.energy_distance(energy, grammage);
                directions = sector.utility.directions_scatter(
                    grammage,
                    energy,
                    energy_final,
                    &state.direction,
                    scatter_draws,
                );
                let control = self.distance_to_border(&state.position, &directions.mean, sector);
                if (control - distance).abs() <= PARTICLE_POSITION_RESOLUTION {
                    distance = control;
                    break;
                }
                iterations += 1;
                if iterations >= MAX_BORDER_ITERATIONS {
                    return Err(TransportError::BorderCrossingDiverged {
                        max_iterations: MAX_BORDER_ITERATIONS,
                        last_correction: (control - distance).abs(),
                    });
                }
            }
        }

        state.time += sector.utility.time_elapsed(
            energy,
            energy_final,
            distance,
            density.evaluate(&state.position),
        );
        state.position = state.position.translated(&directions.mean, distance);
        state.direction = directions.sampled;
        state.propagated_distance += distance;
        state.energy = sector
            .utility
            .energy_randomize(energy, energy_final, randomize_draw);
        state.event = EventType::ContinuousEnergyLoss;
        track.push(state);
        Ok(advancement)
    }

    /// Selects the sector containing the given position, the highest
    /// hierarchy winning where geometries overlap.
    fn choose_sector(&self, position: &Point3, direction: &Vec3) -> TransportResult<&Sector> {
        let mut best: Option<&Sector> = None;
        for sector in &self.sectors {
            if !sector.geometry.is_inside(position, direction) {
                continue;
            }
            let better = match best {
                Some(current) => sector.geometry.hierarchy() > current.geometry.hierarchy(),
                None => true,
            };
            if better {
                best = Some(sector);
            }
        }
        best.ok_or(TransportError::NoSectorAtPosition(*position))
    }

    /// Step length from the given position that cannot carry the
    /// particle through a foreign geometry of equal or higher
    /// hierarchy unnoticed, up to `cap` [cm].
    fn adaptive_steplength(&self, position: &Point3, sector: &Sector, cap: f64) -> f64 {
        let mut steplength = cap;
        for other in &self.sectors {
            if Arc::ptr_eq(&other.geometry, &sector.geometry)
                || other.geometry.hierarchy() < sector.geometry.hierarchy()
            {
                continue;
            }
            let candidate = other.geometry.adaptive_steplength(position, steplength);
            if candidate > PARTICLE_POSITION_RESOLUTION && candidate < steplength {
                steplength = candidate;
            }
        }
        steplength
    }

    /// Distance along `direction` to the surface at which the active
    /// sector changes: the exit of the current geometry or the entry
    /// into an overriding geometry of higher hierarchy [cm].
    fn distance_to_border(&self, position: &Point3, direction: &Vec3, sector: &Sector) -> f64 {
        let (exit, _) = sector.geometry.distance_to_border(position, direction);
        let mut border = f64::max(exit, 0.0);
        for other in &self.sectors {
            if Arc::ptr_eq(&other.geometry, &sector.geometry)
                || other.geometry.hierarchy() <= sector.geometry.hierarchy()
            {
                continue;
            }
            let (entry, _) = other.geometry.distance_to_border(position, direction);
            if entry > 0.0 && entry < border {
                border = entry;
            }
        }
        border
    }
}

/// Index of the highest value, the first of equals winning.
fn maximize(values: &[f64]) -> usize {
    let mut winner = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[winner] {
            winner = index;
        }
    }
    winner
}

/// Index of the lowest value, the first of equals winning.
fn minimize(values: &[f64]) -> usize {
    let mut winner = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value < values[winner] {
            winner = index;
        }
    }
    winner
}
