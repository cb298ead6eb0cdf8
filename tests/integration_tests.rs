mod common;

use common::{
    assert_track_is_consistent, continuous_cuts, ionization_utility, muon_along_z, sphere_sector,
    stochastic_cuts, CONTINUOUS_ROCK,
};
use overburden::config::PropagationConfig;
use overburden::constants::CLIGHT;
use overburden::geometry::{Point3, Vec3};
use overburden::io::Verbose;
use overburden::medium::{STANDARD_ROCK, WATER};
use overburden::particle::{EventType, ParticleState, MUON_MINUS, TAU_MINUS};
use overburden::propagation::Propagator;
use overburden::random::SeededRandom;

#[test]
fn continuous_transport_stops_at_the_distance_budget() {
    let propagator = Propagator::new(vec![sphere_sector(
        &CONTINUOUS_ROCK,
        &STANDARD_ROCK,
        1e6,
        0,
    )])
    .unwrap();
    let mut random = SeededRandom::new(1);
    let track = propagator
        .propagate(&muon_along_z(1e5), 100.0, 1e3, &mut random)
        .unwrap();

    assert_track_is_consistent(&track);
    assert_eq!(track.len(), 2);
    let terminal = track.terminal();
    assert!(matches!(terminal.event, EventType::MaxDistanceReached));
    assert_eq!(terminal.propagated_distance, 100.0);
    // 265 g/cm^2 of rock at roughly 2-3 MeV cm^2/g.
    let loss = 1e5 - terminal.energy;
    assert!(
        loss > 300.0 && loss < 1200.0,
        "Energy loss {} over 100 cm of rock is out of range",
        loss
    );
}

#[test]
fn particle_starting_below_the_energy_floor_never_moves() {
    let propagator = Propagator::new(vec![sphere_sector(
        &CONTINUOUS_ROCK,
        &STANDARD_ROCK,
        1e6,
        0,
    )])
    .unwrap();
    let mut random = SeededRandom::new(1);
    let track = propagator
        .propagate(&muon_along_z(1e4), 1e6, 2e4, &mut random)
        .unwrap();

    assert_eq!(track.len(), 1);
    let terminal = track.terminal();
    assert!(matches!(terminal.event, EventType::BelowMinimalEnergy));
    assert_eq!(terminal.propagated_distance, 0.0);
    assert_eq!(terminal.energy, 1e4);
}

#[test]
fn continuous_transport_stops_exactly_at_the_energy_floor() {
    let propagator = Propagator::new(vec![sphere_sector(
        &CONTINUOUS_ROCK,
        &STANDARD_ROCK,
        1e9,
        0,
    )])
    .unwrap();
    let mut random = SeededRandom::new(1);
    let track = propagator
        .propagate(&muon_along_z(1e5), 1e9, 5e4, &mut random)
        .unwrap();

    assert_track_is_consistent(&track);
    assert_eq!(track.len(), 2);
    let terminal = track.terminal();
    assert!(matches!(terminal.event, EventType::BelowMinimalEnergy));
    assert_eq!(terminal.energy, 5e4);
    // Slowing from 100 to 50 GeV takes roughly 2e4 g/cm^2 of rock.
    assert!(
        terminal.propagated_distance > 4e3 && terminal.propagated_distance < 1.5e4,
        "Stopping distance {} cm is out of range",
        terminal.propagated_distance
    );
}

#[test]
fn border_crossings_snap_to_the_sector_surface() {
    let propagator = Propagator::new(vec![
        sphere_sector(&CONTINUOUS_ROCK, &STANDARD_ROCK, 1e4, 0),
        sphere_sector(&CONTINUOUS_ROCK, &STANDARD_ROCK, 50.0, 1),
    ])
    .unwrap();
    let mut random = SeededRandom::new(1);
    let track = propagator
        .propagate(&muon_along_z(1e5), 200.0, 1e3, &mut random)
        .unwrap();

    assert_track_is_consistent(&track);
    assert_eq!(track.len(), 3);
    let states = track.states();
    assert!(
        (states[1].propagated_distance - 50.0).abs() < 1e-9,
        "Border state sits at {} cm instead of the surface at 50 cm",
        states[1].propagated_distance
    );
    assert_eq!(states[2].propagated_distance, 200.0);
    // Without scattering the track runs straight up the z axis.
    for state in states {
        assert!((state.position.z() - state.propagated_distance).abs() < 1e-9);
        assert!(state.position.x().abs() < 1e-12 && state.position.y().abs() < 1e-12);
    }
}

#[test]
fn stochastic_losses_interleave_with_continuous_steps() {
    let utility = ionization_utility(
        MUON_MINUS,
        &STANDARD_ROCK,
        stochastic_cuts(100.0),
        false,
    );
    let propagator =
        Propagator::new(vec![sphere_sector(&utility, &STANDARD_ROCK, 1e9, 0)]).unwrap();
    let mut random = SeededRandom::new(42);
    let track = propagator
        .propagate(&muon_along_z(1e5), 1.5e4, 1e4, &mut random)
        .unwrap();

    assert_track_is_consistent(&track);
    let states = track.states();
    let mut knock_ons = 0;
    for pair in states.windows(2) {
        if matches!(pair[1].event, EventType::Ionization) {
            knock_ons += 1;
            let drop = pair[0].energy - pair[1].energy;
            assert!(
                drop >= 99.9,
                "Sampled knock-on loss {} lies below the 100 MeV cut",
                drop
            );
            assert_eq!(
                pair[0].propagated_distance, pair[1].propagated_distance,
                "Stochastic loss moved the particle"
            );
        }
    }
    assert!(
        knock_ons >= 1,
        "No knock-on losses sampled over {} cm",
        track.terminal().propagated_distance
    );
    assert!(track.terminal().energy <= 1e4 + 1e-6);
}

#[test]
fn taus_decay_in_flight() {
    let utility = ionization_utility(TAU_MINUS, &STANDARD_ROCK, continuous_cuts(), true);
    let propagator =
        Propagator::new(vec![sphere_sector(&utility, &STANDARD_ROCK, 1e6, 0)]).unwrap();
    let initial = ParticleState::new(
        TAU_MINUS,
        Point3::origin(),
        Vec3::new(0.0, 0.0, 1.0),
        1e5,
    );
    let mut random = SeededRandom::new(5);
    let track = propagator.propagate(&initial, 1e4, 2e3, &mut random).unwrap();

    assert_track_is_consistent(&track);
    let terminal = track.terminal();
    assert!(matches!(terminal.event, EventType::Decay));
    // A 100 GeV tau lives for a fraction of a nanosecond.
    assert!(
        terminal.propagated_distance > 1e-6 && terminal.propagated_distance < 100.0,
        "Tau decayed after {} cm",
        terminal.propagated_distance
    );
    let ratio = terminal.time * CLIGHT / terminal.propagated_distance;
    assert!(
        ratio >= 0.9999 && ratio < 1.01,
        "Elapsed time corresponds to {} times the speed of light",
        1.0 / ratio
    );
}

#[test]
fn inner_sector_overrides_the_enclosing_one() {
    let water_utility = ionization_utility(
        MUON_MINUS,
        &WATER,
        continuous_cuts(),
        false,
    );
    let propagator = Propagator::new(vec![
        sphere_sector(&water_utility, &WATER, 1e4, 0),
        sphere_sector(&CONTINUOUS_ROCK, &STANDARD_ROCK, 100.0, 1),
    ])
    .unwrap();
    let mut random = SeededRandom::new(1);
    let track = propagator
        .propagate(&muon_along_z(1e5), 200.0, 1e3, &mut random)
        .unwrap();

    assert_track_is_consistent(&track);
    assert_eq!(track.len(), 3);
    let states = track.states();
    assert!((states[1].propagated_distance - 100.0).abs() < 1e-9);
    // Rock absorbs a good factor of two more per cm than water.
    let rate_rock = (states[0].energy - states[1].energy) / 100.0;
    let rate_water = (states[1].energy - states[2].energy) / 100.0;
    assert!(
        rate_rock > 1.5 * rate_water,
        "Loss rates {} and {} MeV/cm do not reflect the rock over water hierarchy",
        rate_rock,
        rate_water
    );
}

#[test]
fn batches_are_reproducible_from_their_seed() {
    let utility = ionization_utility(
        MUON_MINUS,
        &STANDARD_ROCK,
        stochastic_cuts(100.0),
        false,
    );
    let propagator =
        Propagator::new(vec![sphere_sector(&utility, &STANDARD_ROCK, 1e9, 0)]).unwrap();
    let initial = muon_along_z(1e5);

    let first = propagator
        .propagate_batch(&initial, 4, 1.5e4, 1e4, 99)
        .unwrap();
    let second = propagator
        .propagate_batch(&initial, 4, 1.5e4, 1e4, 99)
        .unwrap();

    assert_eq!(first.len(), 4);
    for (track, repeat) in first.iter().zip(&second) {
        assert_eq!(track.len(), repeat.len());
        assert_eq!(track.terminal().energy, repeat.terminal().energy);
        assert_eq!(
            track.terminal().propagated_distance,
            repeat.terminal().propagated_distance
        );
    }
    let mut distances: Vec<f64> = first
        .iter()
        .map(|track| track.terminal().propagated_distance)
        .collect();
    distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
    distances.dedup();
    assert!(
        distances.len() >= 2,
        "All batch members stopped at the same distance"
    );
}

fn continuous_config_json(do_interpolation: bool) -> String {
    format!(
        r#"{{
            "particle": "mu_minus",
            "global": {{
                "do_interpolation": {},
                "exact_time": false,
                "scattering": "none",
                "cuts": {{"e_cut": null, "v_cut": 1.0, "continuous_randomization": false}},
                "interpolation": {{"nodes_cross_section": 50, "nodes_utility": 80, "max_energy": 1e7}}
            }},
            "sectors": [
                {{
                    "medium": "standard_rock",
                    "hierarchy": 0,
                    "geometry": {{"shape": "sphere", "center": [0.0, 0.0, 0.0], "radius": 1e6}}
                }}
            ]
        }}"#,
        do_interpolation
    )
}

#[test]
fn tabulated_transport_matches_exact_integration() {
    let exact = PropagationConfig::from_json_str(&continuous_config_json(false))
        .unwrap()
        .build(Verbose::No)
        .unwrap();
    let tabulated = PropagationConfig::from_json_str(&continuous_config_json(true))
        .unwrap()
        .build(Verbose::No)
        .unwrap();
    let initial = muon_along_z(1e5);

    let mut random = SeededRandom::new(3);
    let exact_track = exact.propagate(&initial, 500.0, 1e3, &mut random).unwrap();
    let mut random = SeededRandom::new(3);
    let tabulated_track = tabulated
        .propagate(&initial, 500.0, 1e3, &mut random)
        .unwrap();

    assert!(matches!(
        exact_track.terminal().event,
        EventType::MaxDistanceReached
    ));
    assert!(matches!(
        tabulated_track.terminal().event,
        EventType::MaxDistanceReached
    ));
    let exact_loss = 1e5 - exact_track.terminal().energy;
    let tabulated_loss = 1e5 - tabulated_track.terminal().energy;
    assert!(
        (tabulated_loss - exact_loss).abs() < 0.05 * exact_loss,
        "Tabulated loss {} deviates from the exactly integrated loss {}",
        tabulated_loss,
        exact_loss
    );
}

#[test]
fn persisted_tables_reproduce_in_memory_results() {
    let table_dir = tempfile::tempdir().unwrap();
    let mut config = PropagationConfig::from_json_str(&continuous_config_json(true)).unwrap();
    config.global.table_directory = Some(table_dir.path().to_path_buf());

    let fresh = config.build(Verbose::No).unwrap();
    let stored_tables = std::fs::read_dir(table_dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
        .count();
    assert!(
        stored_tables > 0,
        "No interpolation tables were persisted to the table directory"
    );

    let reloaded = config.build(Verbose::No).unwrap();
    let initial = muon_along_z(1e5);
    let mut random = SeededRandom::new(8);
    let fresh_track = fresh.propagate(&initial, 500.0, 1e3, &mut random).unwrap();
    let mut random = SeededRandom::new(8);
    let reloaded_track = reloaded
        .propagate(&initial, 500.0, 1e3, &mut random)
        .unwrap();

    assert_eq!(
        fresh_track.terminal().energy,
        reloaded_track.terminal().energy
    );
    assert_eq!(
        fresh_track.terminal().propagated_distance,
        reloaded_track.terminal().propagated_distance
    );
}
