//! Whole-session runs through `Rider::tick`.

use carve_core::{
    CarveConfig, CarveEvent, CarveSnapshot, ContactState, Equipment, Rider, RiderInput,
    TerrainSample, TurnPhase,
};

const DT: f32 = 1.0 / 60.0;

/// Sinusoidal steering with an edge change every `period` seconds.
fn slalom(rider: &mut Rider, period: f32, amplitude: f32, speed: f32, seconds: f32) -> Vec<CarveSnapshot> {
    let contact = ContactState { speed, ..ContactState::default() };
    let terrain = TerrainSample::default();
    let ticks = (seconds / DT) as usize;
    (0..ticks)
        .map(|i| {
            let t = i as f32 * DT;
            let steer = (t * std::f32::consts::PI / period).sin() * amplitude;
            let input = RiderInput { steer, ..RiderInput::default() };
            rider.tick(&input, &contact, &terrain, DT)
        })
        .collect()
}

#[test]
fn test_board_slalom_builds_chain() {
    let mut rider = Rider::snowboard(CarveConfig::deterministic());
    slalom(&mut rider, 0.8, 1.0, 12.0, 5.0);

    let history = rider.history();
    assert!(history.total_turns() >= 4, "turns {}", history.total_turns());

    let directions: Vec<i8> = history.iter().map(|r| r.direction).collect();
    for pair in directions.windows(2) {
        assert_eq!(pair[0], -pair[1], "turns should alternate: {directions:?}");
    }

    let chain = rider.chain();
    assert!(chain.chain_count >= 1);
    assert!(chain.timing_count >= 3);
    assert!(chain.average_timing() > 1.0, "timing {}", chain.average_timing());
    assert!(rider.session().carving_time > 0.0);
}

#[test]
fn test_events_match_history() {
    let mut rider = Rider::snowboard(CarveConfig::deterministic());
    slalom(&mut rider, 0.8, 1.0, 12.0, 4.0);

    let events = rider.drain_events();
    let completed = events.iter().filter(|e| matches!(e, CarveEvent::TurnComplete(_))).count();
    assert_eq!(completed as u64, rider.history().total_turns());

    let perfect = events.iter().filter(|e| matches!(e, CarveEvent::PerfectCarve(_))).count();
    assert_eq!(perfect as u32, rider.history().perfect_count());

    let initiations = events
        .iter()
        .filter(|e| matches!(e, CarveEvent::PhaseChange { phase: TurnPhase::Initiation, .. }))
        .count();
    assert!(initiations >= completed);
    assert!(rider.drain_events().is_empty());
}

#[test]
fn test_session_is_deterministic() {
    let mut a = Rider::snowboard(CarveConfig::deterministic());
    let mut b = Rider::snowboard(CarveConfig::deterministic());
    let run_a = slalom(&mut a, 0.9, 0.8, 14.0, 3.0);
    let run_b = slalom(&mut b, 0.9, 0.8, 14.0, 3.0);
    assert_eq!(run_a, run_b);
    assert_eq!(a.drain_events(), b.drain_events());
}

#[test]
fn test_skis_slalom() {
    let mut rider = Rider::new(Equipment::Skis, CarveConfig::deterministic());
    let snaps = slalom(&mut rider, 0.9, 0.8, 12.0, 5.0);

    assert!(snaps.iter().all(|s| s.skis.is_some()));
    assert!(rider.history().total_turns() >= 1);
    let max_edge = rider.config().ski_edge.max_edge_angle;
    assert!(snaps.iter().all(|s| s.edge_angle.abs() <= max_edge + 1e-5));
}

#[test]
fn test_snapshot_json_shape() {
    let mut rider = Rider::snowboard(CarveConfig::deterministic());
    let contact = ContactState { speed: 8.0, ..ContactState::default() };
    let snap = rider.tick(&RiderInput::default(), &contact, &TerrainSample::default(), DT);

    let value: serde_json::Value =
        serde_json::from_str(&snap.to_json().unwrap()).unwrap();
    assert!(value["turn_radius"].is_null());
    assert_eq!(value["phase"], "neutral");
    assert_eq!(value["equipment"], "snowboard");
    assert!(value["skis"].is_null());

    let back: CarveSnapshot = serde_json::from_value(value).unwrap();
    assert_eq!(back, snap);
}
