//! Benchmarks for the per-tick rider update

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use carve_core::physics::grip::{resolve_grip, GripInput, GripState};
use carve_core::{CarveConfig, ContactState, Equipment, Rider, RiderInput, TerrainSample};

const DT: f32 = 1.0 / 60.0;

/// Alternating turns, one edge change every 0.8 s
fn slalom_inputs(ticks: usize) -> Vec<RiderInput> {
    (0..ticks)
        .map(|i| {
            let t = i as f32 * DT;
            let steer = (t * std::f32::consts::PI / 0.8).sin() * 0.8;
            RiderInput { steer, lean: 0.3, ..RiderInput::default() }
        })
        .collect()
}

fn bench_rider_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("rider_tick");
    let contact = ContactState { speed: 14.0, ..ContactState::default() };
    let terrain = TerrainSample::default();

    for equipment in [Equipment::Snowboard, Equipment::Skis] {
        let inputs = slalom_inputs(600);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{equipment:?}")),
            &equipment,
            |b, &equipment| {
                b.iter(|| {
                    let mut rider = Rider::new(equipment, CarveConfig::default());
                    for input in &inputs {
                        black_box(rider.tick(black_box(input), &contact, &terrain, DT));
                    }
                    black_box(rider.drain_events())
                });
            },
        );
    }

    group.finish();
}

fn bench_grip_resolve(c: &mut Criterion) {
    let cfg = CarveConfig::default();
    let input = GripInput { edge_angle: 0.8, speed: 22.0, ..GripInput::default() };
    c.bench_function("resolve_grip", |b| {
        b.iter(|| resolve_grip(&GripState::default(), black_box(&input), DT, &cfg.grip))
    });
}

criterion_group!(benches, bench_rider_tick, bench_grip_resolve);
criterion_main!(benches);
