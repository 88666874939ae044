//! Benchmarks for the per-frame physics cost.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use handfield::forces::{net_force, ParticleSample};
use handfield::prelude::*;
use handfield::HandState;

fn session(count: usize) -> Simulation {
    let mut sim = Simulation::new(
        SimulationConfig::default()
            .with_particle_count(count)
            .with_chunk_size(25_000),
    )
    .unwrap();
    sim.set_hand(
        HandReading::at(Vec3::new(0.4, 0.2, 0.1), Gesture::Open)
            .with_fingertips([Vec3::new(0.4, 0.5, 0.1); 5]),
    );
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    // Per-tick cost should stay flat as the count grows.
    for count in [15_000usize, 100_000, 400_000] {
        group.bench_with_input(BenchmarkId::new("open_hand", count), &count, |b, &count| {
            let mut sim = session(count);
            b.iter(|| black_box(sim.tick()))
        });
    }

    group.bench_function("no_hand_100k", |b| {
        let mut sim = session(100_000);
        sim.set_hand(HandReading::absent());
        b.iter(|| black_box(sim.tick()))
    });

    group.finish();
}

fn bench_net_force(c: &mut Criterion) {
    let mut group = c.benchmark_group("net_force");
    let forces = ForceConfig::default();
    let particle = ParticleSample {
        index: 17,
        position: Vec3::new(0.3, -0.8, 1.1),
        velocity: Vec3::new(0.01, 0.0, -0.02),
        origin: Vec3::new(0.3, -0.9, 1.2),
    };

    for gesture in [Gesture::Open, Gesture::Fist, Gesture::Peace, Gesture::Repel] {
        let mut hand = HandState::new();
        hand.apply(HandReading::at(Vec3::new(0.5, 0.0, 0.0), gesture), &forces);
        group.bench_function(gesture.name(), |b| {
            b.iter(|| black_box(net_force(black_box(&particle), &hand, 100.0, &forces)))
        });
    }

    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut sim = session(100_000);
    c.bench_function("rebuild_shells_100k", |b| {
        b.iter(|| sim.set_formation(black_box(Formation::shells())).unwrap())
    });
}

criterion_group!(benches, bench_tick, bench_net_force, bench_rebuild);
criterion_main!(benches);
