//! Benchmark: cursor movement across topology shapes.
//!
//! Run with: `cargo bench -p chartnav-core --bench topology_bench`
//!
//! Measures a full left-to-right sweep plus row changes, the dominant
//! pattern during autoplay, and plane mode toggles on dense scatter data.

use std::hint::black_box;

use chartnav_core::{Graph, Grid, Movable, MovableOptions, NavDirection, Plane};
use criterion::{Criterion, criterion_group, criterion_main};

// ===========================================================================
// Sweeps
// ===========================================================================

fn sweep(topo: &mut impl Movable, rows: usize) {
    topo.reset();
    topo.move_once(NavDirection::Right);
    for _ in 0..rows {
        while topo.move_once(NavDirection::Right) {}
        topo.move_to_extreme(NavDirection::Left);
        topo.move_once(NavDirection::Up);
    }
}

fn bench_sweeps(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");

    let mut grid = Grid::rectangular(16, 256, MovableOptions::default()).unwrap();
    group.bench_function("grid_16x256", |b| {
        b.iter(|| sweep(black_box(&mut grid), 16));
    });

    let mut graph = Graph::dense(16, 256, MovableOptions::default()).unwrap();
    group.bench_function("graph_16x256", |b| {
        b.iter(|| sweep(black_box(&mut graph), 16));
    });

    group.finish();
}

// ===========================================================================
// Plane toggles
// ===========================================================================

fn bench_plane_toggle(c: &mut Criterion) {
    let points: Vec<(f64, f64)> = (0..2_000)
        .map(|i| {
            let x = f64::from(i % 97);
            let y = f64::from((i * 31) % 89);
            (x, y)
        })
        .collect();
    let mut plane = Plane::from_points(&points).unwrap();
    plane.move_once(NavDirection::Right);

    c.bench_function("plane_toggle_pair", |b| {
        b.iter(|| {
            black_box(plane.move_once(NavDirection::Up));
            black_box(plane.move_once(NavDirection::Right));
        });
    });
}

criterion_group!(benches, bench_sweeps, bench_plane_toggle);
criterion_main!(benches);
