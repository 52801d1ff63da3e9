//! Benchmarks for split-explicit time stepping.
//!
//! Run with: `cargo bench --bench time_stepping_bench`
//!
//! Benchmarks a full baroclinic step (barotropic sub-cycle included) and a
//! single barotropic predictor sub-step.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ocean_split::boundary::{BoundaryTable, PhysicalBc};
use ocean_split::config::{CoriolisParams, OceanConfig};
use ocean_split::exec::{Executor, KernelContext};
use ocean_split::field::{Field, Geometry, ScratchPool};
use ocean_split::state::{InitialData, OceanState};
use ocean_split::time::{step_2d, FastStep, Integrator};
use ocean_split::types::{FaceTable, IndexBox};

/// Setup a closed basin with a surface bump.
fn setup_problem(n: i32, nz: i32, config: &OceanConfig) -> OceanState {
    let geom = Geometry::new(IndexBox::new([0, 0, 0], [n - 1, n - 1, nz - 1]), [2000.0, 2000.0, 1.0]);
    let cells = geom.field_box(2);
    let mid = n / 2;
    let bump = Field::from_fn(geom.slab_box(2), 1, |i, j, _| {
        let r2 = ((i - mid) * (i - mid) + (j - mid) * (j - mid)) as f64;
        0.1 * (-r2 / 16.0).exp()
    });
    let data = InitialData::new()
        .with_bathymetry(Field::from_fn(geom.slab_box(2), 1, |i, _, _| 80.0 + i as f64))
        .with_velocity(Field::new(cells, 1), Field::new(cells, 1))
        .with_tracers(Field::from_fn(cells, 2, |_, _, k| 12.0 + 0.2 * k as f64))
        .with_free_surface(bump)
        .with_boundary(BoundaryTable::from_physical(&FaceTable::uniform(PhysicalBc::SlipWall)));
    OceanState::from_initial_data(config, geom, data).unwrap()
}

/// Benchmark one baroclinic step at different grid sizes.
fn bench_baroclinic_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("baroclinic_step");
    group.sample_size(10);

    let config = OceanConfig::new(120.0, 20).with_coriolis(CoriolisParams::new(1.0e-4, 0.0));
    for n in [16, 32, 64] {
        let mut state = setup_problem(n, 8, &config);
        let mut integrator = Integrator::new(config.clone()).unwrap();

        group.bench_with_input(BenchmarkId::new("grid", format!("{}x{}x8", n, n)), &n, |b, _| {
            b.iter(|| integrator.step(black_box(&mut state)));
        });
    }

    group.finish();
}

/// Benchmark a single barotropic sub-step.
fn bench_barotropic_substep(c: &mut Criterion) {
    let mut group = c.benchmark_group("barotropic_substep");
    group.sample_size(30);

    let config = OceanConfig::new(120.0, 20).with_coriolis(CoriolisParams::new(1.0e-4, 0.0));
    let weights = config.weights.resolve(config.ndtfast);
    let pool = ScratchPool::new();
    for n in [32, 128] {
        let mut state = setup_problem(n, 4, &config);
        let ctx = KernelContext::new(Executor::best(), &pool);

        group.bench_with_input(BenchmarkId::new("predictor", format!("{}x{}", n, n)), &n, |b, _| {
            b.iter(|| step_2d(ctx, &config, &weights, black_box(&mut state), FastStep::predictor(1)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_baroclinic_step, bench_barotropic_substep);
criterion_main!(benches);
