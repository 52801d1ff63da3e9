//! Benchmarks for the baroclinic momentum right-hand side.
//!
//! Run with: `cargo bench --bench rhs_computation_bench`
//!
//! Benchmarks 3D momentum advection for both schemes and the hydrostatic
//! pressure gradient at several grid sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ocean_split::config::AdvectionScheme;
use ocean_split::exec::{Executor, KernelContext};
use ocean_split::field::{Field, Geometry, GridMetrics, ScratchPool};
use ocean_split::rhs::{
    compute_hydrostatic_pressure_gradient, compute_momentum_advection, MomentumAdvection,
    MomentumForcing, PressureConstants, PressureInput, StressFields,
};
use ocean_split::types::{Direction, IndexBox};
use ocean_split::vertical::{UniformStretching, VerticalFields, VerticalGrid};

/// Fields of a sloping-bottom basin with a gentle flow.
struct Problem {
    geom: Geometry,
    metrics: GridMetrics,
    vert: VerticalFields,
    u: Field,
    v: Field,
    huon: Field,
    hvom: Field,
    w: Field,
    rho: Field,
    stress: StressFields,
}

fn setup_problem(n: i32, nz: i32) -> Problem {
    let geom = Geometry::new(IndexBox::new([0, 0, 0], [n - 1, n - 1, nz - 1]), [1000.0, 1000.0, 1.0]);
    let cells = geom.field_box(2);
    let mut metrics = GridMetrics::uniform(&geom, 2, 100.0);
    metrics.h = Field::from_fn(geom.slab_box(2), 1, |i, j, _| 50.0 + 0.5 * (i + j) as f64);
    let zeta = Field::from_fn(geom.slab_box(2), 1, |i, _, _| 0.01 * (i as f64 * 0.2).sin());
    let grid = VerticalGrid::new(nz as usize, &UniformStretching);
    let mut vert = VerticalFields::new(cells, geom.w_box(2));
    grid.update(Executor::Serial, &cells, &metrics.h, &zeta, 0, &mut vert)
        .unwrap();

    Problem {
        u: Field::from_fn(cells, 1, |i, j, k| 0.1 * ((i + k) as f64 * 0.3).sin() + 0.01 * j as f64),
        v: Field::from_fn(cells, 1, |i, j, k| 0.05 * ((j - k) as f64 * 0.2).cos() - 0.01 * i as f64),
        huon: Field::filled(cells, 1, 2.0e3),
        hvom: Field::filled(cells, 1, -1.0e3),
        w: Field::new(geom.w_box(2), 1),
        rho: Field::from_fn(cells, 1, |i, _, k| 26.0 + 0.01 * i as f64 - 0.05 * k as f64),
        stress: StressFields::zeros(geom.slab_box(2)),
        geom,
        metrics,
        vert,
    }
}

/// Benchmark momentum advection for both schemes.
fn bench_momentum_advection(c: &mut Criterion) {
    let mut group = c.benchmark_group("momentum_advection");
    group.sample_size(30);
    let pool = ScratchPool::new();

    for n in [16, 32, 64] {
        let p = setup_problem(n, 16);
        let cells = p.geom.field_box(2);
        let domain = p.geom.domain();
        let (xbx, ybx) = (domain.surrounding_nodes(Direction::X), domain.surrounding_nodes(Direction::Y));
        let mut ru = Field::new(cells, 2);
        let mut rv = Field::new(cells, 2);
        let mut rufrc = Field::new(p.geom.slab_box(2), 1);
        let mut rvfrc = Field::new(p.geom.slab_box(2), 1);

        for (label, scheme) in [("upstream3", AdvectionScheme::Upstream3), ("centered2", AdvectionScheme::Centered2)] {
            let input = MomentumAdvection {
                geom: &p.geom,
                metrics: &p.metrics,
                u: &p.u,
                v: &p.v,
                huon: &p.huon,
                hvom: &p.hvom,
                w: &p.w,
                stress: &p.stress,
                scheme,
            };
            group.bench_with_input(BenchmarkId::new(label, format!("{}x{}x16", n, n)), &n, |b, _| {
                b.iter(|| {
                    compute_momentum_advection(
                        KernelContext::new(Executor::best(), &pool),
                        &xbx,
                        &ybx,
                        black_box(&input),
                        &mut MomentumForcing {
                            ru: &mut ru,
                            rv: &mut rv,
                            rufrc: &mut rufrc,
                            rvfrc: &mut rvfrc,
                            nrhs: 0,
                        },
                    )
                });
            });
        }
    }

    group.finish();
}

/// Benchmark the pressure gradient at different vertical resolutions.
fn bench_pressure_gradient(c: &mut Criterion) {
    let mut group = c.benchmark_group("pressure_gradient");
    group.sample_size(30);
    let pool = ScratchPool::new();

    for nz in [8, 16, 32] {
        let p = setup_problem(32, nz);
        let cells = p.geom.field_box(2);
        let domain = p.geom.domain();
        let (xbx, ybx) = (domain.surrounding_nodes(Direction::X), domain.surrounding_nodes(Direction::Y));
        let mut ru = Field::new(cells, 1);
        let mut rv = Field::new(cells, 1);
        let input = PressureInput {
            metrics: &p.metrics,
            rho: &p.rho,
            hz: &p.vert.hz,
            z_r: &p.vert.z_r,
            z_w: &p.vert.z_w,
            constants: PressureConstants::new(9.81, 1025.0),
        };

        group.bench_with_input(BenchmarkId::new("levels", nz), &nz, |b, _| {
            b.iter(|| {
                compute_hydrostatic_pressure_gradient(
                    KernelContext::new(Executor::best(), &pool),
                    &xbx,
                    &ybx,
                    black_box(&input),
                    &mut ru,
                    &mut rv,
                    0,
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_momentum_advection, bench_pressure_gradient);
criterion_main!(benches);
