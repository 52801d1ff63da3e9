//! Integration tests for the split-explicit time step.
//!
//! These tests verify:
//! 1. A forward-Euler sub-step on a resting flat ocean changes nothing
//! 2. Water volume is conserved by full baroclinic steps in a closed basin
//! 3. Land points stay exactly zero through the update
//! 4. Suspicious but valid configurations run, with a warning

use ocean_split::boundary::{BoundaryTable, PhysicalBc};
use ocean_split::config::{CoriolisParams, OceanConfig};
use ocean_split::exec::{Executor, KernelContext};
use ocean_split::field::{Field, Geometry, ScratchPool};
use ocean_split::state::{InitialData, OceanState};
use ocean_split::time::{step_2d, FastSlots, FastStep, FastWeightKind, Integrator, Phase};
use ocean_split::types::{Direction, FaceTable, IndexBox, Staggering};

const TOL: f64 = 1e-12;

/// Route `tracing` output through the test harness.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn closed_basin() -> BoundaryTable {
    BoundaryTable::from_physical(&FaceTable::uniform(PhysicalBc::SlipWall))
}

fn geometry() -> Geometry {
    Geometry::new(IndexBox::new([0, 0, 0], [11, 9, 3]), [2000.0, 2000.0, 1.0])
}

// ============================================================================
// Barotropic Sub-step
// ============================================================================

#[test]
fn test_forward_step_on_flat_rest_is_identity() {
    init_logging();
    let geom = geometry();
    let cells = geom.field_box(2);
    let config = OceanConfig::new(120.0, 8);
    let data = InitialData::new()
        .with_bathymetry(Field::filled(geom.slab_box(2), 1, 80.0))
        .with_velocity(Field::new(cells, 1), Field::new(cells, 1))
        .with_tracers(Field::filled(cells, 2, 14.0))
        .with_boundary(closed_basin());
    let mut state = OceanState::from_initial_data(&config, geom, data).unwrap();
    let weights = config.weights.resolve(config.ndtfast);
    let pool = ScratchPool::new();
    let ctx = KernelContext::new(Executor::Serial, &pool);

    for phase in [Phase::Predictor, Phase::Corrector] {
        let step = FastStep { my_iif: 0, phase };
        step_2d(ctx, &config, &weights, &mut state, step).unwrap();
        let slots = FastSlots::for_phase(phase, 0, state.iic);
        let slab = state.geom.domain().make_slab(Direction::Z, 0);
        for (i, j, k) in slab.iter() {
            assert!(
                (state.zeta.get(i, j, k, slots.knew) - state.zeta.get(i, j, k, slots.kstp)).abs()
                    < TOL,
                "{:?}: zeta changed at ({}, {})",
                phase,
                i,
                j
            );
        }
        assert!(state.ubar.max_abs(&slab.surrounding_nodes(Direction::X), slots.knew) < TOL);
        assert!(state.vbar.max_abs(&slab.surrounding_nodes(Direction::Y), slots.knew) < TOL);
    }
}

// ============================================================================
// Conservation
// ============================================================================

#[test]
fn test_closed_basin_conserves_volume() {
    init_logging();
    let geom = geometry();
    let cells = geom.field_box(2);
    let config = OceanConfig::new(120.0, 12).with_coriolis(CoriolisParams::new(1.0e-4, 0.0));
    let bump = Field::from_fn(geom.slab_box(2), 1, |i, j, _| {
        let r2 = ((i - 5) * (i - 5) + (j - 4) * (j - 4)) as f64;
        0.2 * (-r2 / 4.0).exp()
    });
    let data = InitialData::new()
        .with_bathymetry(Field::from_fn(geom.slab_box(2), 1, |i, _, _| 60.0 + 2.0 * i as f64))
        .with_velocity(Field::new(cells, 1), Field::new(cells, 1))
        .with_tracers(Field::filled(cells, 2, 14.0))
        .with_free_surface(bump)
        .with_boundary(closed_basin());
    let mut state = OceanState::from_initial_data(&config, geom, data).unwrap();
    let volume = state.total_volume(0);

    let mut integrator = Integrator::new(config).unwrap().with_executor(Executor::Serial);
    integrator.run(&mut state, 3).unwrap();

    let rel = (state.total_volume(0) - volume).abs() / volume;
    assert!(rel < 1e-10, "relative volume change {}", rel);
    // the bump has started to collapse
    assert!(state.zeta.get(5, 4, 0, 0) < 0.2);
    for (i, j, k) in state.geom.domain().iter() {
        let t = state.tracers[state.slow_slots().nstp].get(i, j, k, 0);
        assert!(t.is_finite() && (t - 14.0).abs() < 1e-3, "({}, {}, {}): {}", i, j, k, t);
    }
}

// ============================================================================
// Land Mask
// ============================================================================

#[test]
fn test_land_stays_zero_after_steps() {
    init_logging();
    let geom = geometry();
    let cells = geom.field_box(2);
    let island = |i: i32, j: i32| (4..=6).contains(&i) && (3..=5).contains(&j);
    let rho_mask = Field::from_fn(geom.slab_box(2), 1, |i, j, _| if island(i, j) { 0.0 } else { 1.0 });
    let config = OceanConfig::new(60.0, 6);
    let data = InitialData::new()
        .with_bathymetry(Field::filled(geom.slab_box(2), 1, 50.0))
        .with_land_mask(rho_mask)
        .with_velocity(Field::filled(cells, 1, 0.05), Field::filled(cells, 1, -0.02))
        .with_tracers(Field::from_fn(cells, 2, |i, _, k| 10.0 + 0.3 * i as f64 + k as f64))
        .with_free_surface(Field::from_fn(geom.slab_box(2), 1, |i, _, _| 0.01 * i as f64))
        .with_boundary(closed_basin());
    let mut state = OceanState::from_initial_data(&config, geom, data).unwrap();

    let mut integrator = Integrator::new(config).unwrap().with_executor(Executor::Serial);
    integrator.run(&mut state, 2).unwrap();

    let n = state.slow_slots().nstp;
    let domain = state.geom.domain();
    for (i, j, k) in domain.iter() {
        if island(i, j) {
            for c in 0..state.n_tracers() {
                assert_eq!(state.tracers[n].get(i, j, k, c), 0.0, "tracer {} at ({}, {})", c, i, j);
            }
        }
    }
    for (i, j, k) in domain.surrounding_nodes(Direction::X).iter() {
        if !state.mask.is_wet(i, j, Staggering::XFace) {
            assert_eq!(state.u.get(i, j, k, n), 0.0, "u at ({}, {}, {})", i, j, k);
        }
    }
    for (i, j, k) in domain.surrounding_nodes(Direction::Y).iter() {
        if !state.mask.is_wet(i, j, Staggering::YFace) {
            assert_eq!(state.v.get(i, j, k, n), 0.0, "v at ({}, {}, {})", i, j, k);
        }
    }
    for (i, j, k) in domain.make_slab(Direction::Z, 0).iter() {
        if island(i, j) {
            assert_eq!(state.zeta.get(i, j, k, 0), 0.0, "zeta at ({}, {})", i, j);
        }
    }
}

// ============================================================================
// Configuration Warnings
// ============================================================================

#[test]
fn test_single_step_weights_with_substeps_still_run() {
    init_logging();
    let geom = geometry();
    let cells = geom.field_box(2);
    // odd sub-step count and single-step averaging both only warn
    let config = OceanConfig::new(60.0, 3).with_weights(FastWeightKind::SingleStep);
    let data = InitialData::new()
        .with_bathymetry(Field::filled(geom.slab_box(2), 1, 40.0))
        .with_velocity(Field::new(cells, 1), Field::new(cells, 1))
        .with_tracers(Field::filled(cells, 2, 14.0))
        .with_boundary(closed_basin());
    let mut state = OceanState::from_initial_data(&config, geom, data).unwrap();

    let mut integrator = Integrator::new(config).unwrap().with_executor(Executor::Serial);
    integrator.step(&mut state).unwrap();
    assert_eq!(state.iic, 1);
    let n = state.slow_slots().nstp;
    let domain = state.geom.domain();
    assert!(state.u.max_abs(&domain.surrounding_nodes(Direction::X), n) < 1e-10);
}
