//! One barotropic sub-step.
//!
//! ```text
//! Drhs = ζ[krhs] + h
//! DUon = ½·on_u·(Drhs(i) + Drhs(i-1))·ubar[krhs]
//! ```
//!
//! The transports feed the running averages first. The auxiliary step
//! `my_iif == nfast` stops there; every other step goes on to advance the
//! free surface and then the depth-integrated momentum:
//!
//! | Step | `ζ` tendency | momentum increment |
//! |------|--------------|--------------------|
//! | `my_iif == 0` | `Δt·rhs` | `½Δt·rhs` |
//! | predictor | `2Δt·rhs` | `Δt·rhs` |
//! | corrector | `Δt·(5/12·rhs + 8/12·r[kstp] - 1/12·r[ptsk])` | `½Δt·(5/12·rhs + 8/12·r[kstp] - 1/12·r[ptsk])` |
//!
//! where `Δt` is the fast step. The momentum increment is scaled by
//! `(pm + pm)(pn + pn)` and the new velocity divided by the face depth
//! `Dnew(i) + Dnew(i-1)`, so both forms integrate over the same interval.

use tracing::debug;

use crate::boundary::BcVar;
use crate::config::OceanConfig;
use crate::error::Result;
use crate::exec::{Executor, KernelContext};
use crate::field::Field;
use crate::rhs::{compute_coriolis, rhs_2d, BarotropicAdvection, CoriolisInput};
use crate::state::{Ghosts, OceanState};
use crate::types::{Direction, IndexBox, Staggering};

use super::slots::{FastSlots, Phase, SlowSlots};
use super::weights::FastWeights;

const ONE_TWELFTH: f64 = 1.0 / 12.0;
const FIVE_TWELFTHS: f64 = 5.0 / 12.0;
const EIGHT_TWELFTHS: f64 = 8.0 / 12.0;

/// Position of a barotropic sub-step in the cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FastStep {
    /// 0-based sub-step counter
    pub my_iif: usize,
    pub phase: Phase,
}

impl FastStep {
    pub fn predictor(my_iif: usize) -> Self {
        Self {
            my_iif,
            phase: Phase::Predictor,
        }
    }

    pub fn corrector(my_iif: usize) -> Self {
        Self {
            my_iif,
            phase: Phase::Corrector,
        }
    }

    #[inline]
    fn is_predictor(&self) -> bool {
        self.phase == Phase::Predictor
    }

    #[inline]
    fn is_first(&self) -> bool {
        self.my_iif == 0
    }
}

/// Which history the 3D forcing is extrapolated from on the first sub-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Coupling {
    /// First baroclinic step: forcing as is
    Forward,
    /// Second step: `1.5·f - 0.5·f_prev`
    SecondOrder,
    /// Third-order Adams-Bashforth
    ThirdOrder,
}

impl Coupling {
    fn for_step(iic: usize, ntfirst: usize) -> Self {
        if iic <= ntfirst {
            Coupling::Forward
        } else if iic == ntfirst + 1 {
            Coupling::SecondOrder
        } else {
            Coupling::ThirdOrder
        }
    }
}

/// Advance the barotropic mode by one predictor or corrector sub-step.
///
/// Reads slot `krhs` (and `kstp`, `ptsk`), writes slot `knew` of `zeta`,
/// `ubar` and `vbar` including ghosts, updates the running averages and on
/// predictors the right-hand-side histories.
pub fn step_2d(
    ctx: KernelContext<'_>,
    config: &OceanConfig,
    weights: &FastWeights,
    state: &mut OceanState,
    step: FastStep,
) -> Result<()> {
    let slots = FastSlots::for_phase(step.phase, step.my_iif, state.iic);
    let slow = state.slow_slots();
    let coupling = Coupling::for_step(state.iic, state.ntfirst);
    let predictor = step.is_predictor();
    let first = step.is_first();
    debug!(
        knew = slots.knew,
        krhs = slots.krhs,
        kstp = slots.kstp,
        predictor,
        first,
        "barotropic sub-step {}",
        step.my_iif
    );

    let slab = state.slab_box();
    let k0 = slab.small_end(Direction::Z);
    let domain = state.geom.domain().make_slab(Direction::Z, k0);
    let xbx = domain.surrounding_nodes(Direction::X);
    let ybx = domain.surrounding_nodes(Direction::Y);
    let inner = domain.grow([1, 1, 0]);
    for (what, f) in [
        ("free surface", &state.zeta),
        ("barotropic x-velocity", &state.ubar),
        ("barotropic y-velocity", &state.vbar),
    ] {
        f.require(what, &slab)?;
        f.require_comp(what, 2)?;
    }

    let OceanState {
        geom,
        metrics,
        mask,
        boundary,
        zeta,
        ubar,
        vbar,
        rzeta,
        rubar,
        rvbar,
        averages,
        rufrc,
        rvfrc,
        ru_hist,
        rv_hist,
        ..
    } = state;
    let (geom, metrics, mask, boundary) = (&*geom, &*metrics, &*mask, &*boundary);
    let exec = ctx.exec;
    let h = &metrics.h;
    let FastSlots {
        krhs,
        kstp,
        knew,
        ptsk,
        ..
    } = slots;

    let mut drhs = ctx.pool.acquire(slab, 1);
    exec.fill(&mut drhs, 0, &slab, |i, j, k| {
        zeta.get(i, j, k, krhs) + h.get(i, j, k, 0)
    });
    let drhs = &*drhs;

    let mut duon = ctx.pool.acquire(slab, 1);
    let mut dvom = ctx.pool.acquire(slab, 1);
    exec.fill(&mut duon, 0, &slab.grow_lo(Direction::X, -1), |i, j, k| {
        0.5 * metrics.on_u.get(i, j, k, 0)
            * (drhs.get(i, j, k, 0) + drhs.get(i - 1, j, k, 0))
            * ubar.get(i, j, k, krhs)
    });
    exec.fill(&mut dvom, 0, &slab.grow_lo(Direction::Y, -1), |i, j, k| {
        0.5 * metrics.om_v.get(i, j, k, 0)
            * (drhs.get(i, j, k, 0) + drhs.get(i, j - 1, k, 0))
            * vbar.get(i, j, k, krhs)
    });
    let (duon, dvom) = (&*duon, &*dvom);

    // running averages
    let w = weights.substep(step.my_iif);
    match (predictor, first) {
        (true, true) => {
            let cff2 = -ONE_TWELFTH * w.a;
            averages.zt_avg1.set_val(0.0);
            averages.du_avg1.set_val(0.0);
            averages.dv_avg1.set_val(0.0);
            accumulate(exec, &mut averages.du_avg2, &xbx, false, cff2, duon, 0);
            accumulate(exec, &mut averages.dv_avg2, &ybx, false, cff2, dvom, 0);
        }
        (true, false) => {
            let cff1 = w.b;
            let cff2 = EIGHT_TWELFTHS * w.c - ONE_TWELFTH * w.d;
            accumulate(exec, &mut averages.zt_avg1, &slab, true, cff1, zeta, krhs);
            accumulate(exec, &mut averages.du_avg1, &xbx, true, cff1, duon, 0);
            accumulate(exec, &mut averages.du_avg2, &xbx, true, cff2, duon, 0);
            accumulate(exec, &mut averages.dv_avg1, &ybx, true, cff1, dvom, 0);
            accumulate(exec, &mut averages.dv_avg2, &ybx, true, cff2, dvom, 0);
        }
        (false, _) => {
            let cff2 = if first { w.c } else { FIVE_TWELFTHS * w.c };
            accumulate(exec, &mut averages.du_avg2, &xbx, true, cff2, duon, 0);
            accumulate(exec, &mut averages.dv_avg2, &ybx, true, cff2, dvom, 0);
        }
    }

    // the auxiliary step only closes the averages
    if step.my_iif >= weights.nfast() {
        return Ok(());
    }

    let dtfast = config.dtfast();
    let (pm, pn) = (&metrics.pm, &metrics.pn);

    let mut rhs_zeta = ctx.pool.acquire(slab, 1);
    exec.fill(&mut rhs_zeta, 0, &inner, |i, j, k| {
        (duon.get(i, j, k, 0) - duon.get(i + 1, j, k, 0))
            + (dvom.get(i, j, k, 0) - dvom.get(i, j + 1, k, 0))
    });
    let rhs_zeta = &*rhs_zeta;

    let mut zeta_new = ctx.pool.acquire(slab, 1);
    {
        let rz = &*rzeta;
        exec.fill(&mut zeta_new, 0, &inner, |i, j, k| {
            let r = rhs_zeta.get(i, j, k, 0);
            let tendency = if first {
                dtfast * r
            } else if predictor {
                2.0 * dtfast * r
            } else {
                dtfast
                    * (FIVE_TWELFTHS * r + EIGHT_TWELFTHS * rz.get(i, j, k, kstp)
                        - ONE_TWELFTH * rz.get(i, j, k, ptsk))
            };
            zeta.get(i, j, k, kstp) + pm.get(i, j, k, 0) * pn.get(i, j, k, 0) * tendency
        });
    }
    mask.apply(&mut zeta_new, 0, Staggering::Cell);
    let zeta_new = &*zeta_new;

    let mut dnew = ctx.pool.acquire(slab, 1);
    let mut dstp = ctx.pool.acquire(slab, 1);
    exec.fill(&mut dnew, 0, &inner, |i, j, k| {
        zeta_new.get(i, j, k, 0) + h.get(i, j, k, 0)
    });
    exec.fill(&mut dstp, 0, &inner, |i, j, k| {
        zeta.get(i, j, k, kstp) + h.get(i, j, k, 0)
    });
    let (dnew, dstp) = (&*dnew, &*dstp);

    // surface pressure gradient initialises the momentum right-hand side
    let mut rhs_ubar = ctx.pool.acquire(slab, 1);
    let mut rhs_vbar = ctx.pool.acquire(slab, 1);
    if config.use_surface_pressure_2d {
        let fac = config.fac();
        let cff4 = 4.0 / 25.0;
        let zwrk = |i: i32, j: i32, k: i32| {
            let zn = zeta_new.get(i, j, k, 0);
            if first {
                0.5 * (zeta.get(i, j, k, kstp) + zn)
            } else if predictor {
                (1.0 - 2.0 * cff4) * zeta.get(i, j, k, krhs) + cff4 * (zeta.get(i, j, k, kstp) + zn)
            } else {
                0.6 * zn + 0.4 * zeta.get(i, j, k, krhs)
            }
        };
        let mut gzeta = ctx.pool.acquire(slab, 2);
        exec.fill(&mut gzeta, 0, &inner, |i, j, k| fac * zwrk(i, j, k));
        let gz = &*gzeta;
        let values = exec.map_box(&inner, |i, j, k| gz.get(i, j, k, 0) * zwrk(i, j, k));
        gzeta.assign(&inner, 1, &values);
        let gz = &*gzeta;

        let half_g = 0.5 * config.g;
        exec.fill(&mut rhs_ubar, 0, &xbx, |i, j, k| {
            half_g
                * metrics.on_u.get(i, j, k, 0)
                * ((h.get(i - 1, j, k, 0) + h.get(i, j, k, 0))
                    * (gz.get(i - 1, j, k, 0) - gz.get(i, j, k, 0))
                    + gz.get(i - 1, j, k, 1)
                    - gz.get(i, j, k, 1))
        });
        exec.fill(&mut rhs_vbar, 0, &ybx, |i, j, k| {
            half_g
                * metrics.om_v.get(i, j, k, 0)
                * ((h.get(i, j - 1, k, 0) + h.get(i, j, k, 0))
                    * (gz.get(i, j - 1, k, 0) - gz.get(i, j, k, 0))
                    + gz.get(i, j - 1, k, 1)
                    - gz.get(i, j, k, 1))
        });
    }

    rhs_2d(
        ctx,
        &xbx,
        &ybx,
        &BarotropicAdvection {
            geom,
            ubar,
            vbar,
            krhs,
            duon,
            dvom,
        },
        &mut rhs_ubar,
        &mut rhs_vbar,
    )?;

    if config.coriolis.is_some() {
        compute_coriolis(
            ctx,
            &xbx,
            &ybx,
            &CoriolisInput {
                fomn: &metrics.fomn,
                thickness: drhs,
                u: ubar,
                u_comp: krhs,
                v: vbar,
                v_comp: krhs,
            },
            &mut rhs_ubar,
            0,
            &mut rhs_vbar,
            0,
        )?;
    }

    // 3D forcing
    if first && predictor {
        couple(exec, &xbx, coupling, slow, &mut rhs_ubar, rufrc, ru_hist)?;
        couple(exec, &ybx, coupling, slow, &mut rhs_vbar, rvfrc, rv_hist)?;
    } else {
        accumulate(exec, &mut rhs_ubar, &xbx, true, 1.0, rufrc, 0);
        accumulate(exec, &mut rhs_vbar, &ybx, true, 1.0, rvfrc, 0);
    }

    // new depth-integrated momentum
    let (rhs_u, rhs_v) = (&*rhs_ubar, &*rhs_vbar);
    let increment = |r: f64, hist: &Field, i: i32, j: i32, k: i32| {
        if first {
            0.5 * dtfast * r
        } else if predictor {
            dtfast * r
        } else {
            0.5 * dtfast
                * (FIVE_TWELFTHS * r + EIGHT_TWELFTHS * hist.get(i, j, k, kstp)
                    - ONE_TWELFTH * hist.get(i, j, k, ptsk))
        }
    };
    let ubar_new = {
        let (ub, rh) = (&*ubar, &*rubar);
        exec.map_box(&xbx, |i, j, k| {
            let cff = (pm.get(i, j, k, 0) + pm.get(i - 1, j, k, 0))
                * (pn.get(i, j, k, 0) + pn.get(i - 1, j, k, 0));
            let depth = dnew.get(i, j, k, 0) + dnew.get(i - 1, j, k, 0);
            let old = ub.get(i, j, k, kstp) * (dstp.get(i, j, k, 0) + dstp.get(i - 1, j, k, 0));
            face_velocity(old + cff * increment(rhs_u.get(i, j, k, 0), rh, i, j, k), depth)
        })
    };
    let vbar_new = {
        let (vb, rh) = (&*vbar, &*rvbar);
        exec.map_box(&ybx, |i, j, k| {
            let cff = (pm.get(i, j, k, 0) + pm.get(i, j - 1, k, 0))
                * (pn.get(i, j, k, 0) + pn.get(i, j - 1, k, 0));
            let depth = dnew.get(i, j, k, 0) + dnew.get(i, j - 1, k, 0);
            let old = vb.get(i, j, k, kstp) * (dstp.get(i, j, k, 0) + dstp.get(i, j - 1, k, 0));
            face_velocity(old + cff * increment(rhs_v.get(i, j, k, 0), rh, i, j, k), depth)
        })
    };

    // every read of the old levels is done
    let mut old = ctx.pool.acquire(slab, 3);
    old.copy_region(zeta, kstp, 0, &slab)?;
    old.copy_region(ubar, kstp, 1, &slab)?;
    old.copy_region(vbar, kstp, 2, &slab)?;

    zeta.copy_region(zeta_new, 0, knew, &inner)?;
    ubar.assign(&xbx, knew, &ubar_new);
    vbar.assign(&ybx, knew, &vbar_new);
    mask.apply(ubar, knew, Staggering::XFace);
    mask.apply(vbar, knew, Staggering::YFace);
    if predictor {
        rzeta.copy_region(rhs_zeta, 0, krhs, &inner)?;
        rubar.copy_region(rhs_u, 0, krhs, &xbx)?;
        rvbar.copy_region(rhs_v, 0, krhs, &ybx)?;
    }

    let ghosts = Ghosts {
        engine: boundary,
        mask,
    };
    ghosts.fill(zeta, knew, BcVar::Zeta, Staggering::Cell, &old, 0)?;
    ghosts.fill(ubar, knew, BcVar::Ubar, Staggering::XFace, &old, 1)?;
    ghosts.fill(vbar, knew, BcVar::Vbar, Staggering::YFace, &old, 2)?;
    Ok(())
}

/// Velocity from a face transport-like quantity and the summed depth of the
/// two cells; dry faces get zero.
#[inline]
fn face_velocity(numerator: f64, depth: f64) -> f64 {
    if depth > 0.0 {
        numerator / depth
    } else {
        0.0
    }
}

/// `target = (keep ? target : 0) + cff·src[src_comp]` over `bx`.
fn accumulate(
    exec: Executor,
    target: &mut Field,
    bx: &IndexBox,
    keep: bool,
    cff: f64,
    src: &Field,
    src_comp: usize,
) {
    let dest = &*target;
    let values = exec.map_box(bx, |i, j, k| {
        let base = if keep { dest.get(i, j, k, 0) } else { 0.0 };
        base + cff * src.get(i, j, k, src_comp)
    });
    target.assign(bx, 0, &values);
}

/// First-sub-step coupling: remove the sub-step's own terms from the 3D
/// forcing, add the forcing extrapolated in time, store it as history.
fn couple(
    exec: Executor,
    bx: &IndexBox,
    coupling: Coupling,
    slow: SlowSlots,
    rhs: &mut Field,
    frc: &mut Field,
    hist: &mut Field,
) -> Result<()> {
    hist.require("forcing history", bx)?;
    hist.require_comp("forcing history", slow.nstp.max(slow.nnew))?;

    let (r, f) = (&*rhs, &*frc);
    let reduced = exec.map_box(bx, |i, j, k| f.get(i, j, k, 0) - r.get(i, j, k, 0));
    frc.assign(bx, 0, &reduced);

    let (r, f, h) = (&*rhs, &*frc, &*hist);
    let values = exec.map_box(bx, |i, j, k| {
        let forcing = f.get(i, j, k, 0);
        let extrapolated = match coupling {
            Coupling::Forward => forcing,
            Coupling::SecondOrder => 1.5 * forcing - 0.5 * h.get(i, j, k, slow.nnew),
            Coupling::ThirdOrder => {
                23.0 / 12.0 * forcing - 16.0 / 12.0 * h.get(i, j, k, slow.nnew)
                    + FIVE_TWELFTHS * h.get(i, j, k, slow.nstp)
            }
        };
        r.get(i, j, k, 0) + extrapolated
    });
    rhs.assign(bx, 0, &values);
    hist.copy_region(frc, 0, slow.nstp, bx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BoundaryTable, PhysicalBc};
    use crate::field::{Geometry, ScratchPool};
    use crate::state::InitialData;
    use crate::time::FastWeightKind;
    use crate::types::FaceTable;

    const TOL: f64 = 1e-12;

    fn basin(zeta: impl Fn(i32, i32) -> f64) -> (OceanConfig, OceanState) {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [9, 7, 2]), [1000.0, 1000.0, 1.0]);
        let cells = geom.field_box(2);
        let config = OceanConfig::new(60.0, 2).with_weights(FastWeightKind::SingleStep);
        let data = InitialData::new()
            .with_bathymetry(Field::filled(geom.slab_box(2), 1, 20.0))
            .with_velocity(Field::new(cells, 1), Field::new(cells, 1))
            .with_tracers(Field::filled(cells, 1, 14.0))
            .with_free_surface(Field::from_fn(geom.slab_box(2), 1, |i, j, _| zeta(i, j)))
            .with_boundary(BoundaryTable::from_physical(&FaceTable::uniform(
                PhysicalBc::SlipWall,
            )));
        let state = OceanState::from_initial_data(&config, geom, data).unwrap();
        (config, state)
    }

    #[test]
    fn test_resting_flat_surface_is_unchanged() {
        let (config, mut state) = basin(|_, _| 0.25);
        let weights = config.weights.resolve(config.ndtfast);
        let pool = ScratchPool::new();
        let ctx = KernelContext::new(Executor::Serial, &pool);

        step_2d(ctx, &config, &weights, &mut state, FastStep::predictor(0)).unwrap();
        let domain = state.geom.domain().make_slab(Direction::Z, 0);
        for (i, j, k) in domain.iter() {
            assert!((state.zeta.get(i, j, k, 2) - 0.25).abs() < TOL, "({}, {})", i, j);
            assert!(state.ubar.get(i, j, k, 2).abs() < TOL);
        }
        // first predictor stores its right-hand side
        assert!(state.rzeta.max_abs(&domain, 0).abs() < TOL);
    }

    #[test]
    fn test_bump_spreads_under_slow_forcing_and_keeps_volume() {
        let bump = |i: i32, j: i32| if (i, j) == (4, 3) { 0.5 } else { 0.0 };
        let (config, mut state) = basin(bump);
        // depth-integrated pressure force of the bump, as the 3D step would
        // leave it in rufrc/rvfrc
        let scale = config.g * 20.0 * 1000.0;
        state.rufrc = Field::from_fn(state.rufrc.bx(), 1, |i, j, _| {
            -scale * (bump(i, j) - bump(i - 1, j))
        });
        state.rvfrc = Field::from_fn(state.rvfrc.bx(), 1, |i, j, _| {
            -scale * (bump(i, j) - bump(i, j - 1))
        });
        let weights = config.weights.resolve(config.ndtfast);
        let pool = ScratchPool::new();
        let ctx = KernelContext::new(Executor::Serial, &pool);
        let volume = state.total_volume(0);

        step_2d(ctx, &config, &weights, &mut state, FastStep::predictor(0)).unwrap();
        // the first predictor is driven by the slow forcing alone
        let (west, east) = (state.ubar.get(4, 3, 0, 2), state.ubar.get(5, 3, 0, 2));
        assert!(west < 0.0, "west face {}", west);
        assert!(east > 0.0, "east face {}", east);
        assert!((west + east).abs() < 1e-12 * east.abs(), "asymmetric: {} {}", west, east);
        assert!(state.vbar.get(4, 3, 0, 2) < 0.0);

        step_2d(ctx, &config, &weights, &mut state, FastStep::corrector(0)).unwrap();
        let knew = FastSlots::for_phase(Phase::Corrector, 0, 0).knew;
        assert!(state.zeta.get(4, 3, 0, knew) < 0.5);
        assert!(state.zeta.get(5, 3, 0, knew) > 0.0);
        let rel = (state.total_volume(knew) - volume).abs() / volume;
        assert!(rel < 1e-12, "volume drift {}", rel);
    }

    #[test]
    fn test_zero_slow_forcing_holds_bump_on_first_predictor() {
        let (config, mut state) = basin(|i, j| if (i, j) == (4, 3) { 0.5 } else { 0.0 });
        let weights = config.weights.resolve(config.ndtfast);
        let pool = ScratchPool::new();
        let ctx = KernelContext::new(Executor::Serial, &pool);

        step_2d(ctx, &config, &weights, &mut state, FastStep::predictor(0)).unwrap();
        // the 2D terms are replaced by rufrc, which is zero
        assert!(state.ubar.get(4, 3, 0, 2).abs() < TOL);
        assert!(state.ubar.get(5, 3, 0, 2).abs() < TOL);
        // and the slow correction now cancels the fast pressure force
        assert!(state.rufrc.get(4, 3, 0, 0) > 0.0);
        assert!(state.rufrc.get(5, 3, 0, 0) < 0.0);
    }

    #[test]
    fn test_auxiliary_step_only_averages() {
        let (config, mut state) = basin(|_, _| 0.1);
        let weights = config.weights.resolve(config.ndtfast);
        let pool = ScratchPool::new();
        let ctx = KernelContext::new(Executor::Serial, &pool);
        let before = state.zeta.clone();

        let aux = FastStep::predictor(weights.nfast());
        step_2d(ctx, &config, &weights, &mut state, aux).unwrap();
        assert_eq!(state.zeta, before, "no free-surface update past the cycle");
        // single-step weights: b = 1
        assert!((state.averages.zt_avg1.get(3, 3, 0, 0) - 0.1).abs() < TOL);
    }

    #[test]
    fn test_first_step_coupling_moves_forcing_into_history() {
        let (config, mut state) = basin(|_, _| 0.0);
        let config = config.with_surface_pressure_2d(false);
        let weights = config.weights.resolve(config.ndtfast);
        let pool = ScratchPool::new();
        let ctx = KernelContext::new(Executor::Serial, &pool);
        state.rufrc.set_val(2.0e-3);

        step_2d(ctx, &config, &weights, &mut state, FastStep::predictor(0)).unwrap();
        let nstp = state.slow_slots().nstp;
        assert!((state.ru_hist.get(3, 3, 0, nstp) - 2.0e-3).abs() < TOL);
        // forward-Euler half step: ubar·2D = ½·dtfast·4·pm·pn·rufrc / ... over 2D
        let dtfast = config.dtfast();
        let expected = 0.5 * dtfast * 4.0e-6 * 2.0e-3 / 40.0;
        assert!((state.ubar.get(3, 3, 0, 2) - expected).abs() < 1e-15);
        assert!((state.rubar.get(3, 3, 0, 0) - 2.0e-3).abs() < TOL);
    }

    /// Right-hand side 0.3, forcing `frc`, history levels `hist[n]`.
    fn coupling_fields(frc: f64, hist: [f64; 3]) -> (IndexBox, Field, Field, Field) {
        let bx = IndexBox::new([0, 0, 0], [3, 2, 0]);
        let mut history = Field::new(bx, 3);
        for (n, value) in hist.into_iter().enumerate() {
            history.set_comp(n, value);
        }
        (bx, Field::filled(bx, 1, 0.3), Field::filled(bx, 1, frc), history)
    }

    #[test]
    fn test_second_step_coupling_extrapolates_forcing() {
        let slow = SlowSlots::new(1, 0);
        let mut hist = [0.0; 3];
        hist[slow.nnew] = 1.0;
        let (bx, mut rhs, mut frc, mut history) = coupling_fields(2.0, hist);

        let coupling = Coupling::for_step(1, 0);
        couple(Executor::Serial, &bx, coupling, slow, &mut rhs, &mut frc, &mut history).unwrap();

        // forcing reduced by the sub-step's own terms
        let f = 2.0 - 0.3;
        for (i, j, k) in bx.iter() {
            assert!((frc.get(i, j, k, 0) - f).abs() < TOL);
            let expected = 0.3 + 1.5 * f - 0.5 * 1.0;
            assert!((rhs.get(i, j, k, 0) - expected).abs() < TOL, "rhs {}", rhs.get(i, j, k, 0));
            assert!((history.get(i, j, k, slow.nstp) - f).abs() < TOL, "history not stored");
            assert_eq!(history.get(i, j, k, slow.nnew), 1.0);
        }
    }

    #[test]
    fn test_third_step_coupling_uses_adams_bashforth() {
        let slow = SlowSlots::new(2, 0);
        let mut hist = [0.0; 3];
        hist[slow.nnew] = 1.0;
        hist[slow.nstp] = 0.4;
        let (bx, mut rhs, mut frc, mut history) = coupling_fields(2.0, hist);

        let coupling = Coupling::for_step(2, 0);
        assert_eq!(coupling, Coupling::ThirdOrder);
        couple(Executor::Serial, &bx, coupling, slow, &mut rhs, &mut frc, &mut history).unwrap();

        let f = 2.0 - 0.3;
        let expected = 0.3 + 23.0 / 12.0 * f - 16.0 / 12.0 * 1.0 + 5.0 / 12.0 * 0.4;
        for (i, j, k) in bx.iter() {
            assert!((rhs.get(i, j, k, 0) - expected).abs() < TOL, "rhs {}", rhs.get(i, j, k, 0));
            // the oldest level is overwritten by this step's forcing
            assert!((history.get(i, j, k, slow.nstp) - f).abs() < TOL);
        }
    }

    #[test]
    fn test_history_rotates_between_steps() {
        let bx = IndexBox::new([0, 0, 0], [1, 1, 0]);
        let mut history = Field::new(bx, 3);
        for (iic, forcing) in [(0, 1.0), (1, 2.0), (2, 4.0)] {
            let slow = SlowSlots::new(iic, 0);
            let mut rhs = Field::new(bx, 1);
            let mut frc = Field::filled(bx, 1, forcing);
            let coupling = Coupling::for_step(iic, 0);
            couple(Executor::Serial, &bx, coupling, slow, &mut rhs, &mut frc, &mut history).unwrap();
            assert_eq!(history.get(0, 0, 0, slow.nstp), forcing, "step {}", iic);
        }
        // the step after reads the last two forcings as nnew and nstp history
        let next = SlowSlots::new(3, 0);
        assert_eq!(history.get(1, 1, 0, next.nnew), 4.0);
        assert_eq!(history.get(1, 1, 0, next.nstp), 2.0);
    }

    #[test]
    fn test_coupling_stages() {
        assert_eq!(Coupling::for_step(0, 0), Coupling::Forward);
        assert_eq!(Coupling::for_step(1, 0), Coupling::SecondOrder);
        assert_eq!(Coupling::for_step(7, 0), Coupling::ThirdOrder);
    }
}
