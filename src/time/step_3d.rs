//! One baroclinic step.
//!
//! 1. Ghost cells of the starting level, vertical grid, layer transports
//!    and density.
//! 2. 3D right-hand side `ru`/`rv` at `nrhs` (pressure gradient, Coriolis,
//!    advection) and its column integral `rufrc`/`rvfrc`.
//! 3. The barotropic cycle, `my_iif = 0..=nfast` predictors with a
//!    corrector after every one but the last.
//! 4. Free surface reset to its cycle average, vertical grid rebuilt.
//! 5. Velocity update to `nnew`, with every column's depth mean replaced by
//!    the averaged barotropic transport.
//! 6. Transports of the new velocity, with column sums matched to the
//!    secondary-weight transport averages, then flux-form tracer update and
//!    masking of every tracer component.

use tracing::{debug, info_span};

use crate::boundary::BcVar;
use crate::config::OceanConfig;
use crate::error::Result;
use crate::exec::{Executor, KernelContext};
use crate::field::{Field, GridMetrics};
use crate::rhs::{
    compute_coriolis, compute_hydrostatic_pressure_gradient, compute_momentum_advection,
    CoriolisInput, MomentumAdvection, MomentumForcing, PressureConstants, PressureInput,
};
use crate::state::{Ghosts, OceanState};
use crate::types::{Direction, IndexBox, Staggering};
use crate::vertical::{compute_horizontal_transports, compute_vertical_transport};

use super::slots::SlowSlots;
use super::step_2d::{step_2d, FastStep};
use super::weights::FastWeights;

/// Advance `state` by one baroclinic step of length `config.dt`.
///
/// Returns the slots the step used; `nnew` holds the new level. The step
/// counter and model time are advanced on success.
pub fn step_3d(
    ctx: KernelContext<'_>,
    config: &OceanConfig,
    weights: &FastWeights,
    state: &mut OceanState,
) -> Result<SlowSlots> {
    let slots = state.slow_slots();
    let SlowSlots { nstp, nnew, nrhs } = slots;
    let exec = ctx.exec;
    let cells = state.cell_box();
    let domain = state.geom.domain();
    let xbx = domain.surrounding_nodes(Direction::X);
    let ybx = domain.surrounding_nodes(Direction::Y);
    debug!(iic = state.iic, nstp, nnew, nrhs, "baroclinic step");

    fill_level_ghosts(ctx, state, nstp, nstp)?;
    state.update_vertical(exec, 0)?;
    update_transports(ctx, state, nstp, false)?;
    state
        .eos
        .compute_density(exec, &cells, &state.tracers[nstp], &mut state.rho)?;

    compute_rhs_3d(ctx, config, state, slots)?;

    {
        let _cycle = info_span!("barotropic cycle", iic = state.iic, nfast = weights.nfast()).entered();
        for my_iif in 0..=weights.nfast() {
            step_2d(ctx, config, weights, state, FastStep::predictor(my_iif))?;
            if my_iif < weights.nfast() {
                step_2d(ctx, config, weights, state, FastStep::corrector(my_iif))?;
            }
        }
    }

    // free surface at the cycle average
    let slab = state.slab_box();
    let mut hz_old = ctx.pool.acquire(cells, 1);
    hz_old.copy_from(&state.vert.hz)?;
    for n in 0..3 {
        state
            .zeta
            .copy_region(&state.averages.zt_avg1, 0, n, &slab)?;
    }
    state.update_vertical(exec, 0)?;

    update_velocity(exec, config.dt, state, slots, Direction::X, &xbx, &hz_old)?;
    update_velocity(exec, config.dt, state, slots, Direction::Y, &ybx, &hz_old)?;
    set_barotropic_from_averages(exec, state, Direction::X)?;
    set_barotropic_from_averages(exec, state, Direction::Y)?;
    fill_velocity_ghosts(ctx, state, nnew, nstp)?;

    update_transports(ctx, state, nnew, true)?;
    update_tracers(ctx, config, state, slots, &hz_old)?;

    state.iic += 1;
    state.time += config.dt;
    Ok(slots)
}

/// Pressure gradient, Coriolis and advection into `ru`/`rv[nrhs]`; their
/// column integrals plus stresses into `rufrc`/`rvfrc`.
fn compute_rhs_3d(
    ctx: KernelContext<'_>,
    config: &OceanConfig,
    state: &mut OceanState,
    slots: SlowSlots,
) -> Result<()> {
    let nrhs = slots.nrhs;
    let domain = state.geom.domain();
    let xbx = domain.surrounding_nodes(Direction::X);
    let ybx = domain.surrounding_nodes(Direction::Y);
    let cells = state.cell_box();
    let OceanState {
        geom,
        metrics,
        vert,
        u,
        v,
        rho,
        huon,
        hvom,
        w,
        ru,
        rv,
        rufrc,
        rvfrc,
        stress,
        ..
    } = state;
    let (geom, metrics, vert, rho) = (&*geom, &*metrics, &*vert, &*rho);
    let (u, v, huon, hvom, w, stress) = (&*u, &*v, &*huon, &*hvom, &*w, &*stress);

    if config.use_prsgrd {
        compute_hydrostatic_pressure_gradient(
            ctx,
            &xbx,
            &ybx,
            &PressureInput {
                metrics,
                rho,
                hz: &vert.hz,
                z_r: &vert.z_r,
                z_w: &vert.z_w,
                constants: PressureConstants::new(config.g, config.rho0),
            },
            ru,
            rv,
            nrhs,
        )?;
    } else {
        ru.set_comp(nrhs, 0.0);
        rv.set_comp(nrhs, 0.0);
    }

    if config.coriolis.is_some() {
        compute_coriolis(
            ctx,
            &xbx,
            &ybx,
            &CoriolisInput {
                fomn: &metrics.fomn,
                thickness: &vert.hz,
                u,
                u_comp: nrhs,
                v,
                v_comp: nrhs,
            },
            ru,
            nrhs,
            rv,
            nrhs,
        )?;
    }

    let mut u_rhs = ctx.pool.acquire(cells, 1);
    let mut v_rhs = ctx.pool.acquire(cells, 1);
    u_rhs.copy_region(u, nrhs, 0, &cells)?;
    v_rhs.copy_region(v, nrhs, 0, &cells)?;

    rufrc.set_val(0.0);
    rvfrc.set_val(0.0);
    compute_momentum_advection(
        ctx,
        &xbx,
        &ybx,
        &MomentumAdvection {
            geom,
            metrics,
            u: &u_rhs,
            v: &v_rhs,
            huon,
            hvom,
            w,
            stress,
            scheme: config.uv_hadv_scheme,
        },
        &mut MomentumForcing {
            ru,
            rv,
            rufrc,
            rvfrc,
            nrhs,
        },
    )
}

/// `Huon`, `Hvom` from velocity level `n` and the current `Hz`, then `W`.
/// With `coupled`, every domain column of the horizontal transports is
/// shifted to integrate to `DU_avg2`/`DV_avg2` first.
fn update_transports(
    ctx: KernelContext<'_>,
    state: &mut OceanState,
    n: usize,
    coupled: bool,
) -> Result<()> {
    let cells = state.cell_box();
    let ubx = cells.grow_lo(Direction::X, -1);
    let vbx = cells.grow_lo(Direction::Y, -1);
    let wcells = cells.grow([-1, -1, 0]);

    let mut u_n = ctx.pool.acquire(cells, 1);
    let mut v_n = ctx.pool.acquire(cells, 1);
    u_n.copy_region(&state.u, n, 0, &cells)?;
    v_n.copy_region(&state.v, n, 0, &cells)?;

    compute_horizontal_transports(
        ctx.exec,
        &ubx,
        &vbx,
        &state.metrics,
        &state.vert.hz,
        &u_n,
        &v_n,
        &mut state.huon,
        &mut state.hvom,
    )?;
    if coupled {
        for dir in [Direction::X, Direction::Y] {
            couple_transport(ctx.exec, state, dir)?;
        }
    }
    compute_vertical_transport(
        ctx.exec,
        &wcells,
        &state.huon,
        &state.hvom,
        &state.vert.z_w,
        &mut state.w,
    )?;
    for f in [&mut state.huon, &mut state.hvom, &mut state.w] {
        state.geom.periodic_fill(f);
    }
    Ok(())
}

/// Shift every column of `Huon` (or `Hvom`) over the domain faces so it
/// integrates to the barotropic transport average:
///
/// ```text
/// CF    = (Σ Huon - DU_avg2) / Σ DC,   DC = Hz_u·on_u
/// Huon -= DC·CF
/// ```
fn couple_transport(exec: Executor, state: &mut OceanState, dir: Direction) -> Result<()> {
    let OceanState {
        geom,
        metrics,
        vert,
        huon,
        hvom,
        averages,
        ..
    } = state;
    let (flux, avg) = match dir {
        Direction::X => (huon, &averages.du_avg2),
        _ => (hvom, &averages.dv_avg2),
    };
    let faces = geom.domain().surrounding_nodes(dir);
    let k0 = avg.bx().small_end(Direction::Z);
    avg.require("averaged transport", &faces.make_slab(Direction::Z, k0))?;
    let (di, dj) = offsets(dir);
    let (k_lo, k_hi) = (faces.small_end(Direction::Z), faces.big_end(Direction::Z));
    let (hz, metrics) = (&vert.hz, &*metrics);

    let current = &*flux;
    let columns = exec.map_columns(&faces, |i, j| {
        let width = face_width(metrics, dir, i, j, k0);
        let dc: Vec<f64> = (k_lo..=k_hi)
            .map(|k| 0.5 * (hz.get(i, j, k, 0) + hz.get(i - di, j - dj, k, 0)) * width)
            .collect();
        let depth: f64 = dc.iter().sum();
        let total: f64 = (k_lo..=k_hi).map(|k| current.get(i, j, k, 0)).sum();
        let cf = if depth > 0.0 {
            (total - avg.get(i, j, k0, 0)) / depth
        } else {
            0.0
        };
        (k_lo..=k_hi)
            .zip(dc.iter())
            .map(|(k, d)| current.get(i, j, k, 0) - d * cf)
            .collect()
    });
    let slab = faces.make_slab(Direction::Z, k_lo);
    for ((i, j, _), column) in slab.iter().zip(columns.iter()) {
        flux.assign_column(i, j, 0, k_lo, column);
    }
    Ok(())
}

/// Update the velocity along `dir` to `nnew` over the face box `bx` and
/// correct every column to the averaged barotropic transport.
///
/// ```text
/// u*      = (u[nstp]·Hz_u_old + dt·mn_u·ru[nrhs]) / Hz_u
/// CF      = (Σ DC·u* - DU_avg1) / Σ DC,   DC = Hz_u·on_u
/// u[nnew] = u* - CF
/// ```
fn update_velocity(
    exec: Executor,
    dt: f64,
    state: &mut OceanState,
    slots: SlowSlots,
    dir: Direction,
    bx: &IndexBox,
    hz_old: &Field,
) -> Result<()> {
    let SlowSlots { nstp, nnew, nrhs } = slots;
    let OceanState {
        metrics,
        mask,
        vert,
        u,
        v,
        ru,
        rv,
        averages,
        ..
    } = state;
    let (vel, r, avg, stagger) = match dir {
        Direction::X => (u, &*ru, &averages.du_avg1, Staggering::XFace),
        _ => (v, &*rv, &averages.dv_avg1, Staggering::YFace),
    };
    let (di, dj) = offsets(dir);
    let k0 = avg.bx().small_end(Direction::Z);
    let (k_lo, k_hi) = (bx.small_end(Direction::Z), bx.big_end(Direction::Z));
    let hz = &vert.hz;
    let metrics: &GridMetrics = metrics;
    avg.require("averaged transport", &bx.make_slab(Direction::Z, k0))?;

    let old = &*vel;
    let columns = exec.map_columns(bx, |i, j| {
        let mn = match dir {
            Direction::X => metrics.mn_u(i, j, k0),
            _ => metrics.mn_v(i, j, k0),
        };
        let width = face_width(metrics, dir, i, j, k0);
        let mut column = Vec::with_capacity((k_hi - k_lo + 1) as usize);
        let mut depth = 0.0;
        let mut transport = 0.0;
        for k in k_lo..=k_hi {
            let h_old = 0.5 * (hz_old.get(i, j, k, 0) + hz_old.get(i - di, j - dj, k, 0));
            let h_new = 0.5 * (hz.get(i, j, k, 0) + hz.get(i - di, j - dj, k, 0));
            let value = if h_new > 0.0 {
                (old.get(i, j, k, nstp) * h_old + dt * mn * r.get(i, j, k, nrhs)) / h_new
            } else {
                0.0
            };
            depth += h_new * width;
            transport += h_new * width * value;
            column.push(value);
        }
        if depth > 0.0 {
            let cf = (transport - avg.get(i, j, k0, 0)) / depth;
            for value in column.iter_mut() {
                *value -= cf;
            }
        }
        column
    });
    let slab = bx.make_slab(Direction::Z, k_lo);
    for ((i, j, _), column) in slab.iter().zip(columns.iter()) {
        vel.assign_column(i, j, nnew, k_lo, column);
    }
    mask.apply(vel, nnew, stagger);
    Ok(())
}

/// Every barotropic slot set to the averaged transport over the new face depth.
fn set_barotropic_from_averages(exec: Executor, state: &mut OceanState, dir: Direction) -> Result<()> {
    let OceanState {
        geom,
        metrics,
        mask,
        zeta,
        ubar,
        vbar,
        averages,
        ..
    } = state;
    let (bar, avg, stagger) = match dir {
        Direction::X => (ubar, &averages.du_avg1, Staggering::XFace),
        _ => (vbar, &averages.dv_avg1, Staggering::YFace),
    };
    let k0 = avg.bx().small_end(Direction::Z);
    let faces = geom
        .domain()
        .make_slab(Direction::Z, k0)
        .surrounding_nodes(dir);
    let (di, dj) = offsets(dir);
    let h = &metrics.h;
    let metrics: &GridMetrics = metrics;
    let zeta: &Field = zeta;
    let values = exec.map_box(&faces, |i, j, k| {
        let depth = 0.5
            * (zeta.get(i, j, k, 0) + h.get(i, j, k, 0) + zeta.get(i - di, j - dj, k, 0)
                + h.get(i - di, j - dj, k, 0));
        let area = depth * face_width(metrics, dir, i, j, k);
        if area > 0.0 {
            avg.get(i, j, k, 0) / area
        } else {
            0.0
        }
    });
    for n in 0..3 {
        bar.assign(&faces, n, &values);
        mask.apply(bar, n, stagger);
    }
    Ok(())
}

/// Flux-form tracer update from `nstp` to `nnew` with centred fluxes,
/// then boundary fill and masking of every component.
fn update_tracers(
    ctx: KernelContext<'_>,
    config: &OceanConfig,
    state: &mut OceanState,
    slots: SlowSlots,
    hz_old: &Field,
) -> Result<()> {
    let nstp = slots.nstp;
    let exec = ctx.exec;
    let domain = state.geom.domain();
    let cells = state.cell_box();
    let OceanState {
        metrics,
        mask,
        boundary,
        vert,
        tracers,
        huon,
        hvom,
        w,
        ..
    } = state;
    let [t0, t1] = tracers;
    let (old, new) = if nstp == 0 { (&*t0, t1) } else { (&*t1, t0) };

    if config.use_tracer_advection {
        let (k_lo, k_hi) = (domain.small_end(Direction::Z), domain.big_end(Direction::Z));
        let k0 = metrics.pm.bx().small_end(Direction::Z);
        let xfaces = domain.surrounding_nodes(Direction::X);
        let yfaces = domain.surrounding_nodes(Direction::Y);
        let (pm, pn, hz, dt) = (&metrics.pm, &metrics.pn, &vert.hz, config.dt);
        let (huon, hvom, w) = (&*huon, &*hvom, &*w);

        for n in 0..old.ncomp() {
            let mut fx = ctx.pool.acquire(cells, 1);
            let mut fe = ctx.pool.acquire(cells, 1);
            exec.fill(&mut fx, 0, &xfaces, |i, j, k| {
                huon.get(i, j, k, 0) * 0.5 * (old.get(i, j, k, n) + old.get(i - 1, j, k, n))
            });
            exec.fill(&mut fe, 0, &yfaces, |i, j, k| {
                hvom.get(i, j, k, 0) * 0.5 * (old.get(i, j, k, n) + old.get(i, j - 1, k, n))
            });
            let (fx, fe) = (&*fx, &*fe);
            // vertical flux through the bottom face of k; closed at both ends
            let fc = |i: i32, j: i32, k: i32| {
                if k <= k_lo || k > k_hi {
                    0.0
                } else {
                    w.get(i, j, k, 0) * 0.5 * (old.get(i, j, k, n) + old.get(i, j, k - 1, n))
                }
            };
            let values = exec.map_box(&domain, |i, j, k| {
                let h_new = hz.get(i, j, k, 0);
                if h_new <= 0.0 {
                    return 0.0;
                }
                let div = fx.get(i + 1, j, k, 0) - fx.get(i, j, k, 0) + fe.get(i, j + 1, k, 0)
                    - fe.get(i, j, k, 0)
                    + fc(i, j, k + 1)
                    - fc(i, j, k);
                (hz_old.get(i, j, k, 0) * old.get(i, j, k, n)
                    - dt * pm.get(i, j, k0, 0) * pn.get(i, j, k0, 0) * div)
                    / h_new
            });
            new.assign(&domain, n, &values);
        }
    } else {
        new.copy_from(old)?;
    }

    let ghosts = Ghosts {
        engine: boundary,
        mask,
    };
    for n in 0..new.ncomp() {
        let var = BcVar::tracer(n).unwrap_or(BcVar::Scalar);
        ghosts.fill(new, n, var, Staggering::Cell, old, n)?;
        mask.apply(new, n, Staggering::Cell);
    }
    Ok(())
}

/// Ghost cells of velocity and tracer level `n`; `reference` is the level
/// holding the previous-time values.
fn fill_level_ghosts(
    ctx: KernelContext<'_>,
    state: &mut OceanState,
    n: usize,
    reference: usize,
) -> Result<()> {
    fill_velocity_ghosts(ctx, state, n, reference)?;
    let OceanState {
        boundary,
        mask,
        tracers,
        ..
    } = state;
    let ghosts = Ghosts {
        engine: boundary,
        mask,
    };
    let level = &mut tracers[n];
    let mut previous = ctx.pool.acquire(level.bx(), level.ncomp());
    previous.copy_from(level)?;
    for comp in 0..level.ncomp() {
        let var = BcVar::tracer(comp).unwrap_or(BcVar::Scalar);
        ghosts.fill(level, comp, var, Staggering::Cell, &previous, comp)?;
    }
    Ok(())
}

/// Ghost cells of `u`, `v` at slot `n` and of every barotropic slot.
fn fill_velocity_ghosts(
    ctx: KernelContext<'_>,
    state: &mut OceanState,
    n: usize,
    reference: usize,
) -> Result<()> {
    let OceanState {
        boundary,
        mask,
        u,
        v,
        zeta,
        ubar,
        vbar,
        ..
    } = state;
    let ghosts = Ghosts {
        engine: boundary,
        mask,
    };
    for (field, var, stagger) in [
        (u, BcVar::XVel, Staggering::XFace),
        (v, BcVar::YVel, Staggering::YFace),
    ] {
        let mut previous = ctx.pool.acquire(field.bx(), field.ncomp());
        previous.copy_from(field)?;
        ghosts.fill(field, n, var, stagger, &previous, reference)?;
    }
    for (field, var, stagger) in [
        (zeta, BcVar::Zeta, Staggering::Cell),
        (ubar, BcVar::Ubar, Staggering::XFace),
        (vbar, BcVar::Vbar, Staggering::YFace),
    ] {
        let mut previous = ctx.pool.acquire(field.bx(), field.ncomp());
        previous.copy_from(field)?;
        for slot in 0..3 {
            ghosts.fill(field, slot, var, stagger, &previous, slot)?;
        }
    }
    Ok(())
}

#[inline]
fn offsets(dir: Direction) -> (i32, i32) {
    match dir {
        Direction::X => (1, 0),
        _ => (0, 1),
    }
}

#[inline]
fn face_width(metrics: &GridMetrics, dir: Direction, i: i32, j: i32, k: i32) -> f64 {
    match dir {
        Direction::X => metrics.on_u.get(i, j, k, 0),
        _ => metrics.om_v.get(i, j, k, 0),
    }
}
