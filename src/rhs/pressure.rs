//! Baroclinic pressure gradient with the density-Jacobian form of
//! Shchepetkin and McWilliams (2003).
//!
//! Pressure is integrated downward from the free surface with harmonic-mean
//! vertical derivatives of density and depth; the horizontal force at a face
//! combines the pressure difference with a Jacobian correction built from
//! harmonic-mean horizontal derivatives. Over a sloping bottom a density
//! field that is constant in space gives exactly no force.
//!
//! The face force overwrites the `nrhs` slot of `ru`/`rv`: it is the first
//! term of the 3D right-hand side.

use crate::error::{OceanError, Result};
use crate::exec::KernelContext;
use crate::field::{Field, GridMetrics};
use crate::types::{Direction, IndexBox};

use super::{shift, Point};

const ONE_FIFTH: f64 = 0.2;
const ONE_TWELFTH: f64 = 1.0 / 12.0;
/// Threshold below which a harmonic-mean derivative is treated as an extremum.
const EPS: f64 = 1.0e-10;

/// Gravity-over-density scalings of the pressure integral.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressureConstants {
    /// `g / rho0`
    pub grho: f64,
    /// `1000·g / rho0`, free-surface contribution
    pub grho0: f64,
    /// `g / (2·rho0)`
    pub half_grho: f64,
}

impl PressureConstants {
    pub fn new(g: f64, rho0: f64) -> Self {
        let grho = g / rho0;
        Self {
            grho,
            grho0: 1000.0 * grho,
            half_grho: 0.5 * grho,
        }
    }
}

/// Inputs of the pressure-gradient kernel. `rho` is the density anomaly
/// (`ρ - 1000`) at cell centres.
#[derive(Clone, Copy, Debug)]
pub struct PressureInput<'a> {
    pub metrics: &'a GridMetrics,
    pub rho: &'a Field,
    pub hz: &'a Field,
    pub z_r: &'a Field,
    pub z_w: &'a Field,
    pub constants: PressureConstants,
}

#[inline]
fn limited(a: f64, b: f64) -> f64 {
    let cff = 2.0 * a * b;
    if cff > EPS {
        cff / (a + b)
    } else {
        0.0
    }
}

/// Hydrostatic pressure of one column, top-down.
///
/// `rho` and `z_r` hold the column bottom to top, `zs` is the surface
/// elevation. Requires at least two levels.
pub(crate) fn column_pressure(c: &PressureConstants, rho: &[f64], z_r: &[f64], zs: f64) -> Vec<f64> {
    let n = rho.len();
    let top = n - 1;
    let diff = |a: &[f64], m: usize| {
        if m < top {
            a[m + 1] - a[m]
        } else {
            a[top] - a[top - 1]
        }
    };
    let dr_raw: Vec<f64> = (0..n).map(|m| diff(rho, m)).collect();
    let dz_raw: Vec<f64> = (0..n).map(|m| diff(z_r, m)).collect();
    let dr: Vec<f64> = (0..n)
        .map(|m| limited(dr_raw[m], dr_raw[m.saturating_sub(1)]))
        .collect();
    let dz: Vec<f64> = (0..n)
        .map(|m| {
            let below = dz_raw[m.saturating_sub(1)];
            2.0 * dz_raw[m] * below / (dz_raw[m] + below)
        })
        .collect();

    let mut p = vec![0.0; n];
    let cff2 = 0.5 * (rho[top] - rho[top - 1]) * (zs - z_r[top]) / (z_r[top] - z_r[top - 1]);
    p[top] = c.grho0 * zs + c.grho * (rho[top] + cff2) * (zs - z_r[top]);
    for m in (0..top).rev() {
        p[m] = p[m + 1]
            + c.half_grho
                * ((rho[m + 1] + rho[m]) * (z_r[m + 1] - z_r[m])
                    - ONE_FIFTH
                        * ((dr[m + 1] - dr[m])
                            * (z_r[m + 1] - z_r[m] - ONE_TWELFTH * (dz[m + 1] + dz[m]))
                            - (dz[m + 1] - dz[m])
                                * (rho[m + 1] - rho[m] - ONE_TWELFTH * (dr[m + 1] + dr[m]))));
    }
    p
}

/// Assign the pressure-gradient force to `ru[nrhs]` over `xbx` and
/// `rv[nrhs]` over `ybx`.
///
/// Density and `z_r` must cover the cells behind both face boxes grown by
/// one cell horizontally; `z_w` the surface level above them.
///
/// # Errors
///
/// [`OceanError::InvalidConfig`] for a single-level column, box errors for
/// missing coverage. Nothing is written on error.
#[allow(clippy::too_many_arguments)]
pub fn compute_hydrostatic_pressure_gradient(
    ctx: KernelContext<'_>,
    xbx: &IndexBox,
    ybx: &IndexBox,
    input: &PressureInput<'_>,
    ru: &mut Field,
    rv: &mut Field,
    nrhs: usize,
) -> Result<()> {
    let cells = xbx
        .grow_lo(Direction::X, 1)
        .hull(&ybx.grow_lo(Direction::Y, 1));
    if cells.length(Direction::Z) < 2 {
        return Err(OceanError::InvalidConfig(format!(
            "pressure gradient needs at least two levels, got {}",
            cells.length(Direction::Z)
        )));
    }
    let k_lo = cells.small_end(Direction::Z);
    let k_hi = cells.big_end(Direction::Z);
    let km = input.metrics.on_u.bx().small_end(Direction::Z);

    input.rho.require("rho", &cells.grow([1, 1, 0]))?;
    input.z_r.require("z_r", &cells.grow([1, 1, 0]))?;
    input.hz.require("Hz", &cells)?;
    input
        .z_w
        .require("z_w", &cells.make_slab(Direction::Z, k_hi + 1))?;
    input
        .metrics
        .on_u
        .require("on_u", &xbx.make_slab(Direction::Z, km))?;
    input
        .metrics
        .om_v
        .require("om_v", &ybx.make_slab(Direction::Z, km))?;
    ru.require("u forcing", xbx)?;
    ru.require_comp("u forcing", nrhs)?;
    rv.require("v forcing", ybx)?;
    rv.require_comp("v forcing", nrhs)?;

    let (rho, z_r) = (input.rho, input.z_r);
    let mut p = ctx.pool.acquire(cells, 1);
    ctx.exec.fill_columns(&mut p, 0, &cells, |i, j| {
        let r: Vec<f64> = (k_lo..=k_hi).map(|k| rho.get(i, j, k, 0)).collect();
        let z: Vec<f64> = (k_lo..=k_hi).map(|k| z_r.get(i, j, k, 0)).collect();
        column_pressure(&input.constants, &r, &z, input.z_w.get(i, j, k_hi + 1, 0))
    });

    face_force(ctx, Direction::X, xbx, input, &p, &input.metrics.on_u, km, ru, nrhs);
    face_force(ctx, Direction::Y, ybx, input, &p, &input.metrics.om_v, km, rv, nrhs);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn face_force(
    ctx: KernelContext<'_>,
    dir: Direction,
    bx: &IndexBox,
    input: &PressureInput<'_>,
    p: &Field,
    face_length: &Field,
    km: i32,
    r: &mut Field,
    nrhs: usize,
) {
    let (rho, z_r) = (input.rho, input.z_r);
    let at = |f: &Field, q: Point| f.get(q.0, q.1, q.2, 0);

    // horizontal derivatives at the cells behind the faces
    let cells = bx.grow_lo(dir, 1);
    let mut dx = ctx.pool.acquire(cells, 2);
    ctx.exec.fill(&mut dx, 0, &cells, |i, j, k| {
        let c = (i, j, k);
        let (lo, hi) = (shift(c, dir, -1), shift(c, dir, 1));
        limited(at(rho, c) - at(rho, lo), at(rho, hi) - at(rho, c))
    });
    ctx.exec.fill(&mut dx, 1, &cells, |i, j, k| {
        let c = (i, j, k);
        let (lo, hi) = (shift(c, dir, -1), shift(c, dir, 1));
        limited(at(z_r, c) - at(z_r, lo), at(z_r, hi) - at(z_r, c))
    });

    let dx = &*dx;
    let c = input.constants;
    let values = ctx.exec.map_box(bx, |i, j, k| {
        let q = (i, j, k);
        let b = shift(q, dir, -1);
        let dr = |x: Point| dx.get(x.0, x.1, x.2, 0);
        let dz = |x: Point| dx.get(x.0, x.1, x.2, 1);
        let drho = at(rho, q) - at(rho, b);
        let dzr = at(z_r, q) - at(z_r, b);
        face_length.get(i, j, km, 0)
            * 0.5
            * (at(input.hz, q) + at(input.hz, b))
            * (at(p, b) - at(p, q)
                - c.half_grho
                    * ((at(rho, q) + at(rho, b)) * dzr
                        - ONE_FIFTH
                            * ((dr(q) - dr(b)) * (dzr - ONE_TWELFTH * (dz(q) + dz(b)))
                                - (dz(q) - dz(b)) * (drho - ONE_TWELFTH * (dr(q) + dr(b))))))
    });
    r.assign(bx, nrhs, &values);
}
