//! Layer transports through cell faces.
//!
//! ```text
//! Huon(i,j,k) = ½·(Hz(i,j,k) + Hz(i-1,j,k))·u(i,j,k)·on_u(i,j)
//! Hvom(i,j,k) = ½·(Hz(i,j,k) + Hz(i,j-1,k))·v(i,j,k)·om_v(i,j)
//! ```
//!
//! The vertical transport `W` (m³/s through the bottom face of each cell)
//! follows from continuity, integrated upward from a closed bottom. Whatever
//! reaches the surface is the free-surface tendency; it is removed
//! proportionally to the height above the bottom so that `W(N+1) = 0`.

use crate::error::Result;
use crate::exec::Executor;
use crate::field::{Field, GridMetrics};
use crate::types::{Direction, IndexBox};

/// Horizontal layer transports `Huon` over the u-point box `ubx` and `Hvom`
/// over the v-point box `vbx`.
#[allow(clippy::too_many_arguments)]
pub fn compute_horizontal_transports(
    exec: Executor,
    ubx: &IndexBox,
    vbx: &IndexBox,
    metrics: &GridMetrics,
    hz: &Field,
    u: &Field,
    v: &Field,
    huon: &mut Field,
    hvom: &mut Field,
) -> Result<()> {
    u.require("u", ubx)?;
    v.require("v", vbx)?;
    hz.require("Hz", &ubx.grow_lo(Direction::X, 1))?;
    hz.require("Hz", &vbx.grow_lo(Direction::Y, 1))?;
    huon.require("Huon", ubx)?;
    hvom.require("Hvom", vbx)?;
    let k_lo = metrics.on_u.bx().small_end(Direction::Z);
    metrics
        .on_u
        .require("on_u", &ubx.make_slab(Direction::Z, k_lo))?;
    metrics
        .om_v
        .require("om_v", &vbx.make_slab(Direction::Z, k_lo))?;

    exec.fill(huon, 0, ubx, |i, j, k| {
        0.5 * (hz.get(i, j, k, 0) + hz.get(i - 1, j, k, 0))
            * u.get(i, j, k, 0)
            * metrics.on_u.get(i, j, k_lo, 0)
    });
    exec.fill(hvom, 0, vbx, |i, j, k| {
        0.5 * (hz.get(i, j, k, 0) + hz.get(i, j - 1, k, 0))
            * v.get(i, j, k, 0)
            * metrics.om_v.get(i, j, k_lo, 0)
    });
    Ok(())
}

/// Vertical transport at the w-points of the cells in `bx` (`bx` spans all
/// levels; `W` is written on `0..=N+1`).
pub fn compute_vertical_transport(
    exec: Executor,
    bx: &IndexBox,
    huon: &Field,
    hvom: &Field,
    z_w: &Field,
    w: &mut Field,
) -> Result<()> {
    let w_bx = bx.grow_hi(Direction::Z, 1);
    huon.require("Huon", &bx.grow_hi(Direction::X, 1))?;
    hvom.require("Hvom", &bx.grow_hi(Direction::Y, 1))?;
    z_w.require("z_w", &w_bx)?;
    w.require("W", &w_bx)?;

    let k_lo = bx.small_end(Direction::Z);
    let k_hi = bx.big_end(Direction::Z);
    exec.fill_columns(w, 0, &w_bx, |i, j| {
        let mut column = Vec::with_capacity(w_bx.length(Direction::Z));
        let mut acc = 0.0;
        column.push(acc);
        for k in k_lo..=k_hi {
            acc -= (huon.get(i + 1, j, k, 0) - huon.get(i, j, k, 0))
                + (hvom.get(i, j + 1, k, 0) - hvom.get(i, j, k, 0));
            column.push(acc);
        }

        let bottom = z_w.get(i, j, k_lo, 0);
        let depth = z_w.get(i, j, k_hi + 1, 0) - bottom;
        let surface = acc;
        if depth > 0.0 {
            for (n, value) in column.iter_mut().enumerate() {
                let height = z_w.get(i, j, k_lo + n as i32, 0) - bottom;
                *value -= surface * height / depth;
            }
        }
        column
    });
    Ok(())
}
