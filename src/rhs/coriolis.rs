//! Coriolis forcing on a C-grid.
//!
//! The rotation term is formed at cell centres and averaged to the faces:
//!
//! ```text
//! UFx = ½·D·fomn·(v(j) + v(j+1))      ru(i) += ½·(UFx(i) + UFx(i-1))
//! VFe = ½·D·fomn·(u(i) + u(i+1))      rv(j) -= ½·(VFe(j) + VFe(j-1))
//! ```
//!
//! `D` is the layer thickness `Hz` for the 3D momentum and the total depth
//! for the barotropic momentum; the kernel is the same.

use crate::error::Result;
use crate::exec::KernelContext;
use crate::field::Field;
use crate::types::{Direction, IndexBox};

/// Velocities and thickness the rotation acts on.
#[derive(Clone, Copy, Debug)]
pub struct CoriolisInput<'a> {
    /// `f / (pm·pn)` (single slab)
    pub fomn: &'a Field,
    /// Thickness at cell centres: `Hz` or the total depth
    pub thickness: &'a Field,
    pub u: &'a Field,
    pub u_comp: usize,
    pub v: &'a Field,
    pub v_comp: usize,
}

/// Add the Coriolis term to `ru[ru_comp]` over `xbx` and `rv[rv_comp]` over `ybx`.
#[allow(clippy::too_many_arguments)]
pub fn compute_coriolis(
    ctx: KernelContext<'_>,
    xbx: &IndexBox,
    ybx: &IndexBox,
    input: &CoriolisInput<'_>,
    ru: &mut Field,
    ru_comp: usize,
    rv: &mut Field,
    rv_comp: usize,
) -> Result<()> {
    let ucells = xbx.grow_lo(Direction::X, 1);
    let vcells = ybx.grow_lo(Direction::Y, 1);
    let km = input.fomn.bx().small_end(Direction::Z);
    let slab = |bx: &IndexBox| bx.make_slab(Direction::Z, km);
    input.fomn.require("fomn", &slab(&ucells))?;
    input.fomn.require("fomn", &slab(&vcells))?;
    input.thickness.require("thickness", &ucells)?;
    input.thickness.require("thickness", &vcells)?;
    input.v.require("v", &ucells.grow_hi(Direction::Y, 1))?;
    input.v.require_comp("v", input.v_comp)?;
    input.u.require("u", &vcells.grow_hi(Direction::X, 1))?;
    input.u.require_comp("u", input.u_comp)?;
    ru.require("u forcing", xbx)?;
    ru.require_comp("u forcing", ru_comp)?;
    rv.require("v forcing", ybx)?;
    rv.require_comp("v forcing", rv_comp)?;

    let cff = |i: i32, j: i32, k: i32| {
        0.5 * input.thickness.get(i, j, k, 0) * input.fomn.get(i, j, km, 0)
    };

    let mut ufx = ctx.pool.acquire(ucells, 1);
    ctx.exec.fill(&mut ufx, 0, &ucells, |i, j, k| {
        cff(i, j, k) * (input.v.get(i, j, k, input.v_comp) + input.v.get(i, j + 1, k, input.v_comp))
    });
    let ufx = &*ufx;
    let dest = &*ru;
    let values = ctx.exec.map_box(xbx, |i, j, k| {
        dest.get(i, j, k, ru_comp) + 0.5 * (ufx.get(i, j, k, 0) + ufx.get(i - 1, j, k, 0))
    });
    ru.assign(xbx, ru_comp, &values);

    let mut vfe = ctx.pool.acquire(vcells, 1);
    ctx.exec.fill(&mut vfe, 0, &vcells, |i, j, k| {
        cff(i, j, k) * (input.u.get(i, j, k, input.u_comp) + input.u.get(i + 1, j, k, input.u_comp))
    });
    let vfe = &*vfe;
    let dest = &*rv;
    let values = ctx.exec.map_box(ybx, |i, j, k| {
        dest.get(i, j, k, rv_comp) - 0.5 * (vfe.get(i, j, k, 0) + vfe.get(i, j - 1, k, 0))
    });
    rv.assign(ybx, rv_comp, &values);
    Ok(())
}
