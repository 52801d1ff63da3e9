//! Momentum advection for the 3D and depth-integrated momentum equations.
//!
//! Fluxes of `u` are formed at cell centres (along x) and at cell corners
//! (across, in y); fluxes of `v` likewise with x and y exchanged. The
//! forcing at a face point is minus the flux divergence:
//!
//! ```text
//! ru(i,j,k) -= (UFx(i) - UFx(i-1)) + (UFe(j+1) - UFe(j))
//! ru(i,j,k) -= FC(k+1) - FC(k)
//! ```
//!
//! # Schemes
//!
//! | Scheme | Horizontal flux | Vertical flux |
//! |--------|-----------------|---------------|
//! | [`Centered2`](AdvectionScheme::Centered2) | `¼·(u₀+u₁)·(T₀+T₁)` | `¼·(u(k-1)+u(k))·(W₀+W₋₁)` |
//! | [`Upstream3`](AdvectionScheme::Upstream3) | centred plus a curvature term from the upstream side | 4-point `9/16, 1/16` interpolation of both factors |
//!
//! In the upstream scheme the curvature next to a non-periodic domain face is
//! taken from the interior neighbour instead of reading outside the domain.
//! The vertical flux vanishes at the bottom and at the surface.

use crate::config::AdvectionScheme;
use crate::error::Result;
use crate::exec::KernelContext;
use crate::field::{Field, Geometry, GridMetrics};
use crate::types::{Direction, IndexBox};

use super::{shift, Point};

/// Curvature weight of the upstream-biased flux.
const GADV: f64 = -0.25;
const C9_16: f64 = 9.0 / 16.0;
const C1_16: f64 = 1.0 / 16.0;

/// Kinematic surface and bottom stresses (single-slab fields, m²/s²).
#[derive(Clone, Debug)]
pub struct StressFields {
    /// Surface stress at u-points
    pub sustr: Field,
    /// Surface stress at v-points
    pub svstr: Field,
    /// Bottom stress at u-points
    pub bustr: Field,
    /// Bottom stress at v-points
    pub bvstr: Field,
}

impl StressFields {
    /// All-zero stresses over a slab box.
    pub fn zeros(slab: IndexBox) -> Self {
        Self {
            sustr: Field::new(slab, 1),
            svstr: Field::new(slab, 1),
            bustr: Field::new(slab, 1),
            bvstr: Field::new(slab, 1),
        }
    }
}

/// Inputs of the 3D momentum advection.
///
/// `u` and `v` hold the velocity at the right-hand-side time level in
/// component 0.
#[derive(Clone, Copy, Debug)]
pub struct MomentumAdvection<'a> {
    pub geom: &'a Geometry,
    pub metrics: &'a GridMetrics,
    pub u: &'a Field,
    pub v: &'a Field,
    pub huon: &'a Field,
    pub hvom: &'a Field,
    pub w: &'a Field,
    pub stress: &'a StressFields,
    pub scheme: AdvectionScheme,
}

/// Forcing accumulators updated by the 3D momentum kernels.
#[derive(Debug)]
pub struct MomentumForcing<'a> {
    pub ru: &'a mut Field,
    pub rv: &'a mut Field,
    /// Depth-integrated forcing at u-points (single slab)
    pub rufrc: &'a mut Field,
    /// Depth-integrated forcing at v-points (single slab)
    pub rvfrc: &'a mut Field,
    /// Time-level component of `ru`/`rv` to update
    pub nrhs: usize,
}

/// Subtract the advection of `u` over `xbx` and of `v` over `ybx` from
/// `ru`/`rv`, then add the column sums plus surface and bottom stress to
/// `rufrc`/`rvfrc`.
///
/// `xbx` and `ybx` are face boxes spanning all levels. Velocities and
/// horizontal transports must cover them grown by two points horizontally
/// (one for [`Centered2`](AdvectionScheme::Centered2)), `W` the same plus
/// the surface level.
pub fn compute_momentum_advection(
    ctx: KernelContext<'_>,
    xbx: &IndexBox,
    ybx: &IndexBox,
    input: &MomentumAdvection<'_>,
    forcing: &mut MomentumForcing<'_>,
) -> Result<()> {
    let u_part = Component::new(Direction::X, input.geom, input.u, 0, input.huon, input.hvom)
        .with_vertical(input.w)
        .with_stress(&input.stress.sustr, &input.stress.bustr);
    let v_part = Component::new(Direction::Y, input.geom, input.v, 0, input.hvom, input.huon)
        .with_vertical(input.w)
        .with_stress(&input.stress.svstr, &input.stress.bvstr);

    u_part.validate(xbx, input.scheme, forcing.ru, forcing.nrhs)?;
    u_part.validate_column_sum(xbx, input.metrics, forcing.rufrc)?;
    v_part.validate(ybx, input.scheme, forcing.rv, forcing.nrhs)?;
    v_part.validate_column_sum(ybx, input.metrics, forcing.rvfrc)?;

    u_part.advect(ctx, xbx, input.scheme, forcing.ru, forcing.nrhs);
    u_part.sum_columns(ctx, xbx, input.metrics, forcing.ru, forcing.nrhs, forcing.rufrc);
    v_part.advect(ctx, ybx, input.scheme, forcing.rv, forcing.nrhs);
    v_part.sum_columns(ctx, ybx, input.metrics, forcing.rv, forcing.nrhs, forcing.rvfrc);
    Ok(())
}

fn stencil_reach(scheme: AdvectionScheme) -> i32 {
    match scheme {
        AdvectionScheme::Upstream3 => 2,
        AdvectionScheme::Centered2 => 1,
    }
}

#[inline]
fn coord(p: Point, dir: Direction) -> i32 {
    match dir {
        Direction::X => p.0,
        Direction::Y => p.1,
        Direction::Z => p.2,
    }
}

/// One horizontal velocity component with the transports that carry it.
///
/// `along` is the component's own direction: `u` is carried along x by
/// `Huon` and across (in y) by `Hvom`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Component<'a> {
    along: Direction,
    cross: Direction,
    domain: IndexBox,
    periodic_along: bool,
    periodic_cross: bool,
    vel: &'a Field,
    vel_comp: usize,
    along_transport: &'a Field,
    cross_transport: &'a Field,
    w: Option<&'a Field>,
    surface: Option<&'a Field>,
    bottom: Option<&'a Field>,
}

impl<'a> Component<'a> {
    pub(crate) fn new(
        along: Direction,
        geom: &Geometry,
        vel: &'a Field,
        vel_comp: usize,
        along_transport: &'a Field,
        cross_transport: &'a Field,
    ) -> Self {
        let cross = match along {
            Direction::X => Direction::Y,
            _ => Direction::X,
        };
        Self {
            along,
            cross,
            domain: geom.domain(),
            periodic_along: geom.is_periodic(along),
            periodic_cross: geom.is_periodic(cross),
            vel,
            vel_comp,
            along_transport,
            cross_transport,
            w: None,
            surface: None,
            bottom: None,
        }
    }

    fn with_vertical(mut self, w: &'a Field) -> Self {
        self.w = Some(w);
        self
    }

    fn with_stress(mut self, surface: &'a Field, bottom: &'a Field) -> Self {
        self.surface = Some(surface);
        self.bottom = Some(bottom);
        self
    }

    #[inline]
    fn vel(&self, p: Point) -> f64 {
        self.vel.get(p.0, p.1, p.2, self.vel_comp)
    }

    pub(crate) fn validate(
        &self,
        bx: &IndexBox,
        scheme: AdvectionScheme,
        r: &Field,
        r_comp: usize,
    ) -> Result<()> {
        let reach = stencil_reach(scheme);
        let stencil = bx.grow([reach, reach, 0]);
        self.vel.require("advected velocity", &stencil)?;
        self.vel.require_comp("advected velocity", self.vel_comp)?;
        self.along_transport.require("along-face transport", &stencil)?;
        self.cross_transport.require("cross-face transport", &stencil)?;
        if let Some(w) = self.w {
            w.require("W", &stencil.grow_hi(Direction::Z, 1))?;
        }
        r.require("momentum forcing", bx)?;
        r.require_comp("momentum forcing", r_comp)
    }

    fn validate_column_sum(&self, bx: &IndexBox, metrics: &GridMetrics, frc: &Field) -> Result<()> {
        let slab = |f: &Field| bx.make_slab(Direction::Z, f.bx().small_end(Direction::Z));
        frc.require("depth-integrated forcing", &slab(frc))?;
        if let Some(s) = self.surface {
            s.require("surface stress", &slab(s))?;
        }
        if let Some(b) = self.bottom {
            b.require("bottom stress", &slab(b))?;
        }
        let metric_box = slab(&metrics.pm).grow_lo(self.along, 1);
        metrics.pm.require("pm", &metric_box)?;
        metrics.pn.require("pn", &metric_box)
    }

    /// Flux along the component's own direction at the cell between `p`
    /// and `p + along`.
    fn along_flux(&self, p: Point, scheme: AdvectionScheme) -> f64 {
        let a = self.along;
        let f = |n: i32| self.vel(shift(p, a, n));
        let t = |n: i32| {
            let q = shift(p, a, n);
            self.along_transport.get(q.0, q.1, q.2, 0)
        };
        let sum = f(0) + f(1);
        let tsum = t(0) + t(1);
        match scheme {
            AdvectionScheme::Centered2 => 0.25 * sum * tsum,
            AdvectionScheme::Upstream3 => {
                let mut curv = [f(-1) - 2.0 * f(0) + f(1), f(0) - 2.0 * f(1) + f(2)];
                let mut tcurv = [t(-1) - 2.0 * t(0) + t(1), t(0) - 2.0 * t(1) + t(2)];
                if !self.periodic_along {
                    let c = coord(p, a);
                    if c == self.domain.small_end(a) {
                        curv[0] = curv[1];
                        tcurv[0] = tcurv[1];
                    } else if c == self.domain.big_end(a) {
                        curv[1] = curv[0];
                        tcurv[1] = tcurv[0];
                    }
                }
                let upwind = if sum > 0.0 { curv[0] } else { curv[1] };
                0.25 * (sum + GADV * upwind) * (tsum + 0.5 * GADV * (tcurv[0] + tcurv[1]))
            }
        }
    }

    /// Flux across the component's direction at the corner point `p`, between
    /// `p - cross` and `p`.
    fn cross_flux(&self, p: Point, scheme: AdvectionScheme) -> f64 {
        let (a, c) = (self.along, self.cross);
        let f = |n: i32| self.vel(shift(p, c, n));
        let t = |n: i32| {
            let q = shift(p, a, n);
            self.cross_transport.get(q.0, q.1, q.2, 0)
        };
        let sum = f(0) + f(-1);
        let tsum = t(0) + t(-1);
        match scheme {
            AdvectionScheme::Centered2 => 0.25 * sum * tsum,
            AdvectionScheme::Upstream3 => {
                let mut curv = [f(-2) - 2.0 * f(-1) + f(0), f(-1) - 2.0 * f(0) + f(1)];
                if !self.periodic_cross {
                    let y = coord(p, c);
                    if y == self.domain.small_end(c) {
                        curv[0] = curv[1];
                    } else if y == self.domain.big_end(c) + 1 {
                        curv[1] = curv[0];
                    }
                }
                let upwind = if tsum > 0.0 { curv[0] } else { curv[1] };
                let tcurv = (t(-1) - 2.0 * t(0) + t(1)) + (t(-2) - 2.0 * t(-1) + t(0));
                0.25 * (sum + GADV * upwind) * (tsum + 0.5 * GADV * tcurv)
            }
        }
    }

    /// Flux through the bottom face of level `p.2`; zero at the bottom and
    /// surface of the column `k_lo..=k_hi`.
    fn vertical_flux(&self, w: &Field, p: Point, k_lo: i32, k_hi: i32, scheme: AdvectionScheme) -> f64 {
        let k = p.2;
        if k <= k_lo || k > k_hi {
            return 0.0;
        }
        let a = self.along;
        let ww = |n: i32| {
            let q = shift(p, a, n);
            w.get(q.0, q.1, q.2, 0)
        };
        // one-sided next to the ends: reads beyond the column reuse the end level
        let uu = |kk: i32| self.vel((p.0, p.1, kk.clamp(k_lo, k_hi)));
        match scheme {
            AdvectionScheme::Centered2 => 0.25 * (uu(k - 1) + uu(k)) * (ww(0) + ww(-1)),
            AdvectionScheme::Upstream3 => {
                (C9_16 * (uu(k - 1) + uu(k)) - C1_16 * (uu(k - 2) + uu(k + 1)))
                    * (C9_16 * (ww(0) + ww(-1)) - C1_16 * (ww(1) + ww(-2)))
            }
        }
    }

    /// Subtract the horizontal flux divergence over `bx` from `r[r_comp]`.
    pub(crate) fn advect_horizontal(
        &self,
        ctx: KernelContext<'_>,
        bx: &IndexBox,
        scheme: AdvectionScheme,
        r: &mut Field,
        r_comp: usize,
    ) {
        let along_box = bx.grow_lo(self.along, 1);
        let cross_box = bx.grow_hi(self.cross, 1);
        let mut fa = ctx.pool.acquire(along_box, 1);
        let mut fc = ctx.pool.acquire(cross_box, 1);
        ctx.exec
            .fill(&mut fa, 0, &along_box, |i, j, k| self.along_flux((i, j, k), scheme));
        ctx.exec
            .fill(&mut fc, 0, &cross_box, |i, j, k| self.cross_flux((i, j, k), scheme));

        let (fa, fc) = (&*fa, &*fc);
        let (a, c) = (self.along, self.cross);
        let dest = &*r;
        let values = ctx.exec.map_box(bx, |i, j, k| {
            let p = (i, j, k);
            let pa = shift(p, a, -1);
            let pc = shift(p, c, 1);
            dest.get(i, j, k, r_comp)
                - ((fa.get(i, j, k, 0) - fa.get(pa.0, pa.1, pa.2, 0))
                    + (fc.get(pc.0, pc.1, pc.2, 0) - fc.get(i, j, k, 0)))
        });
        r.assign(bx, r_comp, &values);
    }

    fn advect(
        &self,
        ctx: KernelContext<'_>,
        bx: &IndexBox,
        scheme: AdvectionScheme,
        r: &mut Field,
        r_comp: usize,
    ) {
        self.advect_horizontal(ctx, bx, scheme, r, r_comp);
        let Some(w) = self.w else {
            return;
        };

        let k_lo = bx.small_end(Direction::Z);
        let k_hi = bx.big_end(Direction::Z);
        let fc_box = bx.surrounding_nodes(Direction::Z);
        let mut fc = ctx.pool.acquire(fc_box, 1);
        ctx.exec.fill(&mut fc, 0, &fc_box, |i, j, k| {
            self.vertical_flux(w, (i, j, k), k_lo, k_hi, scheme)
        });

        let fc = &*fc;
        let dest = &*r;
        let values = ctx.exec.map_box(bx, |i, j, k| {
            dest.get(i, j, k, r_comp) - (fc.get(i, j, k + 1, 0) - fc.get(i, j, k, 0))
        });
        r.assign(bx, r_comp, &values);
    }

    /// `frc += Σ_k r + surface·om·on (top level) - bottom·om·on (bottom level)`.
    fn sum_columns(
        &self,
        ctx: KernelContext<'_>,
        bx: &IndexBox,
        metrics: &GridMetrics,
        r: &Field,
        r_comp: usize,
        frc: &mut Field,
    ) {
        let k_lo = bx.small_end(Direction::Z);
        let k_hi = bx.big_end(Direction::Z);
        let ks = frc.bx().small_end(Direction::Z);
        let km = metrics.pm.bx().small_end(Direction::Z);
        let slab = bx.make_slab(Direction::Z, ks);
        let a = self.along;
        let dest = &*frc;
        let values = ctx.exec.map_box(&slab, |i, j, _| {
            let prev = shift((i, j, km), a, -1);
            let om = 2.0 / (metrics.pm.get(prev.0, prev.1, km, 0) + metrics.pm.get(i, j, km, 0));
            let on = 2.0 / (metrics.pn.get(prev.0, prev.1, km, 0) + metrics.pn.get(i, j, km, 0));
            let area = om * on;
            let column: f64 = (k_lo..=k_hi).map(|k| r.get(i, j, k, r_comp)).sum();
            let surface = self
                .surface
                .map_or(0.0, |s| s.get(i, j, s.bx().small_end(Direction::Z), 0) * area);
            let bottom = self
                .bottom
                .map_or(0.0, |b| -b.get(i, j, b.bx().small_end(Direction::Z), 0) * area);
            dest.get(i, j, ks, 0) + column + surface + bottom
        });
        frc.assign(&slab, 0, &values);
    }
}
