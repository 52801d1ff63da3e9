//! Horizontal metric factors, Coriolis parameter and bathymetry.

use crate::config::CoriolisParams;
use crate::error::{OceanError, Result};
use crate::types::Direction;

use super::{Field, Geometry};

/// Map-scale factors and static 2D inputs, all single-slab fields over the
/// geometry's [`slab_box`](Geometry::slab_box).
///
/// | Field | Location | Meaning |
/// |-------|----------|---------|
/// | `pm`, `pn` | rho | inverse grid spacing in x, y |
/// | `on_u` | u | face length `1/pn` at x-faces |
/// | `om_v` | v | face length `1/pm` at y-faces |
/// | `f` | rho | Coriolis parameter |
/// | `fomn` | rho | `f / (pm·pn)` |
/// | `h` | rho | bathymetry (positive depth) |
#[derive(Clone, Debug)]
pub struct GridMetrics {
    pub pm: Field,
    pub pn: Field,
    pub on_u: Field,
    pub om_v: Field,
    pub f: Field,
    pub fomn: Field,
    pub h: Field,
}

impl GridMetrics {
    /// Uniform-spacing metrics with flat bathymetry `depth` and no rotation.
    pub fn uniform(geom: &Geometry, halo: i32, depth: f64) -> Self {
        let bx = geom.slab_box(halo);
        let [dx, dy, _] = geom.cell_size();
        Self {
            pm: Field::filled(bx, 1, 1.0 / dx),
            pn: Field::filled(bx, 1, 1.0 / dy),
            on_u: Field::filled(bx, 1, dy),
            om_v: Field::filled(bx, 1, dx),
            f: Field::new(bx, 1),
            fomn: Field::new(bx, 1),
            h: Field::filled(bx, 1, depth),
        }
    }

    /// Replace the bathymetry. Must cover the same slab as the metrics.
    pub fn with_bathymetry(mut self, h: Field) -> Result<Self> {
        h.require("bathymetry", &self.pm.bx())?;
        if h.ncomp() != 1 {
            return Err(OceanError::InvalidConfig(format!(
                "bathymetry must have one component, got {}",
                h.ncomp()
            )));
        }
        self.h = h;
        Ok(self)
    }

    /// Beta-plane Coriolis parameter centred on the domain:
    /// `f = f0 + beta·(y - L_y/2)`, and `fomn = f / (pm·pn)`.
    pub fn set_coriolis(&mut self, geom: &Geometry, params: &CoriolisParams) {
        let bx = self.f.bx();
        let dy = geom.cell_size()[1];
        let y0 = geom.prob_lo()[1];
        let ly = geom.prob_length(Direction::Y);
        for (i, j, k) in bx.iter() {
            let y = y0 + (j as f64 + 0.5) * dy;
            let f = params.f0 + params.beta * (y - y0 - 0.5 * ly);
            self.f.set(i, j, k, 0, f);
            let mn = self.pm.get(i, j, k, 0) * self.pn.get(i, j, k, 0);
            self.fomn.set(i, j, k, 0, f / mn);
        }
    }

    /// `2 / (pm(i-1) + pm(i))`: x-spacing at a u-point.
    #[inline]
    pub fn om_u(&self, i: i32, j: i32, k: i32) -> f64 {
        2.0 / (self.pm.get(i - 1, j, k, 0) + self.pm.get(i, j, k, 0))
    }

    /// `2 / (pn(j-1) + pn(j))`: y-spacing at a v-point.
    #[inline]
    pub fn on_v(&self, i: i32, j: i32, k: i32) -> f64 {
        2.0 / (self.pn.get(i, j - 1, k, 0) + self.pn.get(i, j, k, 0))
    }

    /// Harmonic face length `2 / (pn(i-1) + pn(i))` at a u-point.
    #[inline]
    pub fn on_u_harmonic(&self, i: i32, j: i32, k: i32) -> f64 {
        2.0 / (self.pn.get(i - 1, j, k, 0) + self.pn.get(i, j, k, 0))
    }

    /// Harmonic face length `2 / (pm(j-1) + pm(j))` at a v-point.
    #[inline]
    pub fn om_v_harmonic(&self, i: i32, j: i32, k: i32) -> f64 {
        2.0 / (self.pm.get(i, j - 1, k, 0) + self.pm.get(i, j, k, 0))
    }

    /// Inverse cell area averaged to a u-point.
    #[inline]
    pub fn mn_u(&self, i: i32, j: i32, k: i32) -> f64 {
        0.25 * (self.pm.get(i - 1, j, k, 0) + self.pm.get(i, j, k, 0))
            * (self.pn.get(i - 1, j, k, 0) + self.pn.get(i, j, k, 0))
    }

    /// Inverse cell area averaged to a v-point.
    #[inline]
    pub fn mn_v(&self, i: i32, j: i32, k: i32) -> f64 {
        0.25 * (self.pm.get(i, j - 1, k, 0) + self.pm.get(i, j, k, 0))
            * (self.pn.get(i, j - 1, k, 0) + self.pn.get(i, j, k, 0))
    }
}
