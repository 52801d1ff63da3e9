//! Terrain-following level depths and layer thicknesses.

use tracing::warn;

use crate::error::{OceanError, Result};
use crate::exec::Executor;
use crate::field::Field;
use crate::types::{Direction, IndexBox};

use super::stretching::{Stretching, StretchingCurves};

/// Vertical geometry fields, recomputed whenever the free surface changes.
///
/// | Field | Levels | Meaning |
/// |-------|--------|---------|
/// | `z_r` | cells `0..=N` | depth of cell centres |
/// | `z_w` | w-points `0..=N+1` | depth of the bottom face of each cell; `N+1` is the surface |
/// | `hz` | cells `0..=N` | layer thickness `z_w(k+1) - z_w(k)` |
#[derive(Clone, Debug)]
pub struct VerticalFields {
    pub z_r: Field,
    pub z_w: Field,
    pub hz: Field,
}

impl VerticalFields {
    /// Zero fields over a cell box and its w-point box.
    pub fn new(cell_box: IndexBox, w_box: IndexBox) -> Self {
        Self {
            z_r: Field::new(cell_box, 1),
            z_w: Field::new(w_box, 1),
            hz: Field::new(cell_box, 1),
        }
    }
}

/// Terrain-following transform
///
/// ```text
/// z0 = (hc·s + h·Cs(s)) / (hc + h)
/// z  = ζ + (ζ + h)·z0
/// ```
///
/// mapping `s = -1` to the bottom `-h` and `s = 0` to the free surface `ζ`.
#[derive(Clone, Debug, PartialEq)]
pub struct VerticalGrid {
    n_levels: usize,
    hc: f64,
    curves: StretchingCurves,
}

impl VerticalGrid {
    pub fn new(n_levels: usize, stretching: &dyn Stretching) -> Self {
        Self {
            n_levels,
            hc: stretching.hc(),
            curves: stretching.curves(n_levels),
        }
    }

    #[inline]
    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    pub fn curves(&self) -> &StretchingCurves {
        &self.curves
    }

    #[inline]
    fn transform(&self, s: f64, cs: f64, h: f64, zeta: f64) -> f64 {
        let denom = self.hc + h;
        let z0 = if denom > 0.0 {
            (self.hc * s + h * cs) / denom
        } else {
            s
        };
        zeta + (zeta + h) * z0
    }

    /// w-level depths of one column, bottom first (`n_levels + 1` values).
    pub fn z_w_column(&self, h: f64, zeta: f64) -> Vec<f64> {
        self.curves
            .s_w
            .iter()
            .zip(&self.curves.cs_w)
            .map(|(&s, &cs)| self.transform(s, cs, h, zeta))
            .collect()
    }

    /// rho-level depths of one column, bottom first (`n_levels` values).
    pub fn z_r_column(&self, h: f64, zeta: f64) -> Vec<f64> {
        self.curves
            .s_r
            .iter()
            .zip(&self.curves.cs_r)
            .map(|(&s, &cs)| self.transform(s, cs, h, zeta))
            .collect()
    }

    /// Recompute `z_r`, `z_w` and `hz` over the horizontal extent of `bx`
    /// from bathymetry `h` and free surface `zeta[zeta_comp]`.
    ///
    /// `bx` is a cell box spanning all levels.
    pub fn update(
        &self,
        exec: Executor,
        bx: &IndexBox,
        h: &Field,
        zeta: &Field,
        zeta_comp: usize,
        out: &mut VerticalFields,
    ) -> Result<()> {
        if bx.length(Direction::Z) != self.n_levels {
            return Err(OceanError::InvalidConfig(format!(
                "vertical grid has {} levels, box {} has {}",
                self.n_levels,
                bx,
                bx.length(Direction::Z)
            )));
        }
        let slab_h = bx.make_slab(Direction::Z, h.bx().small_end(Direction::Z));
        let slab_z = bx.make_slab(Direction::Z, zeta.bx().small_end(Direction::Z));
        h.require("bathymetry", &slab_h)?;
        zeta.require("free surface", &slab_z)?;
        zeta.require_comp("free surface", zeta_comp)?;
        let w_bx = bx.grow_hi(Direction::Z, 1);
        out.z_r.require("z_r", bx)?;
        out.hz.require("Hz", bx)?;
        out.z_w.require("z_w", &w_bx)?;

        let kh = h.bx().small_end(Direction::Z);
        let kz = zeta.bx().small_end(Direction::Z);
        let column = |i: i32, j: i32| (h.get(i, j, kh, 0), zeta.get(i, j, kz, zeta_comp));

        let dry = slab_h
            .iter()
            .filter(|&(i, j, _)| {
                let (hh, zz) = column(i, j);
                hh + zz <= 0.0
            })
            .count();
        if dry > 0 {
            warn!(columns = dry, "non-positive total depth in vertical grid update");
        }

        exec.fill_columns(&mut out.z_w, 0, &w_bx, |i, j| {
            let (hh, zz) = column(i, j);
            self.z_w_column(hh, zz)
        });
        exec.fill_columns(&mut out.z_r, 0, bx, |i, j| {
            let (hh, zz) = column(i, j);
            self.z_r_column(hh, zz)
        });
        let z_w = &out.z_w;
        exec.fill(&mut out.hz, 0, bx, |i, j, k| {
            z_w.get(i, j, k + 1, 0) - z_w.get(i, j, k, 0)
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertical::{SongHaidvogelStretching, UniformStretching};

    const TOL: f64 = 1e-10;

    #[test]
    fn test_uniform_column() {
        let grid = VerticalGrid::new(4, &UniformStretching);
        let z_w = grid.z_w_column(100.0, 0.0);
        assert_eq!(z_w.len(), 5);
        assert!((z_w[0] + 100.0).abs() < TOL);
        assert!((z_w[2] + 50.0).abs() < TOL);
        assert!(z_w[4].abs() < TOL);

        let z_r = grid.z_r_column(100.0, 2.0);
        // layers stretch with the free surface: each is 25.5 m thick
        assert!((z_r[0] - (-100.0 + 0.5 * 25.5)).abs() < TOL);
    }

    #[test]
    fn test_stretched_column_spans_water_depth() {
        let grid = VerticalGrid::new(20, &SongHaidvogelStretching::new(5.0, 0.4, 20.0));
        for (h, zeta) in [(10.0, 0.0), (500.0, 0.3), (4000.0, -0.5)] {
            let z_w = grid.z_w_column(h, zeta);
            assert!((z_w[0] + h).abs() < 1e-8, "bottom at -h for h={}", h);
            assert!((z_w[20] - zeta).abs() < 1e-8, "top at zeta for h={}", h);
        }
    }

    #[test]
    fn test_update_fields() {
        let bx = IndexBox::new([0, 0, 0], [2, 1, 3]);
        let slab = bx.make_slab(Direction::Z, 0);
        let grid = VerticalGrid::new(4, &UniformStretching);
        let h = Field::from_fn(slab, 1, |i, _, _| 10.0 * (i + 1) as f64);
        let zeta = Field::new(slab, 3);
        let mut out = VerticalFields::new(bx, bx.grow_hi(Direction::Z, 1));

        grid.update(Executor::Serial, &bx, &h, &zeta, 2, &mut out).unwrap();

        for (i, j, k) in bx.iter() {
            let depth = 10.0 * (i + 1) as f64;
            assert!((out.hz.get(i, j, k, 0) - depth / 4.0).abs() < TOL);
            let mid = 0.5 * (out.z_w.get(i, j, k, 0) + out.z_w.get(i, j, k + 1, 0));
            assert!((out.z_r.get(i, j, k, 0) - mid).abs() < TOL);
        }
        assert!(out.z_w.get(2, 1, 4, 0).abs() < TOL);
    }

    #[test]
    fn test_update_rejects_level_mismatch() {
        let bx = IndexBox::new([0, 0, 0], [2, 1, 3]);
        let slab = bx.make_slab(Direction::Z, 0);
        let grid = VerticalGrid::new(5, &UniformStretching);
        let mut out = VerticalFields::new(bx, bx.grow_hi(Direction::Z, 1));
        let result = grid.update(
            Executor::Serial,
            &bx,
            &Field::filled(slab, 1, 5.0),
            &Field::new(slab, 1),
            0,
            &mut out,
        );
        assert!(result.is_err());
    }
}
