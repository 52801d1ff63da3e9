//! Multi-component 3D arrays over an index box.

use std::ops::{Index, IndexMut};

use crate::error::{OceanError, Result};
use crate::types::{Direction, IndexBox};

/// A 3D array of `f64` with a trailing component axis, allocated over an
/// [`IndexBox`] that may extend into ghost cells (negative indices allowed).
///
/// Components hold either distinct quantities (tracers) or time levels of the
/// same quantity (the `kstp`/`krhs`/`knew` slots of the free surface).
///
/// Storage is contiguous, component-major, then k, j, i (i fastest).
///
/// Element access outside the allocated box panics: stencils that would read
/// beyond a field fail fast rather than return garbage.
///
/// # Example
///
/// ```
/// use ocean_split::field::Field;
/// use ocean_split::types::IndexBox;
///
/// let mut zeta = Field::new(IndexBox::new([-2, -2, 0], [9, 9, 0]), 3);
/// zeta[(0, 0, 0, 1)] = 0.25;
/// assert_eq!(zeta.get(0, 0, 0, 1), 0.25);
/// assert_eq!(zeta.get(-2, -2, 0, 0), 0.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    bx: IndexBox,
    ncomp: usize,
    data: Vec<f64>,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            bx: IndexBox::new([0, 0, 0], [-1, -1, -1]),
            ncomp: 0,
            data: Vec::new(),
        }
    }
}

impl Field {
    /// Zero-initialized field.
    pub fn new(bx: IndexBox, ncomp: usize) -> Self {
        Self::filled(bx, ncomp, 0.0)
    }

    /// Field with every element set to `value`.
    pub fn filled(bx: IndexBox, ncomp: usize, value: f64) -> Self {
        Self {
            bx,
            ncomp,
            data: vec![value; bx.num_pts() * ncomp],
        }
    }

    /// Build a field from a function of `(i, j, k)`, same value in every component.
    pub fn from_fn<F>(bx: IndexBox, ncomp: usize, f: F) -> Self
    where
        F: Fn(i32, i32, i32) -> f64,
    {
        let mut field = Self::new(bx, ncomp);
        for n in 0..ncomp {
            for (i, j, k) in bx.iter() {
                field.set(i, j, k, n, f(i, j, k));
            }
        }
        field
    }

    /// Reuse an existing buffer, zeroing it.
    pub(crate) fn from_buffer(bx: IndexBox, ncomp: usize, mut buf: Vec<f64>) -> Self {
        buf.clear();
        buf.resize(bx.num_pts() * ncomp, 0.0);
        Self {
            bx,
            ncomp,
            data: buf,
        }
    }

    pub(crate) fn into_buffer(self) -> Vec<f64> {
        self.data
    }

    /// Allocated box (valid region plus ghosts).
    #[inline]
    pub fn bx(&self) -> IndexBox {
        self.bx
    }

    /// Number of components.
    #[inline]
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    #[inline]
    fn index_of(&self, i: i32, j: i32, k: i32, n: usize) -> usize {
        assert!(
            self.bx.contains(i, j, k) && n < self.ncomp,
            "index ({}, {}, {}, {}) outside field box {} with {} components",
            i,
            j,
            k,
            n,
            self.bx,
            self.ncomp
        );
        n * self.bx.num_pts() + self.bx.offset(i, j, k)
    }

    #[inline]
    pub fn get(&self, i: i32, j: i32, k: i32, n: usize) -> f64 {
        self.data[self.index_of(i, j, k, n)]
    }

    #[inline]
    pub fn set(&mut self, i: i32, j: i32, k: i32, n: usize, value: f64) {
        let idx = self.index_of(i, j, k, n);
        self.data[idx] = value;
    }

    /// Set every element of every component.
    pub fn set_val(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Set every element of component `n`.
    pub fn set_comp(&mut self, n: usize, value: f64) {
        let npts = self.bx.num_pts();
        self.data[n * npts..(n + 1) * npts].fill(value);
    }

    /// Copy component `src` into component `dst`.
    pub fn copy_comp(&mut self, src: usize, dst: usize) {
        if src == dst {
            return;
        }
        let npts = self.bx.num_pts();
        self.data
            .copy_within(src * npts..(src + 1) * npts, dst * npts);
    }

    /// Overwrite every element with those of `src`, which must have the same
    /// box and component count.
    pub fn copy_from(&mut self, src: &Field) -> Result<()> {
        if src.bx != self.bx {
            return Err(OceanError::box_mismatch("copy source", self.bx, src.bx));
        }
        if src.ncomp != self.ncomp {
            return Err(OceanError::ComponentOutOfRange {
                what: "copy source",
                comp: self.ncomp.saturating_sub(1),
                ncomp: src.ncomp,
            });
        }
        self.data.copy_from_slice(&src.data);
        Ok(())
    }

    /// Copy component `src_comp` of `src` into component `dst_comp` over `bx`.
    pub fn copy_region(
        &mut self,
        src: &Field,
        src_comp: usize,
        dst_comp: usize,
        bx: &IndexBox,
    ) -> Result<()> {
        src.require("copy source", bx)?;
        src.require_comp("copy source", src_comp)?;
        self.require("copy target", bx)?;
        self.require_comp("copy target", dst_comp)?;
        for (i, j, k) in bx.iter() {
            self.set(i, j, k, dst_comp, src.get(i, j, k, src_comp));
        }
        Ok(())
    }

    /// Read-only view of component `n` in storage order.
    pub fn comp_slice(&self, n: usize) -> &[f64] {
        let npts = self.bx.num_pts();
        &self.data[n * npts..(n + 1) * npts]
    }

    /// Write `values` (in `bx` iteration order) into component `n` over `bx`.
    pub fn assign(&mut self, bx: &IndexBox, n: usize, values: &[f64]) {
        debug_assert_eq!(bx.num_pts(), values.len());
        for (p, &v) in values.iter().enumerate() {
            let (i, j, k) = bx.point(p);
            self.set(i, j, k, n, v);
        }
    }

    /// Write one column `values[k - k_lo]` at `(i, j)` into component `n`.
    pub fn assign_column(&mut self, i: i32, j: i32, n: usize, k_lo: i32, values: &[f64]) {
        for (dk, &v) in values.iter().enumerate() {
            self.set(i, j, k_lo + dk as i32, n, v);
        }
    }

    /// Precondition check: the field must cover `required`.
    pub fn require(&self, what: &'static str, required: &IndexBox) -> Result<()> {
        if self.bx.contains_box(required) {
            Ok(())
        } else {
            Err(OceanError::box_mismatch(what, *required, self.bx))
        }
    }

    /// Precondition check: component `n` must exist.
    pub fn require_comp(&self, what: &'static str, n: usize) -> Result<()> {
        if n < self.ncomp {
            Ok(())
        } else {
            Err(OceanError::ComponentOutOfRange {
                what,
                comp: n,
                ncomp: self.ncomp,
            })
        }
    }

    /// Maximum absolute value of component `n` over `bx`.
    pub fn max_abs(&self, bx: &IndexBox, n: usize) -> f64 {
        bx.iter()
            .map(|(i, j, k)| self.get(i, j, k, n).abs())
            .fold(0.0, f64::max)
    }

    /// Sum of component `n` over `bx`.
    pub fn sum(&self, bx: &IndexBox, n: usize) -> f64 {
        bx.iter().map(|(i, j, k)| self.get(i, j, k, n)).sum()
    }

    /// Number of vertical points.
    pub fn nz(&self) -> usize {
        self.bx.length(Direction::Z)
    }
}

impl Index<(i32, i32, i32, usize)> for Field {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j, k, n): (i32, i32, i32, usize)) -> &f64 {
        &self.data[self.index_of(i, j, k, n)]
    }
}

impl IndexMut<(i32, i32, i32, usize)> for Field {
    #[inline]
    fn index_mut(&mut self, (i, j, k, n): (i32, i32, i32, usize)) -> &mut f64 {
        let idx = self.index_of(i, j, k, n);
        &mut self.data[idx]
    }
}
