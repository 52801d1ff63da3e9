//! Land/sea masking at rho, u and v points.
//!
//! Masks are multiplicative 0/1 single-slab fields. A face is wet only if
//! both cells it separates are wet, as in ROMS (`umask = rmask(i-1)·rmask(i)`).
//!
//! # Example
//!
//! ```
//! use ocean_split::field::{Field, Geometry, LandMask};
//! use ocean_split::types::{IndexBox, Staggering};
//!
//! let geom = Geometry::new(IndexBox::new([0, 0, 0], [3, 3, 1]), [1.0; 3]);
//! let h = Field::from_fn(geom.slab_box(2), 1, |i, _, _| if i == 0 { 0.0 } else { 20.0 });
//! let mask = LandMask::from_bathymetry(&h, 1.0);
//!
//! assert!(!mask.is_wet(0, 2, Staggering::Cell));
//! assert!(!mask.is_wet(1, 2, Staggering::XFace)); // touches land
//! assert!(mask.is_wet(2, 2, Staggering::XFace));
//! ```

use crate::types::{Direction, Staggering};

use super::Field;

/// Land/sea masks at the three horizontal staggerings.
#[derive(Clone, Debug)]
pub struct LandMask {
    pub rho: Field,
    pub u: Field,
    pub v: Field,
}

impl LandMask {
    /// Every point wet.
    pub fn all_wet(slab: &Field) -> Self {
        Self::from_rho(Field::filled(slab.bx(), 1, 1.0))
    }

    /// Derive face masks from a cell mask.
    pub fn from_rho(rho: Field) -> Self {
        let bx = rho.bx();
        let mut u = Field::new(bx, 1);
        let mut v = Field::new(bx, 1);
        let ilo = bx.small_end(Direction::X);
        let jlo = bx.small_end(Direction::Y);
        for (i, j, k) in bx.iter() {
            let r = rho.get(i, j, k, 0);
            // the first column/row has no neighbour to pair with
            let um = if i > ilo { r * rho.get(i - 1, j, k, 0) } else { r };
            let vm = if j > jlo { r * rho.get(i, j - 1, k, 0) } else { r };
            u.set(i, j, k, 0, um);
            v.set(i, j, k, 0, vm);
        }
        Self { rho, u, v }
    }

    /// Cells with depth at or below `min_depth` are land.
    pub fn from_bathymetry(h: &Field, min_depth: f64) -> Self {
        let bx = h.bx();
        let rho = Field::from_fn(bx, 1, |i, j, k| {
            if h.get(i, j, k, 0) > min_depth {
                1.0
            } else {
                0.0
            }
        });
        Self::from_rho(rho)
    }

    /// Mask field matching a staggering.
    pub fn for_staggering(&self, stagger: Staggering) -> &Field {
        match stagger {
            Staggering::Cell => &self.rho,
            Staggering::XFace => &self.u,
            Staggering::YFace => &self.v,
        }
    }

    /// Mask value at `(i, j)`.
    #[inline]
    pub fn value(&self, i: i32, j: i32, stagger: Staggering) -> f64 {
        let m = self.for_staggering(stagger);
        m.get(i, j, m.bx().small_end(Direction::Z), 0)
    }

    #[inline]
    pub fn is_wet(&self, i: i32, j: i32, stagger: Staggering) -> bool {
        self.value(i, j, stagger) != 0.0
    }

    /// Number of wet cells (rho points) inside the mask's box.
    pub fn n_wet(&self) -> usize {
        self.rho.comp_slice(0).iter().filter(|&&m| m != 0.0).count()
    }

    /// Multiply every point of component `n` by the matching mask.
    pub fn apply(&self, field: &mut Field, n: usize, stagger: Staggering) {
        let mask = self.for_staggering(stagger);
        let k0 = mask.bx().small_end(Direction::Z);
        let fbx = field.bx();
        let columns = mask
            .bx()
            .set_small(Direction::Z, fbx.small_end(Direction::Z))
            .set_big(Direction::Z, fbx.big_end(Direction::Z));
        let bx = fbx.intersect(&columns);
        for (i, j, k) in bx.iter() {
            let v = field.get(i, j, k, n) * mask.get(i, j, k0, 0);
            field.set(i, j, k, n, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Geometry;
    use crate::types::IndexBox;

    fn island() -> (Geometry, LandMask) {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [4, 4, 2]), [1.0; 3]);
        let rho = Field::from_fn(geom.slab_box(1), 1, |i, j, _| {
            if i == 2 && j == 2 {
                0.0
            } else {
                1.0
            }
        });
        (geom, LandMask::from_rho(rho))
    }

    #[test]
    fn test_face_masks_close_around_land() {
        let (_, mask) = island();
        assert!(!mask.is_wet(2, 2, Staggering::XFace));
        assert!(!mask.is_wet(3, 2, Staggering::XFace));
        assert!(mask.is_wet(4, 2, Staggering::XFace));
        assert!(!mask.is_wet(2, 3, Staggering::YFace));
        assert!(mask.is_wet(2, 4, Staggering::YFace));
        assert_eq!(mask.n_wet(), mask.rho.bx().num_pts() - 1);
    }

    #[test]
    fn test_apply_zeroes_every_level() {
        let (geom, mask) = island();
        let mut t = Field::filled(geom.field_box(1), 2, 7.0);
        mask.apply(&mut t, 1, Staggering::Cell);
        for k in 0..=2 {
            assert_eq!(t.get(2, 2, k, 1), 0.0);
            assert_eq!(t.get(2, 2, k, 0), 7.0);
            assert_eq!(t.get(1, 2, k, 1), 7.0);
        }
    }
}
