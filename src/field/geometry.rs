//! Domain geometry: valid index box, periodicity and cell sizes.

use crate::types::{Direction, IndexBox};

use super::Field;

/// Physical domain description for a single-level, single-box grid.
///
/// Cell `(i, j, k)` spans `[prob_lo + i·dx, prob_lo + (i+1)·dx]` per
/// direction. The vertical cell size is nominal: actual layer thicknesses
/// come from the terrain-following [`VerticalGrid`](crate::vertical::VerticalGrid).
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    domain: IndexBox,
    periodic: [bool; 3],
    dx: [f64; 3],
    prob_lo: [f64; 3],
}

impl Geometry {
    /// Non-periodic geometry with the given cell sizes.
    pub fn new(domain: IndexBox, dx: [f64; 3]) -> Self {
        Self {
            domain,
            periodic: [false; 3],
            dx,
            prob_lo: [0.0; 3],
        }
    }

    /// Set per-direction periodicity. The vertical is never periodic.
    pub fn with_periodicity(mut self, x: bool, y: bool) -> Self {
        self.periodic = [x, y, false];
        self
    }

    /// Set the physical coordinates of the low domain corner.
    pub fn with_prob_lo(mut self, prob_lo: [f64; 3]) -> Self {
        self.prob_lo = prob_lo;
        self
    }

    /// Valid (non-ghost) cell box.
    #[inline]
    pub fn domain(&self) -> IndexBox {
        self.domain
    }

    #[inline]
    pub fn is_periodic(&self, dir: Direction) -> bool {
        self.periodic[dir.index()]
    }

    #[inline]
    pub fn cell_size(&self) -> [f64; 3] {
        self.dx
    }

    #[inline]
    pub fn inv_cell_size(&self) -> [f64; 3] {
        [1.0 / self.dx[0], 1.0 / self.dx[1], 1.0 / self.dx[2]]
    }

    #[inline]
    pub fn prob_lo(&self) -> [f64; 3] {
        self.prob_lo
    }

    /// Physical length of the domain along `dir`.
    pub fn prob_length(&self, dir: Direction) -> f64 {
        self.domain.length(dir) as f64 * self.dx[dir.index()]
    }

    /// Index of the top cell level (`N`).
    #[inline]
    pub fn top_level(&self) -> i32 {
        self.domain.big_end(Direction::Z)
    }

    /// Allocation box for 3D cell, x-face and y-face fields with `halo` ghost
    /// cells horizontally: the domain grown by `halo`, plus one extra point on
    /// the high side in x and y so staggered fields fit the same box.
    pub fn field_box(&self, halo: i32) -> IndexBox {
        self.domain
            .grow([halo, halo, 0])
            .grow_hi(Direction::X, 1)
            .grow_hi(Direction::Y, 1)
    }

    /// Allocation box for depth-integrated (single-slab) fields.
    pub fn slab_box(&self, halo: i32) -> IndexBox {
        let k = self.domain.small_end(Direction::Z);
        self.field_box(halo).make_slab(Direction::Z, k)
    }

    /// Allocation box for w-point fields (one extra level on top).
    pub fn w_box(&self, halo: i32) -> IndexBox {
        self.field_box(halo).grow_hi(Direction::Z, 1)
    }

    /// Periodic wraparound of every ghost point of `field` along the periodic
    /// directions, all components.
    ///
    /// Stand-in for the external halo-exchange primitive on a single-box
    /// domain. Faces along a staggered direction wrap with the same period as
    /// the cells, so face `dom_hi + 1` becomes a copy of face `dom_lo`.
    pub fn periodic_fill(&self, field: &mut Field) {
        let fbx = field.bx();
        for dir in [Direction::X, Direction::Y] {
            if !self.is_periodic(dir) {
                continue;
            }
            let d = dir.index();
            let lo = self.domain.small_end(dir);
            let hi = self.domain.big_end(dir);
            let period = hi - lo + 1;
            for n in 0..field.ncomp() {
                for (i, j, k) in fbx.iter() {
                    let mut p = [i, j, k];
                    if p[d] >= lo && p[d] <= hi {
                        continue;
                    }
                    p[d] = lo + (p[d] - lo).rem_euclid(period);
                    let v = field.get(p[0], p[1], p[2], n);
                    field.set(i, j, k, n, v);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_boxes() {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [7, 5, 3]), [1e3, 1e3, 1.0]);
        assert_eq!(geom.field_box(2), IndexBox::new([-2, -2, 0], [10, 8, 3]));
        assert_eq!(geom.slab_box(2), IndexBox::new([-2, -2, 0], [10, 8, 0]));
        assert_eq!(geom.w_box(2).big_end(Direction::Z), 4);
        assert_eq!(geom.top_level(), 3);
        assert!((geom.prob_length(Direction::Y) - 6e3).abs() < 1e-9);
    }

    #[test]
    fn test_periodic_fill_wraps_ghosts() {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [3, 3, 0]), [1.0; 3])
            .with_periodicity(true, false);
        let bx = geom.field_box(2);
        let mut f = Field::from_fn(bx, 1, |i, j, _| {
            if (0..=3).contains(&i) {
                (10 * i + j) as f64
            } else {
                -99.0
            }
        });
        geom.periodic_fill(&mut f);

        assert_eq!(f.get(-1, 2, 0, 0), f.get(3, 2, 0, 0));
        assert_eq!(f.get(-2, 1, 0, 0), f.get(2, 1, 0, 0));
        assert_eq!(f.get(4, 0, 0, 0), f.get(0, 0, 0, 0));
        assert_eq!(f.get(6, 3, 0, 0), f.get(2, 3, 0, 0));
        // y is not periodic: untouched
        assert_eq!(f.get(1, -1, 0, 0), 9.0);
        assert_eq!(f.get(-1, -1, 0, 0), f.get(3, -1, 0, 0));
    }
}
