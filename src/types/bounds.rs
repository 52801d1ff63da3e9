//! Inclusive integer index boxes.
//!
//! Every pass in the solver runs over an [`IndexBox`]: the valid region of a
//! grid, a ghost strip outside one face, the x-faces surrounding a block of
//! cells, a single k-slab for depth-integrated quantities, and so on.
//! Boxes are inclusive on both ends, matching the index arithmetic of the
//! stencils.

use std::fmt;

use super::sides::{Direction, Orientation};

/// Inclusive 3D index range `[lo, hi]` per dimension.
///
/// An empty box has `hi < lo` in at least one dimension.
///
/// # Example
///
/// ```
/// use ocean_split::types::{Direction, IndexBox};
///
/// let cells = IndexBox::new([0, 0, 0], [7, 3, 4]);
/// assert_eq!(cells.num_pts(), 8 * 4 * 5);
///
/// // x-faces surrounding the cells: one extra point in x
/// let u_faces = cells.surrounding_nodes(Direction::X);
/// assert_eq!(u_faces.hi(), [8, 3, 4]);
///
/// // depth-integrated slab
/// let slab = cells.make_slab(Direction::Z, 0);
/// assert_eq!(slab.length(Direction::Z), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexBox {
    lo: [i32; 3],
    hi: [i32; 3],
}

impl IndexBox {
    /// Create a box from inclusive corners.
    pub const fn new(lo: [i32; 3], hi: [i32; 3]) -> Self {
        Self { lo, hi }
    }

    /// Box of `n[d]` cells per dimension starting at the origin.
    pub fn from_size(n: [usize; 3]) -> Self {
        Self::new(
            [0, 0, 0],
            [n[0] as i32 - 1, n[1] as i32 - 1, n[2] as i32 - 1],
        )
    }

    /// Lower corner.
    #[inline]
    pub fn lo(&self) -> [i32; 3] {
        self.lo
    }

    /// Upper corner (inclusive).
    #[inline]
    pub fn hi(&self) -> [i32; 3] {
        self.hi
    }

    #[inline]
    pub fn small_end(&self, dir: Direction) -> i32 {
        self.lo[dir.index()]
    }

    #[inline]
    pub fn big_end(&self, dir: Direction) -> i32 {
        self.hi[dir.index()]
    }

    /// Number of points along `dir` (zero if empty in that direction).
    #[inline]
    pub fn length(&self, dir: Direction) -> usize {
        let d = dir.index();
        (self.hi[d] - self.lo[d] + 1).max(0) as usize
    }

    /// True if the box holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|d| self.hi[d] < self.lo[d])
    }

    /// Total number of points.
    #[inline]
    pub fn num_pts(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            Direction::ALL.iter().map(|&d| self.length(d)).product()
        }
    }

    #[inline]
    pub fn contains(&self, i: i32, j: i32, k: i32) -> bool {
        i >= self.lo[0]
            && i <= self.hi[0]
            && j >= self.lo[1]
            && j <= self.hi[1]
            && k >= self.lo[2]
            && k <= self.hi[2]
    }

    /// True if every point of `other` is inside `self`. Empty boxes are
    /// contained in anything.
    pub fn contains_box(&self, other: &IndexBox) -> bool {
        other.is_empty()
            || (0..3).all(|d| other.lo[d] >= self.lo[d] && other.hi[d] <= self.hi[d])
    }

    /// Grow (or shrink, for negative `n`) every direction by `n[d]` on both sides.
    pub fn grow(&self, n: [i32; 3]) -> Self {
        let mut b = *self;
        for d in 0..3 {
            b.lo[d] -= n[d];
            b.hi[d] += n[d];
        }
        b
    }

    /// Grow the low end of `dir` by `n`.
    pub fn grow_lo(&self, dir: Direction, n: i32) -> Self {
        let mut b = *self;
        b.lo[dir.index()] -= n;
        b
    }

    /// Grow the high end of `dir` by `n`.
    pub fn grow_hi(&self, dir: Direction, n: i32) -> Self {
        let mut b = *self;
        b.hi[dir.index()] += n;
        b
    }

    /// Replace the low end of `dir`.
    pub fn set_small(&self, dir: Direction, v: i32) -> Self {
        let mut b = *self;
        b.lo[dir.index()] = v;
        b
    }

    /// Replace the high end of `dir`.
    pub fn set_big(&self, dir: Direction, v: i32) -> Self {
        let mut b = *self;
        b.hi[dir.index()] = v;
        b
    }

    /// Collapse `dir` to the single index `v`.
    pub fn make_slab(&self, dir: Direction, v: i32) -> Self {
        self.set_small(dir, v).set_big(dir, v)
    }

    /// Extend the high end of `dir` by one: the faces surrounding the cells.
    pub fn surrounding_nodes(&self, dir: Direction) -> Self {
        self.grow_hi(dir, 1)
    }

    /// Intersection of two boxes (possibly empty).
    pub fn intersect(&self, other: &IndexBox) -> Self {
        let mut b = *self;
        for d in 0..3 {
            b.lo[d] = b.lo[d].max(other.lo[d]);
            b.hi[d] = b.hi[d].min(other.hi[d]);
        }
        b
    }

    /// Smallest box containing both.
    pub fn hull(&self, other: &IndexBox) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut b = *self;
        for d in 0..3 {
            b.lo[d] = b.lo[d].min(other.lo[d]);
            b.hi[d] = b.hi[d].max(other.hi[d]);
        }
        b
    }

    /// The part of `self` strictly outside `domain` across the given face.
    ///
    /// For `XLo` this is every point of `self` with `i < domain.lo.x`.
    pub fn outside_face(&self, domain: &IndexBox, ori: Orientation) -> Self {
        let dir = ori.direction();
        if ori.is_low() {
            self.set_big(dir, domain.small_end(dir) - 1)
        } else {
            self.set_small(dir, domain.big_end(dir) + 1)
        }
    }

    /// Linear offset of `(i, j, k)` in i-fastest order. The point must be inside.
    #[inline]
    pub fn offset(&self, i: i32, j: i32, k: i32) -> usize {
        let nx = self.length(Direction::X);
        let ny = self.length(Direction::Y);
        let di = (i - self.lo[0]) as usize;
        let dj = (j - self.lo[1]) as usize;
        let dk = (k - self.lo[2]) as usize;
        di + nx * (dj + ny * dk)
    }

    /// Inverse of [`IndexBox::offset`].
    #[inline]
    pub fn point(&self, offset: usize) -> (i32, i32, i32) {
        let nx = self.length(Direction::X);
        let ny = self.length(Direction::Y);
        let i = (offset % nx) as i32 + self.lo[0];
        let j = ((offset / nx) % ny) as i32 + self.lo[1];
        let k = (offset / (nx * ny)) as i32 + self.lo[2];
        (i, j, k)
    }

    /// Iterate over all points, i fastest.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        (0..self.num_pts()).map(move |p| self.point(p))
    }
}

impl fmt::Display for IndexBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(({},{},{}) ({},{},{}))",
            self.lo[0], self.lo[1], self.lo[2], self.hi[0], self.hi[1], self.hi[2]
        )
    }
}
