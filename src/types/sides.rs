//! Directions, domain-face orientations and per-face tables.
//!
//! Provides strongly-typed structures for per-face boundary specifications,
//! eliminating the need to remember the orientation index convention
//! (`xlo=0, ylo=1, zlo=2, xhi=3, yhi=4, zhi=5`).

use std::fmt;
use std::ops::{Index, IndexMut};

/// Coordinate direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    X,
    Y,
    Z,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::X, Direction::Y, Direction::Z];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::X => 0,
            Direction::Y => 1,
            Direction::Z => 2,
        }
    }

    /// Unit offset along this direction.
    #[inline]
    pub const fn unit(self) -> [i32; 3] {
        match self {
            Direction::X => [1, 0, 0],
            Direction::Y => [0, 1, 0],
            Direction::Z => [0, 0, 1],
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::X => "x",
            Direction::Y => "y",
            Direction::Z => "z",
        };
        f.write_str(s)
    }
}

/// One of the six faces of a 3D domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    XLo,
    YLo,
    ZLo,
    XHi,
    YHi,
    ZHi,
}

impl Orientation {
    /// All faces in orientation-index order.
    pub const ALL: [Orientation; 6] = [
        Orientation::XLo,
        Orientation::YLo,
        Orientation::ZLo,
        Orientation::XHi,
        Orientation::YHi,
        Orientation::ZHi,
    ];

    /// Orientation index: `xlo=0, ylo=1, zlo=2, xhi=3, yhi=4, zhi=5`.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Orientation::XLo => 0,
            Orientation::YLo => 1,
            Orientation::ZLo => 2,
            Orientation::XHi => 3,
            Orientation::YHi => 4,
            Orientation::ZHi => 5,
        }
    }

    pub const fn low(dir: Direction) -> Self {
        match dir {
            Direction::X => Orientation::XLo,
            Direction::Y => Orientation::YLo,
            Direction::Z => Orientation::ZLo,
        }
    }

    pub const fn high(dir: Direction) -> Self {
        match dir {
            Direction::X => Orientation::XHi,
            Direction::Y => Orientation::YHi,
            Direction::Z => Orientation::ZHi,
        }
    }

    #[inline]
    pub const fn direction(self) -> Direction {
        match self {
            Orientation::XLo | Orientation::XHi => Direction::X,
            Orientation::YLo | Orientation::YHi => Direction::Y,
            Orientation::ZLo | Orientation::ZHi => Direction::Z,
        }
    }

    #[inline]
    pub const fn is_low(self) -> bool {
        matches!(self, Orientation::XLo | Orientation::YLo | Orientation::ZLo)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.is_low() { "lo" } else { "hi" };
        write!(f, "{}{}", self.direction(), side)
    }
}

/// Where a field's values live relative to the cells.
///
/// Face-staggered fields carry one more point than the cells along their
/// staggering direction; point `dom_lo` of that direction sits on the
/// low domain face and `dom_hi + 1` on the high one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Staggering {
    /// Cell centres (rho-points): tracers, free surface, density.
    #[default]
    Cell,
    /// x-faces (u-points).
    XFace,
    /// y-faces (v-points).
    YFace,
}

impl Staggering {
    /// True if the field is staggered along `dir`.
    #[inline]
    pub fn is_staggered_in(self, dir: Direction) -> bool {
        matches!(
            (self, dir),
            (Staggering::XFace, Direction::X) | (Staggering::YFace, Direction::Y)
        )
    }
}

/// A value for each of the six domain faces, with named fields.
///
/// # Example
///
/// ```
/// use ocean_split::types::{FaceTable, Orientation};
///
/// let mut t = FaceTable::uniform(0.0);
/// t[Orientation::XHi] = 1.5;
/// assert_eq!(t.xhi, 1.5);
/// assert_eq!(t.to_array(), [0.0, 0.0, 0.0, 1.5, 0.0, 0.0]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaceTable<T> {
    pub xlo: T,
    pub ylo: T,
    pub zlo: T,
    pub xhi: T,
    pub yhi: T,
    pub zhi: T,
}

impl<T> FaceTable<T> {
    /// Create with the same value on all faces.
    pub fn uniform(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            xlo: value.clone(),
            ylo: value.clone(),
            zlo: value.clone(),
            xhi: value.clone(),
            yhi: value.clone(),
            zhi: value,
        }
    }

    /// Create from an array in orientation-index order.
    pub fn from_array([xlo, ylo, zlo, xhi, yhi, zhi]: [T; 6]) -> Self {
        Self {
            xlo,
            ylo,
            zlo,
            xhi,
            yhi,
            zhi,
        }
    }

    /// Convert to an array in orientation-index order.
    pub fn to_array(self) -> [T; 6] {
        [self.xlo, self.ylo, self.zlo, self.xhi, self.yhi, self.zhi]
    }

    /// Map a function over all faces.
    pub fn map<U, F>(self, mut f: F) -> FaceTable<U>
    where
        F: FnMut(T) -> U,
    {
        FaceTable {
            xlo: f(self.xlo),
            ylo: f(self.ylo),
            zlo: f(self.zlo),
            xhi: f(self.xhi),
            yhi: f(self.yhi),
            zhi: f(self.zhi),
        }
    }

    /// Set the value on both faces of `dir`.
    pub fn with_direction(mut self, dir: Direction, value: T) -> Self
    where
        T: Clone,
    {
        self[Orientation::low(dir)] = value.clone();
        self[Orientation::high(dir)] = value;
        self
    }
}

impl<T> Index<Orientation> for FaceTable<T> {
    type Output = T;

    fn index(&self, ori: Orientation) -> &T {
        match ori {
            Orientation::XLo => &self.xlo,
            Orientation::YLo => &self.ylo,
            Orientation::ZLo => &self.zlo,
            Orientation::XHi => &self.xhi,
            Orientation::YHi => &self.yhi,
            Orientation::ZHi => &self.zhi,
        }
    }
}

impl<T> IndexMut<Orientation> for FaceTable<T> {
    fn index_mut(&mut self, ori: Orientation) -> &mut T {
        match ori {
            Orientation::XLo => &mut self.xlo,
            Orientation::YLo => &mut self.ylo,
            Orientation::ZLo => &mut self.zlo,
            Orientation::XHi => &mut self.xhi,
            Orientation::YHi => &mut self.yhi,
            Orientation::ZHi => &mut self.zhi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_indices() {
        for (n, ori) in Orientation::ALL.iter().enumerate() {
            assert_eq!(ori.index(), n);
        }
        assert_eq!(Orientation::low(Direction::Y), Orientation::YLo);
        assert_eq!(Orientation::high(Direction::Z).direction(), Direction::Z);
        assert!(!Orientation::XHi.is_low());
        assert_eq!(Orientation::YHi.to_string(), "yhi");
    }

    #[test]
    fn test_face_table_roundtrip() {
        let t = FaceTable::from_array([1, 2, 3, 4, 5, 6]);
        assert_eq!(t[Orientation::ZLo], 3);
        assert_eq!(t[Orientation::YHi], 5);
        assert_eq!(t.map(|v| v * 2).to_array(), [2, 4, 6, 8, 10, 12]);

        let w = FaceTable::uniform(0).with_direction(Direction::X, 9);
        assert_eq!(w.to_array(), [9, 0, 0, 9, 0, 0]);
    }

    #[test]
    fn test_staggering() {
        assert!(Staggering::XFace.is_staggered_in(Direction::X));
        assert!(!Staggering::XFace.is_staggered_in(Direction::Y));
        assert!(!Staggering::Cell.is_staggered_in(Direction::Z));
    }
}
