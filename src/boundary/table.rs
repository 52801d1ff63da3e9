//! Boundary-type tags and the per-variable boundary table.

use crate::error::{OceanError, Result};
use crate::types::{Direction, FaceTable, Orientation};

/// Mathematical boundary type applied on one face of one variable.
///
/// Integer codes follow the usual block-structured convention
/// (`reflect_odd = -1`, `int_dir = 0`, `reflect_even = 1`, `foextrap = 2`,
/// `ext_dir = 3`, `clamped = 4`, `orlanski_rad = 5`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BcType {
    /// Interior or periodic: filled by the exchange, never by the engine.
    IntDir,
    /// Prescribed (Dirichlet) value from the table.
    ExtDir,
    /// First-order extrapolation (zero gradient).
    #[default]
    Foextrap,
    /// Zero gradient, with corners left alone; boundary data is applied
    /// elsewhere.
    Clamped,
    /// Orlanski radiation.
    OrlanskiRad,
    /// Mirror across the face.
    ReflectEven,
    /// Negated mirror across the face.
    ReflectOdd,
    /// A code outside the known set. The engine leaves such ghosts untouched.
    Unknown(i32),
}

impl BcType {
    /// Decode an integer boundary code. Unrecognised codes become
    /// [`BcType::Unknown`] rather than an error.
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => BcType::ReflectOdd,
            0 => BcType::IntDir,
            1 => BcType::ReflectEven,
            2 => BcType::Foextrap,
            3 => BcType::ExtDir,
            4 => BcType::Clamped,
            5 => BcType::OrlanskiRad,
            other => BcType::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            BcType::ReflectOdd => -1,
            BcType::IntDir => 0,
            BcType::ReflectEven => 1,
            BcType::Foextrap => 2,
            BcType::ExtDir => 3,
            BcType::Clamped => 4,
            BcType::OrlanskiRad => 5,
            BcType::Unknown(c) => c,
        }
    }
}

/// Row of the boundary table. Each prognostic variable has its own row;
/// [`BcVar::Foextrap`] is a fixed all-extrapolation row used for auxiliary
/// fields and is applied even along periodic directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BcVar {
    Temp,
    Salt,
    Scalar,
    XVel,
    YVel,
    ZVel,
    Ubar,
    Vbar,
    Zeta,
    Foextrap,
}

impl BcVar {
    pub const COUNT: usize = 10;

    pub const ALL: [BcVar; BcVar::COUNT] = [
        BcVar::Temp,
        BcVar::Salt,
        BcVar::Scalar,
        BcVar::XVel,
        BcVar::YVel,
        BcVar::ZVel,
        BcVar::Ubar,
        BcVar::Vbar,
        BcVar::Zeta,
        BcVar::Foextrap,
    ];

    /// Row index in the table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Row for tracer component `n` (temperature, salinity, passive scalar).
    pub fn tracer(n: usize) -> Option<Self> {
        match n {
            0 => Some(BcVar::Temp),
            1 => Some(BcVar::Salt),
            2 => Some(BcVar::Scalar),
            _ => None,
        }
    }

    /// Velocity component normal to faces of `dir`, if this row is one.
    fn normal_direction(self) -> Option<Direction> {
        match self {
            BcVar::XVel | BcVar::Ubar => Some(Direction::X),
            BcVar::YVel | BcVar::Vbar => Some(Direction::Y),
            BcVar::ZVel => Some(Direction::Z),
            _ => None,
        }
    }
}

/// Physical boundary kind specified per domain face; expanded into
/// per-variable [`BcType`]s by [`BoundaryTable::from_physical`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhysicalBc {
    /// Handled by periodic wraparound.
    Periodic,
    /// Free-slip wall: zero normal velocity, zero-gradient tangential.
    #[default]
    SlipWall,
    /// No-slip wall: all velocities zero.
    NoSlipWall,
    /// Mirror symmetry plane.
    Symmetry,
    /// Zero-gradient outflow.
    Outflow,
    /// Prescribed inflow values.
    Inflow,
    /// Boundary data applied externally.
    Clamped,
    /// Orlanski radiation for velocities and tracers.
    Radiation,
}

/// Types and prescribed values for the six faces of one variable.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundaryRow {
    pub types: FaceTable<BcType>,
    pub ext_dir: FaceTable<f64>,
}

impl BoundaryRow {
    pub fn uniform(bc: BcType) -> Self {
        Self {
            types: FaceTable::uniform(bc),
            ext_dir: FaceTable::uniform(0.0),
        }
    }

    #[inline]
    pub fn bc(&self, ori: Orientation) -> BcType {
        self.types[ori]
    }
}

/// Per-variable, per-face boundary types plus Dirichlet values.
///
/// Built once at setup and read-only afterwards.
///
/// # Example
///
/// ```
/// use ocean_split::boundary::{BcType, BcVar, BoundaryTable, PhysicalBc};
/// use ocean_split::types::{FaceTable, Orientation};
///
/// let mut faces = FaceTable::uniform(PhysicalBc::SlipWall);
/// faces.xhi = PhysicalBc::Radiation;
/// let table = BoundaryTable::from_physical(&faces);
///
/// assert_eq!(table.row(BcVar::XVel).bc(Orientation::XLo), BcType::ExtDir);
/// assert_eq!(table.row(BcVar::YVel).bc(Orientation::XLo), BcType::Foextrap);
/// assert_eq!(table.row(BcVar::Temp).bc(Orientation::XHi), BcType::OrlanskiRad);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundaryTable {
    rows: Vec<BoundaryRow>,
}

impl Default for BoundaryTable {
    fn default() -> Self {
        Self {
            rows: vec![BoundaryRow::uniform(BcType::Foextrap); BcVar::COUNT],
        }
    }
}

impl BoundaryTable {
    /// Every row zero-gradient on every face.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand per-face physical boundary kinds into every variable's row.
    ///
    /// The vertical faces use the given kinds too; a wall there closes the
    /// column (`w = 0`) while horizontal velocities extrapolate.
    pub fn from_physical(faces: &FaceTable<PhysicalBc>) -> Self {
        let mut table = Self::new();
        for var in BcVar::ALL {
            if var == BcVar::Foextrap {
                continue;
            }
            let row = &mut table.rows[var.index()];
            for ori in Orientation::ALL {
                let normal = var.normal_direction() == Some(ori.direction());
                row.types[ori] = physical_to_bc(faces[ori], var, normal);
            }
        }
        table
    }

    /// Replace the types of one row. The fixed extrapolation row cannot be
    /// changed.
    pub fn with_row(mut self, var: BcVar, types: FaceTable<BcType>) -> Self {
        if var != BcVar::Foextrap {
            self.rows[var.index()].types = types;
        }
        self
    }

    /// Set one face of one row.
    pub fn with_bc(mut self, var: BcVar, ori: Orientation, bc: BcType) -> Self {
        if var != BcVar::Foextrap {
            self.rows[var.index()].types[ori] = bc;
        }
        self
    }

    /// Prescribed value used by [`BcType::ExtDir`] on one face of one row.
    pub fn with_ext_dir(mut self, var: BcVar, ori: Orientation, value: f64) -> Self {
        self.rows[var.index()].ext_dir[ori] = value;
        self
    }

    #[inline]
    pub fn row(&self, var: BcVar) -> &BoundaryRow {
        &self.rows[var.index()]
    }

    /// Row by raw index, for callers holding integer row ids.
    pub fn row_at(&self, index: usize) -> Result<&BoundaryRow> {
        self.rows
            .get(index)
            .ok_or(OceanError::UnknownBoundaryRow(index))
    }
}

fn physical_to_bc(kind: PhysicalBc, var: BcVar, normal: bool) -> BcType {
    let is_velocity = var.normal_direction().is_some();
    match kind {
        PhysicalBc::Periodic => BcType::IntDir,
        PhysicalBc::SlipWall => {
            if normal {
                BcType::ExtDir
            } else {
                BcType::Foextrap
            }
        }
        PhysicalBc::NoSlipWall => {
            if is_velocity {
                BcType::ExtDir
            } else {
                BcType::Foextrap
            }
        }
        PhysicalBc::Symmetry => {
            if normal {
                BcType::ReflectOdd
            } else {
                BcType::ReflectEven
            }
        }
        PhysicalBc::Outflow => BcType::Foextrap,
        PhysicalBc::Inflow => BcType::ExtDir,
        PhysicalBc::Clamped => BcType::Clamped,
        PhysicalBc::Radiation => {
            if var == BcVar::ZVel {
                BcType::Foextrap
            } else {
                BcType::OrlanskiRad
            }
        }
    }
}
