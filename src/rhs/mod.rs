//! Right-hand-side kernels of the momentum equations.
//!
//! | Kernel | Writes | Mode |
//! |--------|--------|------|
//! | [`compute_hydrostatic_pressure_gradient`] | `ru`, `rv` at `nrhs` | assign |
//! | [`compute_coriolis`] | `ru`, `rv` (3D) or `rhs_ubar`, `rhs_vbar` (2D) | add |
//! | [`compute_momentum_advection`] | `ru`, `rv`; `rufrc`, `rvfrc` | subtract; add column sums |
//! | [`rhs_2d`] | `rhs_ubar`, `rhs_vbar` | subtract |
//!
//! The 3D right-hand side is assembled in that order: the pressure gradient
//! initialises the slot, Coriolis and advection accumulate on top, and the
//! advection kernel finally integrates the complete column into the
//! depth-integrated forcing that drives the barotropic mode.
//!
//! Every kernel checks its boxes against the fields it touches before
//! writing anything and returns [`OceanError::BoxMismatch`] otherwise.
//!
//! [`OceanError::BoxMismatch`]: crate::error::OceanError::BoxMismatch

mod advection;
mod coriolis;
mod pressure;
mod rhs_2d;

pub use advection::{compute_momentum_advection, MomentumAdvection, MomentumForcing, StressFields};
pub use coriolis::{compute_coriolis, CoriolisInput};
pub use pressure::{compute_hydrostatic_pressure_gradient, PressureConstants, PressureInput};
pub use rhs_2d::{rhs_2d, BarotropicAdvection};

use crate::types::Direction;

pub(crate) type Point = (i32, i32, i32);

/// `p` moved `n` points along `dir`.
#[inline]
pub(crate) fn shift((i, j, k): Point, dir: Direction, n: i32) -> Point {
    match dir {
        Direction::X => (i + n, j, k),
        Direction::Y => (i, j + n, k),
        Direction::Z => (i, j, k + n),
    }
}
