//! Field storage and the static grid description it lives on.
//!
//! # Components
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Field`] | 3D + component array over an [`IndexBox`](crate::types::IndexBox), ghosts included |
//! | [`Geometry`] | Valid domain box, periodicity, cell sizes, periodic wraparound |
//! | [`GridMetrics`] | `pm`, `pn`, face lengths, Coriolis `fomn`, bathymetry `h` |
//! | [`LandMask`] | 0/1 masks at rho, u and v points |
//! | [`ScratchPool`] | Pooled per-call temporaries with scoped release |
//!
//! # Index conventions
//!
//! Indices are signed so ghost cells below the domain are addressable.
//! A u-point `(i, j, k)` sits on the x-face between cells `i-1` and `i`; a
//! v-point on the y-face between cells `j-1` and `j`; a w-point `k` on the
//! bottom face of cell `k` (so `k = N+1` is the free surface).

mod array;
mod geometry;
mod mask;
mod metrics;
mod scratch;

pub use array::Field;
pub use geometry::Geometry;
pub use mask::LandMask;
pub use metrics::GridMetrics;
pub use scratch::{ScratchField, ScratchPool};
