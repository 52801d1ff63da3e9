//! Terrain-following vertical coordinate.
//!
//! The water column between the bottom `z = -h` and the free surface
//! `z = ζ` is divided into `n_levels` layers whose interfaces follow a stretched
//! fractional coordinate `s ∈ [-1, 0]`:
//!
//! - `s = -1` at the bottom
//! - `s = 0` at the surface
//!
//! # Level convention
//!
//! | Quantity | Index range | Notes |
//! |----------|-------------|-------|
//! | `z_r`, `Hz`, tracers, `u`, `v` | `k = 0..=N` | cell centres, `N = n_levels - 1` |
//! | `z_w`, `W` | `k = 0..=N+1` | `k` is the bottom face of cell `k`, `N+1` is the surface |
//!
//! # Example
//!
//! ```
//! use ocean_split::vertical::{SongHaidvogelStretching, VerticalGrid};
//!
//! let grid = VerticalGrid::new(20, &SongHaidvogelStretching::new(7.0, 0.1, 250.0));
//! let z_w = grid.z_w_column(200.0, 0.5);
//! assert!((z_w[0] + 200.0).abs() < 1e-9);
//! assert!((z_w[20] - 0.5).abs() < 1e-9);
//! ```

mod grid;
mod stretching;
mod transport;

pub use grid::{VerticalFields, VerticalGrid};
pub use stretching::{
    SongHaidvogelStretching, Stretching, StretchingCurves, StretchingKind, UniformStretching,
};
pub use transport::{compute_horizontal_transports, compute_vertical_transport};
