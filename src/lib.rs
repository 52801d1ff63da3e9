//! # ocean-split
//!
//! Split-explicit time integration for a terrain-following (sigma)
//! regional ocean model on a structured grid.
//!
//! The crate provides the core of one model time step:
//! - Boundary-condition engine for cell-centred and face-staggered fields
//! - 3D momentum advection (third-order upstream or second-order centred)
//! - Hydrostatic pressure gradient from a density field
//! - Barotropic predictor/corrector sub-cycle with time-averaging filters
//! - Baroclinic step coupling the two modes
//!
//! Fields are [`field::Field`]s over an inclusive [`types::IndexBox`] with
//! signed indices so ghost cells below zero are addressable. Every per-cell
//! kernel runs through [`exec::Executor`], serially or on rayon with the
//! `parallel` feature.
//!
//! # Example
//!
//! ```
//! use ocean_split::config::OceanConfig;
//! use ocean_split::field::{Field, Geometry};
//! use ocean_split::state::{InitialData, OceanState};
//! use ocean_split::time::Integrator;
//! use ocean_split::types::IndexBox;
//!
//! let geom = Geometry::new(IndexBox::new([0, 0, 0], [7, 7, 3]), [1000.0, 1000.0, 1.0]);
//! let data = InitialData::new()
//!     .with_bathymetry(Field::filled(geom.slab_box(2), 1, 50.0))
//!     .with_velocity(Field::new(geom.field_box(2), 1), Field::new(geom.field_box(2), 1))
//!     .with_tracers(Field::filled(geom.field_box(2), 2, 14.0));
//!
//! let config = OceanConfig::new(60.0, 10);
//! let mut state = OceanState::from_initial_data(&config, geom, data).unwrap();
//! Integrator::new(config).unwrap().step(&mut state).unwrap();
//! assert_eq!(state.iic, 1);
//! ```

pub mod boundary;
pub mod config;
pub mod error;
pub mod exec;
pub mod field;
pub mod rhs;
pub mod state;
pub mod time;
pub mod types;
pub mod vertical;

pub use config::{AdvectionScheme, CoriolisParams, OceanConfig};
pub use error::{OceanError, Result};
pub use field::{Field, Geometry};
pub use state::{InitialData, OceanState};
pub use time::Integrator;
pub use types::IndexBox;
