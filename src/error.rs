//! Error types for setup and kernel preconditions.
//!
//! Numerical degeneracies (near-zero denominators in the limiter and the
//! radiation condition) are never errors: they are guarded by fixed epsilon
//! floors. Unknown boundary tags are never errors either; see
//! [`crate::boundary::BcType::Unknown`].

use thiserror::Error;

use crate::types::IndexBox;

/// Errors raised by configuration, initialization and kernel preconditions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OceanError {
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A required input (initial or boundary data) was not provided.
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// A field does not cover the index box a kernel needs to touch.
    #[error("Box mismatch for {what}: requires {required}, field covers {available}")]
    BoxMismatch {
        what: &'static str,
        required: IndexBox,
        available: IndexBox,
    },

    /// A component (time-level slot or tracer) index beyond the field's count.
    #[error("Component {comp} out of range for {what} with {ncomp} components")]
    ComponentOutOfRange {
        what: &'static str,
        comp: usize,
        ncomp: usize,
    },

    /// A boundary-table row that does not exist.
    #[error("Boundary table has no row {0}")]
    UnknownBoundaryRow(usize),
}

impl OceanError {
    /// Create a box mismatch error.
    pub fn box_mismatch(what: &'static str, required: IndexBox, available: IndexBox) -> Self {
        Self::BoxMismatch {
            what,
            required,
            available,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OceanError>;
