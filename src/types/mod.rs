//! Strongly-typed index-space types for safer APIs.
//!
//! # Design Philosophy
//!
//! - **Named faces over positional indices**: `FaceTable { xlo, ylo, .. }`
//!   rather than `[f64; 6]` with a remembered ordering
//! - **Boxes describe every pass**: kernels are written against an
//!   [`IndexBox`] and callers derive sub-boxes with `grow`, `make_slab`,
//!   `surrounding_nodes`, ...
//!
//! # Example
//!
//! ```
//! use ocean_split::types::{Direction, IndexBox, Orientation};
//!
//! let domain = IndexBox::new([0, 0, 0], [31, 15, 9]);
//! let with_ghosts = domain.grow([2, 2, 0]);
//!
//! // ghost strip west of the domain
//! let west = with_ghosts.outside_face(&domain, Orientation::XLo);
//! assert_eq!(west.length(Direction::X), 2);
//! ```

mod bounds;
mod sides;

pub use bounds::IndexBox;
pub use sides::{Direction, FaceTable, Orientation, Staggering};
