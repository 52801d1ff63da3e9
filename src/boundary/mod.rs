//! Physical boundary conditions for structured-grid fields.
//!
//! The [`BoundaryEngine`] fills ghost points outside the physical domain for
//! one component of a field at a time, using the [`BoundaryTable`] row the
//! caller selects ([`BcVar`]). Periodic directions are left for the
//! wraparound fill ([`Geometry::periodic_fill`](crate::field::Geometry::periodic_fill)).
//!
//! # Boundary types
//!
//! | Type | Ghost value (× mask) |
//! |------|----------------------|
//! | `ExtDir` | prescribed value from the table |
//! | `Foextrap`, `Clamped` | nearest interior value |
//! | `ReflectEven` | mirror image across the face |
//! | `ReflectOdd` | negated mirror image |
//! | `OrlanskiRad` | radiation blend, see [`radiation`] |
//! | `IntDir`, `Unknown(_)` | left unmodified |
//!
//! Unknown codes are a defined no-op: tables decoded from integer codes may
//! carry values this engine does not implement, and the fill leaves those
//! ghosts as they were.
//!
//! # Staggered fields
//!
//! Along its staggering direction a face field has a point on the boundary
//! face itself (`dom_lo`, `dom_hi + 1`). That point is written only by
//! `ExtDir`, `Foextrap` (copy of the first interior face) and `OrlanskiRad`;
//! ghosts beyond it mirror about the face. The vertical faces support
//! `ExtDir`, `Foextrap` and the two reflections only.
//!
//! # Corners
//!
//! After the face passes, horizontal corner ghosts are replaced by the
//! average of the two adjacent face-extrapolated values, unless either face
//! is `Clamped`, `IntDir` or `Unknown(_)`.
//!
//! # Example
//!
//! ```
//! use ocean_split::boundary::{BcType, BcVar, BoundaryEngine, BoundaryTable, FillRequest};
//! use ocean_split::field::{Field, Geometry};
//! use ocean_split::types::{FaceTable, IndexBox, Staggering};
//!
//! let geom = Geometry::new(IndexBox::new([0, 0, 0], [7, 7, 0]), [1.0; 3]);
//! let table = BoundaryTable::new()
//!     .with_row(BcVar::Temp, FaceTable::uniform(BcType::ReflectEven));
//! let engine = BoundaryEngine::new(geom.clone(), table);
//!
//! let bx = geom.field_box(2);
//! let mut temp = Field::from_fn(bx, 1, |i, _, _| i as f64);
//! let old = temp.clone();
//! let mask = Field::filled(geom.slab_box(2), 1, 1.0);
//!
//! let req = FillRequest {
//!     comp: 0,
//!     var: BcVar::Temp,
//!     stagger: Staggering::Cell,
//!     mask: &mask,
//!     reference: &old,
//!     ref_comp: 0,
//! };
//! engine.impose(&mut temp, &bx, &req).unwrap();
//! assert_eq!(temp.get(-1, 3, 0, 0), 0.0);
//! assert_eq!(temp.get(-2, 3, 0, 0), 1.0);
//! ```

mod engine;
pub mod radiation;
mod table;

pub use engine::{BoundaryEngine, FillRequest};
pub use table::{BcType, BcVar, BoundaryRow, BoundaryTable, PhysicalBc};
