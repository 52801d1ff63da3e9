//! Split-explicit time stepping.
//!
//! A baroclinic step of length `dt` advances the full 3D state once and
//! sub-cycles the barotropic mode with `dtfast = dt / ndtfast`:
//!
//! ```text
//! step_3d ─┬─ 3D right-hand side (ru, rv, rufrc, rvfrc)
//!          ├─ for my_iif in 0..=nfast
//!          │     step_2d predictor
//!          │     step_2d corrector   (my_iif < nfast)
//!          ├─ ζ ← Zt_avg1, vertical grid rebuilt
//!          ├─ u, v to nnew, column means ← DU_avg1, DV_avg1
//!          └─ tracers, masks
//! ```
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`slots`](FastSlots) | time-level slot indices of every sub-step |
//! | [`weights`](FastWeights) | barotropic averaging filter |
//! | [`step_2d`] | one predictor or corrector sub-step |
//! | [`step_3d`] | one baroclinic step |
//! | [`Integrator`] | driver owning the scratch pool and particle hook |

mod integrator;
mod slots;
mod step_2d;
mod step_3d;
mod weights;

pub use integrator::Integrator;
pub use slots::{FastSlots, Phase, SlowSlots};
pub use step_2d::{step_2d, FastStep};
pub use step_3d::step_3d;
pub use weights::{FastWeightKind, FastWeights, SubstepWeights};
