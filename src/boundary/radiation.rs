//! Orlanski radiation condition.
//!
//! The boundary value is a blend of the previous-time exterior value and the
//! current first-interior value, weighted by a local phase speed estimated
//! from the tendency and the normal gradient at the first interior point:
//!
//! ```text
//! C   = dV/dt · dV/dn                (dV/dt zeroed if C would be negative)
//! cff = max(dV/dn² + dV/dt_tan², eps)
//! V_b = (cff·V_ext(old) + C·V_int) / (cff + C)
//! ```
//!
//! Only outgoing waves radiate (`C >= 0`); the tangential gradient is taken
//! from the upstream side.

/// Floor on the blend denominator.
pub const RADIATION_EPS: f64 = 1e-20;

/// Orlanski blend.
///
/// # Arguments
///
/// * `dvdt` - `V_old(p1) - V_new(p1)` at the first interior point
/// * `dvdn` - `V_new(p1) - V_new(p2)`, normal gradient pointing outward
/// * `backward`, `forward` - tangential differences of `V_old` at `p1`
/// * `exterior` - `V_old` just outside `p1`
/// * `interior` - `V_new(p1)`
#[inline]
pub fn orlanski_blend(
    dvdt: f64,
    dvdn: f64,
    backward: f64,
    forward: f64,
    exterior: f64,
    interior: f64,
) -> f64 {
    let dvdt = if dvdt * dvdn < 0.0 { 0.0 } else { dvdt };
    let tangential = if dvdt * (backward + forward) > 0.0 {
        backward
    } else {
        forward
    };
    let cff = (dvdn * dvdn + tangential * tangential).max(RADIATION_EPS);
    let c = dvdt * dvdn;
    (cff * exterior + c * interior) / (cff + c)
}
