//! Hand-off of the updated velocity field to a particle subsystem.

use crate::error::Result;
use crate::field::{Field, Geometry};

/// Velocity at the end of a baroclinic step.
#[derive(Clone, Copy, Debug)]
pub struct VelocitySnapshot<'a> {
    pub geom: &'a Geometry,
    /// x-face velocity, component `comp`
    pub u: &'a Field,
    /// y-face velocity, component `comp`
    pub v: &'a Field,
    /// Vertical transport at w-points
    pub w: &'a Field,
    /// w-point depths
    pub z_w: &'a Field,
    pub comp: usize,
    /// Length of the step just taken (s)
    pub dt: f64,
}

/// Particle subsystem driven by the integrator after every 3D step.
///
/// The integrator only reads the snapshot out; what the particles do with
/// it is the implementor's business.
pub trait ParticleAdvector: Send {
    fn advect(&mut self, velocity: &VelocitySnapshot<'_>) -> Result<()>;
}
