//! Linear equation of state.
//!
//! ```text
//! ρ' = R0 - 1000 + R0·(-Tcoef·(T - T0) + Scoef·(S - S0))
//! ```
//!
//! The pressure gradient works with the anomaly `ρ' = ρ - 1000`, so the
//! stored density of water at the reference state is `R0 - 1000`.

use crate::error::Result;
use crate::exec::Executor;
use crate::field::Field;
use crate::types::IndexBox;

/// Linear density law in temperature and salinity.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearEos {
    /// Density at the reference state (kg/m³)
    pub r0: f64,
    /// Reference temperature (°C)
    pub t0: f64,
    /// Reference salinity (PSU)
    pub s0: f64,
    /// Thermal expansion coefficient (1/°C)
    pub tcoef: f64,
    /// Haline contraction coefficient (1/PSU)
    pub scoef: f64,
}

impl Default for LinearEos {
    fn default() -> Self {
        Self {
            r0: 1027.0,
            t0: 14.0,
            s0: 35.0,
            tcoef: 1.7e-4,
            scoef: 0.0,
        }
    }
}

impl LinearEos {
    /// Density anomaly `ρ - 1000` (kg/m³).
    #[inline]
    pub fn density_anomaly(&self, temp: f64, salt: f64) -> f64 {
        self.r0 - 1000.0 + self.r0 * (-self.tcoef * (temp - self.t0) + self.scoef * (salt - self.s0))
    }

    /// Fill `rho` over `bx` from the temperature (component 0) and salinity
    /// (component 1) of `tracers`. Without a salinity component the
    /// reference salinity is used.
    pub fn compute_density(
        &self,
        exec: Executor,
        bx: &IndexBox,
        tracers: &Field,
        rho: &mut Field,
    ) -> Result<()> {
        tracers.require("tracers", bx)?;
        tracers.require_comp("temperature", 0)?;
        rho.require("rho", bx)?;
        let has_salt = tracers.ncomp() > 1;
        exec.fill(rho, 0, bx, |i, j, k| {
            let salt = if has_salt {
                tracers.get(i, j, k, 1)
            } else {
                self.s0
            };
            self.density_anomaly(tracers.get(i, j, k, 0), salt)
        });
        Ok(())
    }
}
