//! Run configuration for the split-explicit integrator.
//!
//! # Example
//!
//! ```
//! use ocean_split::config::{AdvectionScheme, CoriolisParams, OceanConfig};
//!
//! let config = OceanConfig::new(300.0, 30)
//!     .with_advection(AdvectionScheme::Centered2)
//!     .with_coriolis(CoriolisParams::upwelling());
//! assert!(config.validate().is_ok());
//! assert_eq!(config.dtfast(), 10.0);
//! ```

use tracing::warn;

use crate::error::{OceanError, Result};
use crate::time::FastWeightKind;
use crate::vertical::StretchingKind;

/// Standard gravity (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Boussinesq reference density (kg/m³).
pub const RHO0: f64 = 1025.0;

/// Horizontal momentum advection scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdvectionScheme {
    /// Third-order upstream-biased fluxes, fourth-order vertical.
    #[default]
    Upstream3,
    /// Second-order centred fluxes.
    Centered2,
}

/// Beta-plane Coriolis parameter `f = f0 + beta·(y - y_mid)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoriolisParams {
    /// Coriolis parameter at the domain centre (1/s)
    pub f0: f64,
    /// Meridional gradient (1/(m·s))
    pub beta: f64,
}

impl CoriolisParams {
    pub fn new(f0: f64, beta: f64) -> Self {
        Self { f0, beta }
    }

    /// Southern-hemisphere f-plane of the upwelling test case.
    pub fn upwelling() -> Self {
        Self::new(-8.26e-5, 0.0)
    }
}

/// Configuration of the split-explicit time step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OceanConfig {
    /// Baroclinic time step (s)
    pub dt: f64,
    /// Barotropic sub-steps per baroclinic step
    pub ndtfast: usize,
    /// Gravitational acceleration
    pub g: f64,
    /// Reference density
    pub rho0: f64,
    /// Horizontal momentum advection
    pub uv_hadv_scheme: AdvectionScheme,
    /// Coriolis parameters (None = no rotation)
    pub coriolis: Option<CoriolisParams>,
    /// Baroclinic pressure gradient
    pub use_prsgrd: bool,
    /// Surface-pressure gradient in the barotropic momentum
    pub use_surface_pressure_2d: bool,
    /// Tracer advection in the 3D step
    pub use_tracer_advection: bool,
    /// Particle advection after the 3D step
    pub use_particles: bool,
    /// Barotropic time-averaging filter
    pub weights: FastWeightKind,
    /// Vertical stretching
    pub stretching: StretchingKind,
    /// Ghost width of every field
    pub halo: i32,
}

impl OceanConfig {
    /// Create a configuration with physical defaults.
    ///
    /// # Arguments
    /// * `dt` - Baroclinic time step (s)
    /// * `ndtfast` - Number of barotropic sub-steps per baroclinic step
    pub fn new(dt: f64, ndtfast: usize) -> Self {
        Self {
            dt,
            ndtfast,
            g: GRAVITY,
            rho0: RHO0,
            uv_hadv_scheme: AdvectionScheme::default(),
            coriolis: None,
            use_prsgrd: true,
            use_surface_pressure_2d: true,
            use_tracer_advection: true,
            use_particles: false,
            weights: FastWeightKind::default(),
            stretching: StretchingKind::default(),
            halo: 2,
        }
    }

    pub fn with_advection(mut self, scheme: AdvectionScheme) -> Self {
        self.uv_hadv_scheme = scheme;
        self
    }

    pub fn with_coriolis(mut self, params: CoriolisParams) -> Self {
        self.coriolis = Some(params);
        self
    }

    /// Override the physical constants.
    pub fn with_constants(mut self, g: f64, rho0: f64) -> Self {
        self.g = g;
        self.rho0 = rho0;
        self
    }

    pub fn with_weights(mut self, weights: FastWeightKind) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_stretching(mut self, stretching: StretchingKind) -> Self {
        self.stretching = stretching;
        self
    }

    pub fn with_prsgrd(mut self, on: bool) -> Self {
        self.use_prsgrd = on;
        self
    }

    pub fn with_surface_pressure_2d(mut self, on: bool) -> Self {
        self.use_surface_pressure_2d = on;
        self
    }

    pub fn with_tracer_advection(mut self, on: bool) -> Self {
        self.use_tracer_advection = on;
        self
    }

    pub fn with_particles(mut self, on: bool) -> Self {
        self.use_particles = on;
        self
    }

    pub fn with_halo(mut self, halo: i32) -> Self {
        self.halo = halo;
        self
    }

    /// Barotropic time step.
    #[inline]
    pub fn dtfast(&self) -> f64 {
        self.dt / self.ndtfast as f64
    }

    /// Density scaling of the barotropic surface-pressure term.
    #[inline]
    pub fn fac(&self) -> f64 {
        1000.0 / self.rho0
    }

    /// Check the configuration; fails on the first invalid value.
    pub fn validate(&self) -> Result<()> {
        let finite = |name: &str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(OceanError::InvalidConfig(format!("{} must be finite, got {}", name, v)))
            }
        };
        finite("dt", self.dt)?;
        finite("g", self.g)?;
        finite("rho0", self.rho0)?;

        if self.dt <= 0.0 {
            return Err(OceanError::InvalidConfig(format!("dt must be positive, got {}", self.dt)));
        }
        if self.ndtfast == 0 {
            return Err(OceanError::InvalidConfig("ndtfast must be at least 1".into()));
        }
        if self.g <= 0.0 {
            return Err(OceanError::InvalidConfig(format!("g must be positive, got {}", self.g)));
        }
        if self.rho0 <= 0.0 {
            return Err(OceanError::InvalidConfig(format!(
                "rho0 must be positive, got {}",
                self.rho0
            )));
        }
        if self.halo < 2 {
            return Err(OceanError::InvalidConfig(format!(
                "halo must be at least 2 for the advection stencils, got {}",
                self.halo
            )));
        }
        if let Some(c) = self.coriolis {
            finite("f0", c.f0)?;
            finite("beta", c.beta)?;
        }
        self.weights.validate()?;
        self.stretching.validate()?;

        if self.ndtfast % 2 != 0 {
            warn!(ndtfast = self.ndtfast, "odd number of barotropic sub-steps");
        }
        if self.weights == FastWeightKind::SingleStep && self.ndtfast > 1 {
            warn!(
                ndtfast = self.ndtfast,
                "single-step weights average only the last barotropic sub-step"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = OceanConfig::new(60.0, 20);
        assert_eq!(c.g, 9.81);
        assert_eq!(c.rho0, 1025.0);
        assert!((c.fac() - 1000.0 / 1025.0).abs() < 1e-15);
        assert_eq!(c.uv_hadv_scheme, AdvectionScheme::Upstream3);
        assert!(matches!(c.weights, FastWeightKind::PowerLaw { .. }));
        assert!(c.validate().is_ok());
        // single-step averaging over several sub-steps only warns
        assert!(c.with_weights(FastWeightKind::SingleStep).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(OceanConfig::new(0.0, 10).validate().is_err());
        assert!(OceanConfig::new(-1.0, 10).validate().is_err());
        assert!(OceanConfig::new(f64::NAN, 10).validate().is_err());
        assert!(OceanConfig::new(10.0, 0).validate().is_err());
        assert!(OceanConfig::new(10.0, 4).with_constants(0.0, 1025.0).validate().is_err());
        assert!(OceanConfig::new(10.0, 4).with_constants(9.81, -1.0).validate().is_err());
        assert!(OceanConfig::new(10.0, 4).with_halo(1).validate().is_err());
        assert!(OceanConfig::new(10.0, 4)
            .with_coriolis(CoriolisParams::new(f64::INFINITY, 0.0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_error_message() {
        let err = OceanConfig::new(-2.0, 4).validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: dt must be positive, got -2");
    }
}
