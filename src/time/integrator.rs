//! Driver of the split-explicit time step.
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
//! let geom = Geometry::new(IndexBox::new([0, 0, 0], [5, 5, 2]), [1000.0, 1000.0, 1.0]);
//! let data = InitialData::new()
//!     .with_bathymetry(Field::filled(geom.slab_box(2), 1, 30.0))
//!     .with_velocity(Field::new(geom.field_box(2), 1), Field::new(geom.field_box(2), 1))
//!     .with_tracers(Field::filled(geom.field_box(2), 2, 14.0));
//! let config = OceanConfig::new(60.0, 10);
//! let mut state = OceanState::from_initial_data(&config, geom, data).unwrap();
//!
//! let mut integrator = Integrator::new(config).unwrap();
//! integrator.run(&mut state, 2).unwrap();
//! assert_eq!(state.iic, 2);
//! ```

use tracing::{info, info_span};

use crate::config::OceanConfig;
use crate::error::Result;
use crate::exec::{Executor, KernelContext};
use crate::field::ScratchPool;
use crate::state::{OceanState, ParticleAdvector, VelocitySnapshot};

use super::step_3d::step_3d;
use super::weights::FastWeights;

/// Owns the configuration, the resolved barotropic weights and the scratch
/// pool shared by every kernel of a run.
pub struct Integrator {
    config: OceanConfig,
    weights: FastWeights,
    pool: ScratchPool,
    exec: Executor,
    particles: Option<Box<dyn ParticleAdvector>>,
}

impl Integrator {
    /// Validate `config` and resolve its barotropic weights.
    pub fn new(config: OceanConfig) -> Result<Self> {
        config.validate()?;
        let weights = config.weights.resolve(config.ndtfast);
        Ok(Self {
            config,
            weights,
            pool: ScratchPool::new(),
            exec: Executor::best(),
            particles: None,
        })
    }

    pub fn with_executor(mut self, exec: Executor) -> Self {
        self.exec = exec;
        self
    }

    /// Particle subsystem advanced after every step when
    /// `use_particles` is set.
    pub fn with_particles(mut self, advector: Box<dyn ParticleAdvector>) -> Self {
        self.particles = Some(advector);
        self
    }

    pub fn config(&self) -> &OceanConfig {
        &self.config
    }

    pub fn weights(&self) -> &FastWeights {
        &self.weights
    }

    /// Advance `state` by one baroclinic step.
    pub fn step(&mut self, state: &mut OceanState) -> Result<()> {
        let _step = info_span!("baroclinic step", iic = state.iic).entered();
        let ctx = KernelContext::new(self.exec, &self.pool);
        let slots = step_3d(ctx, &self.config, &self.weights, state)?;

        if self.config.use_particles {
            if let Some(particles) = self.particles.as_mut() {
                particles.advect(&VelocitySnapshot {
                    geom: &state.geom,
                    u: &state.u,
                    v: &state.v,
                    w: &state.w,
                    z_w: &state.vert.z_w,
                    comp: slots.nnew,
                    dt: self.config.dt,
                })?;
            }
        }
        Ok(())
    }

    /// Advance `state` by `n_steps` baroclinic steps.
    pub fn run(&mut self, state: &mut OceanState, n_steps: usize) -> Result<()> {
        for _ in 0..n_steps {
            self.step(state)?;
        }
        info!(iic = state.iic, time = state.time, "run finished");
        Ok(())
    }
}

impl std::fmt::Debug for Integrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integrator")
            .field("config", &self.config)
            .field("nfast", &self.weights.nfast())
            .field("exec", &self.exec)
            .field("particles", &self.particles.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::field::{Field, Geometry};
    use crate::state::InitialData;
    use crate::types::IndexBox;

    struct Recorder(Arc<Mutex<Vec<(usize, f64)>>>);

    impl ParticleAdvector for Recorder {
        fn advect(&mut self, velocity: &VelocitySnapshot<'_>) -> Result<()> {
            self.0.lock().push((velocity.comp, velocity.dt));
            Ok(())
        }
    }

    fn state(config: &OceanConfig) -> OceanState {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [4, 4, 2]), [1000.0, 1000.0, 1.0]);
        let data = InitialData::new()
            .with_bathymetry(Field::filled(geom.slab_box(2), 1, 25.0))
            .with_velocity(Field::new(geom.field_box(2), 1), Field::new(geom.field_box(2), 1))
            .with_tracers(Field::filled(geom.field_box(2), 1, 12.0));
        OceanState::from_initial_data(config, geom, data).unwrap()
    }

    #[test]
    fn test_particles_receive_new_level() {
        let config = OceanConfig::new(30.0, 6).with_particles(true);
        let mut s = state(&config);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut integrator = Integrator::new(config)
            .unwrap()
            .with_executor(Executor::Serial)
            .with_particles(Box::new(Recorder(calls.clone())));

        integrator.run(&mut s, 3).unwrap();
        assert_eq!(*calls.lock(), vec![(1, 30.0), (0, 30.0), (1, 30.0)]);
        assert!((s.time - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_particles_skipped_when_disabled() {
        let config = OceanConfig::new(30.0, 6);
        let mut s = state(&config);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut integrator = Integrator::new(config)
            .unwrap()
            .with_particles(Box::new(Recorder(calls.clone())));

        integrator.step(&mut s).unwrap();
        assert!(calls.lock().is_empty());
        assert_eq!(s.iic, 1);
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(Integrator::new(OceanConfig::new(30.0, 0)).is_err());
    }
}
