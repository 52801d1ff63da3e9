//! Model state: every prognostic and diagnostic field of one grid.
//!
//! # Time levels
//!
//! | Field | Components | Indexed by |
//! |-------|------------|------------|
//! | `u`, `v` | 2 | `nstp`, `nnew` |
//! | `tracers[slot]` | one per tracer | `nstp`, `nnew` |
//! | `ru`, `rv` | 2 | `nrhs` |
//! | `ru_hist`, `rv_hist` | 2 | `nstp`, `nnew` |
//! | `zeta`, `ubar`, `vbar` | 3 | `kstp`, `krhs`, `knew` |
//! | `rzeta`, `rubar`, `rvbar` | 2 | `kstp`, `krhs`, `ptsk` |
//!
//! 3D fields live on [`Geometry::field_box`], depth-integrated ones on
//! [`Geometry::slab_box`] and w-point fields on [`Geometry::w_box`], all
//! with the configured halo.
//!
//! # Example
//!
//! ```
//! use ocean_split::config::OceanConfig;
//! use ocean_split::field::{Field, Geometry};
//! use ocean_split::state::{InitialData, OceanState};
//! use ocean_split::types::IndexBox;
//!
//! let geom = Geometry::new(IndexBox::new([0, 0, 0], [7, 7, 3]), [1000.0, 1000.0, 1.0]);
//! let data = InitialData::new()
//!     .with_bathymetry(Field::filled(geom.slab_box(2), 1, 50.0))
//!     .with_velocity(Field::new(geom.field_box(2), 1), Field::new(geom.field_box(2), 1))
//!     .with_tracers(Field::filled(geom.field_box(2), 2, 14.0));
//!
//! let state = OceanState::from_initial_data(&OceanConfig::new(60.0, 20), geom, data).unwrap();
//! assert_eq!(state.n_levels(), 4);
//! assert!((state.total_volume(0) - 64.0 * 50.0e6).abs() < 1e-3);
//! ```

mod eos;
mod initial;
mod particles;

pub use eos::LinearEos;
pub use initial::InitialData;
pub use particles::{ParticleAdvector, VelocitySnapshot};

use tracing::debug;

use crate::boundary::{BcVar, BoundaryEngine, FillRequest};
use crate::config::OceanConfig;
use crate::error::{OceanError, Result};
use crate::exec::Executor;
use crate::field::{Field, Geometry, GridMetrics, LandMask};
use crate::rhs::StressFields;
use crate::time::SlowSlots;
use crate::types::{Direction, IndexBox, Staggering};
use crate::vertical::{VerticalFields, VerticalGrid};

/// Running barotropic averages accumulated over one fast cycle.
#[derive(Clone, Debug)]
pub struct FastAverages {
    /// Averaged free surface
    pub zt_avg1: Field,
    /// Averaged x-transport, primary weights
    pub du_avg1: Field,
    /// Averaged x-transport, secondary weights
    pub du_avg2: Field,
    pub dv_avg1: Field,
    pub dv_avg2: Field,
}

impl FastAverages {
    pub fn zeros(slab: IndexBox) -> Self {
        Self {
            zt_avg1: Field::new(slab, 1),
            du_avg1: Field::new(slab, 1),
            du_avg2: Field::new(slab, 1),
            dv_avg1: Field::new(slab, 1),
            dv_avg2: Field::new(slab, 1),
        }
    }
}

/// Owner of the grid description and all model fields.
#[derive(Clone, Debug)]
pub struct OceanState {
    pub geom: Geometry,
    pub metrics: GridMetrics,
    pub mask: LandMask,
    pub boundary: BoundaryEngine,
    pub vgrid: VerticalGrid,
    pub vert: VerticalFields,
    pub eos: LinearEos,

    pub u: Field,
    pub v: Field,
    pub tracers: [Field; 2],
    pub rho: Field,
    pub huon: Field,
    pub hvom: Field,
    pub w: Field,

    pub ru: Field,
    pub rv: Field,
    pub rufrc: Field,
    pub rvfrc: Field,
    pub ru_hist: Field,
    pub rv_hist: Field,

    pub zeta: Field,
    pub ubar: Field,
    pub vbar: Field,
    pub rzeta: Field,
    pub rubar: Field,
    pub rvbar: Field,
    pub averages: FastAverages,
    pub stress: StressFields,

    /// Baroclinic step counter
    pub iic: usize,
    /// Step the run started at
    pub ntfirst: usize,
    /// Model time (s)
    pub time: f64,
    halo: i32,
}

impl OceanState {
    /// Allocate every field and load the initial data.
    ///
    /// Initial velocities and tracers must cover the domain (faces included
    /// for velocities); anything they cover beyond it is kept as ghost
    /// values. The barotropic velocities start as the depth average of the
    /// 3D ones.
    pub fn from_initial_data(config: &OceanConfig, geom: Geometry, data: InitialData) -> Result<Self> {
        config.validate()?;
        data.validate()?;
        let InitialData {
            bathymetry,
            metrics,
            land_mask,
            u,
            v,
            tracers,
            zeta,
            stress,
            boundary,
            ..
        } = data;

        let halo = config.halo;
        let domain = geom.domain();
        let n_levels = domain.length(Direction::Z);
        if config.use_prsgrd && n_levels < 2 {
            return Err(OceanError::InvalidConfig(format!(
                "pressure gradient needs at least two levels, domain {} has {}",
                domain, n_levels
            )));
        }
        let cells = geom.field_box(halo);
        let slab = geom.slab_box(halo);
        let w_box = geom.w_box(halo);
        let k0 = domain.small_end(Direction::Z);

        let mut metrics = match metrics {
            Some(m) => {
                m.pm.require("pm", &slab)?;
                m
            }
            None => GridMetrics::uniform(&geom, halo, 0.0),
        };
        if let Some(h) = bathymetry {
            metrics = metrics.with_bathymetry(h)?;
        }
        metrics.h.require("bathymetry", &slab)?;
        if let Some(params) = &config.coriolis {
            metrics.set_coriolis(&geom, params);
        }

        let mask = match land_mask {
            Some(rho) => {
                rho.require("land mask", &slab)?;
                LandMask::from_rho(rho)
            }
            None => LandMask::all_wet(&metrics.h),
        };

        let stress = match stress {
            Some(s) => {
                for (what, f) in [
                    ("surface x-stress", &s.sustr),
                    ("surface y-stress", &s.svstr),
                    ("bottom x-stress", &s.bustr),
                    ("bottom y-stress", &s.bvstr),
                ] {
                    f.require(what, &slab)?;
                }
                s
            }
            None => StressFields::zeros(slab),
        };

        // validated above
        let (u_in, v_in, t_in) = match (u, v, tracers) {
            (Some(u), Some(v), Some(t)) => (u, v, t),
            _ => return Err(OceanError::MissingInput("initial velocity and tracers".into())),
        };
        let n_tracers = t_in.ncomp();

        let mut u = Field::new(cells, 2);
        let mut v = Field::new(cells, 2);
        for n in 0..2 {
            load("initial x-velocity", &mut u, n, &u_in, 0, &domain.surrounding_nodes(Direction::X))?;
            load("initial y-velocity", &mut v, n, &v_in, 0, &domain.surrounding_nodes(Direction::Y))?;
            mask.apply(&mut u, n, Staggering::XFace);
            mask.apply(&mut v, n, Staggering::YFace);
        }
        let mut tracer_level = Field::new(cells, n_tracers);
        for n in 0..n_tracers {
            load("initial tracers", &mut tracer_level, n, &t_in, n, &domain)?;
            mask.apply(&mut tracer_level, n, Staggering::Cell);
        }

        let mut zeta_slots = Field::new(slab, 3);
        if let Some(z) = zeta {
            let required = domain.make_slab(Direction::Z, k0);
            for n in 0..3 {
                load("initial free surface", &mut zeta_slots, n, &z, 0, &required)?;
            }
        }

        let exec = Executor::best();
        let boundary = BoundaryEngine::new(geom.clone(), boundary.unwrap_or_default()).with_executor(exec);
        let eos = LinearEos::default();
        let mut rho = Field::new(cells, 1);
        eos.compute_density(exec, &cells, &tracer_level, &mut rho)?;

        let mut state = Self {
            vgrid: VerticalGrid::new(n_levels, config.stretching.as_stretching()),
            vert: VerticalFields::new(cells, w_box),
            eos,
            u,
            v,
            tracers: [tracer_level.clone(), tracer_level],
            rho,
            huon: Field::new(cells, 1),
            hvom: Field::new(cells, 1),
            w: Field::new(w_box, 1),
            ru: Field::new(cells, 2),
            rv: Field::new(cells, 2),
            rufrc: Field::new(slab, 1),
            rvfrc: Field::new(slab, 1),
            ru_hist: Field::new(slab, 2),
            rv_hist: Field::new(slab, 2),
            zeta: zeta_slots,
            ubar: Field::new(slab, 3),
            vbar: Field::new(slab, 3),
            rzeta: Field::new(slab, 2),
            rubar: Field::new(slab, 2),
            rvbar: Field::new(slab, 2),
            averages: FastAverages::zeros(slab),
            stress,
            iic: 0,
            ntfirst: 0,
            time: 0.0,
            halo,
            geom,
            metrics,
            mask,
            boundary,
        };

        for n in 0..3 {
            state.fill_barotropic_ghosts(n)?;
        }
        state.update_vertical(exec, 0)?;
        state.init_depth_averages(exec)?;
        for n in 0..3 {
            state.fill_barotropic_ghosts(n)?;
        }

        debug!(
            n_levels,
            n_tracers,
            wet = state.mask.n_wet(),
            "ocean state initialised"
        );
        Ok(state)
    }

    /// Ghost width of every field.
    #[inline]
    pub fn halo(&self) -> i32 {
        self.halo
    }

    #[inline]
    pub fn n_levels(&self) -> usize {
        self.vgrid.n_levels()
    }

    #[inline]
    pub fn n_tracers(&self) -> usize {
        self.tracers[0].ncomp()
    }

    /// 3D allocation box.
    pub fn cell_box(&self) -> IndexBox {
        self.geom.field_box(self.halo)
    }

    /// Depth-integrated allocation box.
    pub fn slab_box(&self) -> IndexBox {
        self.geom.slab_box(self.halo)
    }

    /// Slots of the current baroclinic step.
    pub fn slow_slots(&self) -> SlowSlots {
        SlowSlots::new(self.iic, self.ntfirst)
    }

    /// Recompute `z_r`, `z_w` and `Hz` over the whole 3D box from the free
    /// surface in `zeta[zeta_comp]`.
    pub fn update_vertical(&mut self, exec: Executor, zeta_comp: usize) -> Result<()> {
        let cells = self.cell_box();
        self.vgrid
            .update(exec, &cells, &self.metrics.h, &self.zeta, zeta_comp, &mut self.vert)
    }

    /// Water volume `Σ (ζ + h) / (pm·pn)` over the wet domain cells.
    pub fn total_volume(&self, zeta_comp: usize) -> f64 {
        let k0 = self.slab_box().small_end(Direction::Z);
        let domain = self.geom.domain().make_slab(Direction::Z, k0);
        domain
            .iter()
            .map(|(i, j, k)| {
                let depth = self.zeta.get(i, j, k, zeta_comp) + self.metrics.h.get(i, j, k, 0);
                let area = 1.0 / (self.metrics.pm.get(i, j, k, 0) * self.metrics.pn.get(i, j, k, 0));
                depth * area * self.mask.value(i, j, Staggering::Cell)
            })
            .sum()
    }

    /// Fill the ghosts of slot `n` of the barotropic fields from the values
    /// they hold now.
    fn fill_barotropic_ghosts(&mut self, n: usize) -> Result<()> {
        let ghosts = Ghosts {
            engine: &self.boundary,
            mask: &self.mask,
        };
        for (field, var, stagger) in [
            (&mut self.zeta, BcVar::Zeta, Staggering::Cell),
            (&mut self.ubar, BcVar::Ubar, Staggering::XFace),
            (&mut self.vbar, BcVar::Vbar, Staggering::YFace),
        ] {
            let reference = field.clone();
            ghosts.fill(field, n, var, stagger, &reference, n)?;
        }
        Ok(())
    }

    /// `ubar`, `vbar` in every slot from the thickness-weighted column mean
    /// of the 3D velocity at level 0.
    fn init_depth_averages(&mut self, exec: Executor) -> Result<()> {
        let k0 = self.slab_box().small_end(Direction::Z);
        let domain = self.geom.domain();
        let hz = &self.vert.hz;
        for (dir, vel, bar) in [
            (Direction::X, &self.u, &mut self.ubar),
            (Direction::Y, &self.v, &mut self.vbar),
        ] {
            let faces = domain.surrounding_nodes(dir);
            let (k_lo, k_hi) = (faces.small_end(Direction::Z), faces.big_end(Direction::Z));
            let face_slab = faces.make_slab(Direction::Z, k0);
            let (di, dj) = match dir {
                Direction::X => (1, 0),
                _ => (0, 1),
            };
            let values = exec.map_box(&face_slab, |i, j, _| {
                let mut depth = 0.0;
                let mut transport = 0.0;
                for k in k_lo..=k_hi {
                    let dc = 0.5 * (hz.get(i, j, k, 0) + hz.get(i - di, j - dj, k, 0));
                    depth += dc;
                    transport += dc * vel.get(i, j, k, 0);
                }
                if depth > 0.0 {
                    transport / depth
                } else {
                    0.0
                }
            });
            for n in 0..3 {
                bar.assign(&face_slab, n, &values);
            }
        }
        for n in 0..3 {
            self.mask.apply(&mut self.ubar, n, Staggering::XFace);
            self.mask.apply(&mut self.vbar, n, Staggering::YFace);
        }
        Ok(())
    }
}

/// Physical-boundary fill followed by periodic wraparound.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Ghosts<'a> {
    pub engine: &'a BoundaryEngine,
    pub mask: &'a LandMask,
}

impl Ghosts<'_> {
    /// Fill every ghost of `field[comp]`; `reference[ref_comp]` holds the
    /// previous-time values.
    pub fn fill(
        &self,
        field: &mut Field,
        comp: usize,
        var: BcVar,
        stagger: Staggering,
        reference: &Field,
        ref_comp: usize,
    ) -> Result<()> {
        let bx = field.bx();
        let req = FillRequest {
            comp,
            var,
            stagger,
            mask: self.mask.for_staggering(stagger),
            reference,
            ref_comp,
        };
        self.engine.impose(field, &bx, &req)?;
        self.engine.geometry().periodic_fill(field);
        Ok(())
    }
}

/// Copy `src[src_comp]` into `dst[dst_comp]` wherever both exist; `src` must
/// cover `required`.
fn load(
    what: &'static str,
    dst: &mut Field,
    dst_comp: usize,
    src: &Field,
    src_comp: usize,
    required: &IndexBox,
) -> Result<()> {
    src.require(what, required)?;
    src.require_comp(what, src_comp)?;
    let bx = src.bx().intersect(&dst.bx());
    dst.copy_region(src, src_comp, dst_comp, &bx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryTable;

    const TOL: f64 = 1e-10;

    fn setup(geom: &Geometry) -> InitialData {
        let cells = geom.field_box(2);
        InitialData::new()
            .with_bathymetry(Field::from_fn(geom.slab_box(2), 1, |i, _, _| {
                40.0 + i as f64
            }))
            .with_velocity(
                Field::from_fn(cells, 1, |_, _, k| 0.1 * (k + 1) as f64),
                Field::new(cells, 1),
            )
            .with_tracers(Field::from_fn(cells, 2, |_, _, k| 10.0 + k as f64))
    }

    #[test]
    fn test_allocation_and_slots() {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [5, 4, 2]), [500.0, 500.0, 1.0]);
        let state =
            OceanState::from_initial_data(&OceanConfig::new(30.0, 10), geom.clone(), setup(&geom))
                .unwrap();

        assert_eq!(state.u.ncomp(), 2);
        assert_eq!(state.zeta.ncomp(), 3);
        assert_eq!(state.rubar.ncomp(), 2);
        assert_eq!(state.n_tracers(), 2);
        assert_eq!(state.w.bx(), geom.w_box(2));
        assert_eq!(state.slow_slots(), SlowSlots::new(0, 0));
        assert!((state.tracers[1].get(2, 2, 2, 0) - 12.0).abs() < TOL);
    }

    #[test]
    fn test_barotropic_velocity_is_column_mean() {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [5, 4, 2]), [500.0, 500.0, 1.0]);
        let state =
            OceanState::from_initial_data(&OceanConfig::new(30.0, 10), geom.clone(), setup(&geom))
                .unwrap();

        // uniform stretching: equal layers, mean of 0.1, 0.2, 0.3
        for n in 0..3 {
            assert!((state.ubar.get(3, 2, 0, n) - 0.2).abs() < TOL, "slot {}", n);
        }
        assert_eq!(state.vbar.get(3, 2, 0, 0), 0.0);
    }

    #[test]
    fn test_land_is_masked_on_load() {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [5, 4, 2]), [500.0, 500.0, 1.0]);
        let rho_mask = Field::from_fn(geom.slab_box(2), 1, |i, _, _| if i == 3 { 0.0 } else { 1.0 });
        let data = setup(&geom).with_land_mask(rho_mask);
        let state = OceanState::from_initial_data(&OceanConfig::new(30.0, 10), geom, data).unwrap();

        assert_eq!(state.tracers[0].get(3, 1, 1, 0), 0.0);
        assert_eq!(state.u.get(3, 1, 1, 0), 0.0, "face touching land");
        assert_eq!(state.u.get(4, 1, 1, 1), 0.0);
        assert!(state.u.get(2, 1, 1, 0) > 0.0);
        assert_eq!(state.ubar.get(4, 1, 0, 2), 0.0);
    }

    #[test]
    fn test_rejects_missing_and_short_inputs() {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [5, 4, 2]), [500.0, 500.0, 1.0]);
        let mut data = setup(&geom);
        data.u = None;
        assert!(matches!(
            OceanState::from_initial_data(&OceanConfig::new(30.0, 10), geom.clone(), data),
            Err(OceanError::MissingInput(_))
        ));

        let short = IndexBox::new([0, 0, 0], [3, 3, 2]);
        let data = setup(&geom).with_tracers(Field::new(short, 1));
        assert!(matches!(
            OceanState::from_initial_data(&OceanConfig::new(30.0, 10), geom.clone(), data),
            Err(OceanError::BoxMismatch { .. })
        ));

        let data = setup(&geom).with_boundary_forcing(true);
        assert!(OceanState::from_initial_data(&OceanConfig::new(30.0, 10), geom.clone(), data).is_err());
        let data = setup(&geom)
            .with_boundary_forcing(true)
            .with_boundary(BoundaryTable::new());
        assert!(OceanState::from_initial_data(&OceanConfig::new(30.0, 10), geom, data).is_ok());
    }

    #[test]
    fn test_single_level_needs_prsgrd_off() {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [3, 3, 0]), [500.0, 500.0, 1.0]);
        let config = OceanConfig::new(30.0, 10);
        assert!(OceanState::from_initial_data(&config, geom.clone(), setup(&geom)).is_err());
        let config = config.with_prsgrd(false);
        assert!(OceanState::from_initial_data(&config, geom.clone(), setup(&geom)).is_ok());
    }

    #[test]
    fn test_volume() {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [3, 3, 1]), [10.0, 20.0, 1.0]);
        let cells = geom.field_box(2);
        let data = InitialData::new()
            .with_bathymetry(Field::filled(geom.slab_box(2), 1, 5.0))
            .with_velocity(Field::new(cells, 1), Field::new(cells, 1))
            .with_tracers(Field::new(cells, 1))
            .with_free_surface(Field::filled(geom.slab_box(2), 1, 1.0));
        let state = OceanState::from_initial_data(&OceanConfig::new(30.0, 10), geom, data).unwrap();
        assert!((state.total_volume(2) - 16.0 * 6.0 * 200.0).abs() < 1e-8);
    }
}
