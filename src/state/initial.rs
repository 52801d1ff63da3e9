//! Initial and static inputs supplied by the caller.

use crate::boundary::BoundaryTable;
use crate::error::{OceanError, Result};
use crate::field::{Field, GridMetrics};
use crate::rhs::StressFields;

/// Initial state, grid inputs and boundary description.
///
/// Bathymetry, both velocity components and the tracers are required; the
/// free surface defaults to rest, the mask to all-wet, the metrics to
/// uniform spacing from the geometry and the stresses to zero. When the run
/// is forced through its open boundaries a boundary table must be given too.
///
/// # Example
///
/// ```
/// use ocean_split::field::{Field, Geometry};
/// use ocean_split::state::InitialData;
/// use ocean_split::types::IndexBox;
///
/// let geom = Geometry::new(IndexBox::new([0, 0, 0], [7, 7, 3]), [1000.0, 1000.0, 1.0]);
/// let data = InitialData::new()
///     .with_bathymetry(Field::filled(geom.slab_box(2), 1, 50.0))
///     .with_velocity(Field::new(geom.field_box(2), 1), Field::new(geom.field_box(2), 1))
///     .with_tracers(Field::filled(geom.field_box(2), 2, 14.0));
/// assert!(data.validate().is_ok());
/// assert!(data.with_boundary_forcing(true).validate().is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct InitialData {
    pub bathymetry: Option<Field>,
    pub metrics: Option<GridMetrics>,
    /// Rho-point 0/1 mask
    pub land_mask: Option<Field>,
    pub u: Option<Field>,
    pub v: Option<Field>,
    /// Temperature, salinity, then passive scalars
    pub tracers: Option<Field>,
    pub zeta: Option<Field>,
    pub stress: Option<StressFields>,
    pub boundary: Option<BoundaryTable>,
    /// Open boundaries are forced from external data
    pub boundary_forcing: bool,
}

impl InitialData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bathymetry(mut self, h: Field) -> Self {
        self.bathymetry = Some(h);
        self
    }

    /// Non-uniform metric factors. Their bathymetry is replaced by
    /// [`with_bathymetry`](Self::with_bathymetry) if both are given.
    pub fn with_metrics(mut self, metrics: GridMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_land_mask(mut self, rho_mask: Field) -> Self {
        self.land_mask = Some(rho_mask);
        self
    }

    pub fn with_velocity(mut self, u: Field, v: Field) -> Self {
        self.u = Some(u);
        self.v = Some(v);
        self
    }

    pub fn with_tracers(mut self, tracers: Field) -> Self {
        self.tracers = Some(tracers);
        self
    }

    pub fn with_free_surface(mut self, zeta: Field) -> Self {
        self.zeta = Some(zeta);
        self
    }

    pub fn with_stress(mut self, stress: StressFields) -> Self {
        self.stress = Some(stress);
        self
    }

    pub fn with_boundary(mut self, table: BoundaryTable) -> Self {
        self.boundary = Some(table);
        self
    }

    pub fn with_boundary_forcing(mut self, on: bool) -> Self {
        self.boundary_forcing = on;
        self
    }

    /// Check that every required input is present.
    pub fn validate(&self) -> Result<()> {
        let missing = |what: &str| Err(OceanError::MissingInput(what.to_string()));
        if self.bathymetry.is_none() && self.metrics.is_none() {
            return missing("bathymetry");
        }
        if self.u.is_none() {
            return missing("initial x-velocity");
        }
        if self.v.is_none() {
            return missing("initial y-velocity");
        }
        match &self.tracers {
            None => return missing("initial tracers"),
            Some(t) if t.ncomp() == 0 => return missing("initial temperature"),
            Some(_) => {}
        }
        if self.boundary_forcing && self.boundary.is_none() {
            return missing("boundary data for open-boundary forcing");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndexBox;

    fn complete() -> InitialData {
        let bx = IndexBox::new([0, 0, 0], [3, 3, 1]);
        InitialData::new()
            .with_bathymetry(Field::filled(bx.make_slab(crate::types::Direction::Z, 0), 1, 10.0))
            .with_velocity(Field::new(bx, 1), Field::new(bx, 1))
            .with_tracers(Field::new(bx, 1))
    }

    #[test]
    fn test_complete_inputs() {
        assert!(complete().validate().is_ok());
        assert!(complete()
            .with_boundary_forcing(true)
            .with_boundary(BoundaryTable::new())
            .validate()
            .is_ok());
    }

    #[test]
    fn test_missing_inputs() {
        let mut data = complete();
        data.tracers = None;
        assert_eq!(
            data.validate().unwrap_err(),
            OceanError::MissingInput("initial tracers".into())
        );

        let mut data = complete();
        data.bathymetry = None;
        assert!(matches!(data.validate(), Err(OceanError::MissingInput(_))));

        let err = complete().with_boundary_forcing(true).validate().unwrap_err();
        assert!(err.to_string().contains("boundary data"), "{}", err);
    }
}
