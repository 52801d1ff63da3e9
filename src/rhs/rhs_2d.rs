//! Advection of the depth-integrated momentum.
//!
//! Centred fluxes of `ubar`/`vbar` carried by the barotropic transports
//! `DUon`/`DVom`; the stencil is the second-order form of the 3D advection.

use crate::config::AdvectionScheme;
use crate::error::Result;
use crate::exec::KernelContext;
use crate::field::{Field, Geometry};
use crate::types::{Direction, IndexBox};

use super::advection::Component;

/// Barotropic velocities at slot `krhs` and the transports that carry them.
#[derive(Clone, Copy, Debug)]
pub struct BarotropicAdvection<'a> {
    pub geom: &'a Geometry,
    pub ubar: &'a Field,
    pub vbar: &'a Field,
    pub krhs: usize,
    pub duon: &'a Field,
    pub dvom: &'a Field,
}

/// Subtract the advection of `ubar` over `xbx` from `rhs_ubar` and of `vbar`
/// over `ybx` from `rhs_vbar` (single-slab boxes).
pub fn rhs_2d(
    ctx: KernelContext<'_>,
    xbx: &IndexBox,
    ybx: &IndexBox,
    input: &BarotropicAdvection<'_>,
    rhs_ubar: &mut Field,
    rhs_vbar: &mut Field,
) -> Result<()> {
    let scheme = AdvectionScheme::Centered2;
    let u_part = Component::new(
        Direction::X,
        input.geom,
        input.ubar,
        input.krhs,
        input.duon,
        input.dvom,
    );
    let v_part = Component::new(
        Direction::Y,
        input.geom,
        input.vbar,
        input.krhs,
        input.dvom,
        input.duon,
    );
    u_part.validate(xbx, scheme, rhs_ubar, 0)?;
    v_part.validate(ybx, scheme, rhs_vbar, 0)?;

    u_part.advect_horizontal(ctx, xbx, scheme, rhs_ubar, 0);
    v_part.advect_horizontal(ctx, ybx, scheme, rhs_vbar, 0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::Executor;
    use crate::field::ScratchPool;

    #[test]
    fn test_uniform_transport_of_sheared_flow() {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [6, 6, 3]), [1.0, 1.0, 1.0]);
        let slab = geom.slab_box(2);
        let domain = geom.domain().make_slab(Direction::Z, 0);
        // ubar varies only across the flow: no along-stream flux divergence
        let ubar = Field::from_fn(slab, 3, |_, j, _| j as f64);
        let vbar = Field::new(slab, 3);
        let duon = Field::filled(slab, 1, 4.0);
        let dvom = Field::new(slab, 1);
        let mut rhs_u = Field::filled(slab, 1, 1.5);
        let mut rhs_v = Field::new(slab, 1);
        let pool = ScratchPool::new();

        rhs_2d(
            KernelContext::new(Executor::Serial, &pool),
            &domain.surrounding_nodes(Direction::X),
            &domain.surrounding_nodes(Direction::Y),
            &BarotropicAdvection {
                geom: &geom,
                ubar: &ubar,
                vbar: &vbar,
                krhs: 1,
                duon: &duon,
                dvom: &dvom,
            },
            &mut rhs_u,
            &mut rhs_v,
        )
        .unwrap();

        assert!((rhs_u.get(3, 3, 0, 0) - 1.5).abs() < 1e-12);
        // VFx = ¼·(v + v)·(DUon + DUon) = 0 for v = 0
        assert!(rhs_v.get(3, 3, 0, 0).abs() < 1e-12);
    }

    #[test]
    fn test_converging_transport() {
        let geom = Geometry::new(IndexBox::new([0, 0, 0], [6, 6, 0]), [1.0, 1.0, 1.0]);
        let slab = geom.slab_box(2);
        let domain = geom.domain();
        let ubar = Field::filled(slab, 3, 1.0);
        let vbar = Field::new(slab, 3);
        // DUon = i: UFx(i) = ¼·2·(2i + 1), divergence 1
        let duon = Field::from_fn(slab, 1, |i, _, _| i as f64);
        let dvom = Field::new(slab, 1);
        let mut rhs_u = Field::new(slab, 1);
        let mut rhs_v = Field::new(slab, 1);
        let pool = ScratchPool::new();

        rhs_2d(
            KernelContext::new(Executor::Serial, &pool),
            &domain.surrounding_nodes(Direction::X),
            &domain.surrounding_nodes(Direction::Y),
            &BarotropicAdvection {
                geom: &geom,
                ubar: &ubar,
                vbar: &vbar,
                krhs: 0,
                duon: &duon,
                dvom: &dvom,
            },
            &mut rhs_u,
            &mut rhs_v,
        )
        .unwrap();

        assert!((rhs_u.get(2, 2, 0, 0) + 1.0).abs() < 1e-12);
    }
}
