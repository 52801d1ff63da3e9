//! Ghost-cell filling at physical domain faces.

use tracing::trace;

use crate::error::Result;
use crate::exec::Executor;
use crate::field::{Field, Geometry};
use crate::types::{Direction, IndexBox, Orientation, Staggering};

use super::radiation::orlanski_blend;
use super::{BcType, BcVar, BoundaryRow, BoundaryTable};

/// Everything the engine needs to know about one fill besides the target.
#[derive(Clone, Copy, Debug)]
pub struct FillRequest<'a> {
    /// Component of the target field to fill.
    pub comp: usize,
    /// Boundary-table row.
    pub var: BcVar,
    /// Where the target's values live.
    pub stagger: Staggering,
    /// Single-slab 0/1 mask at the target's staggering.
    pub mask: &'a Field,
    /// Previous-time values of the same quantity, read by the radiation
    /// condition.
    pub reference: &'a Field,
    pub ref_comp: usize,
}

/// Boundary condition engine: fills the ghost points of a field outside the
/// physical domain from a fixed [`BoundaryTable`].
///
/// Faces are processed in the order x, y, z, then the horizontal corners,
/// each pass completing before the next starts. A horizontal direction is
/// skipped when it is periodic, unless the fill uses the
/// [`BcVar::Foextrap`] row.
#[derive(Clone, Debug)]
pub struct BoundaryEngine {
    geom: Geometry,
    table: BoundaryTable,
    exec: Executor,
}

/// One side of one direction, with the index arithmetic that depends on the
/// field's staggering.
#[derive(Clone, Copy, Debug)]
struct Side {
    dir: Direction,
    ori: Orientation,
    staggered: bool,
    dom_lo: i32,
    dom_hi: i32,
}

impl Side {
    fn new(domain: &IndexBox, ori: Orientation, stagger: Staggering) -> Self {
        let dir = ori.direction();
        Self {
            dir,
            ori,
            staggered: stagger.is_staggered_in(dir),
            dom_lo: domain.small_end(dir),
            dom_hi: domain.big_end(dir),
        }
    }

    /// +1 pointing into the domain from this side.
    #[inline]
    fn inward(&self) -> i32 {
        if self.ori.is_low() {
            1
        } else {
            -1
        }
    }

    /// The point on the boundary face of a staggered field.
    #[inline]
    fn face(&self) -> i32 {
        if self.ori.is_low() {
            self.dom_lo
        } else {
            self.dom_hi + 1
        }
    }

    /// Nearest interior point: first cell, or first face inside the boundary
    /// face for staggered fields.
    #[inline]
    fn first_interior(&self) -> i32 {
        match (self.staggered, self.ori.is_low()) {
            (false, true) => self.dom_lo,
            (false, false) => self.dom_hi,
            (true, true) => self.dom_lo + 1,
            (true, false) => self.dom_hi,
        }
    }

    /// Mirror image of ghost index `x` across the face.
    #[inline]
    fn flip(&self, x: i32) -> i32 {
        match (self.staggered, self.ori.is_low()) {
            (false, true) => self.dom_lo - 1 - x,
            (false, false) => 2 * self.dom_hi + 1 - x,
            (true, true) => self.dom_lo - x,
            (true, false) => 2 * (self.dom_hi + 1) - x,
        }
    }

    /// Ghost points strictly beyond the boundary (beyond the face for
    /// staggered fields).
    fn ghost_strip(&self, bx: &IndexBox) -> IndexBox {
        match (self.staggered, self.ori.is_low()) {
            (_, true) => bx.set_big(self.dir, self.dom_lo - 1),
            (false, false) => bx.set_small(self.dir, self.dom_hi + 1),
            (true, false) => bx.set_small(self.dir, self.dom_hi + 2),
        }
    }

    /// Corner region in this direction: the ghost strip, plus the boundary
    /// face for staggered fields.
    fn corner_strip(&self, bx: &IndexBox) -> IndexBox {
        if self.ori.is_low() {
            let last = if self.staggered { self.dom_lo } else { self.dom_lo - 1 };
            bx.set_big(self.dir, last)
        } else {
            bx.set_small(self.dir, self.dom_hi + 1)
        }
    }
}

#[inline]
fn with_index(p: [i32; 3], dir: Direction, v: i32) -> [i32; 3] {
    let mut q = p;
    q[dir.index()] = v;
    q
}

#[inline]
fn other_horizontal(dir: Direction) -> Direction {
    match dir {
        Direction::X => Direction::Y,
        _ => Direction::X,
    }
}

impl BoundaryEngine {
    pub fn new(geom: Geometry, table: BoundaryTable) -> Self {
        Self {
            geom,
            table,
            exec: Executor::default(),
        }
    }

    pub fn with_executor(mut self, exec: Executor) -> Self {
        self.exec = exec;
        self
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geom
    }

    pub fn table(&self) -> &BoundaryTable {
        &self.table
    }

    /// True if the engine fills faces of `dir` for row `var`.
    pub fn processes(&self, dir: Direction, var: BcVar) -> bool {
        dir == Direction::Z || !self.geom.is_periodic(dir) || var == BcVar::Foextrap
    }

    /// Fill every ghost point of `field` inside `fill_box` that lies outside
    /// the physical domain.
    ///
    /// Returns [`BoxMismatch`](crate::error::OceanError::BoxMismatch) before
    /// touching anything if the target, reference or mask do not cover
    /// `fill_box`.
    pub fn impose(&self, field: &mut Field, fill_box: &IndexBox, req: &FillRequest<'_>) -> Result<()> {
        field.require("boundary target", fill_box)?;
        field.require_comp("boundary target", req.comp)?;
        req.reference.require("boundary reference", fill_box)?;
        req.reference.require_comp("boundary reference", req.ref_comp)?;
        let k_mask = req.mask.bx().small_end(Direction::Z);
        req.mask
            .require("boundary mask", &fill_box.make_slab(Direction::Z, k_mask))?;

        let row = self.table.row(req.var);
        let domain = self.geom.domain();

        for dir in [Direction::X, Direction::Y] {
            if !self.processes(dir, req.var) {
                continue;
            }
            for ori in [Orientation::low(dir), Orientation::high(dir)] {
                let side = Side::new(&domain, ori, req.stagger);
                self.fill_horizontal_side(field, fill_box, req, row, side);
            }
        }

        for ori in [Orientation::ZLo, Orientation::ZHi] {
            let side = Side::new(&domain, ori, Staggering::Cell);
            self.fill_vertical_side(field, fill_box, req, row, side);
        }

        if self.processes(Direction::X, req.var) && self.processes(Direction::Y, req.var) {
            self.fill_corners(field, fill_box, req, row, &domain);
        }
        Ok(())
    }

    fn fill_horizontal_side(
        &self,
        field: &mut Field,
        fill_box: &IndexBox,
        req: &FillRequest<'_>,
        row: &BoundaryRow,
        side: Side,
    ) {
        let bc = row.bc(side.ori);
        if matches!(bc, BcType::IntDir | BcType::Unknown(_)) {
            trace!(face = %side.ori, ?bc, "no boundary fill");
            return;
        }
        trace!(face = %side.ori, ?bc, staggered = side.staggered, "boundary fill");

        let tangent = other_horizontal(side.dir);
        let base = fill_box.grow_lo(tangent, -1).grow_hi(tangent, -1);
        let ext = row.ext_dir[side.ori];
        let k_mask = req.mask.bx().small_end(Direction::Z);
        let n = req.comp;

        // Boundary face of a staggered field: only Dirichlet, extrapolation
        // and radiation touch it.
        if side.staggered && matches!(bc, BcType::ExtDir | BcType::Foextrap | BcType::OrlanskiRad) {
            let face_box = base.make_slab(side.dir, side.face()).intersect(fill_box);
            let dest = &*field;
            let values = self.exec.map_box(&face_box, |i, j, k| {
                let p = [i, j, k];
                let m = req.mask.get(i, j, k_mask, 0);
                match bc {
                    BcType::ExtDir => ext * m,
                    BcType::Foextrap => {
                        let q = with_index(p, side.dir, side.first_interior());
                        dest.get(q[0], q[1], q[2], n) * m
                    }
                    _ => radiate(dest, req, side, tangent, p) * m,
                }
            });
            field.assign(&face_box, n, &values);
        }

        let strip = side.ghost_strip(&base);
        if strip.is_empty() {
            return;
        }
        let dest = &*field;
        let values = self.exec.map_box(&strip, |i, j, k| {
            let p = [i, j, k];
            let m = req.mask.get(i, j, k_mask, 0);
            let x = p[side.dir.index()];
            let read = |v: i32| {
                let q = with_index(p, side.dir, v);
                dest.get(q[0], q[1], q[2], n)
            };
            match bc {
                BcType::ExtDir => ext * m,
                BcType::Foextrap | BcType::Clamped | BcType::OrlanskiRad if side.staggered => {
                    // foextrap skips the boundary face, the others copy it
                    let src = if bc == BcType::Foextrap {
                        side.first_interior()
                    } else {
                        side.face()
                    };
                    read(src) * m
                }
                BcType::Foextrap | BcType::Clamped => read(side.first_interior()) * m,
                BcType::OrlanskiRad => radiate(dest, req, side, tangent, p) * m,
                BcType::ReflectEven => read(side.flip(x)) * m,
                BcType::ReflectOdd => -read(side.flip(x)) * m,
                BcType::IntDir | BcType::Unknown(_) => dest.get(i, j, k, n),
            }
        });
        field.assign(&strip, n, &values);
    }

    fn fill_vertical_side(
        &self,
        field: &mut Field,
        fill_box: &IndexBox,
        req: &FillRequest<'_>,
        row: &BoundaryRow,
        side: Side,
    ) {
        let strip = side.ghost_strip(fill_box);
        if strip.is_empty() {
            return;
        }
        let bc = row.bc(side.ori);
        // vertical faces know only these four
        if !matches!(
            bc,
            BcType::ExtDir | BcType::Foextrap | BcType::ReflectEven | BcType::ReflectOdd
        ) {
            trace!(face = %side.ori, ?bc, "no boundary fill");
            return;
        }
        trace!(face = %side.ori, ?bc, "boundary fill");

        let ext = row.ext_dir[side.ori];
        let k_mask = req.mask.bx().small_end(Direction::Z);
        let n = req.comp;
        let dest = &*field;
        let values = self.exec.map_box(&strip, |i, j, k| {
            let m = req.mask.get(i, j, k_mask, 0);
            match bc {
                BcType::ExtDir => ext * m,
                BcType::Foextrap => dest.get(i, j, side.first_interior(), n) * m,
                BcType::ReflectEven => dest.get(i, j, side.flip(k), n) * m,
                _ => -dest.get(i, j, side.flip(k), n) * m,
            }
        });
        field.assign(&strip, n, &values);
    }

    fn fill_corners(
        &self,
        field: &mut Field,
        fill_box: &IndexBox,
        req: &FillRequest<'_>,
        row: &BoundaryRow,
        domain: &IndexBox,
    ) {
        let k_mask = req.mask.bx().small_end(Direction::Z);
        let n = req.comp;
        for xo in [Orientation::XLo, Orientation::XHi] {
            for yo in [Orientation::YLo, Orientation::YHi] {
                let skip =
                    |bc: BcType| matches!(bc, BcType::Clamped | BcType::IntDir | BcType::Unknown(_));
                if skip(row.bc(xo)) || skip(row.bc(yo)) {
                    continue;
                }
                let xs = Side::new(domain, xo, req.stagger);
                let ys = Side::new(domain, yo, req.stagger);
                let corner = xs.corner_strip(fill_box).intersect(&ys.corner_strip(fill_box));
                if corner.is_empty() {
                    continue;
                }
                let x_src = xs.first_interior();
                let y_src = ys.first_interior();
                let dest = &*field;
                let values = self.exec.map_box(&corner, |i, j, k| {
                    let m = req.mask.get(i, j, k_mask, 0);
                    0.5 * (dest.get(i, y_src, k, n) + dest.get(x_src, j, k, n)) * m
                });
                field.assign(&corner, n, &values);
            }
        }
    }
}

/// Orlanski radiation value at point `p` for the given side.
///
/// `p1` is the first interior point, `p2` the next one inward, and the
/// exterior point just outside `p1` supplies the previous-time value being
/// radiated.
fn radiate(dest: &Field, req: &FillRequest<'_>, side: Side, tangent: Direction, p: [i32; 3]) -> f64 {
    let calc = req.reference;
    let nc = req.ref_comp;
    let n = req.comp;
    let p1 = side.first_interior();
    let at = |v: i32, dt: i32| {
        let q = with_index(p, side.dir, v);
        let t = q[tangent.index()] + dt;
        with_index(q, tangent, t)
    };
    let get = |f: &Field, c: usize, q: [i32; 3]| f.get(q[0], q[1], q[2], c);

    let dvdt = get(calc, nc, at(p1, 0)) - get(dest, n, at(p1, 0));
    let dvdn = get(dest, n, at(p1, 0)) - get(dest, n, at(p1 + side.inward(), 0));
    let backward = get(calc, nc, at(p1, 0)) - get(calc, nc, at(p1, -1));
    let forward = get(calc, nc, at(p1, 1)) - get(calc, nc, at(p1, 0));
    let exterior = get(calc, nc, at(p1 - side.inward(), 0));

    orlanski_blend(dvdt, dvdn, backward, forward, exterior, get(dest, n, at(p1, 0)))
}
