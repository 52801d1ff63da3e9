//! Data-parallel map over index boxes.
//!
//! Every per-cell kernel is a closure of `(i, j, k)` evaluated over an
//! [`IndexBox`]. The closure reads its inputs and returns the new value of
//! its own output cell; results are gathered into a buffer and scattered
//! only after the whole map has completed, so a map never observes its own
//! writes. Successive maps are ordered by the caller: returning from a map is
//! the barrier.
//!
//! Column recurrences (the top-down pressure integration) go through
//! [`Executor::map_columns`]: the closure owns one `(i, j)` column and loops
//! over k sequentially, columns are independent.
//!
//! # Back-ends
//!
//! | Variant | Dispatch |
//! |---------|----------|
//! | [`Executor::Serial`] | plain loops |
//! | `Executor::Threaded` | rayon work-stealing pool (`parallel` feature) |
//!
//! # Example
//!
//! ```
//! use ocean_split::exec::Executor;
//! use ocean_split::field::Field;
//! use ocean_split::types::IndexBox;
//!
//! let bx = IndexBox::new([0, 0, 0], [3, 3, 1]);
//! let a = Field::from_fn(bx, 1, |i, j, k| (i + j + k) as f64);
//! let mut b = Field::new(bx, 1);
//!
//! let exec = Executor::default();
//! exec.fill(&mut b, 0, &bx, |i, j, k| 2.0 * a.get(i, j, k, 0));
//! assert_eq!(b.get(3, 3, 1, 0), 14.0);
//! ```

use crate::field::{Field, ScratchPool};
use crate::types::{Direction, IndexBox};

/// Execution target plus the scratch pool kernels draw temporaries from.
#[derive(Clone, Copy, Debug)]
pub struct KernelContext<'a> {
    pub exec: Executor,
    pub pool: &'a ScratchPool,
}

impl<'a> KernelContext<'a> {
    pub fn new(exec: Executor, pool: &'a ScratchPool) -> Self {
        Self { exec, pool }
    }
}

/// Execution target for box maps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Executor {
    #[default]
    Serial,
    #[cfg(feature = "parallel")]
    Threaded,
}

impl Executor {
    /// Best available back-end for this build.
    pub fn best() -> Self {
        #[cfg(feature = "parallel")]
        {
            Executor::Threaded
        }
        #[cfg(not(feature = "parallel"))]
        {
            Executor::Serial
        }
    }

    /// Evaluate `f` at every point of `bx`, results in `bx` iteration order.
    pub fn map_box<F>(&self, bx: &IndexBox, f: F) -> Vec<f64>
    where
        F: Fn(i32, i32, i32) -> f64 + Send + Sync,
    {
        match self {
            Executor::Serial => bx.iter().map(|(i, j, k)| f(i, j, k)).collect(),
            #[cfg(feature = "parallel")]
            Executor::Threaded => map_box_parallel(bx, &f),
        }
    }

    /// Map then scatter into component `n` of `out` over `bx`.
    pub fn fill<F>(&self, out: &mut Field, n: usize, bx: &IndexBox, f: F)
    where
        F: Fn(i32, i32, i32) -> f64 + Send + Sync,
    {
        let values = self.map_box(bx, f);
        out.assign(bx, n, &values);
    }

    /// Evaluate a column closure at every `(i, j)` of `bx`; each call returns
    /// the column values for `k` over `bx`'s vertical range.
    pub fn map_columns<F>(&self, bx: &IndexBox, f: F) -> Vec<Vec<f64>>
    where
        F: Fn(i32, i32) -> Vec<f64> + Send + Sync,
    {
        let slab = bx.make_slab(Direction::Z, bx.small_end(Direction::Z));
        match self {
            Executor::Serial => slab.iter().map(|(i, j, _)| f(i, j)).collect(),
            #[cfg(feature = "parallel")]
            Executor::Threaded => {
                use rayon::prelude::*;

                (0..slab.num_pts())
                    .into_par_iter()
                    .map(|p| {
                        let (i, j, _) = slab.point(p);
                        f(i, j)
                    })
                    .collect()
            }
        }
    }

    /// Column map scattered into component `n` of `out`.
    pub fn fill_columns<F>(&self, out: &mut Field, n: usize, bx: &IndexBox, f: F)
    where
        F: Fn(i32, i32) -> Vec<f64> + Send + Sync,
    {
        let k_lo = bx.small_end(Direction::Z);
        let slab = bx.make_slab(Direction::Z, k_lo);
        let columns = self.map_columns(bx, f);
        for ((i, j, _), column) in slab.iter().zip(columns.iter()) {
            out.assign_column(i, j, n, k_lo, column);
        }
    }
}

#[cfg(feature = "parallel")]
fn map_box_parallel<F>(bx: &IndexBox, f: &F) -> Vec<f64>
where
    F: Fn(i32, i32, i32) -> f64 + Send + Sync,
{
    use rayon::prelude::*;

    let nx = bx.length(Direction::X);
    let mut out = vec![0.0; bx.num_pts()];
    if nx == 0 {
        return out;
    }

    // one chunk per (j, k) row
    out.par_chunks_mut(nx)
        .enumerate()
        .for_each(|(row, chunk)| {
            let (_, j, k) = bx.point(row * nx);
            for (di, v) in chunk.iter_mut().enumerate() {
                *v = f(bx.small_end(Direction::X) + di as i32, j, k);
            }
        });
    out
}
