//! Pooled scratch fields for per-call temporaries.
//!
//! Flux arrays and other kernel temporaries are acquired from a
//! [`ScratchPool`] and returned automatically when the guard drops, so the
//! buffer never outlives the call that acquired it and repeated steps reuse
//! the same allocations.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use crate::types::IndexBox;

use super::Field;

/// Free-list of scratch buffers keyed by length (box points × components).
#[derive(Debug, Default)]
pub struct ScratchPool {
    free: Mutex<HashMap<usize, Vec<Vec<f64>>>>,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-initialized scratch field over `bx`, returned to the pool on drop.
    pub fn acquire(&self, bx: IndexBox, ncomp: usize) -> ScratchField<'_> {
        let len = bx.num_pts() * ncomp;
        let buf = self
            .free
            .lock()
            .get_mut(&len)
            .and_then(Vec::pop)
            .unwrap_or_default();
        ScratchField {
            pool: self,
            field: Field::from_buffer(bx, ncomp, buf),
        }
    }

    fn release(&self, buf: Vec<f64>) {
        if buf.is_empty() {
            return;
        }
        self.free.lock().entry(buf.len()).or_default().push(buf);
    }

    /// Number of idle buffers held by the pool.
    pub fn idle_buffers(&self) -> usize {
        self.free.lock().values().map(Vec::len).sum()
    }
}

/// Scoped scratch field. Dereferences to [`Field`].
#[derive(Debug)]
pub struct ScratchField<'a> {
    pool: &'a ScratchPool,
    field: Field,
}

impl Deref for ScratchField<'_> {
    type Target = Field;

    fn deref(&self) -> &Field {
        &self.field
    }
}

impl DerefMut for ScratchField<'_> {
    fn deref_mut(&mut self) -> &mut Field {
        &mut self.field
    }
}

impl Drop for ScratchField<'_> {
    fn drop(&mut self) {
        let field = std::mem::take(&mut self.field);
        self.pool.release(field.into_buffer());
    }
}
