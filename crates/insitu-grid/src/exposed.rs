//! Non-owning views over a [`FieldGrid`](crate::FieldGrid)'s buffers.
//!
//! An external runtime reads (and may write) the very memory the grid
//! owns; nothing is copied. The view mutably borrows the grid, so while
//! any view is alive the grid cannot be refilled, reallocated, or
//! dropped. Dropping the view closes the exclusivity window.

use std::fmt;

use insitu_core::Association;

/// Mutable, non-owning view over one field buffer.
pub struct ExposedBuffer<'a> {
    association: Association,
    values: &'a mut [f64],
}

impl<'a> ExposedBuffer<'a> {
    pub(crate) fn new(association: Association, values: &'a mut [f64]) -> Self {
        Self {
            association,
            values,
        }
    }

    /// Whether this view covers the point or the cell buffer.
    pub fn association(&self) -> Association {
        self.association
    }

    /// Number of values in the buffer.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the buffer holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Address of the first value, for consumers that take pointer + length.
    pub fn as_ptr(&self) -> *const f64 {
        self.values.as_ptr()
    }

    /// Mutable address of the first value.
    pub fn as_mut_ptr(&mut self) -> *mut f64 {
        self.values.as_mut_ptr()
    }

    /// Read access to the live values.
    pub fn as_slice(&self) -> &[f64] {
        self.values
    }

    /// Write access to the live values.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        self.values
    }
}

impl fmt::Debug for ExposedBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposedBuffer")
            .field("association", &self.association)
            .field("len", &self.values.len())
            .finish()
    }
}
