//! Shared view of y for the concurrent first-level kernels.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// `y` handed to every block task of one launch.
///
/// Rows finished inside one lane-group interval belong to that lane-group
/// alone and take [`SharedY::add`]. Rows that two lane-groups may both touch
/// go through [`SharedY::atomic_add`].
pub(crate) struct SharedY<'a> {
    ptr: *mut f64,
    len: usize,
    _marker: PhantomData<&'a mut [f64]>,
}

unsafe impl Send for SharedY<'_> {}
unsafe impl Sync for SharedY<'_> {}

impl<'a> SharedY<'a> {
    pub(crate) fn new(y: &'a mut [f64]) -> Self {
        assert_eq!(
            y.as_ptr().align_offset(std::mem::align_of::<AtomicU64>()),
            0,
            "y must be aligned for 64-bit atomics"
        );
        Self {
            ptr: y.as_mut_ptr(),
            len: y.len(),
            _marker: PhantomData,
        }
    }

    /// Plain `y[row] += v`.
    ///
    /// # Safety
    /// No other task may access `y[row]` for the duration of the launch.
    #[inline]
    pub(crate) unsafe fn add(&self, row: usize, v: f64) {
        assert!(row < self.len, "row {row} out of range for y of length {}", self.len);
        *self.ptr.add(row) += v;
    }

    /// `y[row] += v` as a compare-and-swap loop on the bit pattern.
    #[inline]
    pub(crate) fn atomic_add(&self, row: usize, v: f64) {
        assert!(row < self.len, "row {row} out of range for y of length {}", self.len);
        // in bounds and aligned (checked in `new`); every concurrent access to
        // this row is atomic
        let cell = unsafe { AtomicU64::from_ptr(self.ptr.add(row).cast::<u64>()) };
        let mut cur = cell.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(cur) + v).to_bits();
            match cell.compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return,
                Err(seen) => cur = seen,
            }
        }
    }
}
