//! Second-level carry buffer: one (row, partial sum) slot per active lane-group.

use crate::error::{SpmvError, SpmvResult};

/// Open partial sum for the last row a lane-group touched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CarryPair {
    pub row: i64,
    pub sum: f64,
}

impl CarryPair {
    #[inline]
    #[must_use]
    pub const fn new(row: i64, sum: f64) -> Self {
        Self { row, sum }
    }
}

/// Reserve and zero-fill `len` slots.
///
/// Nothing is retried; a failed reservation ends the call before any kernel
/// touches y.
pub fn alloc_carries(len: usize) -> SpmvResult<Vec<CarryPair>> {
    let mut buf = Vec::new();
    if buf.try_reserve_exact(len).is_err() {
        log::warn!("carry buffer reservation of {len} slots failed");
        return Err(SpmvError::CarryAlloc { requested: len });
    }
    buf.resize(len, CarryPair::default());
    Ok(buf)
}
