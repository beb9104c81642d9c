//! Launch constants and index conversions shared by the flat kernels
//
// The constants describe the emulated parallel grid: lane-group width, the
// thread budget a launch may occupy, and the per-strategy block shapes.

/// Width of one lane-group (warp)
pub const WARP_SIZE: usize = 32;
/// Upper bound on concurrently resident lanes for one launch
pub const MAX_THREADS: usize = 30 * 1024;

/// Lanes per block for the buffered two-level kernel
pub const BUFFERED_BLOCK_SIZE: usize = 256;
/// Block budget for the buffered two-level kernel
pub const BUFFERED_MAX_BLOCKS: usize = MAX_THREADS / (2 * BUFFERED_BLOCK_SIZE);

/// Lanes per block for the atomic single-level kernel
pub const ATOMIC_BLOCK_SIZE: usize = 128;
/// Block budget for the atomic kernel (empirically better with more, smaller blocks)
pub const ATOMIC_MAX_BLOCKS: usize = 4 * MAX_THREADS / ATOMIC_BLOCK_SIZE;

/// Lanes of the single cooperating block that folds the carry buffer
pub const MERGE_BLOCK_SIZE: usize = 512;

/// Row id stored in padding and guard slots; never a real row.
pub const SENTINEL_ROW: i64 = -1;

/// Convert i64 to usize, asserting non-negativity.
#[inline]
#[must_use]
pub fn i64_to_usize(x: i64) -> usize {
    debug_assert!(x >= 0, "value must be non-negative");
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    {
        x as usize
    }
}

/// `ceil(x / y)` for launch arithmetic.
#[inline]
#[must_use]
pub const fn divide_into(x: usize, y: usize) -> usize {
    x.div_ceil(y)
}
