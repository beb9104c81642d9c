//! Work partitioning for one flat SpMV call.

use crate::config::FlatConfig;
use crate::util::divide_into;

/// Geometry of the first-level launch over `[0, tail)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Launch {
    pub warp_size: usize,
    pub warps_per_block: usize,
    /// Whole lane-group loads in the input.
    pub num_units: usize,
    /// Lane-groups launched, each owning one interval.
    pub num_warps: usize,
    pub num_blocks: usize,
    /// Lane-group loads per interval.
    pub num_iters: usize,
    /// Entries per interval, a multiple of `warp_size`.
    pub interval_size: usize,
    /// End of the partitioned prefix; `[tail, nnz)` goes to the serial reducer.
    pub tail: usize,
    /// Lane-groups whose interval starts before `tail`; one carry slot each.
    pub active_warps: usize,
}

impl Launch {
    /// Entry range of lane-group `warp`, clipped to the partitioned prefix.
    #[inline]
    #[must_use]
    pub fn interval(&self, warp: usize) -> std::ops::Range<usize> {
        let begin = (warp * self.interval_size).min(self.tail);
        let end = (begin + self.interval_size).min(self.tail);
        begin..end
    }
}

/// What one call does, decided from the entry count alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// No entries; y is left untouched.
    Empty,
    /// Fewer entries than one lane-group; serial reducer only.
    Serial,
    Flat(Launch),
}

#[must_use]
pub fn plan(num_entries: usize, cfg: &FlatConfig) -> Route {
    let warp_size = cfg.warp_size;
    if num_entries == 0 {
        return Route::Empty;
    }
    if num_entries < warp_size {
        return Route::Serial;
    }

    let warps_per_block = cfg.warps_per_block();
    let num_units = num_entries / warp_size;
    let num_warps = num_units.min(warps_per_block.saturating_mul(cfg.max_blocks));
    let num_blocks = divide_into(num_warps, warps_per_block);
    let num_iters = divide_into(num_units, num_warps);

    let interval_size = warp_size * num_iters;
    let tail = num_units * warp_size;
    let active_warps = if interval_size == 0 {
        0
    } else {
        divide_into(tail, interval_size)
    };

    Route::Flat(Launch {
        warp_size,
        warps_per_block,
        num_units,
        num_warps,
        num_blocks,
        num_iters,
        interval_size,
        tail,
        active_warps,
    })
}
