//! Segmented reductions over (row id, value) lanes.
//!
//! Both reductions leave at lane `i` the inclusive running sum of the row-run
//! that contains `i`, so the last lane of every run holds the run total. They
//! assume row ids are non-decreasing across lanes, which makes
//! `idx[i] == idx[i - offset]` imply that every lane in between shares the row.

use rayon::prelude::*;

/// Smallest slice of block lanes handed to one rayon job per phase.
const LANES_PER_JOB: usize = 64;

/// Lockstep reduction for one lane-group.
///
/// Offsets 1, 2, 4, ... up to half the group width. Within one step every lane
/// must see its neighbour's value from before the step; walking lanes from the
/// top down gives exactly that without a second buffer.
#[inline]
pub fn segreduce_warp(idx: &[i64], val: &mut [f64]) {
    debug_assert_eq!(idx.len(), val.len());
    let width = val.len();
    let mut offset = 1usize;
    while offset < width {
        for lane in (offset..width).rev() {
            if idx[lane] == idx[lane - offset] {
                val[lane] += val[lane - offset];
            }
        }
        offset <<= 1;
    }
}

/// Barrier-synchronized reduction for one cooperating block.
///
/// Each step gathers the gated left neighbours into `left` in one parallel
/// pass, then adds them in a second pass. The join between the passes is the
/// barrier: no lane writes before every lane has read.
pub fn segreduce_block(rows: &[i64], vals: &mut [f64], left: &mut [f64]) {
    let block = vals.len();
    debug_assert_eq!(rows.len(), block);
    debug_assert_eq!(left.len(), block);
    let mut offset = 1usize;
    while offset < block {
        let prev: &[f64] = vals;
        left.par_iter_mut()
            .enumerate()
            .with_min_len(LANES_PER_JOB)
            .for_each(|(i, l)| {
                *l = if i >= offset && rows[i] == rows[i - offset] {
                    prev[i - offset]
                } else {
                    0.0
                };
            });
        vals.par_iter_mut()
            .zip(left.par_iter())
            .with_min_len(LANES_PER_JOB)
            .for_each(|(v, &l)| *v += l);
        offset <<= 1;
    }
}
