//! Second-level kernels: fold the carry buffer into y.
//!
//! Carry slots are ordered by lane-group, so slots sharing a row are
//! contiguous. All three folds give the same result up to summation order.

use crate::carry::CarryPair;
use crate::segreduce::segreduce_block;
use crate::util::{i64_to_usize, SENTINEL_ROW};

/// Segmented fold with one cooperating block of `block_size` lanes.
///
/// A run that straddles two chunks is accumulated once per chunk, which is
/// still exact because every write is `+=`. The final partial chunk is padded
/// with sentinel rows, and the guard slot at `block_size` is a sentinel, so
/// the last real lane of a chunk always sees a row change.
pub fn spmv_coo_reduce_update(carries: &[CarryPair], block_size: usize, y: &mut [f64]) {
    debug_assert!(block_size.is_power_of_two());
    let mut rows = vec![SENTINEL_ROW; block_size + 1];
    let mut vals = vec![0.0f64; block_size + 1];
    let mut left = vec![0.0f64; block_size];

    for chunk in carries.chunks(block_size) {
        let n = chunk.len();
        for (k, c) in chunk.iter().enumerate() {
            rows[k] = c.row;
            vals[k] = c.sum;
        }
        rows[n..block_size].fill(SENTINEL_ROW);
        vals[n..block_size].fill(0.0);

        segreduce_block(&rows[..block_size], &mut vals[..block_size], &mut left);

        for i in 0..n {
            if rows[i] != rows[i + 1] {
                y[i64_to_usize(rows[i])] += vals[i];
            }
        }
    }
}

/// Unmerged fold: one accumulate per slot.
pub fn spmv_coo_scatter_update(carries: &[CarryPair], y: &mut [f64]) {
    for c in carries {
        y[i64_to_usize(c.row)] += c.sum;
    }
}

/// Coalesce equal adjacent rows on the host, then scatter the unique rows.
pub fn spmv_coo_host_update(carries: &[CarryPair], y: &mut [f64]) {
    let mut host = carries.to_vec();
    let unique = coalesce(&mut host);
    spmv_coo_scatter_update(&host[..unique], y);
}

/// Merge runs of equal rows in place; returns the number of unique rows kept
/// at the front.
fn coalesce(pairs: &mut [CarryPair]) -> usize {
    if pairs.is_empty() {
        return 0;
    }
    let mut unique = 0usize;
    for start in 1..pairs.len() {
        if pairs[unique].row == pairs[start].row {
            pairs[unique].sum += pairs[start].sum;
        } else {
            unique += 1;
            pairs[unique] = pairs[start];
        }
    }
    unique + 1
}
