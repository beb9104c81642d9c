#![allow(
    clippy::many_single_char_names,
    reason = "Kernel code follows the I/J/V naming of the coordinate arrays"
)]
//! First-level flat kernels.
//!
//! The partitioned prefix `[0, tail)` is cut into equal intervals, one per
//! lane-group. A lane-group walks its interval one `warp_size` load at a time,
//! reduces each load with [`segreduce_warp`], retires every row that ends
//! inside the load, and keeps the last row open as a carry into the next load.
//! What happens to the carry left at the end of the interval is the only
//! difference between the two kernels.

use crate::cache::XSource;
use crate::carry::CarryPair;
use crate::launch::Launch;
use crate::output::SharedY;
use crate::segreduce::segreduce_warp;
use crate::util::i64_to_usize;
use rayon::prelude::*;
use std::cell::RefCell;
use thread_local::ThreadLocal;
use wide::f64x4;

/// Lane storage of one lane-group. A block task runs its lane-groups one
/// after another, so one of these per worker thread is enough.
struct LaneScratch {
    idx: Vec<i64>,
    val: Vec<f64>,
}

impl LaneScratch {
    fn new(width: usize) -> Self {
        Self {
            idx: vec![0; width],
            val: vec![0.0; width],
        }
    }
}

/// `idx = I[n]`, `val = V[n] * x[J[n]]` for one load.
#[inline]
fn load_lanes<X: XSource + ?Sized>(
    row: &[i64],
    col: &[i64],
    data: &[f64],
    x: &X,
    idx: &mut [i64],
    val: &mut [f64],
) {
    idx.copy_from_slice(row);
    let width = val.len();
    let limit4 = width & !3;
    let mut lane = 0usize;
    while lane < limit4 {
        let v = f64x4::from([data[lane], data[lane + 1], data[lane + 2], data[lane + 3]]);
        let xv = f64x4::from([
            x.fetch(col[lane]),
            x.fetch(col[lane + 1]),
            x.fetch(col[lane + 2]),
            x.fetch(col[lane + 3]),
        ]);
        val[lane..lane + 4].copy_from_slice(&(v * xv).to_array());
        lane += 4;
    }
    while lane < width {
        val[lane] = data[lane] * x.fetch(col[lane]);
        lane += 1;
    }
}

/// Stream one interval through a lane-group.
///
/// `finish(row, sum)` is called for every row-run that ends inside the
/// interval. The returned pair is the run still open at the interval's end.
/// An empty interval does nothing and returns `None`.
#[inline]
fn flat_interval<X, F>(
    row: &[i64],
    col: &[i64],
    data: &[f64],
    x: &X,
    idx: &mut [i64],
    val: &mut [f64],
    mut finish: F,
) -> Option<CarryPair>
where
    X: XSource + ?Sized,
    F: FnMut(i64, f64),
{
    let width = idx.len();
    debug_assert_eq!(row.len() % width, 0, "interval must hold whole loads");
    let &first = row.first()?;
    let last = width - 1;

    let mut carry = CarryPair::new(first, 0.0);
    for ((r, c), d) in row
        .chunks_exact(width)
        .zip(col.chunks_exact(width))
        .zip(data.chunks_exact(width))
    {
        load_lanes(r, c, d, x, idx, val);

        if idx[0] == carry.row {
            val[0] += carry.sum; // row continues into this load
        } else {
            finish(carry.row, carry.sum);
        }

        segreduce_warp(idx, val);

        for lane in 0..last {
            if idx[lane] != idx[lane + 1] {
                finish(idx[lane], val[lane]);
            }
        }
        carry = CarryPair::new(idx[last], val[last]);
    }
    Some(carry)
}

/// Buffered first-level kernel: the final carry of lane-group `w` goes to
/// `carries[w]`.
///
/// Every row retired here is retired by exactly one lane-group; a row shared
/// with a neighbour only reaches that neighbour through the carry buffer.
pub(crate) fn spmv_coo_flat_kernel<X: XSource + ?Sized>(
    launch: &Launch,
    row: &[i64],
    col: &[i64],
    data: &[f64],
    x: &X,
    y: &SharedY<'_>,
    carries: &mut [CarryPair],
) {
    debug_assert_eq!(carries.len(), launch.active_warps);
    let width = launch.warp_size;
    let wpb = launch.warps_per_block;
    let tls: ThreadLocal<RefCell<LaneScratch>> = ThreadLocal::new();

    carries
        .par_chunks_mut(wpb)
        .enumerate()
        .for_each(|(block, slots)| {
            let cell = tls.get_or(|| RefCell::new(LaneScratch::new(width)));
            let mut scratch = cell.borrow_mut();
            let LaneScratch { idx, val } = &mut *scratch;
            for (lane_group, slot) in slots.iter_mut().enumerate() {
                let range = launch.interval(block * wpb + lane_group);
                let open = flat_interval(
                    &row[range.clone()],
                    &col[range.clone()],
                    &data[range],
                    x,
                    idx.as_mut_slice(),
                    val.as_mut_slice(),
                    |r, s| unsafe { y.add(i64_to_usize(r), s) },
                );
                if let Some(c) = open {
                    *slot = c;
                }
            }
        });
}

/// Atomic first-level kernel: no carry buffer.
///
/// Only the interval's first row can also be claimed by the lane-group before
/// it, and only its last row by the one after. The first row is retired with
/// an atomic accumulate, the final carry always is, everything else is a
/// plain accumulate.
pub(crate) fn spmv_coo_flat_atomic_kernel<X: XSource + ?Sized>(
    launch: &Launch,
    row: &[i64],
    col: &[i64],
    data: &[f64],
    x: &X,
    y: &SharedY<'_>,
) {
    let width = launch.warp_size;
    let wpb = launch.warps_per_block;
    let tls: ThreadLocal<RefCell<LaneScratch>> = ThreadLocal::new();

    (0..launch.num_blocks).into_par_iter().for_each(|block| {
        let cell = tls.get_or(|| RefCell::new(LaneScratch::new(width)));
        let mut scratch = cell.borrow_mut();
        let LaneScratch { idx, val } = &mut *scratch;
        for lane_group in 0..wpb {
            let range = launch.interval(block * wpb + lane_group);
            if range.is_empty() {
                break;
            }
            let first_row = row[range.start];
            let open = flat_interval(
                &row[range.clone()],
                &col[range.clone()],
                &data[range],
                x,
                idx.as_mut_slice(),
                val.as_mut_slice(),
                |r, s| {
                    if r == first_row {
                        y.atomic_add(i64_to_usize(r), s);
                    } else {
                        unsafe { y.add(i64_to_usize(r), s) }
                    }
                },
            );
            if let Some(c) = open {
                y.atomic_add(i64_to_usize(c.row), c.sum);
            }
        }
    });
}
