//! Host-side orchestration of the flat COO SpMV.
//!
//! One call moves through `plan -> [bind x] -> bulk kernel -> serial tail ->
//! [merge] -> [unbind x]`. Empty inputs return before anything is bound; inputs
//! shorter than one lane-group run the serial reducer alone.

use crate::cache::{BoundX, ReadCache, TextureCache, XSource};
use crate::carry::alloc_carries;
use crate::config::{FlatConfig, FlatStrategy, MergeStrategy};
use crate::error::SpmvResult;
use crate::flat::{spmv_coo_flat_atomic_kernel, spmv_coo_flat_kernel};
use crate::launch::{plan, Launch, Route};
use crate::merge::{spmv_coo_host_update, spmv_coo_reduce_update, spmv_coo_scatter_update};
use crate::output::SharedY;
use crate::serial::spmv_coo_serial;
use flatspmv_core::Coo;

/// y += A @ x, buffered two-level reduction.
pub fn spmv_coo_flat_f64_i64(a: &Coo<f64, i64>, x: &[f64], y: &mut [f64]) -> SpmvResult<()> {
    spmv_coo_flat_with_config(a, x, y, &FlatConfig::buffered())
}

/// y += A @ x, buffered two-level reduction, x read through the cache.
pub fn spmv_coo_flat_tex_f64_i64(
    a: &Coo<f64, i64>,
    x: &[f64],
    y: &mut [f64],
) -> SpmvResult<()> {
    spmv_coo_flat_cached_with_config(a, x, y, &FlatConfig::buffered(), &TextureCache)
}

/// y += A @ x, single-level reduction with atomic accumulates.
pub fn spmv_coo_flat_atomic_f64_i64(
    a: &Coo<f64, i64>,
    x: &[f64],
    y: &mut [f64],
) -> SpmvResult<()> {
    spmv_coo_flat_with_config(a, x, y, &FlatConfig::atomic())
}

/// y += A @ x, atomic single-level reduction, x read through the cache.
pub fn spmv_coo_flat_atomic_tex_f64_i64(
    a: &Coo<f64, i64>,
    x: &[f64],
    y: &mut [f64],
) -> SpmvResult<()> {
    spmv_coo_flat_cached_with_config(a, x, y, &FlatConfig::atomic(), &TextureCache)
}

/// y += A @ x with explicit tuning, x read directly.
///
/// Rows of `a` must be sorted ascending; the result is unspecified otherwise.
///
/// # Panics
/// If `x.len() != a.ncols`, `y.len() != a.nrows`, or a row id is outside y.
pub fn spmv_coo_flat_with_config(
    a: &Coo<f64, i64>,
    x: &[f64],
    y: &mut [f64],
    cfg: &FlatConfig,
) -> SpmvResult<()> {
    check_shapes(a, x, y);
    cfg.validate()?;
    let route = plan(a.nnz(), cfg);
    log_route(&route, cfg);
    execute(a, x, y, cfg, &route)
}

/// y += A @ x with explicit tuning, x read through `cache`.
///
/// The cache is bound once before the first kernel and unbound after the
/// last one, whichever route the call takes.
pub fn spmv_coo_flat_cached_with_config<C: ReadCache + ?Sized>(
    a: &Coo<f64, i64>,
    x: &[f64],
    y: &mut [f64],
    cfg: &FlatConfig,
    cache: &C,
) -> SpmvResult<()> {
    check_shapes(a, x, y);
    cfg.validate()?;
    let route = plan(a.nnz(), cfg);
    log_route(&route, cfg);
    if route == Route::Empty {
        return Ok(());
    }
    let bound = BoundX::bind(cache, x);
    execute(a, &bound, y, cfg, &route)
}

fn check_shapes(a: &Coo<f64, i64>, x: &[f64], y: &[f64]) {
    assert_eq!(x.len(), a.ncols, "x length must equal ncols");
    assert_eq!(y.len(), a.nrows, "y length must equal nrows");
    assert!(
        a.row.len() == a.nnz() && a.col.len() == a.nnz(),
        "row/col/data must have equal length"
    );
}

fn log_route(route: &Route, cfg: &FlatConfig) {
    match route {
        Route::Empty => log::debug!("spmv_coo_flat: empty matrix, nothing to do"),
        Route::Serial => log::debug!("spmv_coo_flat: below one lane-group, serial reducer only"),
        Route::Flat(l) => log::debug!(
            "spmv_coo_flat: {:?}/{:?} warps={} blocks={} interval={} tail={} active={}",
            cfg.strategy,
            cfg.merge,
            l.num_warps,
            l.num_blocks,
            l.interval_size,
            l.tail,
            l.active_warps
        ),
    }
}

fn execute<X: XSource + ?Sized>(
    a: &Coo<f64, i64>,
    x: &X,
    y: &mut [f64],
    cfg: &FlatConfig,
    route: &Route,
) -> SpmvResult<()> {
    match route {
        Route::Empty => Ok(()),
        Route::Serial => {
            spmv_coo_serial(&a.row, &a.col, &a.data, x, y);
            Ok(())
        }
        Route::Flat(launch) => match cfg.strategy {
            FlatStrategy::Buffered => flat_buffered(a, x, y, launch, cfg.merge, cfg.merge_block_size),
            FlatStrategy::Atomic => {
                flat_atomic(a, x, y, launch);
                Ok(())
            }
        },
    }
}

fn flat_buffered<X: XSource + ?Sized>(
    a: &Coo<f64, i64>,
    x: &X,
    y: &mut [f64],
    launch: &Launch,
    merge: MergeStrategy,
    merge_block_size: usize,
) -> SpmvResult<()> {
    let tail = launch.tail;
    let mut carries = alloc_carries(launch.active_warps)?;

    log::trace!("bulk kernel over [0, {tail})");
    spmv_coo_flat_kernel(
        launch,
        &a.row[..tail],
        &a.col[..tail],
        &a.data[..tail],
        x,
        &SharedY::new(y),
        &mut carries,
    );

    log::trace!("serial tail over [{tail}, {})", a.nnz());
    spmv_coo_serial(&a.row[tail..], &a.col[tail..], &a.data[tail..], x, y);

    log::trace!("merging {} carries ({merge:?})", carries.len());
    match merge {
        MergeStrategy::Segmented => spmv_coo_reduce_update(&carries, merge_block_size, y),
        MergeStrategy::Scatter => spmv_coo_scatter_update(&carries, y),
        MergeStrategy::HostCoalesce => spmv_coo_host_update(&carries, y),
    }
    Ok(())
}

fn flat_atomic<X: XSource + ?Sized>(a: &Coo<f64, i64>, x: &X, y: &mut [f64], launch: &Launch) {
    let tail = launch.tail;

    log::trace!("atomic bulk kernel over [0, {tail})");
    spmv_coo_flat_atomic_kernel(
        launch,
        &a.row[..tail],
        &a.col[..tail],
        &a.data[..tail],
        x,
        &SharedY::new(y),
    );

    log::trace!("serial tail over [{tail}, {})", a.nnz());
    spmv_coo_serial(&a.row[tail..], &a.col[tail..], &a.data[tail..], x, y);
}
