//! Flattened segmented-reduction COO SpMV kernels (pure Rust, rayon parallel)
//!
//! `y += A @ x` for a row-sorted coordinate matrix. The nonzero stream is cut
//! into equal intervals, one per lane-group; per-row sums are assembled with
//! segmented reductions, and the rows that straddle intervals are finished
//! either through a carry buffer and a second merge kernel or with atomic
//! accumulates into y.
//!
//! Work runs on the global rayon pool; set `RAYON_NUM_THREADS` to size it.

pub mod cache;
pub mod carry;
pub mod config;
pub mod error;
mod flat;
pub mod launch;
pub mod merge;
mod output;
pub mod segreduce;
pub mod serial;
pub mod spmv;
pub mod util;
pub mod verify;

pub use cache::{BoundX, ReadCache, TextureCache, XSource};
pub use carry::CarryPair;
pub use config::{FlatConfig, FlatStrategy, MergeStrategy};
pub use error::{SpmvError, SpmvResult};
pub use launch::{plan, Launch, Route};
pub use serial::spmv_coo_serial_f64_i64;
pub use spmv::{
    spmv_coo_flat_atomic_f64_i64, spmv_coo_flat_atomic_tex_f64_i64,
    spmv_coo_flat_cached_with_config, spmv_coo_flat_f64_i64, spmv_coo_flat_tex_f64_i64,
    spmv_coo_flat_with_config,
};
pub use verify::{check_spmv, l2_error};
