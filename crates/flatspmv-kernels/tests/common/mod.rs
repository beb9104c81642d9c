#![allow(dead_code)]

use flatspmv_core::Coo;
use flatspmv_kernels::{FlatConfig, MergeStrategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Row-sorted matrix with uneven rows, empty rows and repeated columns.
pub fn random_coo(nrows: usize, ncols: usize, max_row_nnz: usize, seed: u64) -> Coo<f64, i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut row = Vec::new();
    let mut col = Vec::new();
    let mut data = Vec::new();
    for i in 0..nrows {
        // a quarter of the rows stay empty, a few get very long
        let len = match rng.random_range(0..8) {
            0 | 1 => 0,
            7 => rng.random_range(0..max_row_nnz * 8 + 1),
            _ => rng.random_range(0..max_row_nnz + 1),
        };
        for _ in 0..len {
            row.push(i as i64);
            col.push(rng.random_range(0..ncols) as i64);
            data.push(rng.random_range(-10.0..10.0));
        }
    }
    Coo::from_parts(nrows, ncols, row, col, data, true).unwrap()
}

pub fn random_x(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| f64::from(rng.random_range(-10i32..=10))).collect()
}

/// Sequential per-row accumulation in entry order.
pub fn reference(a: &Coo<f64, i64>, x: &[f64], y0: &[f64]) -> Vec<f64> {
    let mut y = y0.to_vec();
    for k in 0..a.nnz() {
        y[a.row[k] as usize] += a.data[k] * x[a.col[k] as usize];
    }
    y
}

/// Every strategy the orchestrator can select, with default geometry.
pub fn all_configs() -> Vec<FlatConfig> {
    vec![
        FlatConfig::buffered(),
        FlatConfig::buffered().with_merge(MergeStrategy::Scatter),
        FlatConfig::buffered().with_merge(MergeStrategy::HostCoalesce),
        FlatConfig::atomic(),
    ]
}

/// Small geometries that force many intervals and multi-load intervals.
pub fn stress_configs() -> Vec<FlatConfig> {
    let mut out = Vec::new();
    for base in all_configs() {
        out.push(base.clone().with_geometry(4, 8).with_max_blocks(3));
        out.push(base.clone().with_geometry(8, 32).with_max_blocks(1));
        out.push(base.clone().with_geometry(2, 2).with_max_blocks(64).with_merge_block_size(4));
        out.push(base.with_geometry(1, 4).with_max_blocks(7).with_merge_block_size(2));
    }
    out
}

pub fn assert_close(got: &[f64], want: &[f64]) {
    assert_eq!(got.len(), want.len());
    for (i, (&g, &w)) in got.iter().zip(want).enumerate() {
        let tol = 1e-4 * w.abs().max(1.0);
        assert!((g - w).abs() <= tol, "y[{i}]: got {g}, want {w}");
    }
}
