mod common;

use common::{all_configs, random_coo, random_x};
use flatspmv_core::Coo;
use flatspmv_kernels::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Records bind/unbind pairs and every fetch made outside a binding.
#[derive(Default)]
struct Recording {
    bound: AtomicBool,
    binds: AtomicUsize,
    unbinds: AtomicUsize,
    fetches: AtomicUsize,
    unbound_fetches: AtomicUsize,
}

impl ReadCache for Recording {
    fn bind(&self, _x: &[f64]) {
        assert!(!self.bound.swap(true, Ordering::SeqCst), "double bind");
        self.binds.fetch_add(1, Ordering::SeqCst);
    }

    fn unbind(&self, _x: &[f64]) {
        assert!(self.bound.swap(false, Ordering::SeqCst), "unbind without bind");
        self.unbinds.fetch_add(1, Ordering::SeqCst);
    }

    fn fetch(&self, x: &[f64], col: i64) -> f64 {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        if !self.bound.load(Ordering::SeqCst) {
            self.unbound_fetches.fetch_add(1, Ordering::Relaxed);
        }
        x[col as usize]
    }
}

impl Recording {
    fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.binds.load(Ordering::SeqCst),
            self.unbinds.load(Ordering::SeqCst),
            self.fetches.load(Ordering::SeqCst),
            self.unbound_fetches.load(Ordering::SeqCst),
        )
    }
}

#[test]
fn flat_route_binds_once_around_all_reads() {
    // the bulk prefix and the serial tail both read x
    let a = random_coo(400, 90, 6, 5);
    let x = random_x(90, 6);
    for cfg in all_configs() {
        let cache = Recording::default();
        let mut y = vec![0.0; a.nrows];
        spmv_coo_flat_cached_with_config(&a, &x, &mut y, &cfg, &cache).unwrap();
        let (binds, unbinds, fetches, unbound) = cache.counts();
        assert_eq!((binds, unbinds), (1, 1), "{cfg:?}");
        assert_eq!(fetches, a.nnz(), "every entry reads x exactly once");
        assert_eq!(unbound, 0);
    }
}

#[test]
fn serial_route_still_binds() {
    let a = Coo::from_parts(2, 2, vec![0, 1], vec![1, 0], vec![2.0, 3.0], true).unwrap();
    let cache = Recording::default();
    let mut y = vec![0.0; 2];
    spmv_coo_flat_cached_with_config(&a, &[1.0, 10.0], &mut y, &FlatConfig::atomic(), &cache)
        .unwrap();
    assert_eq!(y, vec![20.0, 3.0]);
    assert_eq!(cache.counts(), (1, 1, 2, 0));
}

#[test]
fn empty_route_never_binds() {
    let a = Coo::from_parts(3, 3, vec![], vec![], vec![], true).unwrap();
    let cache = Recording::default();
    let mut y = vec![1.0; 3];
    spmv_coo_flat_cached_with_config(&a, &[0.0; 3], &mut y, &FlatConfig::buffered(), &cache)
        .unwrap();
    assert_eq!(cache.counts(), (0, 0, 0, 0));
    assert_eq!(y, vec![1.0; 3]);
}

#[test]
fn rejected_config_never_binds() {
    let a = random_coo(50, 50, 4, 9);
    let cache = Recording::default();
    let mut y = vec![0.0; 50];
    let cfg = FlatConfig::buffered().with_merge_block_size(0);
    let res = spmv_coo_flat_cached_with_config(&a, &random_x(50, 1), &mut y, &cfg, &cache);
    assert!(res.is_err());
    assert_eq!(cache.counts(), (0, 0, 0, 0));
}
