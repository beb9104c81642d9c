//! Read paths for the dense input vector x.
//!
//! Kernels are generic over [`XSource`], so the direct and cached variants are
//! separate monomorphizations of the same code. A cached read goes through a
//! [`ReadCache`] bound for the whole call; the binding is tied to the lifetime
//! of a [`BoundX`] guard.

use crate::util::i64_to_usize;

/// Where a kernel lane reads `x[col]` from.
pub trait XSource: Sync {
    fn fetch(&self, col: i64) -> f64;
}

impl XSource for [f64] {
    #[inline]
    fn fetch(&self, col: i64) -> f64 {
        self[i64_to_usize(col)]
    }
}

/// A read-only side channel for x that must be bound before use.
///
/// `fetch` is only called between `bind` and the matching `unbind`.
pub trait ReadCache: Sync {
    fn bind(&self, x: &[f64]);
    fn unbind(&self, x: &[f64]);

    /// Clamped fetch: indices past the end read the last element.
    #[inline]
    fn fetch(&self, x: &[f64], col: i64) -> f64 {
        match x.len() {
            0 => 0.0,
            n => x[i64_to_usize(col).min(n - 1)],
        }
    }
}

/// Default binder with clamp addressing and nothing else to set up.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextureCache;

impl ReadCache for TextureCache {
    #[inline]
    fn bind(&self, x: &[f64]) {
        log::trace!("bind x cache ({} elements at {:p})", x.len(), x.as_ptr());
    }

    #[inline]
    fn unbind(&self, x: &[f64]) {
        log::trace!("unbind x cache ({:p})", x.as_ptr());
    }
}

/// x bound to a cache; unbinds on drop.
pub struct BoundX<'a, C: ReadCache + ?Sized> {
    cache: &'a C,
    x: &'a [f64],
}

impl<'a, C: ReadCache + ?Sized> BoundX<'a, C> {
    #[must_use]
    pub fn bind(cache: &'a C, x: &'a [f64]) -> Self {
        cache.bind(x);
        Self { cache, x }
    }
}

impl<C: ReadCache + ?Sized> XSource for BoundX<'_, C> {
    #[inline]
    fn fetch(&self, col: i64) -> f64 {
        self.cache.fetch(self.x, col)
    }
}

impl<C: ReadCache + ?Sized> Drop for BoundX<'_, C> {
    fn drop(&mut self) {
        self.cache.unbind(self.x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        binds: AtomicUsize,
        unbinds: AtomicUsize,
    }

    impl ReadCache for Counting {
        fn bind(&self, _x: &[f64]) {
            self.binds.fetch_add(1, Ordering::Relaxed);
        }
        fn unbind(&self, _x: &[f64]) {
            self.unbinds.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn guard_pairs_bind_and_unbind() {
        let cache = Counting::default();
        let x = [1.0, 2.0, 3.0];
        {
            let bx = BoundX::bind(&cache, &x);
            assert_eq!(cache.binds.load(Ordering::Relaxed), 1);
            assert_eq!(cache.unbinds.load(Ordering::Relaxed), 0);
            assert_eq!(bx.fetch(1), 2.0);
        }
        assert_eq!(cache.unbinds.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn clamped_fetch() {
        let x = [1.0, 2.0, 3.0];
        let bx = BoundX::bind(&TextureCache, &x);
        assert_eq!(bx.fetch(2), 3.0);
        assert_eq!(bx.fetch(7), 3.0);
        let empty: [f64; 0] = [];
        assert_eq!(TextureCache.fetch(&empty, 0), 0.0);
    }

    #[test]
    fn direct_fetch() {
        let x = vec![4.0, 5.0];
        assert_eq!(x.as_slice().fetch(1), 5.0);
    }
}
