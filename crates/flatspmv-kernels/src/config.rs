//! Launch configuration for the flat COO kernels.

use crate::error::{SpmvError, SpmvResult};
use crate::util::{
    ATOMIC_BLOCK_SIZE, ATOMIC_MAX_BLOCKS, BUFFERED_BLOCK_SIZE, BUFFERED_MAX_BLOCKS,
    MERGE_BLOCK_SIZE, WARP_SIZE,
};

/// How boundary-spanning partial sums reach y.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlatStrategy {
    /// Carries go to a temporary buffer folded by a second kernel.
    #[default]
    Buffered,
    /// Carries are folded straight into y with atomic accumulates.
    Atomic,
}

/// Second-level kernel used by [`FlatStrategy::Buffered`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Block-level segmented reduction over the carry buffer.
    #[default]
    Segmented,
    /// One accumulate per carry entry.
    Scatter,
    /// Coalesce equal rows sequentially on the host, then scatter.
    HostCoalesce,
}

/// Tuning parameters for one SpMV call.
#[derive(Clone, Debug)]
pub struct FlatConfig {
    /// Global reduction strategy.
    pub strategy: FlatStrategy,

    /// Carry folding kernel (ignored by the atomic strategy).
    pub merge: MergeStrategy,

    /// Lanes per lane-group. Must be a power of two.
    pub warp_size: usize,

    /// Lanes per block. Must be a multiple of `warp_size`.
    pub block_size: usize,

    /// Maximum number of blocks in the first-level launch.
    pub max_blocks: usize,

    /// Lanes of the merge block. Must be a power of two.
    pub merge_block_size: usize,
}

impl Default for FlatConfig {
    fn default() -> Self {
        Self::buffered()
    }
}

impl FlatConfig {
    #[must_use]
    pub const fn buffered() -> Self {
        Self {
            strategy: FlatStrategy::Buffered,
            merge: MergeStrategy::Segmented,
            warp_size: WARP_SIZE,
            block_size: BUFFERED_BLOCK_SIZE,
            max_blocks: BUFFERED_MAX_BLOCKS,
            merge_block_size: MERGE_BLOCK_SIZE,
        }
    }

    #[must_use]
    pub const fn atomic() -> Self {
        Self {
            strategy: FlatStrategy::Atomic,
            merge: MergeStrategy::Segmented,
            warp_size: WARP_SIZE,
            block_size: ATOMIC_BLOCK_SIZE,
            max_blocks: ATOMIC_MAX_BLOCKS,
            merge_block_size: MERGE_BLOCK_SIZE,
        }
    }

    #[must_use]
    pub fn with_merge(mut self, merge: MergeStrategy) -> Self {
        self.merge = merge;
        self
    }

    /// Set the lane-group width and block width together.
    #[must_use]
    pub fn with_geometry(mut self, warp_size: usize, block_size: usize) -> Self {
        self.warp_size = warp_size;
        self.block_size = block_size;
        self
    }

    #[must_use]
    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    #[must_use]
    pub fn with_merge_block_size(mut self, merge_block_size: usize) -> Self {
        self.merge_block_size = merge_block_size;
        self
    }

    /// Lane-groups per block.
    #[inline]
    #[must_use]
    pub const fn warps_per_block(&self) -> usize {
        self.block_size / self.warp_size
    }

    pub fn validate(&self) -> SpmvResult<()> {
        let reason = if !self.warp_size.is_power_of_two() {
            "warp_size must be a non-zero power of two"
        } else if self.block_size == 0 || self.block_size % self.warp_size != 0 {
            "block_size must be a non-zero multiple of warp_size"
        } else if self.max_blocks == 0 {
            "max_blocks must be non-zero"
        } else if !self.merge_block_size.is_power_of_two() {
            "merge_block_size must be a non-zero power of two"
        } else {
            return Ok(());
        };
        Err(SpmvError::InvalidConfig { reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(FlatConfig::buffered().validate().is_ok());
        assert!(FlatConfig::atomic().validate().is_ok());
        assert_eq!(FlatConfig::default().strategy, FlatStrategy::Buffered);
        assert_eq!(FlatConfig::buffered().warps_per_block(), 8);
        assert_eq!(FlatConfig::atomic().warps_per_block(), 4);
    }

    #[test]
    fn rejects_bad_geometry() {
        let bad = [
            FlatConfig::buffered().with_geometry(0, 256),
            FlatConfig::buffered().with_geometry(24, 48),
            FlatConfig::buffered().with_geometry(32, 48),
            FlatConfig::buffered().with_geometry(32, 0),
            FlatConfig::buffered().with_max_blocks(0),
            FlatConfig::buffered().with_merge_block_size(384),
        ];
        for cfg in bad {
            assert!(
                matches!(cfg.validate(), Err(SpmvError::InvalidConfig { .. })),
                "{cfg:?}"
            );
        }
    }
}
