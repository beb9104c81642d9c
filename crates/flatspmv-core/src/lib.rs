//! Coordinate sparse matrix container consumed by the flat SpMV kernels (pure Rust)

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod coo;

pub use coo::Coo;
