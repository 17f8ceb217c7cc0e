//! Labeled, sparse, block-structured tensor collections.
//!
//! This crate gathers the workspace members behind a single dependency.

/// labels, blocks, tensor maps and their structural operations
pub use tensormap_core as core;

/// numerical storage for block values implemented with ndarray
pub use tensormap_ndarray as ndarray;

/// metadata operations on tensor maps
pub use tensormap_ops as ops;

pub use tensormap_core::sel;

pub mod prelude {
    //! A prelude module re-exporting commonly used items.

    pub use tensormap_core::prelude::*;
    pub use tensormap_ndarray::{block_from_array, NdArray};
    pub use tensormap_ops::{
        drop_blocks, slice, slice_block, unique_metadata, unique_metadata_block, Axis,
    };
}
