//! Metadata operations on tensor maps, built on the public API of the core crate.

mod drop_blocks;
mod slice;
mod unique_metadata;

pub use drop_blocks::drop_blocks;
pub use slice::{slice, slice_block};
pub use unique_metadata::{unique_metadata, unique_metadata_block, Axis};
