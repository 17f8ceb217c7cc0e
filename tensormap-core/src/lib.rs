//! Core crate of tensormap.
//!
//! Labeled, sparse, block-structured tensors: a [`TensorMap`](tensor::TensorMap) stores
//! [`Block`](block::Block)s indexed by the entries of a keys [`Labels`](labels::Labels),
//! and every axis of every block carries its own labels. The numeric storage is abstracted
//! behind [`DataArray`](array::DataArray).

#![warn(missing_docs)]

// metadata

pub mod labels;

// data

pub mod array;

pub mod ownership;

pub mod block;

pub mod tensor;

// common

pub mod error;

pub mod prelude {
    //! A prelude module re-exporting commonly used items.

    pub use crate::array::{DataArray, SampleMapping};
    pub use crate::block::Block;
    pub use crate::error::{Error, Result};
    pub use crate::labels::{Labels, LabelsEntry, LabelsView};
    pub use crate::ownership::Ownership;
    pub use crate::tensor::{KeysToMove, Selection, TensorMap};

    pub use crate::sel;
}
