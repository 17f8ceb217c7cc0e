//! Tensor maps: blocks indexed by the entries of a keys [`Labels`].

mod components_to_properties;
mod keys_to_properties;
mod keys_to_samples;
mod regroup;
mod selection;

use std::fmt;

use crate::{
    array::DataArray,
    block::Block,
    error::{Error, Result},
    labels::{Labels, LabelsEntry},
    ownership::{OwnerId, Ownership},
};

pub use regroup::KeysToMove;
pub use selection::Selection;

/// A collection of blocks, one per entry of `keys`.
///
/// All blocks share the same sample, component and property names and the same set of
/// gradients. Blocks inside a tensor map are owned by it and can not be inserted
/// anywhere else; structural operations return new tensor maps and leave `self` as is.
pub struct TensorMap<A> {
    id: OwnerId,
    keys: Labels,
    blocks: Vec<Block<A>>,
}

impl<A: DataArray> TensorMap<A> {
    /// Creates a tensor map, taking ownership of `blocks`.
    ///
    /// Fails with [`Error::DimensionMismatch`] if there is not one block per key or if the
    /// blocks disagree on their metadata names or gradients, and with
    /// [`Error::OwnershipViolation`] if a block is already owned by another container.
    pub fn new(keys: Labels, mut blocks: Vec<Block<A>>) -> Result<Self> {
        if keys.count() != blocks.len() {
            return Err(Error::DimensionMismatch(format!(
                "there are {} keys but {} blocks",
                keys.count(),
                blocks.len()
            )));
        }

        for (i, block) in blocks.iter().enumerate() {
            if block.ownership().is_owned() {
                return Err(Error::OwnershipViolation(format!(
                    "block {i} is already inside a tensor map or another block, use \
                     `copy()` to get an unowned block"
                )));
            }
        }

        check_consistent(&blocks)?;

        let id = OwnerId::new();
        for block in &mut blocks {
            block.set_ownership(Ownership::OwnedBy(id));
        }
        tracing::trace!(keys = ?keys.names(), blocks = blocks.len(), %id, "created tensor map");

        Ok(Self { id, keys, blocks })
    }

    /// Deep copy of every block. The copy is a separate tensor map.
    pub fn copy(&self) -> Self {
        let id = OwnerId::new();
        let blocks = self
            .blocks
            .iter()
            .map(|block| {
                let mut block = block.copy();
                block.set_ownership(Ownership::OwnedBy(id));
                block
            })
            .collect();
        Self {
            id,
            keys: self.keys.clone(),
            blocks,
        }
    }

    /// Dissolves the tensor map into its keys and blocks, which become unowned.
    pub fn into_raw(self) -> (Labels, Vec<Block<A>>) {
        let mut blocks = self.blocks;
        for block in &mut blocks {
            block.set_ownership(Ownership::Unowned);
        }
        (self.keys, blocks)
    }
}

impl<A> TensorMap<A> {
    /// Keys of the blocks.
    pub fn keys(&self) -> &Labels {
        &self.keys
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether there are no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block at position `index`.
    pub fn block_by_id(&self, index: usize) -> Result<&Block<A>> {
        self.blocks.get(index).ok_or_else(|| {
            Error::NotFound(format!(
                "block index {index} is out of bounds for a tensor map with {} blocks",
                self.blocks.len()
            ))
        })
    }

    /// Blocks at the given positions, in the same order.
    pub fn blocks_by_id(&self, indices: &[usize]) -> Result<Vec<&Block<A>>> {
        indices.iter().map(|&i| self.block_by_id(i)).collect()
    }

    /// Iterates over `(key, block)` pairs.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (LabelsEntry<'_>, &Block<A>)> + '_ {
        self.keys.iter().zip(&self.blocks)
    }

    /// Names of the sample dimensions, shared by all blocks.
    pub fn sample_names(&self) -> Vec<&str> {
        self.blocks.first().map_or_else(Vec::new, |block| {
            block.metadata_names().0.iter().map(String::as_str).collect()
        })
    }

    /// Names of the component dimensions, shared by all blocks.
    pub fn components_names(&self) -> Vec<&str> {
        self.blocks
            .first()
            .map_or_else(Vec::new, |block| block.metadata_names().1)
    }

    /// Names of the property dimensions, shared by all blocks.
    pub fn property_names(&self) -> Vec<&str> {
        self.blocks.first().map_or_else(Vec::new, |block| {
            block.metadata_names().2.iter().map(String::as_str).collect()
        })
    }

    /// Renders the number of blocks and at most `max_keys` keys (all of them if negative).
    pub fn print(&self, max_keys: isize) -> String {
        format!(
            "TensorMap with {} blocks\nkeys:{}",
            self.len(),
            self.keys.print(max_keys, 5)
        )
    }
}

/// Checks that all blocks agree on metadata names and on gradients.
fn check_consistent<A>(blocks: &[Block<A>]) -> Result<()> {
    let Some(first) = blocks.first() else {
        return Ok(());
    };
    let names = first.metadata_names();
    let parameters: Vec<&str> = first.gradients().map(|(p, _)| p).collect();

    for (i, block) in blocks.iter().enumerate().skip(1) {
        if block.metadata_names() != names {
            return Err(Error::DimensionMismatch(format!(
                "block {i} has different metadata names than block 0: samples {:?}, \
                 components {:?}, properties {:?} instead of {:?}, {:?}, {:?}",
                block.metadata_names().0,
                block.metadata_names().1,
                block.metadata_names().2,
                names.0,
                names.1,
                names.2
            )));
        }

        let block_parameters: Vec<&str> = block.gradients().map(|(p, _)| p).collect();
        if block_parameters != parameters {
            return Err(Error::DimensionMismatch(format!(
                "block {i} has gradients {block_parameters:?}, but block 0 has {parameters:?}"
            )));
        }

        for ((parameter, gradient), (_, first_gradient)) in block.gradients().zip(first.gradients())
        {
            if gradient.metadata_names() != first_gradient.metadata_names() {
                return Err(Error::DimensionMismatch(format!(
                    "the gradient with respect to '{parameter}' of block {i} has different \
                     metadata names than the one of block 0"
                )));
            }
        }
    }

    Ok(())
}

impl<A> fmt::Display for TensorMap<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print(4))
    }
}

impl<A> fmt::Debug for TensorMap<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print(-1))
    }
}
