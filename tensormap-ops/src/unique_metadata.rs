use std::collections::BTreeSet;

use tensormap_core::{
    block::Block,
    error::{Error, Result},
    labels::Labels,
    tensor::TensorMap,
};

/// Axis of a block carrying the metadata to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// first axis
    Samples,
    /// last axis
    Properties,
}

/// Sorted unique values of the `names` dimensions of `axis`, over all blocks of `tensor`
/// (or over their gradient with respect to `gradient`).
///
/// A tensor map without blocks gives empty labels.
pub fn unique_metadata<A>(
    tensor: &TensorMap<A>,
    axis: Axis,
    names: &[&str],
    gradient: Option<&str>,
) -> Result<Labels> {
    let mut entries = BTreeSet::new();
    for (_, block) in tensor.iter() {
        collect_entries(block, axis, names, gradient, &mut entries)?;
    }
    Labels::new(names, entries)
}

/// Same as [`unique_metadata`] for a single block.
pub fn unique_metadata_block<A>(
    block: &Block<A>,
    axis: Axis,
    names: &[&str],
    gradient: Option<&str>,
) -> Result<Labels> {
    let mut entries = BTreeSet::new();
    collect_entries(block, axis, names, gradient, &mut entries)?;
    Labels::new(names, entries)
}

fn collect_entries<A>(
    block: &Block<A>,
    axis: Axis,
    names: &[&str],
    gradient: Option<&str>,
    entries: &mut BTreeSet<Vec<i32>>,
) -> Result<()> {
    let block = match gradient {
        None => block,
        Some(parameter) => block.gradient(parameter).ok_or_else(|| {
            Error::NotFound(format!("the blocks have no gradient with respect to '{parameter}'"))
        })?,
    };

    let labels = match axis {
        Axis::Samples => block.samples(),
        Axis::Properties => block.properties(),
    };
    let view = labels.view(names)?;
    entries.extend(view.iter().map(|row| row.to_vec()));
    Ok(())
}
