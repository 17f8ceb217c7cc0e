use tensormap_core::{
    array::{DataArray, SampleMapping},
    block::Block,
    error::{Error, Result},
    labels::Labels,
    tensor::TensorMap,
};

use crate::unique_metadata::Axis;

/// New tensor map keeping, in every block, the samples or properties selected by
/// `selection`.
///
/// An entry of `axis` is kept when its values for the dimensions named by `selection`
/// form one of the entries of `selection`, and kept entries stay in their original order.
/// The keys are unchanged, so blocks may end up with no samples or no properties.
/// Gradients are sliced along with their block.
///
/// Fails with [`Error::NotFound`] if `selection` names a dimension missing from `axis`.
pub fn slice<A: DataArray>(
    tensor: &TensorMap<A>,
    axis: Axis,
    selection: &Labels,
) -> Result<TensorMap<A>> {
    let blocks = tensor
        .iter()
        .map(|(_, block)| slice_block(block, axis, selection))
        .collect::<Result<Vec<_>>>()?;
    TensorMap::new(tensor.keys().clone(), blocks)
}

/// Same as [`slice`] for a single block. The result is a new, unowned block.
pub fn slice_block<A: DataArray>(
    block: &Block<A>,
    axis: Axis,
    selection: &Labels,
) -> Result<Block<A>> {
    let labels = match axis {
        Axis::Samples => block.samples(),
        Axis::Properties => block.properties(),
    };
    let kept = selected(labels, selection)?;
    tracing::debug!(?axis, kept = kept.len(), total = labels.count(), "slicing block");

    match axis {
        Axis::Samples => slice_samples(block, &kept),
        Axis::Properties => slice_properties(block, &kept),
    }
}

/// Positions of the entries of `labels` matching one of the entries of `selection`.
fn selected(labels: &Labels, selection: &Labels) -> Result<Vec<usize>> {
    let names: Vec<&str> = selection.names().iter().map(String::as_str).collect();
    let view = labels.view(&names)?;
    Ok(view
        .iter()
        .enumerate()
        .filter(|(_, entry)| selection.contains(entry))
        .map(|(i, _)| i)
        .collect())
}

fn subset(labels: &Labels, kept: &[usize]) -> Result<Labels> {
    let values = kept
        .iter()
        .flat_map(|&i| labels.row(i).iter().copied())
        .collect();
    Labels::from_raw(labels.names().to_vec(), values)
}

fn take_samples<A: DataArray>(values: &A, kept: &[usize]) -> A {
    let mut shape = values.shape().to_vec();
    shape[0] = kept.len();
    let n_properties = shape[shape.len() - 1];

    let mappings: Vec<SampleMapping> = kept
        .iter()
        .enumerate()
        .map(|(output, &input)| SampleMapping { input, output })
        .collect();
    let mut output = values.create(&shape);
    output.move_samples_from(values, &mappings, 0..n_properties);
    output
}

fn slice_samples<A: DataArray>(block: &Block<A>, kept: &[usize]) -> Result<Block<A>> {
    let mut sliced = Block::new(
        take_samples(block.values(), kept),
        subset(block.samples(), kept)?,
        block.components().to_vec(),
        block.properties().clone(),
    )?;

    // old sample position -> new one
    let mut new_positions = vec![None; block.samples().count()];
    for (new, &old) in kept.iter().enumerate() {
        new_positions[old] = Some(new);
    }

    for (parameter, gradient) in block.gradients() {
        let mut gradient_kept = Vec::new();
        let mut values = Vec::new();
        for (i, entry) in gradient.samples().iter().enumerate() {
            let sample = entry.values()[0];
            let Some(new) = usize::try_from(sample).ok().and_then(|s| new_positions[s]) else {
                continue;
            };
            let new = i32::try_from(new).map_err(|_| {
                Error::TypeMismatch(format!("sample index {new} does not fit in a 32-bit integer"))
            })?;
            gradient_kept.push(i);
            values.push(new);
            values.extend_from_slice(&entry.values()[1..]);
        }

        let gradient = Block::new(
            take_samples(gradient.values(), &gradient_kept),
            Labels::from_raw(gradient.samples().names().to_vec(), values)?,
            gradient.components().to_vec(),
            gradient.properties().clone(),
        )?;
        sliced.add_gradient(parameter, gradient)?;
    }

    Ok(sliced)
}

fn slice_properties<A: DataArray>(block: &Block<A>, kept: &[usize]) -> Result<Block<A>> {
    let properties = subset(block.properties(), kept)?;
    let mut sliced = Block::new(
        block.values().select_properties(kept),
        block.samples().clone(),
        block.components().to_vec(),
        properties.clone(),
    )?;

    for (parameter, gradient) in block.gradients() {
        let gradient = Block::new(
            gradient.values().select_properties(kept),
            gradient.samples().clone(),
            gradient.components().to_vec(),
            properties.clone(),
        )?;
        sliced.add_gradient(parameter, gradient)?;
    }

    Ok(sliced)
}
