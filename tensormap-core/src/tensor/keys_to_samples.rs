use super::{
    regroup::{check_same, index_value, sample_mappings, split_keys, KeysToMove, RowSet},
    TensorMap,
};
use crate::{
    array::DataArray,
    block::Block,
    error::{Error, Result},
    labels::{check_names, Labels, Row},
};

impl<A: DataArray> TensorMap<A> {
    /// Moves the key dimensions `keys_to_move` to the samples.
    ///
    /// Blocks whose remaining key values are the same are merged into one block by
    /// stacking their samples, and the removed key values are appended as new sample
    /// dimensions. With `sort_samples`, the merged samples are sorted lexicographically;
    /// otherwise they follow the order of the blocks and of their samples.
    ///
    /// The merged blocks must have the same components and properties, otherwise this fails
    /// with [`Error::DimensionMismatch`]. Gradients are merged the same way, their
    /// `"sample"` dimension being updated to point to the merged samples.
    #[tracing::instrument(skip_all, fields(sort_samples = sort_samples))]
    pub fn keys_to_samples<'k>(
        &self,
        keys_to_move: impl Into<KeysToMove<'k>>,
        sort_samples: bool,
    ) -> Result<TensorMap<A>> {
        let keys_to_move = keys_to_move.into();
        if let KeysToMove::Labels(labels) = keys_to_move {
            if !labels.is_empty() {
                return Err(Error::DimensionMismatch(
                    "the labels of keys to move to samples must not contain entries, only names"
                        .into(),
                ));
            }
        }

        let split = split_keys(&self.keys, keys_to_move.names())?;
        tracing::debug!(
            moved = ?split.moved_names,
            groups = split.groups.len(),
            "moving keys to samples"
        );

        let blocks = split
            .groups
            .iter()
            .map(|group| {
                let blocks: Vec<(&Block<A>, &[i32])> = group
                    .iter()
                    .map(|(b, key)| (&self.blocks[*b], key.as_slice()))
                    .collect();
                merge_samples(&blocks, &split.moved_names, sort_samples)
            })
            .collect::<Result<Vec<_>>>()?;

        TensorMap::new(split.keys, blocks)
    }
}

/// Stacks the samples of `blocks`, each with the values of the moved key dimensions.
fn merge_samples<A: DataArray>(
    blocks: &[(&Block<A>, &[i32])],
    moved_names: &[String],
    sort_samples: bool,
) -> Result<Block<A>> {
    let first = blocks[0].0;
    for (block, _) in &blocks[1..] {
        if block.components() != first.components() {
            return Err(Error::DimensionMismatch(
                "can not move keys to samples: the blocks to merge have different components"
                    .into(),
            ));
        }
    }
    check_same(blocks.iter().map(|(b, _)| b.properties()), "properties", "samples")?;

    let mut names = first.samples().names().to_vec();
    names.extend(moved_names.iter().cloned());
    let names = check_names(names)?;

    // rows of different blocks differ in their key values, so every insertion is new
    let mut samples = RowSet::default();
    let mut mappings = Vec::with_capacity(blocks.len());
    for (block, key) in blocks {
        let mapping: Vec<usize> = block
            .samples()
            .iter()
            .map(|sample| {
                let mut row = Row::from_slice(sample.values());
                row.extend_from_slice(key);
                samples.insert(row)
            })
            .collect();
        mappings.push(mapping);
    }
    let (rows, positions) = samples.finish(sort_samples);

    let n_properties = first.properties().count();
    let mut shape = vec![rows.len()];
    shape.extend(first.components().iter().map(Labels::count));
    shape.push(n_properties);

    let mut values = first.values().create(&shape);
    for ((block, _), mapping) in blocks.iter().zip(&mappings) {
        values.move_samples_from(
            block.values(),
            &sample_mappings(mapping, &positions),
            0..n_properties,
        );
    }

    let mut merged = Block::new(
        values,
        Labels::from_rows(names, &rows),
        first.components().to_vec(),
        first.properties().clone(),
    )?;

    for (parameter, first_gradient) in first.gradients() {
        let mut gradient_samples = RowSet::default();
        let mut gradients = Vec::with_capacity(blocks.len());
        let mut gradient_mappings = Vec::with_capacity(blocks.len());
        for ((block, _), mapping) in blocks.iter().zip(&mappings) {
            let gradient = block.gradient(parameter).ok_or_else(|| {
                Error::DimensionMismatch(format!(
                    "can not move keys to samples: some blocks lack the gradient with \
                     respect to '{parameter}'"
                ))
            })?;
            if gradient.components() != first_gradient.components() {
                return Err(Error::DimensionMismatch(format!(
                    "can not move keys to samples: the gradients with respect to \
                     '{parameter}' have different components"
                )));
            }

            let gradient_mapping = gradient
                .samples()
                .iter()
                .map(|entry| {
                    let mut row = Row::from_slice(entry.values());
                    row[0] = index_value(positions[mapping[row[0] as usize]])?;
                    Ok(gradient_samples.insert(row))
                })
                .collect::<Result<Vec<usize>>>()?;
            gradients.push(gradient);
            gradient_mappings.push(gradient_mapping);
        }
        let (rows, gradient_positions) = gradient_samples.finish(sort_samples);

        let mut shape = vec![rows.len()];
        shape.extend(first_gradient.components().iter().map(Labels::count));
        shape.push(n_properties);

        let mut values = first_gradient.values().create(&shape);
        for (gradient, mapping) in gradients.iter().zip(&gradient_mappings) {
            values.move_samples_from(
                gradient.values(),
                &sample_mappings(mapping, &gradient_positions),
                0..n_properties,
            );
        }

        let gradient = Block::new(
            values,
            Labels::from_rows(first_gradient.samples().names().to_vec(), &rows),
            first_gradient.components().to_vec(),
            first.properties().clone(),
        )?;
        merged.add_gradient(parameter, gradient)?;
    }

    Ok(merged)
}
