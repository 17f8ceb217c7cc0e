use std::ops::Range;

use super::{
    regroup::{check_same, index_value, sample_mappings, split_keys, KeysToMove, RowSet},
    TensorMap,
};
use crate::{
    array::DataArray,
    block::Block,
    error::{Error, Result},
    labels::{check_names, Labels, LabelsEntry, Row},
};

impl<A: DataArray> TensorMap<A> {
    /// Moves the key dimensions `keys_to_move` to the properties.
    ///
    /// Blocks whose remaining key values are the same are merged into one block. The
    /// samples of the merged block are the union of the samples of the blocks (sorted
    /// when `sort_samples` is set), and the new properties are made of the removed key
    /// dimensions followed by the existing property dimensions:
    ///
    /// - when `keys_to_move` only gives names (or is an empty [`Labels`]), the properties
    ///   are the `(key, property)` pairs present in the blocks, block after block;
    /// - when `keys_to_move` is a non-empty [`Labels`], the properties are every entry of
    ///   `keys_to_move` combined with every property, all blocks of a group must share the
    ///   same properties, and a block whose key values are missing from `keys_to_move`
    ///   fails with [`Error::NotFound`].
    ///
    /// Values not provided by any block are zero.
    #[tracing::instrument(skip_all, fields(sort_samples = sort_samples))]
    pub fn keys_to_properties<'k>(
        &self,
        keys_to_move: impl Into<KeysToMove<'k>>,
        sort_samples: bool,
    ) -> Result<TensorMap<A>> {
        let keys_to_move = keys_to_move.into();
        let explicit = match keys_to_move {
            KeysToMove::Labels(labels) if !labels.is_empty() => Some(labels),
            _ => None,
        };

        let split = split_keys(&self.keys, keys_to_move.names())?;
        tracing::debug!(
            moved = ?split.moved_names,
            groups = split.groups.len(),
            explicit = explicit.is_some(),
            "moving keys to properties"
        );

        let blocks = split
            .groups
            .iter()
            .map(|group| {
                let blocks: Vec<(&Block<A>, &[i32])> = group
                    .iter()
                    .map(|(b, key)| (&self.blocks[*b], key.as_slice()))
                    .collect();
                merge_properties(&blocks, &split.moved_names, explicit, sort_samples)
            })
            .collect::<Result<Vec<_>>>()?;

        TensorMap::new(split.keys, blocks)
    }
}

/// Places the properties of `blocks` side by side, each block tagged with the values of the
/// moved key dimensions.
fn merge_properties<A: DataArray>(
    blocks: &[(&Block<A>, &[i32])],
    moved_names: &[String],
    explicit: Option<&Labels>,
    sort_samples: bool,
) -> Result<Block<A>> {
    let first = blocks[0].0;
    for (block, _) in &blocks[1..] {
        if block.components() != first.components() {
            return Err(Error::DimensionMismatch(
                "can not move keys to properties: the blocks to merge have different \
                 components"
                    .into(),
            ));
        }
    }

    let mut names = moved_names.to_vec();
    names.extend(first.properties().names().iter().cloned());
    let names = check_names(names)?;

    let (properties, ranges) = match explicit {
        Some(keys_to_move) => {
            check_same(
                blocks.iter().map(|(b, _)| b.properties()),
                "properties",
                "properties",
            )?;
            let properties = Labels::product(&[keys_to_move, first.properties()])?;
            let n_properties = first.properties().count();
            let ranges = blocks
                .iter()
                .map(|(_, key)| {
                    let position = keys_to_move.position(key).ok_or_else(|| {
                        Error::NotFound(format!(
                            "the key {} of a block is not part of the keys to move",
                            LabelsEntry::new(moved_names, key).print()
                        ))
                    })?;
                    Ok(position * n_properties..(position + 1) * n_properties)
                })
                .collect::<Result<Vec<Range<usize>>>>()?;
            (properties, ranges)
        }
        None => {
            let mut values = Vec::new();
            let mut ranges = Vec::with_capacity(blocks.len());
            let mut count = 0;
            for (block, key) in blocks {
                let start = count;
                for property in block.properties().iter() {
                    values.extend_from_slice(key);
                    values.extend_from_slice(property.values());
                    count += 1;
                }
                ranges.push(start..count);
            }
            // blocks of a group have different key values, so the entries are unique
            (Labels::from_unique(names, values, count), ranges)
        }
    };

    let mut samples = RowSet::default();
    let mappings: Vec<Vec<usize>> = blocks
        .iter()
        .map(|(block, _)| {
            block
                .samples()
                .iter()
                .map(|sample| samples.insert(Row::from_slice(sample.values())))
                .collect()
        })
        .collect();
    let (rows, positions) = samples.finish(sort_samples);
    tracing::trace!(
        samples = rows.len(),
        properties = properties.count(),
        "merged block metadata"
    );

    let mut shape = vec![rows.len()];
    shape.extend(first.components().iter().map(Labels::count));
    shape.push(properties.count());

    let mut values = first.values().create(&shape);
    for (((block, _), mapping), range) in blocks.iter().zip(&mappings).zip(&ranges) {
        values.move_samples_from(
            block.values(),
            &sample_mappings(mapping, &positions),
            range.clone(),
        );
    }

    let mut merged = Block::new(
        values,
        Labels::from_rows(first.samples().names().to_vec(), &rows),
        first.components().to_vec(),
        properties.clone(),
    )?;

    for (parameter, first_gradient) in first.gradients() {
        let mut gradient_samples = RowSet::default();
        let mut gradients = Vec::with_capacity(blocks.len());
        let mut gradient_mappings = Vec::with_capacity(blocks.len());
        for ((block, _), mapping) in blocks.iter().zip(&mappings) {
            let gradient = block.gradient(parameter).ok_or_else(|| {
                Error::DimensionMismatch(format!(
                    "can not move keys to properties: some blocks lack the gradient with \
                     respect to '{parameter}'"
                ))
            })?;
            if gradient.components() != first_gradient.components() {
                return Err(Error::DimensionMismatch(format!(
                    "can not move keys to properties: the gradients with respect to \
                     '{parameter}' have different components"
                )));
            }

            // the same gradient sample can come from several blocks
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
        shape.push(properties.count());

        let mut values = first_gradient.values().create(&shape);
        for ((gradient, mapping), range) in gradients.iter().zip(&gradient_mappings).zip(&ranges) {
            values.move_samples_from(
                gradient.values(),
                &sample_mappings(mapping, &gradient_positions),
                range.clone(),
            );
        }

        let gradient = Block::new(
            values,
            Labels::from_rows(first_gradient.samples().names().to_vec(), &rows),
            first_gradient.components().to_vec(),
            properties.clone(),
        )?;
        merged.add_gradient(parameter, gradient)?;
    }

    Ok(merged)
}
