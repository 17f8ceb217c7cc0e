use tensormap_core::{
    array::DataArray,
    error::{Error, Result},
    labels::Labels,
    tensor::TensorMap,
};

/// New tensor map without the blocks whose keys are listed in `keys`.
///
/// The remaining blocks are deep copies. `keys` must have the same names as the keys of
/// `tensor` ([`Error::DimensionMismatch`] otherwise), and every entry of `keys` must be a
/// key of `tensor` ([`Error::NotFound`] otherwise).
pub fn drop_blocks<A: DataArray>(tensor: &TensorMap<A>, keys: &Labels) -> Result<TensorMap<A>> {
    let (_, in_tensor, in_keys) = tensor.keys().intersection_with_mapping(keys)?;

    if let Some(missing) = in_keys.iter().position(Option::is_none) {
        return Err(Error::NotFound(format!(
            "the key {} is not part of the tensor map",
            keys.entry(missing).map(|e| e.print()).unwrap_or_default()
        )));
    }

    let kept: Vec<usize> = in_tensor
        .iter()
        .enumerate()
        .filter_map(|(i, position)| position.is_none().then_some(i))
        .collect();
    tracing::debug!(
        dropped = keys.count(),
        remaining = kept.len(),
        "dropping blocks"
    );

    let mut values = Vec::with_capacity(kept.len() * keys.size());
    let mut blocks = Vec::with_capacity(kept.len());
    for &i in &kept {
        values.extend_from_slice(tensor.keys().row(i));
        blocks.push(tensor.block_by_id(i)?.copy());
    }

    let new_keys = Labels::from_raw(tensor.keys().names().to_vec(), values)?;
    TensorMap::new(new_keys, blocks)
}
