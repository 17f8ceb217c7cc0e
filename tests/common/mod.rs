#![allow(dead_code)]

use ndarray::{ArrayD, IxDyn};
use tensormap::prelude::*;

pub type Tensor = TensorMap<NdArray<f64>>;

pub fn full(shape: &[usize], value: f64) -> NdArray<f64> {
    NdArray::full(shape, value)
}

pub fn array(shape: &[usize], values: Vec<f64>) -> anyhow::Result<ArrayD<f64>> {
    Ok(ArrayD::from_shape_vec(IxDyn(shape), values)?)
}

fn block_with_gradient(
    value: f64,
    samples: &[[i32; 1]],
    component: &Labels,
    properties: &[[i32; 1]],
    gradient_samples: &[[i32; 2]],
) -> anyhow::Result<Block<NdArray<f64>>> {
    let properties = Labels::new(&["properties"], properties)?;
    let mut block = Block::new(
        full(&[samples.len(), component.count(), properties.count()], value),
        Labels::new(&["samples"], samples)?,
        vec![component.clone()],
        properties.clone(),
    )?;
    let gradient = Block::new(
        full(
            &[gradient_samples.len(), component.count(), properties.count()],
            value + 10.0,
        ),
        Labels::new(&["sample", "parameter"], gradient_samples)?,
        vec![component.clone()],
        properties,
    )?;
    block.add_gradient("parameter", gradient)?;
    Ok(block)
}

/// Four blocks with keys (key_1, key_2) = (0, 0), (1, 0), (2, 2), (2, 3), filled with
/// 1, 2, 3 and 4, and gradients filled with 11, 12, 13 and 14.
pub fn test_tensor_map() -> anyhow::Result<Tensor> {
    let component = Labels::new(&["component"], [[0]])?;
    let block_1 = block_with_gradient(1.0, &[[0], [2], [4]], &component, &[[0]], &[[0, -2], [2, 3]])?;
    let block_2 = block_with_gradient(
        2.0,
        &[[0], [1], [3]],
        &component,
        &[[3], [4], [5]],
        &[[0, -2], [0, 3], [2, -2]],
    )?;

    let component = Labels::new(&["component"], [[0], [1], [2]])?;
    let block_3 = block_with_gradient(3.0, &[[0], [3], [6], [8]], &component, &[[0]], &[[1, -2]])?;
    let block_4 = block_with_gradient(
        4.0,
        &[[0], [1], [2], [5]],
        &component,
        &[[0]],
        &[[0, 1], [3, 3]],
    )?;

    let keys = Labels::new(&["key_1", "key_2"], [[0, 0], [1, 0], [2, 2], [2, 3]])?;
    Ok(TensorMap::new(keys, vec![block_1, block_2, block_3, block_4])?)
}
