//! ndarray storage for tensormap blocks.

use std::ops::Range;

use ndarray::{ArrayD, Axis, IxDyn, Slice};
use num_traits::Zero;
use tensormap_core::{
    array::{DataArray, SampleMapping},
    block::Block,
    error::{Error, Result},
    labels::Labels,
};

/// Dense block values stored in an [`ArrayD`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdArray<E> {
    data: ArrayD<E>,
}

impl<E> NdArray<E> {
    /// Wraps an array.
    pub fn from_raw(data: ArrayD<E>) -> Self {
        Self { data }
    }

    /// Returns the wrapped array.
    pub fn into_raw(self) -> ArrayD<E> {
        self.data
    }

    /// Borrows the wrapped array.
    pub fn data(&self) -> &ArrayD<E> {
        &self.data
    }

    /// Mutably borrows the wrapped array. The shape must not change.
    pub fn data_mut(&mut self) -> &mut ArrayD<E> {
        &mut self.data
    }
}

impl<E: Clone + Zero> NdArray<E> {
    /// Array of the given shape filled with zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    /// Array of the given shape filled with `value`.
    pub fn full(shape: &[usize], value: E) -> Self {
        Self {
            data: ArrayD::from_elem(IxDyn(shape), value),
        }
    }

    fn take(&mut self) -> ArrayD<E> {
        std::mem::replace(&mut self.data, ArrayD::zeros(IxDyn(&[0])))
    }
}

impl<E> From<ArrayD<E>> for NdArray<E> {
    fn from(data: ArrayD<E>) -> Self {
        Self { data }
    }
}

impl<E: Clone + Zero> DataArray for NdArray<E> {
    fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    fn create(&self, shape: &[usize]) -> Self {
        Self::zeros(shape)
    }

    fn copy(&self) -> Self {
        self.clone()
    }

    fn reshape(&mut self, shape: &[usize]) {
        let data = self.take();
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        self.data = data
            .into_shape_with_order(IxDyn(shape))
            .unwrap_or_else(|err| panic!("invalid reshape to {shape:?}: {err}"));
    }

    fn permute_axes(&mut self, axes: &[usize]) {
        let data = self.take();
        self.data = data.permuted_axes(IxDyn(axes));
    }

    fn move_samples_from(&mut self, input: &Self, samples: &[SampleMapping], properties: Range<usize>) {
        let property_axis = Axis(self.data.ndim() - 2);
        for mapping in samples {
            let source = input.data.index_axis(Axis(0), mapping.input);
            let mut destination = self.data.index_axis_mut(Axis(0), mapping.output);
            destination
                .slice_axis_mut(property_axis, Slice::from(properties.clone()))
                .assign(&source);
        }
    }

    fn select_properties(&self, properties: &[usize]) -> Self {
        let last = Axis(self.data.ndim() - 1);
        Self::from_raw(self.data.select(last, properties))
    }
}

/// Wraps `array` in a block with generic metadata: samples `sample`, components
/// `component_1`, `component_2`, ... and properties `property`, each numbered from zero.
///
/// Fails with [`Error::DimensionMismatch`] if the array has less than two axes.
pub fn block_from_array<E: Clone + Zero>(array: ArrayD<E>) -> Result<Block<NdArray<E>>> {
    let shape = array.shape().to_vec();
    if shape.len() < 2 {
        return Err(Error::DimensionMismatch(format!(
            "the array must have at least two axes to become a block, got {}",
            shape.len()
        )));
    }

    let samples = Labels::range("sample", shape[0])?;
    let components = shape[1..shape.len() - 1]
        .iter()
        .enumerate()
        .map(|(i, &size)| Labels::range(&format!("component_{}", i + 1), size))
        .collect::<Result<Vec<_>>>()?;
    let properties = Labels::range("property", shape[shape.len() - 1])?;

    tracing::trace!(shape = ?shape, "block from array");
    Block::new(NdArray::from(array), samples, components, properties)
}
