//! Contract between the tensor map engine and the storage of block values.
//!
//! The engine never looks at the numbers inside a block: everything it needs to merge,
//! split and reshape blocks goes through [`DataArray`].

use std::ops::Range;

/// Where a sample (first-axis row) goes when moving data between arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleMapping {
    /// row in the source array
    pub input: usize,
    /// row in the destination array
    pub output: usize,
}

/// Storage for the values of a block: an n-dimensional array whose first axis is the
/// samples, last axis the properties, and the axes in between the components.
///
/// The engine validates shapes before calling any of these methods. Implementations may
/// panic when the documented preconditions do not hold.
pub trait DataArray: Sized {
    /// Shape of the array.
    fn shape(&self) -> &[usize];

    /// New array with the same element type and the given shape, filled with zeros
    /// (the additive identity of the element type).
    fn create(&self, shape: &[usize]) -> Self;

    /// Independent deep copy.
    fn copy(&self) -> Self;

    /// Row-major reshape. The number of elements is unchanged.
    fn reshape(&mut self, shape: &[usize]);

    /// Reorders the axes, new axis `i` being the old axis `axes[i]`.
    fn permute_axes(&mut self, axes: &[usize]);

    /// Copies whole samples from `input` into `self`.
    ///
    /// For each mapping, the sample `input` of the source (every component and property)
    /// lands in the sample `output` of `self`, with the source properties written in the
    /// `properties` range of `self`. Both arrays have the same component axes.
    fn move_samples_from(&mut self, input: &Self, samples: &[SampleMapping], properties: Range<usize>);

    /// New array keeping only the given properties (positions along the last axis), in
    /// the given order.
    fn select_properties(&self, properties: &[usize]) -> Self;
}
