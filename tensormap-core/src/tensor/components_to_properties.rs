use super::TensorMap;
use crate::{
    array::DataArray,
    block::Block,
    error::{Error, Result},
    labels::{check_names, Labels},
};

impl<A: DataArray> TensorMap<A> {
    /// Moves the component axes named `dimensions` into the properties of every block.
    ///
    /// The new properties are the outer product of the moved components (in the order of
    /// `dimensions`) and of the existing properties. Gradients are transformed the same
    /// way. An empty `dimensions` returns a copy.
    #[tracing::instrument(skip_all, fields(dimensions = ?dimensions))]
    pub fn components_to_properties(&self, dimensions: &[&str]) -> Result<TensorMap<A>> {
        let dimensions = check_names(dimensions.iter().map(|d| d.to_string()).collect())?;
        let blocks = self
            .blocks
            .iter()
            .map(|block| move_components(block, &dimensions))
            .collect::<Result<Vec<_>>>()?;
        TensorMap::new(self.keys.clone(), blocks)
    }
}

fn move_components<A: DataArray>(block: &Block<A>, dimensions: &[String]) -> Result<Block<A>> {
    if dimensions.is_empty() {
        return Ok(block.copy());
    }

    let moved = dimensions
        .iter()
        .map(|name| {
            block
                .components()
                .iter()
                .position(|c| c.names()[0] == *name)
                .ok_or_else(|| {
                    Error::NotFound(format!("'{name}' is not one of the components of the block"))
                })
        })
        .collect::<Result<Vec<_>>>()?;
    let kept: Vec<usize> = (0..block.components().len())
        .filter(|i| !moved.contains(i))
        .collect();

    let mut factors: Vec<&Labels> = moved.iter().map(|&i| &block.components()[i]).collect();
    factors.push(block.properties());
    let properties = Labels::product(&factors)?;
    let components: Vec<Labels> = kept
        .iter()
        .map(|&i| block.components()[i].clone())
        .collect();

    let values = move_axes(block.values(), 0, &kept, &moved, properties.count());
    let mut new_block = Block::new(
        values,
        block.samples().clone(),
        components.clone(),
        properties.clone(),
    )?;

    for (parameter, gradient) in block.gradients() {
        // gradients may have extra components in front of the ones of the block
        let extra = gradient.components().len() - block.components().len();
        let mut gradient_components = gradient.components()[..extra].to_vec();
        gradient_components.extend(components.iter().cloned());

        let values = move_axes(gradient.values(), extra, &kept, &moved, properties.count());
        let gradient = Block::new(
            values,
            gradient.samples().clone(),
            gradient_components,
            properties.clone(),
        )?;
        new_block.add_gradient(parameter, gradient)?;
    }

    Ok(new_block)
}

/// Copy of `values` with the component axes `moved` (counted after `extra` leading
/// components) merged into the property axis.
fn move_axes<A: DataArray>(
    values: &A,
    extra: usize,
    kept: &[usize],
    moved: &[usize],
    n_properties: usize,
) -> A {
    let shape = values.shape();
    let property_axis = shape.len() - 1;

    let mut axes: Vec<usize> = (0..=extra).collect();
    axes.extend(kept.iter().map(|&i| i + extra + 1));
    axes.extend(moved.iter().map(|&i| i + extra + 1));
    axes.push(property_axis);

    let mut new_shape: Vec<usize> = axes[..axes.len() - moved.len() - 1]
        .iter()
        .map(|&axis| shape[axis])
        .collect();
    new_shape.push(n_properties);

    let mut values = values.copy();
    values.permute_axes(&axes);
    values.reshape(&new_shape);
    values
}
