//! Blocks: values annotated with samples, components and properties, plus gradients.

use std::{collections::BTreeMap, fmt};

use crate::{
    array::DataArray,
    error::{Error, Result},
    labels::Labels,
    ownership::{OwnerId, Ownership},
};

/// A block of data: an array of values whose first axis is described by `samples`, last
/// axis by `properties` and axes in between by `components`.
///
/// A block can carry gradients with respect to named parameters. Each gradient is itself
/// a block, whose first sample dimension (`"sample"`) refers to a sample of this block.
pub struct Block<A> {
    id: OwnerId,
    ownership: Ownership,
    values: A,
    samples: Labels,
    components: Vec<Labels>,
    properties: Labels,
    gradients: BTreeMap<String, Block<A>>,
}

impl<A: DataArray> Block<A> {
    /// Creates a block without gradients.
    ///
    /// Fails with [`Error::DimensionMismatch`] if `values` does not have one axis per
    /// labels, if an axis length differs from the number of entries of its labels, or if
    /// a component labels has more than one dimension. Two components with the same name
    /// fail with [`Error::InvalidName`].
    pub fn new(
        values: A,
        samples: Labels,
        components: Vec<Labels>,
        properties: Labels,
    ) -> Result<Self> {
        check_shape(values.shape(), &samples, &components, &properties)?;
        Ok(Self {
            id: OwnerId::new(),
            ownership: Ownership::Unowned,
            values,
            samples,
            components,
            properties,
            gradients: BTreeMap::new(),
        })
    }

    /// Attaches `gradient` as the gradient with respect to `parameter`.
    ///
    /// The gradient must have the same properties as this block, its first sample
    /// dimension must be called `"sample"` and index the samples of this block, and its
    /// components must end with the components of this block.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateEntry`] if there is already a gradient for `parameter`;
    /// - [`Error::OwnershipViolation`] if `gradient` already lives in another container;
    /// - [`Error::NotImplemented`] if `gradient` has gradients of its own;
    /// - [`Error::DimensionMismatch`] if the metadata of `gradient` do not fit this block;
    /// - [`Error::NotFound`] if a gradient sample refers to a sample this block lacks.
    pub fn add_gradient(&mut self, parameter: &str, mut gradient: Block<A>) -> Result<()> {
        if self.gradients.contains_key(parameter) {
            return Err(Error::DuplicateEntry(format!(
                "gradient with respect to '{parameter}' already exists for this block"
            )));
        }

        if gradient.ownership.is_owned() {
            return Err(Error::OwnershipViolation(format!(
                "the gradient block for '{parameter}' is already inside a tensor map or \
                 another block, use `copy()` to get an unowned block"
            )));
        }

        if !gradient.gradients.is_empty() {
            return Err(Error::NotImplemented(format!(
                "gradients of gradients are not supported (the gradient block for \
                 '{parameter}' has gradients)"
            )));
        }

        if gradient.properties != self.properties {
            return Err(Error::DimensionMismatch(format!(
                "the gradient block for '{parameter}' must have the same properties as the \
                 values block"
            )));
        }

        if gradient.samples.names().first().map(String::as_str) != Some("sample") {
            return Err(Error::DimensionMismatch(format!(
                "the first dimension of gradient samples must be 'sample', got {:?} for \
                 '{parameter}'",
                gradient.samples.names()
            )));
        }

        let n_samples = self.samples.count();
        for entry in gradient.samples.iter() {
            let sample = entry.values()[0];
            if sample < 0 || sample as usize >= n_samples {
                return Err(Error::NotFound(format!(
                    "gradient sample {} for '{parameter}' refers to sample {sample}, but the \
                     values block only has {n_samples} samples",
                    entry.print()
                )));
            }
        }

        let extra = gradient.components.len().checked_sub(self.components.len());
        match extra {
            Some(extra) if gradient.components[extra..] == self.components[..] => {}
            _ => {
                return Err(Error::DimensionMismatch(format!(
                    "the components of the gradient block for '{parameter}' must end with the \
                     components of the values block"
                )))
            }
        }

        gradient.ownership = Ownership::OwnedBy(self.id);
        self.gradients.insert(parameter.to_string(), gradient);
        Ok(())
    }

    /// Deep copy of the values, metadata and gradients. The copy is unowned.
    pub fn copy(&self) -> Self {
        let id = OwnerId::new();
        let gradients = self
            .gradients
            .iter()
            .map(|(parameter, gradient)| {
                let mut gradient = gradient.copy();
                gradient.ownership = Ownership::OwnedBy(id);
                (parameter.clone(), gradient)
            })
            .collect();

        Self {
            id,
            ownership: Ownership::Unowned,
            values: self.values.copy(),
            samples: self.samples.clone(),
            components: self.components.clone(),
            properties: self.properties.clone(),
            gradients,
        }
    }

    pub(crate) fn set_ownership(&mut self, ownership: Ownership) {
        self.ownership = ownership;
    }
}

impl<A> Block<A> {
    /// Values of the block.
    pub fn values(&self) -> &A {
        &self.values
    }

    /// Metadata of the first axis.
    pub fn samples(&self) -> &Labels {
        &self.samples
    }

    /// Metadata of the axes between samples and properties.
    pub fn components(&self) -> &[Labels] {
        &self.components
    }

    /// Metadata of the last axis.
    pub fn properties(&self) -> &Labels {
        &self.properties
    }

    /// Current ownership of this block.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Gradient with respect to `parameter`, if any.
    pub fn gradient(&self, parameter: &str) -> Option<&Block<A>> {
        self.gradients.get(parameter)
    }

    /// Whether there is a gradient with respect to `parameter`.
    pub fn has_gradient(&self, parameter: &str) -> bool {
        self.gradients.contains_key(parameter)
    }

    /// Parameters of all gradients, sorted.
    pub fn gradients_list(&self) -> Vec<&str> {
        self.gradients.keys().map(String::as_str).collect()
    }

    /// Iterates over `(parameter, gradient)` pairs, sorted by parameter.
    pub fn gradients(&self) -> impl ExactSizeIterator<Item = (&str, &Block<A>)> + '_ {
        self.gradients.iter().map(|(p, g)| (p.as_str(), g))
    }

    /// Names of the sample, component and property dimensions, used to check that the
    /// blocks of a tensor map agree.
    pub(crate) fn metadata_names(&self) -> (&[String], Vec<&str>, &[String]) {
        (
            self.samples.names(),
            self.components
                .iter()
                .flat_map(|c| c.names().iter().map(String::as_str))
                .collect(),
            self.properties.names(),
        )
    }
}

/// Copies the values, metadata and gradients while keeping the same identity and
/// ownership: a clone of a block inside a tensor map is owned too and can not be
/// inserted elsewhere. Use [`Block::copy`] to get a free-standing block.
impl<A: DataArray> Clone for Block<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            ownership: self.ownership,
            values: self.values.copy(),
            samples: self.samples.clone(),
            components: self.components.clone(),
            properties: self.properties.clone(),
            gradients: self.gradients.clone(),
        }
    }
}

fn check_shape(
    shape: &[usize],
    samples: &Labels,
    components: &[Labels],
    properties: &Labels,
) -> Result<()> {
    if shape.len() != components.len() + 2 {
        return Err(Error::DimensionMismatch(format!(
            "values have {} axes, but there are labels for {} axes ({} components)",
            shape.len(),
            components.len() + 2,
            components.len()
        )));
    }

    if shape[0] != samples.count() {
        return Err(Error::DimensionMismatch(format!(
            "values have {} samples, but the sample labels contain {} entries",
            shape[0],
            samples.count()
        )));
    }

    for (i, component) in components.iter().enumerate() {
        if component.size() != 1 {
            return Err(Error::DimensionMismatch(format!(
                "component labels must have a single dimension, got {:?} for component {i}",
                component.names()
            )));
        }
        let name = &component.names()[0];
        if components[..i].iter().any(|c| c.names()[0] == *name) {
            return Err(Error::InvalidName {
                name: name.clone(),
                reason: "component names must be unique within a block",
            });
        }
        if shape[i + 1] != component.count() {
            return Err(Error::DimensionMismatch(format!(
                "axis {} of values has length {}, but the labels of component '{name}' \
                 contain {} entries",
                i + 1,
                shape[i + 1],
                component.count()
            )));
        }
    }

    let last = shape[shape.len() - 1];
    if last != properties.count() {
        return Err(Error::DimensionMismatch(format!(
            "values have {last} properties, but the property labels contain {} entries",
            properties.count()
        )));
    }

    Ok(())
}

fn quoted(names: &[String]) -> String {
    let names: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    format!("[{}]", names.join(", "))
}

impl<A> fmt::Display for Block<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let component_sizes: Vec<String> = self
            .components
            .iter()
            .map(|c| c.count().to_string())
            .collect();
        let component_names: Vec<String> = self
            .components
            .iter()
            .flat_map(|c| c.names().iter().cloned())
            .collect();

        writeln!(f, "TensorBlock")?;
        writeln!(
            f,
            "    samples ({}): {}",
            self.samples.count(),
            quoted(self.samples.names())
        )?;
        writeln!(
            f,
            "    components ({}): {}",
            component_sizes.join(", "),
            quoted(&component_names)
        )?;
        writeln!(
            f,
            "    properties ({}): {}",
            self.properties.count(),
            quoted(self.properties.names())
        )?;
        if self.gradients.is_empty() {
            write!(f, "    gradients: None")
        } else {
            let parameters: Vec<String> = self.gradients.keys().cloned().collect();
            write!(f, "    gradients: {}", quoted(&parameters))
        }
    }
}

impl<A> fmt::Debug for Block<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
