use std::fmt;

use super::TensorMap;
use crate::{
    block::Block,
    error::{Error, Result},
    labels::{Labels, LabelsEntry},
};

/// The different ways of pointing at blocks of a [`TensorMap`].
///
/// Everything except `Index` is a partial key: the blocks selected are those whose keys
/// have the given values for the given dimensions.
#[derive(Debug, Clone)]
pub enum Selection<'a> {
    /// Position of a block.
    Index(usize),
    /// Labels with a single entry.
    Labels(&'a Labels),
    /// A key entry, possibly from another labels.
    Entry(LabelsEntry<'a>),
    /// Dimension names and their values, in order.
    Map(Vec<(&'a str, i64)>),
}

/// Builds a [`Selection::Map`] from `name => value` pairs.
///
/// ```
/// # use tensormap_core::{sel, tensor::Selection};
/// let selection = sel!["key_1" => 0, "key_2" => 3];
/// assert!(matches!(selection, Selection::Map(_)));
/// ```
#[macro_export]
macro_rules! sel {
    ( $( $name:expr => $value:expr ),* $(,)? ) => {{
        let pairs: ::std::vec::Vec<(&str, i64)> = ::std::vec![$( ($name, $value) ),*];
        $crate::tensor::Selection::Map(pairs)
    }};
}

impl From<usize> for Selection<'_> {
    fn from(index: usize) -> Self {
        Selection::Index(index)
    }
}

impl<'a> From<&'a Labels> for Selection<'a> {
    fn from(labels: &'a Labels) -> Self {
        Selection::Labels(labels)
    }
}

impl<'a> From<LabelsEntry<'a>> for Selection<'a> {
    fn from(entry: LabelsEntry<'a>) -> Self {
        Selection::Entry(entry)
    }
}

impl<'a> From<Vec<(&'a str, i64)>> for Selection<'a> {
    fn from(pairs: Vec<(&'a str, i64)>) -> Self {
        Selection::Map(pairs)
    }
}

impl<'a, const N: usize> From<[(&'a str, i64); N]> for Selection<'a> {
    fn from(pairs: [(&'a str, i64); N]) -> Self {
        Selection::Map(pairs.to_vec())
    }
}

impl fmt::Display for Selection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Index(index) => write!(f, "index {index}"),
            Selection::Labels(labels) => match labels.entry(0) {
                Some(entry) if labels.count() == 1 => f.write_str(&entry.print()),
                _ => write!(f, "labels with {} entries", labels.count()),
            },
            Selection::Entry(entry) => f.write_str(&entry.print()),
            Selection::Map(pairs) => {
                let fields: Vec<String> = pairs
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect();
                write!(f, "({})", fields.join(", "))
            }
        }
    }
}

impl Selection<'_> {
    /// Positions of the blocks of `tensor` selected by `self`.
    fn resolve<A>(&self, tensor: &TensorMap<A>) -> Result<Vec<usize>> {
        match self {
            Selection::Index(index) => {
                tensor.block_by_id(*index)?;
                Ok(vec![*index])
            }
            Selection::Labels(labels) => tensor.blocks_matching(labels),
            Selection::Entry(entry) => {
                let labels = Labels::from_raw(entry.names().to_vec(), entry.values().to_vec())?;
                tensor.blocks_matching(&labels)
            }
            Selection::Map(pairs) => {
                let names: Vec<&str> = pairs.iter().map(|(name, _)| *name).collect();
                let values: Vec<i64> = pairs.iter().map(|(_, value)| *value).collect();
                let labels = Labels::new(&names, [values])?;
                tensor.blocks_matching(&labels)
            }
        }
    }
}

impl<A> TensorMap<A> {
    /// Positions of the blocks whose keys match `selection` on the dimensions it names.
    ///
    /// `selection` must contain exactly one entry ([`Error::DimensionMismatch`] otherwise),
    /// and its dimensions must be key dimensions ([`Error::NotFound`] otherwise).
    pub fn blocks_matching(&self, selection: &Labels) -> Result<Vec<usize>> {
        if selection.count() != 1 {
            return Err(Error::DimensionMismatch(format!(
                "block selection labels must contain a single entry, got {}",
                selection.count()
            )));
        }

        let columns = selection
            .names()
            .iter()
            .map(|name| {
                self.keys.dimension(name).ok_or_else(|| {
                    Error::NotFound(format!(
                        "'{name}' is not part of the keys {:?}",
                        self.keys.names()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let wanted = selection.row(0);
        Ok((0..self.keys.count())
            .filter(|&i| {
                let key = self.keys.row(i);
                columns.iter().zip(wanted).all(|(&c, &v)| key[c] == v)
            })
            .collect())
    }

    /// The single block matching `selection`.
    ///
    /// Fails with [`Error::NotFound`] when no block matches and with [`Error::Ambiguous`]
    /// when more than one does.
    pub fn block<'s>(&self, selection: impl Into<Selection<'s>>) -> Result<&Block<A>> {
        let selection = selection.into();
        match selection.resolve(self)?.as_slice() {
            [] => Err(Error::NotFound(format!(
                "no block matches the selection {selection}"
            ))),
            [index] => Ok(&self.blocks[*index]),
            matching => Err(Error::Ambiguous(format!(
                "{} blocks match the selection {selection}, use `blocks` to get all of them",
                matching.len()
            ))),
        }
    }

    /// All blocks matching `selection`, or every block when `selection` is `None`.
    pub fn blocks<'s>(&self, selection: impl Into<Option<Selection<'s>>>) -> Result<Vec<&Block<A>>> {
        match selection.into() {
            None => Ok(self.blocks.iter().collect()),
            Some(selection) => Ok(selection
                .resolve(self)?
                .into_iter()
                .map(|i| &self.blocks[i])
                .collect()),
        }
    }
}
