use std::fmt;

use super::{check_names, print_table, Labels, Row};
use crate::error::{Error, Result};

/// Read-only projection of some dimensions of a [`Labels`], in a chosen order.
///
/// A view borrows the labels it projects. Its entries are not guaranteed to be unique, so
/// it has no hash index: [`position`](LabelsView::position), [`contains`](LabelsView::contains)
/// and the set operations fail with [`Error::InvalidOperationOnView`].
/// [`to_owned`](LabelsView::to_owned) turns the view back into labels.
#[derive(Clone)]
pub struct LabelsView<'a> {
    labels: &'a Labels,
    names: Vec<String>,
    columns: Vec<usize>,
}

impl<'a> LabelsView<'a> {
    pub(super) fn new(labels: &'a Labels, names: &[&str]) -> Result<Self> {
        let names = names
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>();
        let names = check_names(names).map_err(|err| match err {
            Error::InvalidName { name, .. } => Error::InvalidName {
                name,
                reason: "a dimension can only appear once in a view",
            },
            err => err,
        })?;

        let columns = names
            .iter()
            .map(|name| {
                labels.dimension(name).ok_or_else(|| {
                    Error::NotFound(format!(
                        "'{name}' is not part of the dimensions {:?}",
                        labels.names()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            labels,
            names,
            columns,
        })
    }

    /// Names of the projected dimensions, in the view order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of projected dimensions.
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    /// Number of entries, the same as the projected labels.
    pub fn count(&self) -> usize {
        self.labels.count()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Projected values of the entry at `index`.
    ///
    /// # Panics
    ///
    /// If `index >= self.count()`.
    pub fn row(&self, index: usize) -> Row {
        let row = self.labels.row(index);
        self.columns.iter().map(|&c| row[c]).collect()
    }

    /// Iterates over the projected entries.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Row> + '_ {
        (0..self.count()).map(|i| self.row(i))
    }

    /// All projected values, row-major.
    pub fn values(&self) -> Vec<i32> {
        self.iter().flatten().collect()
    }

    /// Not available on views.
    pub fn position(&self, _entry: impl AsRef<[i32]>) -> Result<Option<usize>> {
        Err(Error::InvalidOperationOnView("position"))
    }

    /// Not available on views.
    pub fn contains(&self, _entry: impl AsRef<[i32]>) -> Result<bool> {
        Err(Error::InvalidOperationOnView("contains"))
    }

    /// Not available on views.
    pub fn union(&self, _other: &Labels) -> Result<Labels> {
        Err(Error::InvalidOperationOnView("union"))
    }

    /// Not available on views.
    pub fn union_with_mapping(&self, _other: &Labels) -> Result<(Labels, Vec<usize>, Vec<usize>)> {
        Err(Error::InvalidOperationOnView("union_with_mapping"))
    }

    /// Not available on views.
    pub fn intersection(&self, _other: &Labels) -> Result<Labels> {
        Err(Error::InvalidOperationOnView("intersection"))
    }

    /// Not available on views.
    pub fn intersection_with_mapping(
        &self,
        _other: &Labels,
    ) -> Result<(Labels, Vec<Option<usize>>, Vec<Option<usize>>)> {
        Err(Error::InvalidOperationOnView("intersection_with_mapping"))
    }

    /// Copies the projected entries into new labels.
    ///
    /// Fails with [`Error::DuplicateEntry`] if the projection contains the same entry twice,
    /// and with [`Error::DimensionMismatch`] if the view has no dimensions but the labels
    /// have entries.
    pub fn to_owned(&self) -> Result<Labels> {
        Labels::build(self.names.clone(), self.values(), self.count())
    }

    /// Same as [`Labels::print`] on the projected dimensions.
    pub fn print(&self, max_entries: isize, indent: usize) -> String {
        print_table(
            &self.names,
            self.count(),
            |i, d| self.labels.row(i)[self.columns[d]],
            max_entries,
            indent,
        )
    }
}

impl fmt::Display for LabelsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelsView(\n   {}\n)", self.print(4, 3))
    }
}

impl fmt::Debug for LabelsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelsView(\n   {}\n)", self.print(-1, 3))
    }
}
