//! Labels: immutable sets of unique, named integer tuples used as axis metadata.
//!
//! A [`Labels`] owns its values and keeps a hash index from each entry to its position.
//! [`LabelsView`] is a borrowed column projection without that index, and
//! [`LabelsEntry`] is a single row of either.

mod entry;
mod print;
mod view;

use std::{collections::HashMap, fmt, sync::Arc};

use num_traits::PrimInt;
use smallvec::SmallVec;

use crate::error::{Error, Result};

pub use entry::LabelsEntry;
pub use view::LabelsView;

pub(crate) use print::print_table;

/// One entry of a labels, stored inline for the common case of few dimensions.
pub(crate) type Row = SmallVec<[i32; 4]>;

/// Immutable set of unique entries, each entry being a tuple of `i32` tagged with
/// dimension names.
///
/// Cloning is cheap: the names, values and position index are shared.
#[derive(Clone)]
pub struct Labels {
    inner: Arc<LabelsInner>,
}

struct LabelsInner {
    names: Vec<String>,
    /// row-major, `count * names.len()` values
    values: Vec<i32>,
    count: usize,
    positions: HashMap<Row, usize>,
}

impl Labels {
    /// Creates labels with the given dimension `names` and one entry per item of `entries`.
    ///
    /// Fails with [`Error::DimensionMismatch`] if an entry does not have one value per
    /// name or if there are entries but no names, [`Error::TypeMismatch`] if a value does not fit in an `i32`, and
    /// [`Error::DuplicateEntry`] if the same entry is given twice.
    ///
    /// ```
    /// # use tensormap_core::labels::Labels;
    /// let labels = Labels::new(&["structure", "center"], [[0, 1], [0, 2], [1, 0]])?;
    /// assert_eq!(labels.count(), 3);
    /// assert_eq!(labels.position([0, 2]), Some(1));
    /// # Ok::<(), tensormap_core::error::Error>(())
    /// ```
    pub fn new<T, R>(names: &[&str], entries: impl IntoIterator<Item = R>) -> Result<Self>
    where
        T: PrimInt + fmt::Display,
        R: AsRef<[T]>,
    {
        let names = check_names(names.iter().map(|n| n.to_string()).collect())?;
        let mut values = Vec::new();
        let mut count = 0;
        for entry in entries {
            let entry = entry.as_ref();
            if entry.len() != names.len() {
                return Err(Error::DimensionMismatch(format!(
                    "entry {count} has {} values, but there are {} dimensions",
                    entry.len(),
                    names.len()
                )));
            }
            for value in entry {
                let value = value.to_i32().ok_or_else(|| {
                    Error::TypeMismatch(format!(
                        "value {value} in entry {count} does not fit in a 32-bit integer"
                    ))
                })?;
                values.push(value);
            }
            count += 1;
        }
        Self::build(names, values, count)
    }

    /// Creates labels from dimension names and a flat, row-major array of values.
    ///
    /// With no names, `values` must be empty and the labels have no entries.
    pub fn from_raw(names: Vec<String>, values: Vec<i32>) -> Result<Self> {
        let names = check_names(names)?;
        let count = match names.len() {
            0 if values.is_empty() => 0,
            0 => {
                return Err(Error::DimensionMismatch(
                    "labels without dimensions can not contain values".into(),
                ))
            }
            size if values.len() % size != 0 => {
                return Err(Error::DimensionMismatch(format!(
                    "{} values can not be split in entries of {size} dimensions",
                    values.len()
                )))
            }
            size => values.len() / size,
        };
        Self::build(names, values, count)
    }

    /// Labels with the given dimension names and no entries.
    pub fn empty(names: &[&str]) -> Result<Self> {
        let names = check_names(names.iter().map(|n| n.to_string()).collect())?;
        Ok(Self::from_unique(names, Vec::new(), 0))
    }

    /// Labels with a single dimension named `_` and a single entry `0`, used as the
    /// keys of a tensor map with a single block.
    pub fn single() -> Self {
        Self::from_unique(vec!["_".to_string()], vec![0], 1)
    }

    /// Labels with a single dimension `name` and entries `0..end`.
    pub fn range(name: &str, end: usize) -> Result<Self> {
        let end = i32::try_from(end).map_err(|_| {
            Error::TypeMismatch(format!("range end {end} does not fit in a 32-bit integer"))
        })?;
        let names = check_names(vec![name.to_string()])?;
        Ok(Self::from_unique(names, (0..end).collect(), end as usize))
    }

    /// Outer product of `factors`: names are concatenated, and the entries are every
    /// combination of entries with the first factor varying slowest. Without any
    /// dimension the product has no entries.
    ///
    /// Fails with [`Error::InvalidName`] if two factors share a dimension name.
    pub fn product(factors: &[&Labels]) -> Result<Self> {
        let names = check_names(
            factors
                .iter()
                .flat_map(|labels| labels.names().iter().cloned())
                .collect(),
        )?;

        let count = if names.is_empty() {
            0
        } else {
            factors.iter().map(|labels| labels.count()).product::<usize>()
        };
        let mut values = Vec::with_capacity(count * names.len());
        let mut indices = vec![0; factors.len()];
        for _ in 0..count {
            for (labels, &i) in factors.iter().zip(&indices) {
                values.extend_from_slice(labels.row(i));
            }
            // odometer increment, last factor fastest
            for (index, labels) in indices.iter_mut().zip(factors).rev() {
                *index += 1;
                if *index < labels.count() {
                    break;
                }
                *index = 0;
            }
        }

        Ok(Self::from_unique(names, values, count))
    }

    /// Builds labels from entries already known to be unique and names already checked.
    pub(crate) fn from_unique(names: Vec<String>, values: Vec<i32>, count: usize) -> Self {
        let size = names.len();
        let mut positions = HashMap::with_capacity(count);
        for i in 0..count {
            let previous = positions.insert(Row::from_slice(&values[i * size..(i + 1) * size]), i);
            debug_assert!(previous.is_none(), "duplicated entry in from_unique");
        }
        Self {
            inner: Arc::new(LabelsInner {
                names,
                values,
                count,
                positions,
            }),
        }
    }

    /// Builds labels from a list of entries known to be unique.
    pub(crate) fn from_rows(names: Vec<String>, rows: &[Row]) -> Self {
        let values = rows.iter().flatten().copied().collect();
        Self::from_unique(names, values, rows.len())
    }

    fn build(names: Vec<String>, values: Vec<i32>, count: usize) -> Result<Self> {
        let size = names.len();
        if size == 0 && count != 0 {
            return Err(Error::DimensionMismatch(
                "labels without dimensions can not contain entries".into(),
            ));
        }
        let mut positions = HashMap::with_capacity(count);
        for i in 0..count {
            let row = &values[i * size..(i + 1) * size];
            if let Some(first) = positions.insert(Row::from_slice(row), i) {
                return Err(Error::DuplicateEntry(format!(
                    "{} is present at positions {first} and {i}",
                    LabelsEntry::new(&names, row).print()
                )));
            }
        }
        tracing::trace!(dimensions = size, entries = count, "created labels");
        Ok(Self {
            inner: Arc::new(LabelsInner {
                names,
                values,
                count,
                positions,
            }),
        })
    }

    /// Names of the dimensions.
    pub fn names(&self) -> &[String] {
        &self.inner.names
    }

    /// Number of dimensions.
    pub fn size(&self) -> usize {
        self.inner.names.len()
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.inner.count
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.count == 0
    }

    /// All values, row-major.
    pub fn values(&self) -> &[i32] {
        &self.inner.values
    }

    /// Values of the entry at `index`.
    ///
    /// # Panics
    ///
    /// If `index >= self.count()`.
    pub fn row(&self, index: usize) -> &[i32] {
        assert!(index < self.count(), "entry {index} out of bounds");
        let size = self.size();
        &self.inner.values[index * size..(index + 1) * size]
    }

    /// Entry at `index`, if any.
    pub fn entry(&self, index: usize) -> Option<LabelsEntry<'_>> {
        (index < self.count()).then(|| LabelsEntry::new(self.names(), self.row(index)))
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = LabelsEntry<'_>> + '_ {
        (0..self.count()).map(|i| LabelsEntry::new(self.names(), self.row(i)))
    }

    /// Index of the dimension called `name`.
    pub fn dimension(&self, name: &str) -> Option<usize> {
        self.names().iter().position(|n| n == name)
    }

    /// Values of the dimension `name`, one per entry.
    pub fn column(&self, name: &str) -> Result<Vec<i32>> {
        let d = self
            .dimension(name)
            .ok_or_else(|| Error::NotFound(format!("no dimension named '{name}' in labels")))?;
        Ok((0..self.count()).map(|i| self.row(i)[d]).collect())
    }

    /// Position of the entry with the given values, using the hash index.
    pub fn position(&self, entry: impl AsRef<[i32]>) -> Option<usize> {
        self.inner.positions.get(entry.as_ref()).copied()
    }

    /// Whether an entry with the given values exists.
    pub fn contains(&self, entry: impl AsRef<[i32]>) -> bool {
        self.position(entry).is_some()
    }

    /// Projects the dimensions `names`, in that order.
    ///
    /// Fails with [`Error::NotFound`] if a name is not a dimension of these labels and with
    /// [`Error::InvalidName`] if a name is repeated.
    pub fn view<'a>(&'a self, names: &[&str]) -> Result<LabelsView<'a>> {
        LabelsView::new(self, names)
    }

    /// Union of both labels: all entries of `self`, then the entries of `other` not
    /// present in `self`.
    pub fn union(&self, other: &Labels) -> Result<Labels> {
        self.union_with_mapping(other).map(|(union, _, _)| union)
    }

    /// Same as [`Labels::union`], also returning the position in the union of every entry
    /// of `self` and of `other`.
    pub fn union_with_mapping(&self, other: &Labels) -> Result<(Labels, Vec<usize>, Vec<usize>)> {
        self.check_same_names(other, "union")?;

        let mut values = self.values().to_vec();
        let mut count = self.count();
        let first_mapping = (0..self.count()).collect();
        let mut second_mapping = Vec::with_capacity(other.count());
        for entry in other.iter() {
            match self.position(entry) {
                Some(position) => second_mapping.push(position),
                None => {
                    values.extend_from_slice(entry.values());
                    second_mapping.push(count);
                    count += 1;
                }
            }
        }

        let union = Labels::from_unique(self.names().to_vec(), values, count);
        Ok((union, first_mapping, second_mapping))
    }

    /// Entries present in both labels, in the order they appear in `self`.
    pub fn intersection(&self, other: &Labels) -> Result<Labels> {
        self.intersection_with_mapping(other)
            .map(|(intersection, _, _)| intersection)
    }

    /// Same as [`Labels::intersection`], also returning for every entry of `self` and of
    /// `other` its position in the intersection, or `None` when it is not part of it.
    pub fn intersection_with_mapping(
        &self,
        other: &Labels,
    ) -> Result<(Labels, Vec<Option<usize>>, Vec<Option<usize>>)> {
        self.check_same_names(other, "intersection")?;

        let mut values = Vec::new();
        let mut count = 0;
        let mut first_mapping = vec![None; self.count()];
        let mut second_mapping = vec![None; other.count()];
        for (i, entry) in self.iter().enumerate() {
            if let Some(j) = other.position(entry) {
                values.extend_from_slice(entry.values());
                first_mapping[i] = Some(count);
                second_mapping[j] = Some(count);
                count += 1;
            }
        }

        let intersection = Labels::from_unique(self.names().to_vec(), values, count);
        Ok((intersection, first_mapping, second_mapping))
    }

    fn check_same_names(&self, other: &Labels, operation: &str) -> Result<()> {
        if self.names() != other.names() {
            return Err(Error::DimensionMismatch(format!(
                "can not take the {operation} of labels with different names: {:?} and {:?}",
                self.names(),
                other.names()
            )));
        }
        Ok(())
    }

    /// Renders the labels as a table with centered columns.
    ///
    /// At most `max_entries` entries are shown (all of them if `max_entries` is negative),
    /// and every line but the first is indented by `indent` spaces.
    pub fn print(&self, max_entries: isize, indent: usize) -> String {
        print_table(
            self.names(),
            self.count(),
            |i, d| self.row(i)[d],
            max_entries,
            indent,
        )
    }
}

/// Checks that every name is non-empty and unique.
pub(crate) fn check_names(names: Vec<String>) -> Result<Vec<String>> {
    for (i, name) in names.iter().enumerate() {
        if name.is_empty() {
            return Err(Error::InvalidName {
                name: name.clone(),
                reason: "dimension names can not be empty",
            });
        }
        if names[..i].contains(name) {
            return Err(Error::InvalidName {
                name: name.clone(),
                reason: "dimension name is used more than once",
            });
        }
    }
    Ok(names)
}

impl PartialEq for Labels {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.names() == other.names()
                && self.count() == other.count()
                && self.values() == other.values())
    }
}

impl Eq for Labels {}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Labels(\n   {}\n)", self.print(4, 3))
    }
}

impl fmt::Debug for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Labels(\n   {}\n)", self.print(-1, 3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first() -> Labels {
        Labels::new(&["a", "b"], [[0, 1], [1, 2], [0, 3]]).unwrap()
    }

    fn second() -> Labels {
        Labels::new(&["a", "b"], [[0, 3], [1, 3], [1, 2]]).unwrap()
    }

    #[test]
    fn construction_errors() {
        let err = Labels::new(&["a", "b"], [vec![0, 1], vec![1]]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch(_)));

        let err = Labels::new(&["a"], [[0], [1], [0]]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "duplicate entry: (a=0) is present at positions 0 and 2"
        );

        let err = Labels::new(&["a"], [[1i64 << 40]]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));

        let err = Labels::new(&["a", "a"], [[0, 1]]).unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));

        let err = Labels::new(&[""], [[0]]).unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));
    }

    #[test]
    fn accepts_other_integer_types() {
        let labels = Labels::new(&["a"], [[3u8], [7u8]]).unwrap();
        assert_eq!(labels.values(), &[3, 7]);

        let labels = Labels::new(&["a"], vec![[-2i64], [2i64]]).unwrap();
        assert_eq!(labels.values(), &[-2, 2]);
    }

    #[test]
    fn factories() {
        let empty = Labels::empty(&["x", "y"]).unwrap();
        assert_eq!(empty.names(), ["x", "y"]);
        assert!(empty.is_empty());

        let single = Labels::single();
        assert_eq!(single.names(), ["_"]);
        assert_eq!(single.values(), &[0]);

        let range = Labels::range("r", 4).unwrap();
        assert_eq!(range.values(), &[0, 1, 2, 3]);
        assert_eq!(range.position([3]), Some(3));

        let raw = Labels::from_raw(vec!["a".into(), "b".into()], vec![0, 1, 2, 3]).unwrap();
        assert_eq!(raw.count(), 2);
        assert_eq!(raw.row(1), &[2, 3]);

        let err = Labels::from_raw(vec!["a".into(), "b".into()], vec![0, 1, 2]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch(_)));
    }

    #[test]
    fn lookup() {
        let labels = first();
        assert_eq!(labels.position([1, 2]), Some(1));
        assert_eq!(labels.position([2, 2]), None);
        assert_eq!(labels.position([1]), None);
        assert!(labels.contains([0, 3]));
        assert!(labels.contains(labels.entry(2).unwrap()));
        assert_eq!(labels.column("b").unwrap(), vec![1, 2, 3]);
        assert!(matches!(labels.column("c"), Err(Error::NotFound(_))));
        assert!(labels.entry(3).is_none());
    }

    #[test]
    fn union() {
        let (union, first_mapping, second_mapping) =
            first().union_with_mapping(&second()).unwrap();
        assert_eq!(union.values(), &[0, 1, 1, 2, 0, 3, 1, 3]);
        assert_eq!(first_mapping, vec![0, 1, 2]);
        assert_eq!(second_mapping, vec![2, 3, 1]);

        assert_eq!(first().union(&second()).unwrap(), union);
    }

    #[test]
    fn intersection() {
        let (intersection, first_mapping, second_mapping) =
            first().intersection_with_mapping(&second()).unwrap();
        assert_eq!(intersection.values(), &[1, 2, 0, 3]);
        assert_eq!(first_mapping, vec![None, Some(0), Some(1)]);
        assert_eq!(second_mapping, vec![Some(1), None, Some(0)]);
    }

    #[test]
    fn set_operations_need_same_names() {
        let other = Labels::new(&["b", "a"], [[0, 1]]).unwrap();
        assert!(matches!(
            first().union(&other),
            Err(Error::DimensionMismatch(_))
        ));
        assert!(matches!(
            first().intersection(&other),
            Err(Error::DimensionMismatch(_))
        ));
    }

    #[test]
    fn product() {
        let a = Labels::new(&["a"], [[0], [1]]).unwrap();
        let b = Labels::new(&["b", "c"], [[5, 6], [7, 8], [9, 10]]).unwrap();
        let product = Labels::product(&[&a, &b]).unwrap();
        assert_eq!(product.names(), ["a", "b", "c"]);
        assert_eq!(
            product.values(),
            &[0, 5, 6, 0, 7, 8, 0, 9, 10, 1, 5, 6, 1, 7, 8, 1, 9, 10]
        );

        let empty = Labels::empty(&["d"]).unwrap();
        assert!(Labels::product(&[&a, &empty]).unwrap().is_empty());

        assert!(matches!(
            Labels::product(&[&a, &a]),
            Err(Error::InvalidName { .. })
        ));
    }

    #[test]
    fn no_dimensions() {
        let err = Labels::new::<i32, [i32; 0]>(&[], [[]]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch(_)));

        let labels = Labels::new::<i32, [i32; 0]>(&[], []).unwrap();
        assert!(labels.is_empty());

        let product = Labels::product(&[]).unwrap();
        assert!(product.is_empty());
        let raw = Labels::from_raw(product.names().to_vec(), product.values().to_vec()).unwrap();
        assert_eq!(raw, product);
        assert_eq!(raw.count(), product.count());
    }

    #[test]
    fn display() {
        let labels = Labels::new(&["a", "bb"], [[0, 1], [1, 2], [0, 3], [2, 2], [3, 0]]).unwrap();
        assert_eq!(
            labels.to_string(),
            "Labels(\n    a  bb\n    0  1\n    1  2\n       ...\n    2  2\n    3  0\n)"
        );
    }
}
