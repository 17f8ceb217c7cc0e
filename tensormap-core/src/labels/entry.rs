use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// A single entry of a [`Labels`](super::Labels) or [`LabelsView`](super::LabelsView):
/// the dimension names together with one row of values.
///
/// Two entries are equal when both their names and their values are equal.
#[derive(Clone, Copy)]
pub struct LabelsEntry<'a> {
    names: &'a [String],
    values: &'a [i32],
}

impl<'a> LabelsEntry<'a> {
    pub(crate) fn new(names: &'a [String], values: &'a [i32]) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    /// Names of the dimensions.
    pub fn names(&self) -> &'a [String] {
        self.names
    }

    /// Values of this entry, one per dimension.
    pub fn values(&self) -> &'a [i32] {
        self.values
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the entry has no dimension.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the dimension `name`, if there is such a dimension.
    pub fn get(&self, name: &str) -> Option<i32> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Renders the entry as a named tuple, `(a=1, b=2)`.
    pub fn print(&self) -> String {
        let fields: Vec<String> = self
            .names
            .iter()
            .zip(self.values)
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        format!("({})", fields.join(", "))
    }
}

impl AsRef<[i32]> for LabelsEntry<'_> {
    fn as_ref(&self) -> &[i32] {
        self.values
    }
}

impl PartialEq for LabelsEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names && self.values == other.values
    }
}

impl Eq for LabelsEntry<'_> {}

impl Hash for LabelsEntry<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.names.hash(state);
        self.values.hash(state);
    }
}

impl fmt::Display for LabelsEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelsEntry{}", self.print())
    }
}

impl fmt::Debug for LabelsEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
