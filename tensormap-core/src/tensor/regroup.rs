//! Shared machinery of the operations that move key dimensions into blocks.

use std::collections::HashMap;

use crate::{
    array::SampleMapping,
    error::{Error, Result},
    labels::{check_names, Labels, Row},
};

/// Key dimensions to move out of the keys of a tensor map.
///
/// Either plain names, or a [`Labels`] whose names are the dimensions to move. A
/// non-empty labels additionally fixes the key values to use as new properties in
/// [`TensorMap::keys_to_properties`](super::TensorMap::keys_to_properties).
#[derive(Debug, Clone)]
pub enum KeysToMove<'a> {
    /// Names of the dimensions.
    Names(Vec<&'a str>),
    /// Labels listing the dimensions and, when not empty, the values to use.
    Labels(&'a Labels),
}

impl KeysToMove<'_> {
    pub(crate) fn names(&self) -> Vec<String> {
        match self {
            KeysToMove::Names(names) => names.iter().map(|n| n.to_string()).collect(),
            KeysToMove::Labels(labels) => labels.names().to_vec(),
        }
    }
}

impl<'a> From<&'a str> for KeysToMove<'a> {
    fn from(name: &'a str) -> Self {
        KeysToMove::Names(vec![name])
    }
}

impl<'a> From<&'a [&'a str]> for KeysToMove<'a> {
    fn from(names: &'a [&'a str]) -> Self {
        KeysToMove::Names(names.to_vec())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for KeysToMove<'a> {
    fn from(names: [&'a str; N]) -> Self {
        KeysToMove::Names(names.to_vec())
    }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for KeysToMove<'a> {
    fn from(names: &'a [&'a str; N]) -> Self {
        KeysToMove::Names(names.to_vec())
    }
}

impl<'a> From<Vec<&'a str>> for KeysToMove<'a> {
    fn from(names: Vec<&'a str>) -> Self {
        KeysToMove::Names(names)
    }
}

impl<'a> From<&'a Labels> for KeysToMove<'a> {
    fn from(labels: &'a Labels) -> Self {
        KeysToMove::Labels(labels)
    }
}

/// Result of removing some dimensions from the keys.
pub(super) struct KeysSplit {
    /// keys of the new tensor map
    pub keys: Labels,
    /// names of the removed dimensions, in the requested order
    pub moved_names: Vec<String>,
    /// for each new key, the original blocks it gathers with their removed key values
    pub groups: Vec<Vec<(usize, Row)>>,
}

/// Removes `moved` from `keys` and groups the blocks by their remaining key values, in
/// order of first appearance.
pub(super) fn split_keys(keys: &Labels, moved: Vec<String>) -> Result<KeysSplit> {
    let moved_names = check_names(moved)?;
    let moved_columns = moved_names
        .iter()
        .map(|name| {
            keys.dimension(name).ok_or_else(|| {
                Error::NotFound(format!(
                    "'{name}' is not part of the keys {:?}",
                    keys.names()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let remaining_columns: Vec<usize> = (0..keys.size())
        .filter(|c| !moved_columns.contains(c))
        .collect();

    if remaining_columns.is_empty() {
        let group: Vec<(usize, Row)> = (0..keys.count())
            .map(|i| (i, select(keys.row(i), &moved_columns)))
            .collect();
        let (keys, groups) = if group.is_empty() {
            (Labels::from_unique(vec!["_".into()], Vec::new(), 0), Vec::new())
        } else {
            (Labels::single(), vec![group])
        };
        return Ok(KeysSplit {
            keys,
            moved_names,
            groups,
        });
    }

    let mut new_keys = RowSet::default();
    let mut groups: Vec<Vec<(usize, Row)>> = Vec::new();
    for i in 0..keys.count() {
        let row = keys.row(i);
        let group = new_keys.insert(select(row, &remaining_columns));
        if group == groups.len() {
            groups.push(Vec::new());
        }
        groups[group].push((i, select(row, &moved_columns)));
    }

    let remaining_names = remaining_columns
        .iter()
        .map(|&c| keys.names()[c].clone())
        .collect();
    Ok(KeysSplit {
        keys: Labels::from_rows(remaining_names, &new_keys.rows),
        moved_names,
        groups,
    })
}

fn select(row: &[i32], columns: &[usize]) -> Row {
    columns.iter().map(|&c| row[c]).collect()
}

/// Rows inserted in order, each distinct row getting the next position.
#[derive(Default)]
pub(super) struct RowSet {
    rows: Vec<Row>,
    positions: HashMap<Row, usize>,
}

impl RowSet {
    /// Position of `row`, inserting it at the end if needed.
    pub fn insert(&mut self, row: Row) -> usize {
        if let Some(&position) = self.positions.get(&row) {
            return position;
        }
        let position = self.rows.len();
        self.positions.insert(row.clone(), position);
        self.rows.push(row);
        position
    }

    /// The rows, lexicographically sorted if `sort`, and the new position of every row
    /// indexed by insertion position.
    pub fn finish(self, sort: bool) -> (Vec<Row>, Vec<usize>) {
        let mut rows = self.rows;
        if !sort {
            let positions = (0..rows.len()).collect();
            return (rows, positions);
        }

        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by(|&a, &b| rows[a].cmp(&rows[b]));
        let mut positions = vec![0; rows.len()];
        for (new, &old) in order.iter().enumerate() {
            positions[old] = new;
        }
        let mut sorted = Vec::with_capacity(rows.len());
        for &old in &order {
            sorted.push(std::mem::take(&mut rows[old]));
        }
        (sorted, positions)
    }
}

/// Row `i` of the source goes to `positions[mapping[i]]` of the destination.
pub(super) fn sample_mappings(mapping: &[usize], positions: &[usize]) -> Vec<SampleMapping> {
    mapping
        .iter()
        .enumerate()
        .map(|(input, &inserted)| SampleMapping {
            input,
            output: positions[inserted],
        })
        .collect()
}

/// Converts a position into a label value.
pub(super) fn index_value(index: usize) -> Result<i32> {
    i32::try_from(index).map_err(|_| {
        Error::TypeMismatch(format!(
            "sample index {index} does not fit in a 32-bit integer"
        ))
    })
}

/// Every block of a group must have the same labels on some axis.
pub(super) fn check_same<'a>(
    mut labels: impl Iterator<Item = &'a Labels>,
    axis: &str,
    operation: &str,
) -> Result<()> {
    if let Some(first) = labels.next() {
        for other in labels {
            if other != first {
                return Err(Error::DimensionMismatch(format!(
                    "can not move keys to {operation}: the blocks to merge have different {axis}"
                )));
            }
        }
    }
    Ok(())
}
