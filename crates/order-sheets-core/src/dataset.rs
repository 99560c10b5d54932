//! Datasets

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::error::{Error, Result};
use crate::record::RowRecord;

/// The ordered rows of a sheet.
///
/// Row order matches sheet row order and survives a write/read round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<RowRecord>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row
    pub fn push(&mut self, record: RowRecord) {
        self.rows.push(record);
    }

    /// Get a row
    pub fn get(&self, row: usize) -> Option<&RowRecord> {
        self.rows.get(row)
    }

    /// Get a row mutably
    pub fn get_mut(&mut self, row: usize) -> Result<&mut RowRecord> {
        let len = self.rows.len();
        self.rows
            .get_mut(row)
            .ok_or(Error::RowOutOfBounds { row, len })
    }

    /// Remove a row, shifting later rows up
    pub fn remove(&mut self, row: usize) -> Result<RowRecord> {
        if row >= self.rows.len() {
            return Err(Error::RowOutOfBounds {
                row,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(row))
    }

    /// Iterate over rows in order
    pub fn iter(&self) -> std::slice::Iter<'_, RowRecord> {
        self.rows.iter()
    }

    /// Iterate over rows mutably
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, RowRecord> {
        self.rows.iter_mut()
    }

    /// Every row restricted to the fixed columns (see [`RowRecord::normalized`])
    pub fn normalized(&self) -> Dataset {
        self.rows.iter().map(RowRecord::normalized).collect()
    }

    /// Sum of the numeric `subtotal` values; other values count as zero
    pub fn total(&self) -> f64 {
        self.rows
            .iter()
            .filter_map(|r| r.column(Column::Subtotal).and_then(|v| v.as_number()))
            .sum()
    }
}

impl Index<usize> for Dataset {
    type Output = RowRecord;

    fn index(&self, row: usize) -> &RowRecord {
        &self.rows[row]
    }
}

impl From<Vec<RowRecord>> for Dataset {
    fn from(rows: Vec<RowRecord>) -> Self {
        Self { rows }
    }
}

impl FromIterator<RowRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = RowRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dataset {
    type Item = RowRecord;
    type IntoIter = std::vec::IntoIter<RowRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a RowRecord;
    type IntoIter = std::slice::Iter<'a, RowRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
