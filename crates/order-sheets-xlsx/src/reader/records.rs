//! Header-keyed record extraction from raw sheet rows

use std::collections::HashMap;

use order_sheets_core::{CellValue, Dataset, RowRecord};

/// Placeholder name for a header cell with no text
const EMPTY_HEADER: &str = "__EMPTY";

/// One `<row>` of a worksheet: 0-based row index and its valued cells
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SheetRow {
    pub index: u32,
    pub cells: Vec<(u16, CellValue)>,
}

impl SheetRow {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            cells: Vec::new(),
        }
    }

    /// Order cells by column, keeping the first of any repeated column
    fn sort_cells(&mut self) {
        self.cells.sort_by_key(|(c, _)| *c);
        self.cells.dedup_by_key(|(c, _)| *c);
    }

    /// Value in column `col`; cells must be sorted
    fn value_at(&self, col: u16) -> Option<&CellValue> {
        self.cells
            .binary_search_by_key(&col, |(c, _)| *c)
            .ok()
            .map(|i| &self.cells[i].1)
    }
}

/// Turn sheet rows into records.
///
/// The first row is the header. Columns span the smallest to the largest
/// column index used anywhere on the sheet. Data cells absent from a row
/// become empty strings.
pub(crate) fn rows_to_records(mut rows: Vec<SheetRow>) -> Dataset {
    for row in &mut rows {
        row.sort_cells();
    }
    let mut rows = rows.into_iter();
    let header_row = match rows.next() {
        Some(row) => row,
        None => return Dataset::new(),
    };
    let data_rows: Vec<SheetRow> = rows.collect();

    let all_cols = std::iter::once(&header_row)
        .chain(data_rows.iter())
        .flat_map(|r| r.cells.iter().map(|(c, _)| *c));
    let (min_col, max_col) = match all_cols.fold(None, |acc: Option<(u16, u16)>, c| match acc {
        None => Some((c, c)),
        Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
    }) {
        Some(bounds) => bounds,
        None => return Dataset::new(),
    };

    let header = header_names(&header_row, min_col, max_col);

    data_rows
        .iter()
        .map(|row| {
            let fields = header
                .iter()
                .map(|(col, name)| {
                    let value = row.value_at(*col).cloned().unwrap_or_default();
                    (name.clone(), value)
                })
                .collect();
            RowRecord::from_unique_fields(fields)
        })
        .collect()
}

/// Field names for each column of the header row.
///
/// Blank header cells are named `__EMPTY`; repeats of a name get `_1`,
/// `_2`, ... appended in order of appearance.
fn header_names(header_row: &SheetRow, min_col: u16, max_col: u16) -> Vec<(u16, String)> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity((max_col - min_col) as usize + 1);

    for col in min_col..=max_col {
        let base = match header_row.value_at(col) {
            Some(v) if !v.is_blank() => v.to_string(),
            _ => EMPTY_HEADER.to_string(),
        };
        let count = seen.entry(base.clone()).or_insert(0);
        let name = if *count == 0 {
            base
        } else {
            format!("{}_{}", base, count)
        };
        *count += 1;
        names.push((col, name));
    }

    names
}
