//! Plain-text table rendering

use order_sheets_core::{Dataset, HEADER};
use unicode_width::UnicodeWidthStr;

/// Render the rows as a table of the fixed columns, preceded by a 1-based
/// row number gutter. Column widths fit the widest cell in terminal columns,
/// so wide (CJK) characters count double.
pub fn render_grid(dataset: &Dataset) -> String {
    let cells: Vec<Vec<String>> = dataset
        .iter()
        .map(|record| {
            record
                .fixed_values()
                .iter()
                .map(|value| single_line(&value.to_string()))
                .collect()
        })
        .collect();

    let gutter = dataset.len().to_string().len().max(1);
    let mut widths: Vec<usize> = HEADER.iter().map(|h| h.width()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
    push_line(&mut out, &" ".repeat(gutter), &header, &widths);
    let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &"-".repeat(gutter), &rules, &widths);
    for (i, row) in cells.iter().enumerate() {
        push_line(&mut out, &format!("{:>gutter$}", i + 1), row, &widths);
    }
    out
}

fn push_line(out: &mut String, gutter: &str, cells: &[String], widths: &[usize]) {
    out.push_str(gutter);
    for (cell, width) in cells.iter().zip(widths) {
        out.push_str("  ");
        out.push_str(cell);
        let pad = width - cell.width();
        out.extend(std::iter::repeat(' ').take(pad));
    }
    // No trailing spaces
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
    out.push('\n');
}

/// Line breaks and tabs would break the table layout
fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
