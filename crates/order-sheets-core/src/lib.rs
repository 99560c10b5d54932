//! # order-sheets-core
//!
//! Core data types for the order-sheets workspace.
//!
//! - [`Column`] - The nine fixed columns of the order sheet, in header order
//! - [`CellValue`] - An opaque scalar (number, string or boolean)
//! - [`RowRecord`] - One data row, an ordered mapping of field name to value
//! - [`Dataset`] - The ordered rows of a whole sheet
//!
//! ## Example
//!
//! ```rust
//! use order_sheets_core::{Column, Dataset, RowRecord};
//!
//! let mut record = RowRecord::new();
//! record.set("id", 1);
//! record.set("content", "Desk");
//! record.set("subtotal", 120.0);
//!
//! let mut dataset = Dataset::new();
//! dataset.push(record);
//!
//! let normalized = dataset.normalized();
//! assert_eq!(normalized[0].len(), Column::ALL.len());
//! assert_eq!(dataset.total(), 120.0);
//! ```

pub mod column;
pub mod dataset;
pub mod error;
pub mod record;
pub mod value;

pub use column::Column;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use record::RowRecord;
pub use value::CellValue;

/// Header row written to every saved sheet, in column order.
pub const HEADER: [&str; 9] = [
    "id", "content", "quantity", "price", "subtotal", "material", "size", "handler", "remark",
];
