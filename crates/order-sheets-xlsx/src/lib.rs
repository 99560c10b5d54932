//! # order-sheets-xlsx
//!
//! XLSX (Office Open XML) codec for order sheets.
//!
//! Reading decodes the first worksheet of a workbook into a [`Dataset`],
//! using the first populated row as the header. Writing emits a single
//! `Sheet1` with the fixed nine-column header and one row per record.
//!
//! ```rust
//! use std::io::Cursor;
//! use order_sheets_core::{Dataset, RowRecord};
//! use order_sheets_xlsx::{XlsxReader, XlsxWriter};
//!
//! let mut record = RowRecord::new();
//! record.set("id", 1);
//! record.set("content", "Shelf");
//! let dataset: Dataset = vec![record].into();
//!
//! let mut buf = Vec::new();
//! XlsxWriter::write_records(&dataset, Cursor::new(&mut buf)).unwrap();
//! let back = XlsxReader::read_records(Cursor::new(&buf)).unwrap();
//! assert_eq!(back, dataset.normalized());
//! ```
//!
//! [`Dataset`]: order_sheets_core::Dataset

pub mod address;
pub mod error;
pub mod reader;
pub mod writer;

mod escape;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
