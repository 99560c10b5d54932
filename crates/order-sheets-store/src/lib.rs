//! # order-sheets-store
//!
//! The storage gateway: the single owner of where the data file lives and
//! how rows move between disk and memory.
//!
//! - [`StoreConfig`] - data directory and file name, resolved once at startup
//! - [`Store`] - read the default file, read a user-picked file, write the default file
//! - [`FilePicker`] - the file-open dialog seam
//!
//! Every operation opens and closes the file within the call; nothing is
//! cached between calls.

pub mod config;
pub mod error;
pub mod picker;
pub mod store;

mod atomic;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use picker::{FilePicker, FixedPicker, NoPicker, SPREADSHEET_EXTENSIONS};
#[cfg(feature = "dialog")]
pub use picker::DialogPicker;
pub use store::{FileInfo, ReadOutcome, Store};
