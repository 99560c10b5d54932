//! The storage gateway

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use order_sheets_core::Dataset;
use order_sheets_xlsx::{XlsxReader, XlsxWriter};

use crate::atomic::write_file_atomic;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::picker::FilePicker;

/// What a read attempt produced.
///
/// The bridge collapses everything but `Loaded` into an empty dataset; callers
/// that need to tell the cases apart use this directly.
#[derive(Debug)]
pub enum ReadOutcome {
    /// The file was read
    Loaded(Dataset),
    /// The default data file does not exist yet
    Absent,
    /// The user dismissed the picker
    Cancelled,
    /// The file exists but could not be read
    Failed(StoreError),
}

impl ReadOutcome {
    /// Collapse to a dataset, logging failures
    pub fn into_dataset(self) -> Dataset {
        match self {
            ReadOutcome::Loaded(dataset) => dataset,
            ReadOutcome::Absent | ReadOutcome::Cancelled => Dataset::new(),
            ReadOutcome::Failed(err) => {
                log::error!("failed to read spreadsheet: {}", err);
                Dataset::new()
            }
        }
    }
}

/// Size and modification time of the data file
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Local>,
}

/// Storage gateway over the default data file.
pub struct Store {
    config: StoreConfig,
    picker: Box<dyn FilePicker>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Store {
    pub fn new<P: FilePicker + 'static>(config: StoreConfig, picker: P) -> Self {
        Self {
            config,
            picker: Box::new(picker),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the default data file
    pub fn data_path(&self) -> PathBuf {
        self.config.data_path()
    }

    /// Read the default data file.
    pub fn load_default(&self) -> ReadOutcome {
        let path = self.data_path();
        if !path.exists() {
            log::debug!("no data file at {}", path.display());
            return ReadOutcome::Absent;
        }
        read_path(&path)
    }

    /// Ask the picker for a file and read it. The default data file is left alone.
    pub fn load_user_selected(&self) -> ReadOutcome {
        match self.picker.pick_spreadsheet() {
            Some(path) => {
                log::info!("importing {}", path.display());
                read_path(&path)
            }
            None => {
                log::debug!("file selection cancelled");
                ReadOutcome::Cancelled
            }
        }
    }

    /// Rows in the default data file; empty when it is missing or unreadable.
    pub fn read_default(&self) -> Dataset {
        self.load_default().into_dataset()
    }

    /// Rows in a user-picked file; empty on cancel or failure.
    pub fn read_user_selected(&self) -> Dataset {
        self.load_user_selected().into_dataset()
    }

    /// Overwrite the default data file, reporting success as a flag.
    pub fn write(&self, dataset: &Dataset) -> bool {
        match self.save(dataset) {
            Ok(()) => true,
            Err(err) => {
                log::error!("failed to save {}: {}", self.data_path().display(), err);
                false
            }
        }
    }

    /// Overwrite the default data file.
    ///
    /// The workbook is encoded fully in memory first, so an encoding error
    /// leaves the existing file untouched. When backups are enabled the
    /// previous file is copied aside before it is replaced.
    pub fn save(&self, dataset: &Dataset) -> StoreResult<()> {
        let mut buf = Vec::new();
        XlsxWriter::write_records(dataset, Cursor::new(&mut buf))?;

        let path = self.data_path();
        if self.config.keep_backup && path.exists() {
            let backup = self.config.backup_path();
            if let Some(dir) = backup.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::copy(&path, &backup)?;
            log::debug!("backed up {} to {}", path.display(), backup.display());
        }

        write_file_atomic(&path, &buf)?;
        log::info!("saved {} rows to {}", dataset.len(), path.display());
        Ok(())
    }

    /// Put the last backup back in place of the data file.
    ///
    /// Returns `false` when there is no backup to restore.
    pub fn restore_backup(&self) -> StoreResult<bool> {
        let backup = self.config.backup_path();
        if !backup.exists() {
            return Ok(false);
        }
        std::fs::rename(&backup, self.data_path())?;
        log::info!("restored {}", self.data_path().display());
        Ok(true)
    }

    /// Size and modification time of the data file, if it exists
    pub fn file_info(&self) -> StoreResult<Option<FileInfo>> {
        let path = self.data_path();
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(FileInfo {
            size: meta.len(),
            modified: DateTime::<Local>::from(meta.modified()?),
            path,
        }))
    }
}

fn read_path(path: &Path) -> ReadOutcome {
    match XlsxReader::read_records_file(path) {
        Ok(dataset) => ReadOutcome::Loaded(dataset),
        Err(err) => ReadOutcome::Failed(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::{FixedPicker, NoPicker};
    use order_sheets_core::RowRecord;

    fn store_in(dir: &Path) -> Store {
        Store::new(StoreConfig::in_dir(dir), NoPicker)
    }

    #[test]
    fn test_missing_default_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(matches!(store.load_default(), ReadOutcome::Absent));
        assert!(store.read_default().is_empty());
        assert!(store.file_info().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_default_is_failed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.xlsx"), b"plain text").unwrap();
        let store = store_in(dir.path());
        assert!(matches!(store.load_default(), ReadOutcome::Failed(StoreError::Codec(_))));
        assert!(store.read_default().is_empty());
    }

    #[test]
    fn test_cancel_is_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(StoreConfig::in_dir(dir.path()), FixedPicker::cancelling());
        assert!(matches!(store.load_user_selected(), ReadOutcome::Cancelled));
    }

    #[test]
    fn test_save_reports_file_info() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let mut row = RowRecord::new();
        row.set("id", 1);
        store.save(&vec![row].into()).unwrap();

        let info = store.file_info().unwrap().unwrap();
        assert_eq!(info.path, dir.path().join("data.xlsx"));
        assert!(info.size > 0);
    }

    #[test]
    fn test_write_failure_is_false() {
        let dir = tempfile::tempdir().unwrap();
        // data_dir is a regular file, so nothing can be created beneath it
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let store = store_in(&blocker);
        assert!(!store.write(&Dataset::new()));
    }
}
