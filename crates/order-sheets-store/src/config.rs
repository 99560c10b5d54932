//! Storage configuration

use std::path::{Path, PathBuf};

/// Default data file name
pub const DEFAULT_FILE_NAME: &str = "data.xlsx";

/// Default backup directory name, under the data directory
pub const DEFAULT_BACKUP_DIR: &str = "backups";

/// Where the data file lives.
///
/// Built once at startup and handed to the [`Store`](crate::Store); no other
/// code computes data paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the data file.
    /// Defaults to the user's documents directory.
    pub data_dir: PathBuf,

    /// File name of the data file inside `data_dir`.
    pub file_name: String,

    /// Directory name for the pre-save backup, inside `data_dir`.
    pub backup_dir_name: String,

    /// Copy the previous file aside before each save.
    pub keep_backup: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_dir(documents_dir())
    }
}

impl StoreConfig {
    /// Configuration rooted at `dir` with the default file name
    pub fn in_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            data_dir: dir.into(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            backup_dir_name: DEFAULT_BACKUP_DIR.to_string(),
            keep_backup: true,
        }
    }

    /// Use a different data file name
    pub fn with_file_name<S: Into<String>>(mut self, name: S) -> Self {
        self.file_name = name.into();
        self
    }

    /// Enable or disable the pre-save backup
    pub fn with_backup(mut self, keep: bool) -> Self {
        self.keep_backup = keep;
        self
    }

    /// Full path of the data file
    pub fn data_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    /// Full path of the backup copy of the data file
    pub fn backup_path(&self) -> PathBuf {
        self.data_dir
            .join(&self.backup_dir_name)
            .join(format!("{}.bak", self.file_name))
    }
}

/// The user's documents directory, or the current directory when the
/// platform has none
fn documents_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
