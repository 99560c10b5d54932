//! File-open dialog seam

use std::path::PathBuf;

/// Extensions a user may pick
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx"];

/// Asks the user for a spreadsheet to import.
///
/// Returns `None` when the user cancels.
pub trait FilePicker: Send + Sync {
    fn pick_spreadsheet(&self) -> Option<PathBuf>;
}

impl<P: FilePicker + ?Sized> FilePicker for Box<P> {
    fn pick_spreadsheet(&self) -> Option<PathBuf> {
        (**self).pick_spreadsheet()
    }
}

/// Native open dialog, filtered to spreadsheet files. Blocks until the
/// user answers.
#[cfg(feature = "dialog")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DialogPicker;

#[cfg(feature = "dialog")]
impl FilePicker for DialogPicker {
    fn pick_spreadsheet(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter("Excel Files", SPREADSHEET_EXTENSIONS)
            .pick_file()
    }
}

/// Picker for headless hosts: every request is a cancel.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPicker;

impl FilePicker for NoPicker {
    fn pick_spreadsheet(&self) -> Option<PathBuf> {
        None
    }
}

/// Picker with a predetermined answer.
///
/// Paths without a spreadsheet extension are refused like the dialog filter
/// would refuse them, and count as a cancel.
#[derive(Debug, Clone, Default)]
pub struct FixedPicker {
    answer: Option<PathBuf>,
}

impl FixedPicker {
    /// Always pick `path`
    pub fn choosing<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            answer: Some(path.into()),
        }
    }

    /// Always cancel
    pub fn cancelling() -> Self {
        Self { answer: None }
    }
}

impl FilePicker for FixedPicker {
    fn pick_spreadsheet(&self) -> Option<PathBuf> {
        let path = self.answer.as_ref()?;
        let allowed = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                SPREADSHEET_EXTENSIONS
                    .iter()
                    .any(|ok| e.eq_ignore_ascii_case(ok))
            })
            .unwrap_or(false);
        if allowed {
            Some(path.clone())
        } else {
            log::warn!("picker refused non-spreadsheet file {}", path.display());
            None
        }
    }
}
