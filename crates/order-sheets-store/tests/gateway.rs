//! Storage gateway behaviour against real files

use std::path::Path;

use order_sheets_core::{CellValue, Dataset, RowRecord, HEADER};
use order_sheets_store::{FixedPicker, NoPicker, ReadOutcome, Store, StoreConfig};
use order_sheets_xlsx::XlsxWriter;
use pretty_assertions::assert_eq;

fn order(id: i64, content: &str, quantity: i64, price: f64) -> RowRecord {
    let mut r = RowRecord::new();
    r.set("id", id);
    r.set("content", content);
    r.set("quantity", quantity);
    r.set("price", price);
    r.set("subtotal", quantity as f64 * price);
    r.set("material", "");
    r.set("size", "");
    r.set("handler", "");
    r.set("remark", "");
    r
}

fn store(dir: &Path) -> Store {
    Store::new(StoreConfig::in_dir(dir), NoPicker)
}

#[test]
fn test_write_then_read_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let dataset: Dataset = vec![order(1, "A", 2, 5.0), order(2, "B", 1, 7.5)].into();

    assert!(store.write(&dataset));
    assert_eq!(store.read_default(), dataset);
}

#[test]
fn test_example_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let dataset: Dataset = vec![order(1, "A", 2, 5.0)].into();
    assert!(store.write(&dataset));

    let back = store.read_default();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].get("subtotal"), Some(&CellValue::Number(10.0)));
    assert_eq!(back[0].names().collect::<Vec<_>>(), HEADER.to_vec());
}

#[test]
fn test_columns_are_fixed_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());

    let mut extra = RowRecord::new();
    extra.set("colour", "red");
    extra.set("content", "bolts");
    assert!(store.write(&vec![extra].into()));

    let back = store.read_default();
    assert_eq!(back[0].names().collect::<Vec<_>>(), HEADER.to_vec());
    assert_eq!(back[0].get("colour"), None);
    assert_eq!(back[0].get("content"), Some(&CellValue::from("bolts")));
}

#[test]
fn test_saving_twice_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let dataset: Dataset = vec![order(1, "A", 2, 5.0), order(2, "B", 1, 3.5)].into();

    assert!(store.write(&dataset));
    let first = store.read_default();
    assert!(store.write(&dataset));
    let second = store.read_default();

    assert_eq!(first, dataset);
    assert_eq!(second, first);
}

#[test]
fn test_empty_dataset_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    assert!(store.write(&Dataset::new()));

    assert!(matches!(store.load_default(), ReadOutcome::Loaded(ref d) if d.is_empty()));
}

#[test]
fn test_user_selected_leaves_default_alone() {
    let dir = tempfile::tempdir().unwrap();
    let import = dir.path().join("import.xlsx");
    let imported: Dataset = vec![order(7, "imported", 3, 1.0)].into();
    XlsxWriter::write_records_file(&imported, &import).unwrap();

    let store = Store::new(StoreConfig::in_dir(dir.path()), FixedPicker::choosing(&import));
    assert_eq!(store.read_user_selected(), imported);
    assert!(!store.data_path().exists());
}

#[test]
fn test_user_selected_missing_file_is_failed() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(
        StoreConfig::in_dir(dir.path()),
        FixedPicker::choosing(dir.path().join("gone.xlsx")),
    );
    assert!(matches!(store.load_user_selected(), ReadOutcome::Failed(_)));
    assert!(store.read_user_selected().is_empty());
}

#[test]
fn test_backup_and_restore() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let first: Dataset = vec![order(1, "first", 1, 1.0)].into();
    let second: Dataset = vec![order(1, "second", 1, 1.0)].into();

    assert!(!store.restore_backup().unwrap());
    assert!(store.write(&first));
    assert!(!store.config().backup_path().exists());
    assert!(store.write(&second));
    assert!(store.config().backup_path().exists());

    assert!(store.restore_backup().unwrap());
    assert_eq!(store.read_default(), first);
    assert!(!store.restore_backup().unwrap());
}

#[test]
fn test_backup_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(StoreConfig::in_dir(dir.path()).with_backup(false), NoPicker);
    assert!(store.write(&Dataset::new()));
    assert!(store.write(&Dataset::new()));
    assert!(!store.config().backup_path().exists());
}
