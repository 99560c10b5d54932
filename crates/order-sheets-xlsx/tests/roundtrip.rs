//! End-to-end tests for record roundtrip (write -> read -> verify)

use std::io::Cursor;

use order_sheets_core::{CellValue, Dataset, RowRecord, HEADER};
use order_sheets_xlsx::{XlsxReader, XlsxWriter};
use pretty_assertions::assert_eq;

fn roundtrip(dataset: &Dataset) -> Dataset {
    let mut buf = Vec::new();
    XlsxWriter::write_records(dataset, Cursor::new(&mut buf)).unwrap();
    XlsxReader::read_records(Cursor::new(&buf)).unwrap()
}

fn order_row() -> RowRecord {
    let mut r = RowRecord::new();
    r.set("id", 1);
    r.set("content", "A");
    r.set("quantity", 2);
    r.set("price", 5);
    r.set("subtotal", 10);
    r.set("material", "");
    r.set("size", "");
    r.set("handler", "");
    r.set("remark", "");
    r
}

#[test]
fn test_single_order_row() {
    let dataset: Dataset = vec![order_row()].into();
    let back = roundtrip(&dataset);

    assert_eq!(back, dataset);
    let names: Vec<&str> = back[0].names().collect();
    assert_eq!(names, HEADER.to_vec());
}

#[test]
fn test_missing_fields_become_empty_strings() {
    let mut sparse = RowRecord::new();
    sparse.set("remark", "call first");
    sparse.set("id", 3);
    let dataset: Dataset = vec![sparse.clone()].into();

    let back = roundtrip(&dataset);
    assert_eq!(back, vec![sparse.normalized()].into());
    assert_eq!(back[0].get("content"), Some(&CellValue::empty()));
}

#[test]
fn test_row_order_preserved() {
    let dataset: Dataset = (1..=25)
        .map(|i| {
            let mut r = RowRecord::new();
            r.set("id", i);
            r.set("content", format!("item {}", i));
            r
        })
        .collect();

    let back = roundtrip(&dataset);
    let ids: Vec<f64> = back
        .iter()
        .map(|r| r.get("id").and_then(|v| v.as_number()).unwrap())
        .collect();
    assert_eq!(ids, (1..=25).map(f64::from).collect::<Vec<_>>());
}

#[test]
fn test_blank_records_survive() {
    let dataset: Dataset = vec![order_row(), RowRecord::new(), order_row()].into();
    let back = roundtrip(&dataset);
    assert_eq!(back.len(), 3);
    assert!(back[1].iter().all(|(_, v)| v.is_blank()));
}

#[test]
fn test_value_kinds() {
    let mut r = RowRecord::new();
    r.set("id", -4);
    r.set("price", 3.14159);
    r.set("quantity", true);
    r.set("content", "Multi\nLine\r\nText");
    r.set("material", "Unicode: \u{1F600}");
    r.set("remark", "under_x0041_score");
    let dataset: Dataset = vec![r].into();

    assert_eq!(roundtrip(&dataset), dataset.normalized());
}

#[test]
fn test_writing_twice_is_stable() {
    let dataset: Dataset = vec![order_row(), order_row()].into();
    let once = roundtrip(&dataset);
    let twice = roundtrip(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.xlsx");

    let dataset: Dataset = vec![order_row()].into();
    XlsxWriter::write_records_file(&dataset, &path).unwrap();
    let back = XlsxReader::read_records_file(&path).unwrap();
    assert_eq!(back, dataset);
}
