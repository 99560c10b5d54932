//! Row records

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::column::Column;
use crate::value::CellValue;

/// One data row: an ordered mapping from field name to value.
///
/// Field order is insertion order. A record decoded from a file may carry
/// fields outside the fixed column set; those survive in memory and are
/// dropped when the record is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    fields: Vec<(String, CellValue)>,
}

impl RowRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record from fields whose names are already distinct.
    ///
    /// Skips the per-field name check `set` does, so building a wide record
    /// stays linear. Repeated names are the caller's bug; `get` then sees the
    /// first one.
    pub fn from_unique_fields(fields: Vec<(String, CellValue)>) -> Self {
        Self { fields }
    }

    /// Create a record with every fixed column set to the blank value
    pub fn blank() -> Self {
        let mut record = Self::new();
        for col in Column::ALL {
            record.set(col.name(), CellValue::empty());
        }
        record
    }

    /// Number of fields present
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field by name
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Get a fixed column's value
    pub fn column(&self, column: Column) -> Option<&CellValue> {
        self.get(column.name())
    }

    /// Set a field, replacing the value in place if it already exists
    pub fn set<K: Into<String>, V: Into<CellValue>>(&mut self, name: K, value: V) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<CellValue> {
        let pos = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Values of the nine fixed columns in header order, blank when missing
    pub fn fixed_values(&self) -> [CellValue; 9] {
        Column::ALL.map(|col| self.column(col).cloned().unwrap_or_default())
    }

    /// This record restricted to the fixed columns, in header order, with
    /// missing fields set to the blank value
    pub fn normalized(&self) -> RowRecord {
        let mut out = RowRecord::new();
        for (col, value) in Column::ALL.iter().zip(self.fixed_values()) {
            out.fields.push((col.name().to_string(), value));
        }
        out
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RowRecord::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct RowRecordVisitor;

impl<'de> Visitor<'de> for RowRecordVisitor {
    type Value = RowRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of scalar fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RowRecord, A::Error> {
        let mut record = RowRecord::new();
        while let Some((key, value)) = access.next_entry::<String, CellValue>()? {
            record.set(key, value);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for RowRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RowRecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_replaces_in_place() {
        let mut record = RowRecord::new();
        record.set("price", 5);
        record.set("id", 1);
        record.set("price", 6);

        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, vec!["price", "id"]);
        assert_eq!(record.get("price"), Some(&CellValue::Number(6.0)));
    }

    #[test]
    fn test_normalized_orders_and_fills() {
        let record: RowRecord = [
            ("remark", CellValue::from("rush")),
            ("colour", CellValue::from("red")),
            ("id", CellValue::from(7)),
        ]
        .into_iter()
        .collect();

        let normalized = record.normalized();
        let names: Vec<&str> = normalized.names().collect();
        assert_eq!(names, crate::HEADER.to_vec());
        assert_eq!(normalized.get("id"), Some(&CellValue::Number(7.0)));
        assert_eq!(normalized.get("remark"), Some(&CellValue::from("rush")));
        assert_eq!(normalized.get("price"), Some(&CellValue::empty()));
        assert_eq!(normalized.get("colour"), None);
    }

    #[test]
    fn test_json_preserves_field_order() {
        let json = r#"{"size":"L","id":2,"content":"Chair"}"#;
        let record: RowRecord = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, vec!["size", "id", "content"]);
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }

    #[test]
    fn test_blank_has_all_columns() {
        let record = RowRecord::blank();
        assert_eq!(record.len(), 9);
        assert!(record.iter().all(|(_, v)| v.is_blank()));
    }

    #[test]
    fn test_from_unique_fields_keeps_order() {
        let record = RowRecord::from_unique_fields(vec![
            ("size".to_string(), CellValue::from("M")),
            ("id".to_string(), CellValue::from(3)),
        ]);
        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, vec!["size", "id"]);
        assert_eq!(record.get("id"), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn test_remove() {
        let mut record = RowRecord::blank();
        assert_eq!(record.remove("size"), Some(CellValue::empty()));
        assert_eq!(record.remove("size"), None);
        assert_eq!(record.len(), 8);
    }
}
