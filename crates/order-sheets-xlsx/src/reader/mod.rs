//! XLSX reader

mod records;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::address::parse_a1;
use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;
use order_sheets_core::{CellValue, Dataset};

pub(crate) use records::SheetRow;

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read the first sheet of the workbook at `path` as records
    pub fn read_records_file<P: AsRef<Path>>(path: P) -> XlsxResult<Dataset> {
        let file = File::open(path)?;
        Self::read_records(file)
    }

    /// Read the first sheet of a workbook as records.
    ///
    /// The first populated row is the header; each later row with at least
    /// one value becomes a record keyed by header text.
    pub fn read_records<R: Read + Seek>(reader: R) -> XlsxResult<Dataset> {
        let rows = Self::read_first_sheet_rows(reader)?;
        Ok(records::rows_to_records(rows))
    }

    /// Read the raw cell rows of the first sheet
    pub(crate) fn read_first_sheet_rows<R: Read + Seek>(reader: R) -> XlsxResult<Vec<SheetRow>> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let (name, r_id) = sheet_info
            .first()
            .ok_or_else(|| XlsxError::InvalidFormat("Workbook has no sheets".into()))?;
        let path = sheet_paths
            .get(r_id)
            .ok_or_else(|| XlsxError::MissingPart(format!("relationship {} for sheet '{}'", r_id, name)))?;

        if sheet_info.len() > 1 {
            log::debug!(
                "reading sheet '{}' only; ignoring {} other sheet(s)",
                name,
                sheet_info.len() - 1
            );
        }

        Self::read_worksheet(&mut archive, path, &shared_strings)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs carry reading hints, not cell text
        let mut in_rph = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_rph = true,
                    b"t" if in_si && !in_rph => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_rph = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds, in tab order
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let name = attr_value(&e, b"name");
                    let r_id = attr_value(&e, b"r:id");
                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get worksheet part paths by rId
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ unless absolute
                            let full_path = match target.strip_prefix('/') {
                                Some(abs) => abs.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read the cells of one worksheet, row by row
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        shared_strings: &[String],
    ) -> XlsxResult<Vec<SheetRow>> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut rows: Vec<SheetRow> = Vec::new();

        // Rows and cells may omit `r`; positions then follow the previous one
        let mut next_row: u32 = 0;
        let mut next_col: u16 = 0;

        let mut current_row: Option<SheetRow> = None;
        let mut current_cell_ref: Option<String> = None;
        let mut current_cell_type: Option<String> = None;
        let mut current_value: Option<String> = None;
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;
        let mut in_rph = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        let index = Self::row_index(&e, next_row)?;
                        next_row = index + 1;
                        next_col = 0;
                        current_row = Some(SheetRow::new(index));
                    }
                    b"c" => {
                        in_cell = true;
                        current_cell_ref = attr_value(&e, b"r");
                        current_cell_type = attr_value(&e, b"t");
                        current_value = None;
                    }
                    b"v" if in_cell => in_value = true,
                    b"is" if in_cell => {
                        in_inline_str = true;
                        current_value.get_or_insert_with(String::new);
                        current_cell_type = Some("inlineStr".to_string());
                    }
                    b"rPh" if in_inline_str => in_rph = true,
                    b"t" if in_inline_str && !in_rph => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => {
                        // A row with no cells still advances the implicit position
                        let index = Self::row_index(&e, next_row)?;
                        next_row = index + 1;
                    }
                    b"c" => {
                        // Valueless (style-only) cell: occupies a position, holds nothing
                        if let Some(r) = attr_value(&e, b"r") {
                            let (_, col) = parse_a1(&r)?;
                            next_col = col.saturating_add(1);
                        } else {
                            next_col = next_col.saturating_add(1);
                        }
                    }
                    b"is" if in_cell => {
                        current_value.get_or_insert_with(String::new);
                        current_cell_type = Some("inlineStr".to_string());
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"row" => {
                        if let Some(row) = current_row.take() {
                            if !row.cells.is_empty() {
                                rows.push(row);
                            }
                        }
                    }
                    b"c" => {
                        let col = match current_cell_ref.take() {
                            Some(r) => parse_a1(&r)?.1,
                            None => next_col,
                        };
                        next_col = col.saturating_add(1);

                        if let Some(raw) = current_value.take() {
                            let value = Self::cell_value(
                                current_cell_type.as_deref(),
                                &raw,
                                shared_strings,
                            )?;
                            if let (Some(row), Some(value)) = (current_row.as_mut(), value) {
                                row.cells.push((col, value));
                            }
                        }
                        in_cell = false;
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"rPh" => in_rph = false,
                    b"t" if in_inline_str => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    let text = e.unescape()?;
                    current_value
                        .get_or_insert_with(String::new)
                        .push_str(&text);
                }
                Ok(Event::CData(e)) if in_value || in_inline_text => {
                    let text = String::from_utf8_lossy(&e);
                    current_value
                        .get_or_insert_with(String::new)
                        .push_str(&text);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        rows.sort_by_key(|r| r.index);
        Ok(rows)
    }

    fn row_index(e: &BytesStart<'_>, fallback: u32) -> XlsxResult<u32> {
        match attr_value(e, b"r") {
            Some(r) => {
                let n: u32 = r
                    .parse()
                    .map_err(|_| XlsxError::Parse(format!("Invalid row number '{}'", r)))?;
                if n == 0 {
                    return Err(XlsxError::Parse("Row number 0".into()));
                }
                Ok(n - 1)
            }
            None => Ok(fallback),
        }
    }

    /// Convert a raw `<v>` / inline text into a value according to `t`.
    /// `None` for cells that count as missing.
    fn cell_value(
        cell_type: Option<&str>,
        raw: &str,
        shared_strings: &[String],
    ) -> XlsxResult<Option<CellValue>> {
        let value = match cell_type {
            // Shared string
            Some("s") => {
                let idx: usize = raw.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", raw))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }

            // Boolean
            Some("b") => CellValue::Boolean(raw == "1" || raw.eq_ignore_ascii_case("true")),

            // Inline or formula string
            Some("inlineStr") | Some("str") => CellValue::String(decode_excel_escapes(raw)),

            // Number (default type or explicit "n")
            None | Some("n") => match raw.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::String(raw.to_string()),
            },

            // Error cells read as if absent
            Some("e") => return Ok(None),

            // ISO dates ("d") and anything unknown keep their text
            Some(_) => CellValue::String(raw.to_string()),
        };
        Ok(Some(value))
    }
}

/// Unescaped value of the attribute named `key`
fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}
