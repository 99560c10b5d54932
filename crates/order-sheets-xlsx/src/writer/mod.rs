//! XLSX writer

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use crate::address::{column_to_letters, to_a1};
use crate::error::XlsxResult;
use crate::escape::{encode_excel_escapes, escape_xml};
use order_sheets_core::{CellValue, Column, Dataset, HEADER};

/// Name of the single sheet every saved workbook contains
pub const SHEET_NAME: &str = "Sheet1";

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write records to a file path, replacing any existing file
    pub fn write_records_file<P: AsRef<Path>>(dataset: &Dataset, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_records(dataset, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write records as a single-sheet workbook.
    ///
    /// Row 1 is the fixed header; each record fills one row with its values
    /// for the fixed columns. Other fields are not written.
    pub fn write_records<W: Write + Seek>(dataset: &Dataset, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);

        Self::write_content_types(&mut zip)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip)?;
        Self::write_workbook_rels(&mut zip)?;
        Self::write_styles_xml(&mut zip)?;
        Self::write_worksheet(&mut zip, dataset)?;

        zip.finish()?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="{}" sheetId="1" r:id="rId1"/>
    </sheets>
</workbook>"#,
            SHEET_NAME
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    // Excel refuses packages without a default font/fill/border/xf.
    fn write_styles_xml<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
    <fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
    <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
    <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
    <cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
    <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        dataset: &Dataset,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/worksheets/sheet1.xml", options)?;

        let last_col = column_to_letters((HEADER.len() - 1) as u16);
        let last_row = dataset.len() + 1;

        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <dimension ref="A1:{}{}"/>
    <sheetData>"#,
            last_col, last_row
        );

        content.push_str("\n        <row r=\"1\">");
        for (col, name) in HEADER.iter().enumerate() {
            Self::push_string_cell(&mut content, &to_a1(0, col as u16), name);
        }
        content.push_str("\n        </row>");

        for (i, record) in dataset.iter().enumerate() {
            let row = i as u32 + 1;
            content.push_str(&format!("\n        <row r=\"{}\">", row + 1));
            for (col, value) in Column::ALL.iter().zip(record.fixed_values()) {
                let cell_ref = to_a1(row, col.index() as u16);
                match value {
                    CellValue::Number(n) if n.is_finite() => {
                        content.push_str(&format!(
                            "\n            <c r=\"{}\"><v>{}</v></c>",
                            cell_ref, n
                        ));
                    }
                    // NaN and infinities have no numeric cell form
                    CellValue::Number(n) => {
                        Self::push_string_cell(&mut content, &cell_ref, &n.to_string());
                    }
                    CellValue::Boolean(b) => {
                        content.push_str(&format!(
                            "\n            <c r=\"{}\" t=\"b\"><v>{}</v></c>",
                            cell_ref,
                            if b { 1 } else { 0 }
                        ));
                    }
                    CellValue::String(s) => Self::push_string_cell(&mut content, &cell_ref, &s),
                }
            }
            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>\n</worksheet>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Inline string cell; empty strings are kept so blank records survive a reload
    fn push_string_cell(content: &mut String, cell_ref: &str, s: &str) {
        let space = if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
            " xml:space=\"preserve\""
        } else {
            ""
        };
        content.push_str(&format!(
            "\n            <c r=\"{}\" t=\"inlineStr\"><is><t{}>{}</t></is></c>",
            cell_ref,
            space,
            escape_xml(&encode_excel_escapes(s))
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XlsxReader;
    use order_sheets_core::RowRecord;
    use std::io::{Cursor, Read};

    fn sheet_xml(dataset: &Dataset) -> String {
        let mut buf = Vec::new();
        XlsxWriter::write_records(dataset, Cursor::new(&mut buf)).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(buf)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_empty_dataset_writes_header_only() {
        let xml = sheet_xml(&Dataset::new());
        assert!(xml.contains(r#"<dimension ref="A1:I1"/>"#));
        assert!(xml.contains(r#"<c r="A1" t="inlineStr"><is><t>id</t></is></c>"#));
        assert!(xml.contains(r#"<c r="I1" t="inlineStr"><is><t>remark</t></is></c>"#));
        assert!(!xml.contains(r#"<row r="2">"#));
    }

    #[test]
    fn test_extra_fields_dropped() {
        let mut record = RowRecord::new();
        record.set("id", 1);
        record.set("colour", "red");
        let xml = sheet_xml(&vec![record].into());
        assert!(!xml.contains("colour"));
        assert!(!xml.contains("red"));
        assert!(xml.contains(r#"<c r="A2"><v>1</v></c>"#));
    }

    #[test]
    fn test_values_escaped() {
        let mut record = RowRecord::new();
        record.set("content", "<b> & \"q\"");
        record.set("remark", " padded ");
        let xml = sheet_xml(&vec![record].into());
        assert!(xml.contains("&lt;b&gt; &amp; &quot;q&quot;"));
        assert!(xml.contains(r#"<t xml:space="preserve"> padded </t>"#));
    }

    #[test]
    fn test_non_finite_numbers_written_as_text() {
        let mut record = RowRecord::new();
        record.set("price", f64::INFINITY);
        let mut buf = Vec::new();
        XlsxWriter::write_records(&vec![record].into(), Cursor::new(&mut buf)).unwrap();
        let back = XlsxReader::read_records(Cursor::new(buf)).unwrap();
        assert_eq!(back[0].get("price"), Some(&CellValue::from("inf")));
    }
}
