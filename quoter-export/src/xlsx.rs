use std::io::{Cursor, Write};

use quoter_shared::PriceBreakdown;
use serde_json::{Map, Value};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::ExportError;

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Results" sheetId="1" r:id="rId1"/><sheet name="Inputs" sheetId="2" r:id="rId2"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/></Relationships>"#;

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Value::String(s) => Cell::Text(s.clone()),
            // Booleans and nested values are written as their JSON text
            other => Cell::Text(other.to_string()),
        }
    }
}

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

/// Workbook with a `Results` sheet (Metric/Value) and an `Inputs` sheet
/// (Parameter/Value, in request order).
pub fn to_spreadsheet(results: &PriceBreakdown, inputs: &Map<String, Value>) -> Result<Vec<u8>, ExportError> {
    let result_rows = vec![
        vec![text("Metric"), text("Value")],
        vec![text("Final Price"), Cell::Number(results.final_price)],
        vec![text("Total Cost"), Cell::Number(results.total_cost)],
        vec![text("Profit"), Cell::Number(results.profit)],
        vec![text("Margin %"), Cell::Number(results.margin)],
        vec![text("Base Cost"), Cell::Number(results.base_cost)],
    ];

    let mut input_rows = vec![vec![text("Parameter"), text("Value")]];
    input_rows.extend(inputs.iter().map(|(key, value)| vec![text(key), Cell::from(value)]));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels", ROOT_RELS.as_bytes().to_vec()),
        ("xl/workbook.xml", WORKBOOK.as_bytes().to_vec()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes().to_vec()),
        ("xl/worksheets/sheet1.xml", worksheet(&result_rows)?),
        ("xl/worksheets/sheet2.xml", worksheet(&input_rows)?),
    ];

    for (name, body) in parts {
        writer.start_file(name, options)?;
        writer.write_all(&body)?;
    }

    Ok(writer.finish()?.into_inner())
}

fn worksheet(rows: &[Vec<Cell>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new("worksheet");
    root.push_attribute(("xmlns", SPREADSHEET_NS));
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    for (r, row) in rows.iter().enumerate() {
        let row_number = (r + 1).to_string();
        let mut row_start = BytesStart::new("row");
        row_start.push_attribute(("r", row_number.as_str()));
        writer.write_event(Event::Start(row_start))?;

        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(c), row_number);
            let mut cell_start = BytesStart::new("c");
            cell_start.push_attribute(("r", reference.as_str()));
            match cell {
                Cell::Text(s) => {
                    cell_start.push_attribute(("t", "inlineStr"));
                    writer.write_event(Event::Start(cell_start))?;
                    writer.write_event(Event::Start(BytesStart::new("is")))?;
                    let mut t = BytesStart::new("t");
                    t.push_attribute(("xml:space", "preserve"));
                    writer.write_event(Event::Start(t))?;
                    let cleaned = strip_control(s);
                    writer.write_event(Event::Text(BytesText::new(&cleaned)))?;
                    writer.write_event(Event::End(BytesEnd::new("t")))?;
                    writer.write_event(Event::End(BytesEnd::new("is")))?;
                }
                Cell::Number(n) => {
                    writer.write_event(Event::Start(cell_start))?;
                    writer.write_event(Event::Start(BytesStart::new("v")))?;
                    writer.write_event(Event::Text(BytesText::new(&n.to_string())))?;
                    writer.write_event(Event::End(BytesEnd::new("v")))?;
                }
                Cell::Empty => continue,
            }
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner().into_inner())
}

/// Zero-based column index to spreadsheet letters (0 -> A, 26 -> AA)
fn column_name(index: usize) -> String {
    let mut name = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

// Control characters other than tab and newlines are not allowed in XML 1.0
fn strip_control(s: &str) -> String {
    s.chars()
        .filter(|c| (*c as u32) >= 0x20 || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}
