use crate::core::buffer::BufferRecord;
use crate::utils::error::{GeoShopError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt::Write as _;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const SHEET_NAME: &str = "Shopping Results";

pub struct Column {
    pub header: &'static str,
    /// Record keys to read, first present wins.
    pub keys: &'static [&'static str],
    pub width: f64,
}

const fn column(header: &'static str, keys: &'static [&'static str], width: f64) -> Column {
    Column { header, keys, width }
}

pub const COLUMNS: [Column; 14] = [
    column("Geolocation", &["geolocation", "marketCode"], 12.0),
    column("Translated Query", &["translatedQuery"], 25.0),
    column("Product Title", &["productTitle", "title"], 50.0),
    column("Product ID", &["productId", "product_id"], 20.0),
    column("Price Range", &["priceRange", "price"], 18.0),
    column("Seller Count", &["sellerCount"], 12.0),
    column("Product Link", &["productLink", "product_link", "link"], 50.0),
    column("Seller Name", &["sellerName", "source"], 25.0),
    column("Seller Link", &["sellerLink"], 50.0),
    column("Base Price", &["basePrice"], 12.0),
    column("Shipping", &["shipping"], 12.0),
    column("Total Price", &["totalPrice"], 12.0),
    column("Seller Index", &["sellerIndex"], 12.0),
    column("Saved At", &["savedAt"], 22.0),
];

#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Number(String),
    Text(String),
}

fn cell_for(record: &BufferRecord, column: &Column) -> Cell {
    match record.first_of(column.keys) {
        None | Some(Value::Null) => Cell::Empty,
        Some(Value::Number(n)) => Cell::Number(n.to_string()),
        Some(Value::String(s)) => Cell::Text(s),
        Some(Value::Bool(b)) => Cell::Text(b.to_string()),
        Some(other) => Cell::Text(other.to_string()),
    }
}

fn export_filename(generated_at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "shopping_results_{}.{}",
        generated_at.format("%Y-%m-%d_%H-%M-%S"),
        extension
    )
}

/// 0 -> "A", 25 -> "Z", 26 -> "AA"
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // XML 1.0 不允許的字元
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            '\u{FFFE}' | '\u{FFFF}' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

fn write_cell(xml: &mut String, reference: &str, cell: &Cell, style: Option<u32>) {
    let style_attr = style.map(|s| format!(" s=\"{}\"", s)).unwrap_or_default();
    match cell {
        Cell::Empty => {}
        Cell::Number(n) => {
            let _ = write!(xml, "<c r=\"{}\"{}><v>{}</v></c>", reference, style_attr, n);
        }
        Cell::Text(t) => {
            let _ = write!(
                xml,
                "<c r=\"{}\" t=\"inlineStr\"{}><is><t xml:space=\"preserve\">{}</t></is></c>",
                reference,
                style_attr,
                xml_escape(t)
            );
        }
    }
}

fn sheet_xml(records: &[BufferRecord]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">",
    );

    // 凍結標題列
    xml.push_str(
        "<sheetViews><sheetView workbookViewId=\"0\">\
         <pane ySplit=\"1\" topLeftCell=\"A2\" activePane=\"bottomLeft\" state=\"frozen\"/>\
         </sheetView></sheetViews><sheetFormatPr defaultRowHeight=\"15\"/><cols>",
    );
    for (index, column) in COLUMNS.iter().enumerate() {
        let _ = write!(
            xml,
            "<col min=\"{n}\" max=\"{n}\" width=\"{w}\" customWidth=\"1\"/>",
            n = index + 1,
            w = column.width
        );
    }
    xml.push_str("</cols><sheetData>");

    xml.push_str("<row r=\"1\">");
    for (index, column) in COLUMNS.iter().enumerate() {
        let reference = format!("{}1", column_letter(index));
        write_cell(&mut xml, &reference, &Cell::Text(column.header.to_string()), Some(1));
    }
    xml.push_str("</row>");

    for (row_index, record) in records.iter().enumerate() {
        let row_number = row_index + 2;
        let _ = write!(xml, "<row r=\"{}\">", row_number);
        for (index, column) in COLUMNS.iter().enumerate() {
            let reference = format!("{}{}", column_letter(index), row_number);
            write_cell(&mut xml, &reference, &cell_for(record, column), None);
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// style 1 = 標題列：粗體白字、藍色底
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><color rgb="FFFFFFFF"/><name val="Calibri"/></font></fonts><fills count="3"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill><fill><patternFill patternType="solid"><fgColor rgb="FF4472C4"/><bgColor indexed="64"/></patternFill></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

fn workbook_xml() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
         <sheets><sheet name=\"{}\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>",
        xml_escape(SHEET_NAME)
    )
}

fn core_properties_xml(generated_at: DateTime<Utc>) -> String {
    let stamp = generated_at.format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
         xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:dcterms=\"http://purl.org/dc/terms/\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
         <dc:title>{}</dc:title><dc:creator>geo-shopper</dc:creator>\
         <dcterms:created xsi:type=\"dcterms:W3CDTF\">{}</dcterms:created></cp:coreProperties>",
        xml_escape(SHEET_NAME),
        stamp
    )
}

/// Renders the records as a single-sheet XLSX workbook.
pub fn render_xlsx(
    records: &[BufferRecord],
    generated_at: DateTime<Utc>,
) -> Result<ExportDocument> {
    tracing::debug!("Rendering workbook with {} row(s)", records.len());

    let bytes = {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        let parts: [(&str, String); 6] = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
            ("_rels/.rels", ROOT_RELS_XML.to_string()),
            ("docProps/core.xml", core_properties_xml(generated_at)),
            ("xl/workbook.xml", workbook_xml()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.to_string()),
            ("xl/styles.xml", STYLES_XML.to_string()),
        ];
        for (name, content) in parts {
            zip.start_file::<_, ()>(name, FileOptions::default())?;
            zip.write_all(content.as_bytes())?;
        }

        zip.start_file::<_, ()>("xl/worksheets/sheet1.xml", FileOptions::default())?;
        zip.write_all(sheet_xml(records).as_bytes())?;

        let cursor = zip.finish()?;
        cursor.into_inner()
    };

    Ok(ExportDocument {
        bytes,
        filename: export_filename(generated_at, "xlsx"),
        content_type: XLSX_CONTENT_TYPE,
    })
}

/// Same 14 columns as the workbook, as CSV.
pub fn render_csv(records: &[BufferRecord], generated_at: DateTime<Utc>) -> Result<ExportDocument> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS.iter().map(|c| c.header))?;

    for record in records {
        writer.write_record(COLUMNS.iter().map(|column| match cell_for(record, column) {
            Cell::Empty => String::new(),
            Cell::Number(n) | Cell::Text(n) => n,
        }))?;
    }

    let bytes = writer.into_inner().map_err(|e| GeoShopError::ExportFailed {
        message: format!("failed to flush CSV writer: {}", e),
    })?;

    Ok(ExportDocument {
        bytes,
        filename: export_filename(generated_at, "csv"),
        content_type: CSV_CONTENT_TYPE,
    })
}
