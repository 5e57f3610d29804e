//! Minimal XLSX worksheet reader.
//!
//! Reads a single named sheet into rows of cell text. Only what a menu
//! table needs is supported: shared strings, inline strings, formula string
//! results, booleans and numbers. Styles and formulas themselves are ignored.

use menu_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::ZipArchive;

const WORKBOOK_PATH: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PATH: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";

/// One worksheet row; index is the zero-based column, missing cells are empty.
pub type Row = Vec<String>;

/// Reader for sheets inside an XLSX (Office Open XML) workbook.
pub struct XlsxReader;

impl XlsxReader {
    /// Create a new XLSX reader.
    pub fn new() -> Self {
        Self
    }

    /// Read every row of the sheet named `sheet_name`.
    pub fn read_sheet<R: Read + Seek>(&self, reader: R, sheet_name: &str) -> Result<Vec<Row>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::DataLoadError(format!("Not an XLSX workbook: {}", e)))?;

        let sheet_path = self.find_sheet_path(&mut archive, sheet_name)?;
        log::debug!("Sheet '{}' is stored at {}", sheet_name, sheet_path);

        let shared = self.read_shared_strings(&mut archive)?;
        let content = self.read_file_from_archive(&mut archive, &sheet_path)?;
        parse_rows(&content, &shared)
    }

    /// Resolve a sheet name to its part path via the workbook relationships.
    fn find_sheet_path<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        sheet_name: &str,
    ) -> Result<String> {
        let workbook = self.read_file_from_archive(archive, WORKBOOK_PATH)?;

        let mut rel_id = None;
        let mut reader = Reader::from_str(&workbook);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sheet" =>
                {
                    let mut name = String::new();
                    let mut id = String::new();
                    for attr in e.attributes().flatten() {
                        let key = attr.key.as_ref();
                        if key == b"name" {
                            name = attr_value(&attr.value);
                        } else if key != b"sheetId" && local_name(key) == b"id" {
                            id = attr_value(&attr.value);
                        }
                    }
                    if name == sheet_name {
                        rel_id = Some(id);
                        break;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!("Error parsing workbook: {}", e)));
                }
                _ => {}
            }
        }

        let rel_id = rel_id.ok_or_else(|| Error::MissingSheet(sheet_name.to_string()))?;

        let rels = self.read_file_from_archive(archive, WORKBOOK_RELS_PATH)?;
        let mut reader = Reader::from_str(&rels);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = String::new();
                    let mut target = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = attr_value(&attr.value),
                            b"Target" => target = attr_value(&attr.value),
                            _ => {}
                        }
                    }
                    if id == rel_id {
                        return Ok(match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("xl/{}", target),
                        });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing workbook relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Err(Error::DataLoadError(format!(
            "Sheet '{}' has no relationship target",
            sheet_name
        )))
    }

    /// Read the shared string table. Workbooks without one yield an empty table.
    fn read_shared_strings<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        if archive.by_name(SHARED_STRINGS_PATH).is_err() {
            return Ok(Vec::new());
        }
        let content = self.read_file_from_archive(archive, SHARED_STRINGS_PATH)?;
        parse_shared_strings(&content)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for XlsxReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `xl/sharedStrings.xml`. Phonetic runs (`rPh`) are skipped.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut strings = Vec::new();
    let mut reader = Reader::from_str(xml);

    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut phonetic_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"si" => current = Some(String::new()),
                b"rPh" => phonetic_depth += 1,
                b"t" => in_text = phonetic_depth == 0,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()) == b"si" {
                    strings.push(String::new());
                }
            }
            Ok(Event::Text(ref e)) if in_text => {
                if let Some(ref mut s) = current {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Bad shared string: {}", e)))?;
                    s.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) if in_text => {
                if let Some(ref mut s) = current {
                    s.push_str(&String::from_utf8_lossy(&**e));
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"si" => strings.push(current.take().unwrap_or_default()),
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing shared strings: {}", e)));
            }
            _ => {}
        }
    }

    Ok(strings)
}

/// The cell currently being read.
#[derive(Debug, Default)]
struct CellState {
    column: usize,
    kind: CellKind,
    raw: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    #[default]
    Number,
    Shared,
    Inline,
    Boolean,
    Text,
}

impl CellKind {
    fn from_attr(value: &str) -> Self {
        match value {
            "s" => Self::Shared,
            "inlineStr" => Self::Inline,
            "b" => Self::Boolean,
            "n" => Self::Number,
            // "str" (formula result), "e" (error) and "d" (ISO date) are plain text
            _ => Self::Text,
        }
    }
}

/// Parse worksheet XML into dense rows of cell text.
fn parse_rows(xml: &str, shared: &[String]) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    let mut reader = Reader::from_str(xml);

    let mut row: Option<Row> = None;
    let mut cell: Option<CellState> = None;
    let mut next_column = 0usize;
    let mut capture = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"row" => {
                    row = Some(Vec::new());
                    next_column = 0;
                }
                b"c" => {
                    let state = start_cell(e, next_column);
                    next_column = state.column + 1;
                    cell = Some(state);
                }
                b"v" => capture = cell.is_some(),
                b"t" => capture = matches!(cell, Some(CellState { kind: CellKind::Inline, .. })),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"row" => rows.push(Vec::new()),
                b"c" => next_column = start_cell(e, next_column).column + 1,
                _ => {}
            },
            Ok(Event::Text(ref e)) if capture => {
                if let Some(ref mut c) = cell {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Bad cell value: {}", e)))?;
                    c.raw.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"v" | b"t" => capture = false,
                b"c" => {
                    if let (Some(c), Some(r)) = (cell.take(), row.as_mut()) {
                        let value = cell_text(&c, shared);
                        if r.len() <= c.column {
                            r.resize(c.column + 1, String::new());
                        }
                        r[c.column] = value;
                    }
                }
                b"row" => {
                    if let Some(r) = row.take() {
                        rows.push(r);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing worksheet: {}", e)));
            }
            _ => {}
        }
    }

    Ok(rows)
}

fn start_cell(e: &BytesStart<'_>, next_column: usize) -> CellState {
    let mut state = CellState {
        column: next_column,
        ..CellState::default()
    };
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                if let Some(column) = column_index(&attr_value(&attr.value)) {
                    state.column = column;
                }
            }
            b"t" => state.kind = CellKind::from_attr(&attr_value(&attr.value)),
            _ => {}
        }
    }
    state
}

/// Convert a cell's raw value into display text.
fn cell_text(cell: &CellState, shared: &[String]) -> String {
    match cell.kind {
        CellKind::Shared => match cell.raw.trim().parse::<usize>() {
            Ok(i) => shared.get(i).cloned().unwrap_or_else(|| {
                log::warn!("Shared string index {} out of range", i);
                String::new()
            }),
            Err(_) => String::new(),
        },
        CellKind::Boolean => match cell.raw.trim() {
            "1" => "True".to_string(),
            "0" => "False".to_string(),
            other => other.to_string(),
        },
        CellKind::Number => format_number(&cell.raw),
        CellKind::Inline | CellKind::Text => cell.raw.clone(),
    }
}

/// Render a numeric cell; integral values lose their fractional part.
fn format_number(raw: &str) -> String {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        _ => raw.to_string(),
    }
}

/// Zero-based column index from a cell reference such as `B7` or `AA10`.
/// Column count of a worksheet (`A` to `XFD`).
const MAX_COLUMNS: usize = 16_384;

fn column_index(reference: &str) -> Option<usize> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for b in letters {
        index = index.checked_mul(26)?.checked_add((b - b'A' + 1) as usize)?;
        if index > MAX_COLUMNS {
            return None;
        }
    }
    Some(index - 1)
}

fn attr_value(value: &[u8]) -> String {
    String::from_utf8_lossy(value).to_string()
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("D12"), Some(3));
        assert_eq!(column_index("Z3"), Some(25));
        assert_eq!(column_index("AA10"), Some(26));
        assert_eq!(column_index("12"), None);
        assert_eq!(column_index("XFD1"), Some(16_383));
        assert_eq!(column_index("XFE1"), None);
        assert_eq!(column_index("ZZZZZZZZZZZZZZ1"), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number("300"), "300");
        assert_eq!(format_number("300.0"), "300");
        assert_eq!(format_number("12.5"), "12.5");
        assert_eq!(format_number("abc"), "abc");
    }

    #[test]
    fn test_shared_strings_skip_phonetic() {
        let xml = r#"<sst xmlns="x"><si><t>Oatmeal</t></si><si><r><t>Fish </t></r><r><t>&amp; Chips</t></r><rPh><t>ignored</t></rPh></si><si/></sst>"#;
        let strings = parse_shared_strings(xml).unwrap();
        assert_eq!(strings, vec!["Oatmeal", "Fish & Chips", ""]);
    }

    #[test]
    fn test_parse_rows_cell_kinds() {
        let shared = vec!["index".to_string(), "B1".to_string()];
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1" t="inlineStr"><is><t>calories</t></is></c></row>
            <row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2"><v>300.0</v></c><c r="C2" t="b"><v>1</v></c><c r="D2" t="str"><f>X</f><v>text</v></c></row>
        </sheetData></worksheet>"#;

        let rows = parse_rows(xml, &shared).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["index", "", "calories"]);
        assert_eq!(rows[1], vec!["B1", "300", "True", "text"]);
    }

    #[test]
    fn test_parse_rows_without_references() {
        let xml = r#"<worksheet><sheetData><row><c t="inlineStr"><is><t>a</t></is></c><c><v>2</v></c></row></sheetData></worksheet>"#;
        let rows = parse_rows(xml, &[]).unwrap();
        assert_eq!(rows, vec![vec!["a".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"r:id"), b"id");
        assert_eq!(local_name(b"sheet"), b"sheet");
    }
}
