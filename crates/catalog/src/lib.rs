//! Menu catalog loader.
//!
//! Loads menu items from the `data` sheet of an .xlsx workbook. The sheet's
//! first non-empty row is the header and must name the `index`, `items`,
//! `calories` and `allergens` columns.

pub mod xlsx;

pub use xlsx::XlsxReader;

use menu_core::{Catalog, Error, MenuItem, Result};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use unicode_normalization::UnicodeNormalization;
use xlsx::Row;

/// Sheet read when none is configured.
pub const DEFAULT_SHEET: &str = "data";

/// Header names of the required columns, in `MenuItem` field order.
pub const REQUIRED_COLUMNS: [&str; 4] = ["index", "items", "calories", "allergens"];

/// Load the catalog from a workbook on disk.
pub fn load(path: impl AsRef<Path>, sheet: &str) -> Result<Catalog> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::DataLoadError(format!(
            "Menu data file not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let catalog = load_from_reader(BufReader::new(file), sheet)?;
    log::info!(
        "Loaded {} menu items from {} (sheet '{}')",
        catalog.len(),
        path.display(),
        sheet
    );
    Ok(catalog)
}

/// Load the catalog from an in-memory workbook.
pub fn load_bytes(bytes: &[u8], sheet: &str) -> Result<Catalog> {
    load_from_reader(Cursor::new(bytes), sheet)
}

/// Load the catalog from any seekable workbook reader.
pub fn load_from_reader<R: Read + Seek>(reader: R, sheet: &str) -> Result<Catalog> {
    let rows = XlsxReader::new().read_sheet(reader, sheet)?;
    catalog_from_rows(&rows)
}

/// Build a catalog from sheet rows, the first non-empty row being the header.
pub fn catalog_from_rows(rows: &[Row]) -> Result<Catalog> {
    let mut rows = rows.iter().skip_while(|r| r.iter().all(|c| c.trim().is_empty()));

    let header = rows
        .next()
        .ok_or_else(|| Error::DataLoadError("Menu sheet is empty".to_string()))?;

    let mut columns = [0usize; 4];
    for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::MissingColumn(name.to_string()))?;
    }

    let mut catalog = Catalog::new();
    for (offset, row) in rows.enumerate() {
        let [id, name, calories, allergens] = columns.map(|c| normalize_cell(row.get(c)));
        if id.is_empty() {
            if row.iter().any(|c| !c.trim().is_empty()) {
                log::warn!("Skipping data row {} with empty index", offset + 1);
            }
            continue;
        }
        catalog.insert(MenuItem::new(id, name, calories, allergens));
    }

    Ok(catalog)
}

/// Normalise a cell to trimmed NFC text; missing cells become empty.
fn normalize_cell(cell: Option<&String>) -> String {
    cell.map(|c| c.nfc().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
