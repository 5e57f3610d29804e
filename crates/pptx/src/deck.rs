//! Rendering a template into a finished deck and saving it.

use crate::substitute::{StylePolicy, Substituter, SubstitutionStats};
use crate::template::{get_slide_order, TemplateDeck};
use menu_core::{DeckDate, Error, ResolvedMeal, Result, TokenTable};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A generated deck, ready to be saved or sent.
#[derive(Debug, Clone)]
pub struct RenderedDeck {
    pub bytes: Vec<u8>,
    pub stats: SubstitutionStats,
}

/// Substitute all tokens for `meals` and `date` into a copy of the template.
pub fn substitute(
    template: &TemplateDeck,
    meals: &[ResolvedMeal],
    date: &DeckDate,
    policy: StylePolicy,
) -> Result<RenderedDeck> {
    let table = TokenTable::new(date, meals);
    render(template, &table, policy)
}

/// Rewrite every slide of the template with the given token table. All
/// other package parts are copied unchanged.
pub fn render(template: &TemplateDeck, table: &TokenTable, policy: StylePolicy) -> Result<RenderedDeck> {
    let mut archive = ZipArchive::new(Cursor::new(template.bytes()))
        .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

    let slide_numbers: HashMap<String, usize> = get_slide_order(&mut archive)?
        .into_iter()
        .enumerate()
        .map(|(i, path)| (path, i + 1))
        .collect();

    let substituter = Substituter::new(table, policy);
    let mut stats = SubstitutionStats::default();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", i, e)))?;
        let name = file.name().to_string();
        let options = FileOptions::default().compression_method(match file.compression() {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        });

        if file.is_dir() {
            writer
                .add_directory(name, options)
                .map_err(|e| Error::ZipError(format!("Failed to write directory: {}", e)))?;
            continue;
        }

        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
        drop(file);

        if let Some(number) = slide_numbers.get(&name) {
            log::debug!("Checking slide {} ({})", number, name);
            let xml = String::from_utf8(content)
                .map_err(|e| Error::XmlError(format!("'{}' is not UTF-8: {}", name, e)))?;
            content = substituter.substitute_slide(&xml, &mut stats)?.into_bytes();
            stats.slides += 1;
        }

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", name, e)))?;
        writer
            .write_all(&content)
            .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", name, e)))?;
    }

    let bytes = writer
        .finish()
        .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))?
        .into_inner();

    log::info!(
        "Rendered {} slides: {} paragraphs, {} tokens, {} allergen warnings",
        stats.slides,
        stats.paragraphs,
        stats.tokens,
        stats.warnings
    );

    Ok(RenderedDeck { bytes, stats })
}

/// Write a deck to `<output_dir>/<long date>_menu.pptx`, replacing any
/// existing file of that name.
pub fn save(bytes: &[u8], output_dir: impl AsRef<Path>, date: &DeckDate) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir).map_err(|e| {
        Error::OutputError(format!("Failed to create {}: {}", output_dir.display(), e))
    })?;

    let path = output_dir.join(date.output_file_name());
    std::fs::write(&path, bytes)
        .map_err(|e| Error::OutputError(format!("Failed to write {}: {}", path.display(), e)))?;

    log::info!("Saved deck to {}", path.display());
    Ok(path)
}
