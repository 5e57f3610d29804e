//! Error types for menu deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading menu data or building a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read an input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The tabular menu source could not be loaded.
    #[error("Failed to load menu data: {0}")]
    DataLoadError(String),

    /// The workbook has no sheet with the requested name.
    #[error("Sheet '{0}' not found in workbook")]
    MissingSheet(String),

    /// The header row lacks one of the required columns.
    #[error("Required column '{0}' missing from menu data")]
    MissingColumn(String),

    /// The presentation template is absent or not a PPTX document.
    #[error("Template not found or invalid: {0}")]
    TemplateNotFound(String),

    /// Failed to write the generated deck.
    #[error("Failed to write output: {0}")]
    OutputError(String),

    /// ZIP archive error (for PPTX and XLSX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for PPTX and XLSX).
    #[error("XML parsing error: {0}")]
    XmlError(String),
}
