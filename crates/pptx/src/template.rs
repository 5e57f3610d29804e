//! Template loading and slide discovery.

use menu_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// A PPTX template held in memory.
#[derive(Debug, Clone)]
pub struct TemplateDeck {
    bytes: Vec<u8>,
}

impl TemplateDeck {
    /// Open a template from disk.
    ///
    /// Fails with `TemplateNotFound` if the path does not exist or does not
    /// hold a PPTX package.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::TemplateNotFound(format!(
                "{} does not exist",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes).map_err(|e| match e {
            Error::TemplateNotFound(reason) => {
                Error::TemplateNotFound(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    /// Use an in-memory PPTX package as template.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(&bytes))
            .map_err(|e| Error::TemplateNotFound(format!("not a PPTX package ({})", e)))?;

        if archive.by_name(PRESENTATION_PATH).is_err() {
            return Err(Error::TemplateNotFound(format!(
                "missing {}",
                PRESENTATION_PATH
            )));
        }
        drop(archive);

        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Slide part paths in presentation order.
    pub fn slide_paths(&self) -> Result<Vec<String>> {
        let mut archive = ZipArchive::new(Cursor::new(&self.bytes))
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;
        get_slide_order(&mut archive)
    }
}

/// Get the ordered list of slide paths.
///
/// Slides follow `p:sldIdLst` in `ppt/presentation.xml`. Slide relationships
/// the list does not mention are appended in file-number order.
pub(crate) fn get_slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let rels_content = read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
    let mut slides: Vec<SlideRel> = Vec::new();

    let mut reader = Reader::from_str(&rels_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = String::new();
                let mut rel_type = String::new();
                let mut target = String::new();

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        _ => {}
                    }
                }

                if rel_type.ends_with("/slide") {
                    let number = extract_slide_number(&target);
                    let path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{}", target),
                    };
                    slides.push(SlideRel { id, path, number });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    slides.sort_by(|a, b| match (a.number, b.number) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.path.cmp(&b.path),
    });

    let listed = get_slide_id_list(archive)?;
    let mut ordered = Vec::with_capacity(slides.len());
    for rel_id in &listed {
        if let Some(pos) = slides.iter().position(|s| &s.id == rel_id) {
            ordered.push(slides.remove(pos).path);
        } else {
            log::warn!("Slide list refers to unknown relationship {}", rel_id);
        }
    }
    ordered.extend(slides.into_iter().map(|s| s.path));

    Ok(ordered)
}

struct SlideRel {
    id: String,
    path: String,
    number: Option<usize>,
}

/// Relationship ids of `p:sldId` entries, in presentation order.
fn get_slide_id_list<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let content = read_file_from_archive(archive, PRESENTATION_PATH)?;
    let mut ids = Vec::new();

    let mut reader = Reader::from_str(&content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"sldId" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
                        ids.push(String::from_utf8_lossy(&attr.value).to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Read a file from the ZIP archive.
pub(crate) fn read_file_from_archive<R: Read + Seek>(
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

/// Extract a slide number from a target like "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("slides/slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slides/slide12.xml"), Some(12));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_slide_order_follows_numbers() {
        let deck = fixture::deck(&["<p:sp/>", "<p:sp/>", "<p:sp/>"]);
        let template = TemplateDeck::from_bytes(deck).unwrap();
        assert_eq!(
            template.slide_paths().unwrap(),
            vec![
                "ppt/slides/slide1.xml",
                "ppt/slides/slide2.xml",
                "ppt/slides/slide3.xml"
            ]
        );
    }

    #[test]
    fn test_slide_order_follows_slide_id_list() {
        let presentation = r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst></p:presentation>"#;
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide3.xml"/></Relationships>"#;
        let package = fixture::zip(&[
            ("ppt/presentation.xml", presentation),
            ("ppt/_rels/presentation.xml.rels", rels),
        ]);

        let template = TemplateDeck::from_bytes(package).unwrap();
        assert_eq!(
            template.slide_paths().unwrap(),
            vec![
                "ppt/slides/slide2.xml",
                "ppt/slides/slide1.xml",
                "ppt/slides/slide3.xml"
            ]
        );
    }

    #[test]
    fn test_from_bytes_rejects_non_pptx() {
        assert!(matches!(
            TemplateDeck::from_bytes(b"plain text".to_vec()),
            Err(Error::TemplateNotFound(_))
        ));

        let xlsx_like = fixture::zip(&[("xl/workbook.xml", "<workbook/>")]);
        assert!(matches!(
            TemplateDeck::from_bytes(xlsx_like),
            Err(Error::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_open_missing_path() {
        assert!(matches!(
            TemplateDeck::open("/nonexistent/menu_template.pptx"),
            Err(Error::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu_template.pptx");
        std::fs::write(&path, fixture::deck(&["<p:sp/>"])).unwrap();

        let template = TemplateDeck::open(&path).unwrap();
        assert_eq!(template.slide_paths().unwrap().len(), 1);
    }
}
