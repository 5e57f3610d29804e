use menu_core::{Catalog, MenuItem, MenuLayout, ALLERGEN_FREE};
use menu_pptx::StylePolicy;
use menu_web::AppState;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

pub const SLIDE: &str = "ppt/slides/slide1.xml";

/// A one-slide template with a text box holding one paragraph per line.
pub fn template(lines: &[&str]) -> Vec<u8> {
    let paragraphs: String = lines
        .iter()
        .map(|l| format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", l))
        .collect();
    let slide = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/>{}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
        NS, paragraphs
    );
    let presentation = format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}/>"#, NS);
    let rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/></Relationships>"#;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#),
        ("ppt/presentation.xml", presentation.as_str()),
        ("ppt/_rels/presentation.xml.rels", rels),
        (SLIDE, slide.as_str()),
    ] {
        zip.start_file(name, FileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn catalog() -> Catalog {
    Catalog::from_items(vec![
        MenuItem::new("B1", "Oatmeal", "300", ALLERGEN_FREE),
        MenuItem::new("B2", "Granola & Yogurt", "350", "Contains nuts."),
        MenuItem::new("L1", "Tomato Soup", "120", "Contains celery."),
    ])
}

/// State backed by a template written into `dir`, saving decks to
/// `dir/out`.
pub fn state(dir: &Path, lines: &[&str]) -> AppState {
    let template_path = dir.join("menu_template.pptx");
    std::fs::write(&template_path, template(lines)).unwrap();
    AppState::new(
        catalog(),
        MenuLayout::default(),
        template_path,
        dir.join("out"),
        StylePolicy::Flatten,
    )
}

/// Read one part of a package as text.
pub fn read_part(bytes: &[u8], path: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(path).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}
