//! Placeholder substitution over slide XML.
//!
//! Every paragraph inside a text body (text boxes, table cells, grouped
//! shapes) is flattened to one string, scanned for tokens and written back
//! according to the [`StylePolicy`].

use crate::paragraph::{local_name, Node, Paragraph};
use menu_core::{Error, Result, Scanned, TokenTable};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};

/// sRGB colour used for allergen warnings.
pub const WARNING_COLOR: &str = "FF0000";

/// How rewritten paragraphs treat their runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePolicy {
    /// Runs holding a flagged allergen token turn red, then the whole
    /// substituted text goes into the first run and the others are emptied.
    #[default]
    Flatten,
    /// Runs keep their own text and formatting; flagged allergen values are
    /// split into their own red run. Paragraphs with a token spanning runs
    /// fall back to `Flatten`.
    Preserve,
}

/// Counters collected while substituting a deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionStats {
    pub slides: usize,
    pub paragraphs: usize,
    pub tokens: usize,
    pub warnings: usize,
}

/// Rewrites slide XML using a token table.
pub struct Substituter<'a> {
    table: &'a TokenTable,
    policy: StylePolicy,
}

impl<'a> Substituter<'a> {
    pub fn new(table: &'a TokenTable, policy: StylePolicy) -> Self {
        Self { table, policy }
    }

    /// Substitute tokens in one slide part.
    pub fn substitute_slide(&self, xml: &str, stats: &mut SubstitutionStats) -> Result<String> {
        let mut reader = Reader::from_str(xml);
        let mut writer = Writer::new(Vec::with_capacity(xml.len()));
        let mut text_body_depth = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::XmlError(format!("Error parsing slide: {}", e)))?;

            match event {
                Event::Start(e) => {
                    let name = local_name(e.name().as_ref()).to_vec();
                    if name == b"p" && text_body_depth > 0 {
                        let start = e.into_owned();
                        let children = Node::read_children(&mut reader)?;
                        let mut paragraph = Paragraph::new(start, children);
                        self.rewrite_paragraph(&mut paragraph, stats)?;
                        paragraph.write(&mut writer)?;
                        continue;
                    }
                    if name == b"txBody" {
                        text_body_depth += 1;
                    }
                    write(&mut writer, Event::Start(e))?;
                }
                Event::End(e) => {
                    if local_name(e.name().as_ref()) == b"txBody" {
                        text_body_depth = text_body_depth.saturating_sub(1);
                    }
                    write(&mut writer, Event::End(e))?;
                }
                Event::Eof => break,
                other => write(&mut writer, other)?,
            }
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::XmlError(format!("Slide XML is not UTF-8: {}", e)))
    }

    /// Substitute tokens in a single paragraph. Paragraphs without runs or
    /// without recognised tokens are left untouched.
    pub fn rewrite_paragraph(&self, paragraph: &mut Paragraph, stats: &mut SubstitutionStats) -> Result<()> {
        if !paragraph.has_runs() {
            return Ok(());
        }

        let texts = paragraph.run_texts()?;
        let full: String = texts.concat();
        let scanned = self.table.scan(&full);
        if !scanned.is_changed() {
            return Ok(());
        }

        stats.paragraphs += 1;
        stats.tokens += scanned.substitutions.len();
        stats.warnings += scanned.warnings().count();

        match self.policy {
            StylePolicy::Flatten => flatten(paragraph, &texts, &scanned),
            StylePolicy::Preserve => {
                if !preserve(paragraph, &texts, &full, &scanned) {
                    log::debug!("Token spans runs in '{}', flattening paragraph", full);
                    flatten(paragraph, &texts, &scanned);
                }
            }
        }

        Ok(())
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlError(format!("Failed to write slide XML: {}", e)))
}

/// Colour runs carrying a flagged allergen token, then move all text into
/// the first run.
fn flatten(paragraph: &mut Paragraph, texts: &[String], scanned: &Scanned) {
    for warning in scanned.warnings() {
        for (n, text) in texts.iter().enumerate() {
            if text.contains(&warning.token) {
                paragraph.color_run(n, WARNING_COLOR);
            }
        }
    }

    let mut flattened = vec![String::new(); texts.len()];
    if let Some(first) = flattened.first_mut() {
        *first = scanned.text.clone();
    }
    paragraph.set_run_texts(&flattened);
}

/// Substitute inside each run. Returns `false` without touching the
/// paragraph when some token crosses a run boundary.
fn preserve(paragraph: &mut Paragraph, texts: &[String], full: &str, scanned: &Scanned) -> bool {
    let mut bounds = Vec::with_capacity(texts.len());
    let mut offset = 0;
    for text in texts {
        bounds.push(offset..offset + text.len());
        offset += text.len();
    }

    let mut per_run: Vec<Vec<usize>> = vec![Vec::new(); texts.len()];
    for (i, sub) in scanned.substitutions.iter().enumerate() {
        let owner = bounds
            .iter()
            .position(|b| b.start <= sub.source.start && sub.source.end <= b.end);
        match owner {
            Some(n) => per_run[n].push(i),
            None => return false,
        }
    }

    for (n, subs) in per_run.iter().enumerate().rev() {
        if subs.is_empty() {
            continue;
        }

        let mut segments: Vec<(String, Option<&str>)> = Vec::new();
        let mut current = String::new();
        let mut cursor = bounds[n].start;

        for &i in subs {
            let sub = &scanned.substitutions[i];
            current.push_str(&full[cursor..sub.source.start]);
            let value = &scanned.text[sub.output.clone()];
            if sub.warning {
                if !current.is_empty() {
                    segments.push((std::mem::take(&mut current), None));
                }
                if !value.is_empty() {
                    segments.push((value.to_string(), Some(WARNING_COLOR)));
                }
            } else {
                current.push_str(value);
            }
            cursor = sub.source.end;
        }
        current.push_str(&full[cursor..bounds[n].end]);
        if !current.is_empty() || segments.is_empty() {
            segments.push((current, None));
        }

        paragraph.split_run(n, &segments);
    }

    true
}
