//! In-memory model of a DrawingML paragraph (`a:p`) and its runs.
//!
//! Slides are streamed, but a paragraph is buffered into a small node tree
//! so its runs can be inspected, rewritten, coloured and split before it is
//! written back out.

use menu_core::{Error, Result};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

/// Fill elements that compete with the warning colour inside `a:rPr`.
const FILL_ELEMENTS: &[&[u8]] = &[
    b"noFill",
    b"solidFill",
    b"gradFill",
    b"blipFill",
    b"pattFill",
    b"grpFill",
];

/// A node of a buffered XML fragment.
#[derive(Debug, Clone)]
pub enum Node {
    Element {
        start: BytesStart<'static>,
        children: Vec<Node>,
    },
    Empty(BytesStart<'static>),
    /// Text, CDATA, comments and anything else passed through as is.
    Other(Event<'static>),
}

impl Node {
    fn start(&self) -> Option<&BytesStart<'static>> {
        match self {
            Node::Element { start, .. } | Node::Empty(start) => Some(start),
            Node::Other(_) => None,
        }
    }

    /// Local name of an element node.
    pub fn local_name(&self) -> Option<&[u8]> {
        self.start().map(|s| local_name(s.name().into_inner()))
    }

    fn is(&self, name: &[u8]) -> bool {
        self.local_name() == Some(name)
    }

    /// Read the children of an element whose start tag was just consumed.
    pub fn read_children(reader: &mut Reader<&[u8]>) -> Result<Vec<Node>> {
        let mut children = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let start = e.into_owned();
                    let nested = Self::read_children(reader)?;
                    children.push(Node::Element {
                        start,
                        children: nested,
                    });
                }
                Ok(Event::Empty(e)) => children.push(Node::Empty(e.into_owned())),
                Ok(Event::End(_)) => return Ok(children),
                Ok(Event::Eof) => {
                    return Err(Error::XmlError("Unexpected end of slide XML".to_string()))
                }
                Ok(other) => children.push(Node::Other(other.into_owned())),
                Err(e) => return Err(Error::XmlError(format!("Error parsing slide: {}", e))),
            }
        }
    }

    /// Write this node and its subtree.
    pub fn write<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            Node::Element { start, children } => {
                write_event(writer, Event::Start(start.borrow()))?;
                for child in children {
                    child.write(writer)?;
                }
                write_event(writer, Event::End(start.to_end()))
            }
            Node::Empty(start) => write_event(writer, Event::Empty(start.borrow())),
            Node::Other(event) => write_event(writer, event.borrow()),
        }
    }
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlError(format!("Failed to write slide XML: {}", e)))
}

/// A buffered `a:p` element.
#[derive(Debug, Clone)]
pub struct Paragraph {
    start: BytesStart<'static>,
    children: Vec<Node>,
}

impl Paragraph {
    pub fn new(start: BytesStart<'static>, children: Vec<Node>) -> Self {
        Self { start, children }
    }

    /// Namespace prefix of the paragraph element, including the colon.
    fn prefix(&self) -> String {
        let name = self.start.name();
        let name = name.into_inner();
        match name.iter().position(|&b| b == b':') {
            Some(pos) => String::from_utf8_lossy(&name[..=pos]).to_string(),
            None => String::new(),
        }
    }

    /// Indices of the run (`a:r`) children.
    fn run_indices(&self) -> Vec<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is(b"r"))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn has_runs(&self) -> bool {
        self.children.iter().any(|n| n.is(b"r"))
    }

    /// Text of every run, in order.
    pub fn run_texts(&self) -> Result<Vec<String>> {
        self.run_indices()
            .into_iter()
            .map(|i| run_text(&self.children[i]))
            .collect()
    }

    /// Give the runs new texts, pairing them up in order.
    pub fn set_run_texts(&mut self, texts: &[String]) {
        let prefix = self.prefix();
        for (i, text) in self.run_indices().into_iter().zip(texts) {
            set_run_text(&mut self.children[i], text, &prefix);
        }
    }

    /// Colour the `n`th run with an sRGB hex value such as `FF0000`.
    pub fn color_run(&mut self, n: usize, rgb: &str) {
        let prefix = self.prefix();
        if let Some(&i) = self.run_indices().get(n) {
            set_run_color(&mut self.children[i], rgb, &prefix);
        }
    }

    /// Replace the `n`th run by one run per segment, each a copy of the
    /// original run with the segment's text, optionally coloured.
    pub fn split_run(&mut self, n: usize, segments: &[(String, Option<&str>)]) {
        let prefix = self.prefix();
        let Some(&i) = self.run_indices().get(n) else {
            return;
        };
        if segments.is_empty() {
            return;
        }

        let original = self.children[i].clone();
        let replacement: Vec<Node> = segments
            .iter()
            .map(|(text, color)| {
                let mut run = original.clone();
                set_run_text(&mut run, text, &prefix);
                if let Some(rgb) = color {
                    set_run_color(&mut run, rgb, &prefix);
                }
                run
            })
            .collect();

        let tail = self.children.split_off(i + 1);
        self.children.truncate(i);
        self.children.extend(replacement);
        self.children.extend(tail);
    }

    pub fn write<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        write_event(writer, Event::Start(self.start.borrow()))?;
        for child in &self.children {
            child.write(writer)?;
        }
        write_event(writer, Event::End(self.start.to_end()))
    }
}

/// Concatenated, unescaped text of a run's `a:t` element.
fn run_text(run: &Node) -> Result<String> {
    let mut text = String::new();
    if let Node::Element { children, .. } = run {
        for child in children.iter().filter(|c| c.is(b"t")) {
            if let Node::Element { children, .. } = child {
                for leaf in children {
                    match leaf {
                        Node::Other(Event::Text(t)) => {
                            let unescaped = t
                                .unescape()
                                .map_err(|e| Error::XmlError(format!("Bad run text: {}", e)))?;
                            text.push_str(&unescaped);
                        }
                        Node::Other(Event::CData(c)) => {
                            text.push_str(&String::from_utf8_lossy(c));
                        }
                        _ => {}
                    }
                }
            }
        }
    }
    Ok(text)
}

/// Replace a run's text, creating the `a:t` element when needed.
fn set_run_text(run: &mut Node, text: &str, prefix: &str) {
    let Node::Element { children, .. } = run else {
        return;
    };

    let new_text = || Node::Element {
        start: BytesStart::new(format!("{}t", prefix)),
        children: if text.is_empty() {
            Vec::new()
        } else {
            vec![Node::Other(Event::Text(BytesText::new(text).into_owned()))]
        },
    };

    match children.iter().position(|c| c.is(b"t")) {
        Some(pos) => {
            let start = match &children[pos] {
                Node::Element { start, .. } | Node::Empty(start) => start.clone(),
                Node::Other(_) => BytesStart::new(format!("{}t", prefix)),
            };
            let mut node = new_text();
            if let Node::Element { start: s, .. } = &mut node {
                *s = start;
            }
            children[pos] = node;
        }
        None => children.push(new_text()),
    }
}

/// Give a run a solid fill colour, replacing any existing fill.
fn set_run_color(run: &mut Node, rgb: &str, prefix: &str) {
    let Node::Element { children, .. } = run else {
        return;
    };

    let rpr_pos = match children.iter().position(|c| c.is(b"rPr")) {
        Some(pos) => pos,
        None => {
            children.insert(0, Node::Empty(BytesStart::new(format!("{}rPr", prefix))));
            0
        }
    };

    if let Node::Empty(start) = &children[rpr_pos] {
        children[rpr_pos] = Node::Element {
            start: start.clone(),
            children: Vec::new(),
        };
    }

    let Node::Element {
        children: props, ..
    } = &mut children[rpr_pos]
    else {
        return;
    };

    props.retain(|p| !FILL_ELEMENTS.iter().any(|f| p.is(f)));

    let mut color = BytesStart::new(format!("{}srgbClr", prefix));
    color.push_attribute(("val", rgb));
    let fill = Node::Element {
        start: BytesStart::new(format!("{}solidFill", prefix)),
        children: vec![Node::Empty(color)],
    };

    // Fill follows an optional outline (`a:ln`) in the schema order.
    let at = props.iter().position(|p| p.is(b"ln")).map_or(0, |p| p + 1);
    props.insert(at, fill);
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

#[cfg(test)]
pub(crate) fn render(paragraph: &Paragraph) -> String {
    let mut writer = Writer::new(Vec::new());
    paragraph.write(&mut writer).unwrap();
    String::from_utf8(writer.into_inner()).unwrap()
}

#[cfg(test)]
pub(crate) fn parse(xml: &str) -> Paragraph {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if local_name(e.name().as_ref()) == b"p" => {
                let start = e.into_owned();
                let children = Node::read_children(&mut reader).unwrap();
                return Paragraph::new(start, children);
            }
            Event::Eof => panic!("no paragraph in {}", xml),
            _ => {}
        }
    }
}
