//! Dynamic wallpaper XML serialization and deserialization
//!
//! The dialect is the one read by the GNOME background subsystem:
//!
//! ```xml
//! <background>
//!   <starttime><year>2018</year>...<second>0</second></starttime>
//!   <static><file>a.png</file><duration>600</duration></static>
//!   <transition type="overlay"><duration>5</duration><from>a.png</from><to>b.png</to></transition>
//! </background>
//! ```

use crate::document::{Document, Picture, PictureId, StartTime};
use crate::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;

/// Comment written at the top of every exported file
const GENERATOR_COMMENT: &str = "<!-- Generated by Dynamic Wallpaper Editor -->";

/// Name of the root element
const ROOT: &str = "background";

/// Non-fatal findings reported while decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// An element the format doesn't define, skipped
    UnknownElement(String),
    /// A transition whose `from` isn't the picture right before it, dropped
    OrphanTransition { from: String },
}

impl Notice {
    /// Whether the notice should be shown to the user
    ///
    /// Orphan transitions are dropped silently.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Notice::UnknownElement(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::UnknownElement(name) => write!(f, "Unknown element: {}", name),
            Notice::OrphanTransition { from } => {
                write!(f, "Transition from '{}' doesn't follow its picture", from)
            }
        }
    }
}

/// Result of decoding a wallpaper file
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Decoded document, picture IDs are positional
    pub document: Document,
    /// Non-fatal findings, in document order
    pub notices: Vec<Notice>,
}

/// Minimal element tree, built before anything is interpreted so malformed
/// markup is rejected as a whole
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart) -> Result<Self> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::CorruptedFormat(format!("attribute error: {}", e)))?;
            let value = attr
                .unescape_value()
                .map_err(|e| Error::CorruptedFormat(format!("attribute error: {}", e)))?;
            attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value.into_owned(),
            ));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            ..Self::default()
        })
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parses the whole text into an element tree
fn parse_tree(text: &str) -> Result<Element> {
    // Text is kept verbatim, paths may start or end with whitespace. Only leaf
    // text is read, so indentation landing in parent elements is harmless.
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::CorruptedFormat(format!(
                "XML parse error at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) => stack.push(Element::from_start(e)?),
            Event::Empty(ref e) => {
                let element = Element::from_start(e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::CorruptedFormat("unmatched end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(ref t) => {
                let content = t
                    .unescape()
                    .map_err(|e| Error::CorruptedFormat(format!("invalid text: {}", e)))?;
                append_text(&mut stack, &content)?;
            }
            Event::CData(ref c) => append_text(&mut stack, &String::from_utf8_lossy(c))?,
            Event::Eof => break,
            // Declaration, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::CorruptedFormat(format!(
            "unclosed element '{}'",
            open.name
        )));
    }

    root.ok_or_else(|| Error::CorruptedFormat("no root element".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::CorruptedFormat("multiple root elements".to_string())),
    }
    Ok(())
}

fn append_text(stack: &mut [Element], content: &str) -> Result<()> {
    match stack.last_mut() {
        Some(element) => element.text.push_str(content),
        None if content.trim().is_empty() => {}
        None => return Err(Error::CorruptedFormat("text outside of the root element".to_string())),
    }
    Ok(())
}

/// Parses a non-negative number of seconds, rounding fractional values
fn parse_seconds(element: &str, text: &str) -> Result<u32> {
    let text = text.trim();
    if let Ok(value) = text.parse::<u32>() {
        return Ok(value);
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value.round().clamp(0.0, f64::from(u32::MAX)) as u32),
        _ => Err(Error::CorruptedFormat(format!(
            "invalid number '{}' in <{}>",
            text, element
        ))),
    }
}

/// Reads an optional numeric child, defaulting to zero
fn numeric_child(parent: &Element, name: &str) -> Result<u32> {
    match parent.child_text(name) {
        Some(text) if !text.trim().is_empty() => parse_seconds(name, text),
        _ => Ok(0),
    }
}

fn decode_start_time(element: &Element) -> Result<StartTime> {
    Ok(StartTime::new(
        numeric_child(element, "year")?,
        numeric_child(element, "month")?,
        numeric_child(element, "day")?,
        numeric_child(element, "hour")?,
        numeric_child(element, "minute")?,
        numeric_child(element, "second")?,
    ))
}

/// Decodes a wallpaper file
///
/// Fails with [`Error::CorruptedFormat`] if the markup doesn't parse, and with
/// [`Error::InvalidRoot`] if the root element isn't `background`.
pub fn decode(text: &str) -> Result<Decoded> {
    let root = parse_tree(text)?;
    if root.name != ROOT {
        return Err(Error::InvalidRoot(root.name));
    }

    let mut document = Document {
        start_time: StartTime::zero(),
        pictures: Vec::new(),
    };
    let mut notices = Vec::new();

    for child in &root.children {
        match child.name.as_str() {
            "starttime" => document.start_time = decode_start_time(child)?,
            "static" => {
                let path = child.child_text("file").ok_or_else(|| {
                    Error::CorruptedFormat("<static> element without <file>".to_string())
                })?;
                let index = document.pictures.len();
                document.pictures.push(Picture {
                    id: PictureId(index as u64),
                    path: path.to_string(),
                    static_seconds: numeric_child(child, "duration")?,
                    transition_seconds: 0,
                    index,
                });
            }
            "transition" => {
                if let Some(kind) = child.attribute("type").filter(|kind| *kind != "overlay") {
                    tracing::debug!(kind, "Transition type isn't overlay, reading it anyway");
                }

                let duration = numeric_child(child, "duration")?;
                let from = child.child_text("from").unwrap_or_default();
                match document.pictures.last_mut() {
                    Some(last) if last.path == from => last.transition_seconds = duration,
                    _ => {
                        tracing::debug!(from, "Dropping transition that doesn't follow its picture");
                        notices.push(Notice::OrphanTransition {
                            from: from.to_string(),
                        });
                    }
                }
            }
            other => {
                tracing::warn!(element = other, "Unknown element in wallpaper file");
                notices.push(Notice::UnknownElement(other.to_string()));
            }
        }
    }

    Ok(Decoded { document, notices })
}

/// Encodes a document into the wallpaper dialect
///
/// Pictures are written in index order, each `static` block followed by its
/// transition to the next picture when the transition lasts more than zero
/// seconds. The last picture transitions to the first.
pub fn encode(document: &Document) -> String {
    let start = &document.start_time;
    let mut out = String::new();

    out.push_str(GENERATOR_COMMENT);
    out.push('\n');
    out.push_str("<background>\n");
    out.push_str("\t<starttime>\n");
    for (name, value) in [
        ("year", start.year),
        ("month", start.month),
        ("day", start.day),
        ("hour", start.hour),
        ("minute", start.minute),
        ("second", start.second),
    ] {
        out.push_str(&format!("\t\t<{name}>{value}</{name}>\n"));
    }
    out.push_str("\t</starttime>\n");

    let mut pictures: Vec<&Picture> = document.pictures.iter().collect();
    pictures.sort_by_key(|p| p.index);

    for (position, picture) in pictures.iter().enumerate() {
        let path = escape(picture.path.as_str());
        out.push_str("\t<static>\n");
        out.push_str(&format!("\t\t<file>{}</file>\n", path));
        out.push_str(&format!("\t\t<duration>{}</duration>\n", picture.static_seconds));
        out.push_str("\t</static>\n");

        if picture.transition_seconds > 0 {
            let next = pictures[(position + 1) % pictures.len()];
            out.push_str("\t<transition type=\"overlay\">\n");
            out.push_str(&format!(
                "\t\t<duration>{}</duration>\n",
                picture.transition_seconds
            ));
            out.push_str(&format!("\t\t<from>{}</from>\n", path));
            out.push_str(&format!("\t\t<to>{}</to>\n", escape(next.path.as_str())));
            out.push_str("\t</transition>\n");
        }
    }

    out.push_str("</background>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- a comment -->
<background>
	<starttime>
		<year>2020</year>
		<month>06</month>
		<day>15</day>
		<hour>7</hour>
		<minute>30</minute>
		<second>0</second>
	</starttime>
	<static>
		<duration>1795.0</duration>
		<file>/usr/share/backgrounds/morning.jpg</file>
	</static>
	<transition type="overlay">
		<duration>5.0</duration>
		<from>/usr/share/backgrounds/morning.jpg</from>
		<to>/usr/share/backgrounds/night.jpg</to>
	</transition>
	<static>
		<duration>1800</duration>
		<file>/usr/share/backgrounds/night.jpg</file>
	</static>
</background>
"#;

    #[test]
    fn test_decode_sample() {
        let decoded = decode(SAMPLE).unwrap();
        let doc = decoded.document;

        assert_eq!(doc.start_time, StartTime::new(2020, 6, 15, 7, 30, 0));
        assert_eq!(doc.pictures.len(), 2);
        assert_eq!(doc.pictures[0].path, "/usr/share/backgrounds/morning.jpg");
        assert_eq!(doc.pictures[0].static_seconds, 1795);
        assert_eq!(doc.pictures[0].transition_seconds, 5);
        assert_eq!(doc.pictures[1].static_seconds, 1800);
        assert_eq!(doc.pictures[1].transition_seconds, 0);
        assert_eq!(doc.pictures[1].index, 1);
        assert!(decoded.notices.is_empty());
    }

    #[test]
    fn test_decode_missing_start_fields_default_to_zero() {
        let decoded = decode("<background><starttime><year>2019</year></starttime></background>").unwrap();
        assert_eq!(decoded.document.start_time, StartTime::new(2019, 0, 0, 0, 0, 0));
        assert!(decoded.document.pictures.is_empty());
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(decode("<not-xml"), Err(Error::CorruptedFormat(_))));
        assert!(matches!(decode(""), Err(Error::CorruptedFormat(_))));
        assert!(matches!(
            decode("<background><static></background>"),
            Err(Error::CorruptedFormat(_))
        ));
        assert!(matches!(
            decode("<background/><background/>"),
            Err(Error::CorruptedFormat(_))
        ));
    }

    #[test]
    fn test_decode_invalid_root() {
        match decode("<wallpaper><static/></wallpaper>") {
            Err(Error::InvalidRoot(name)) => assert_eq!(name, "wallpaper"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_decode_reports_unknown_elements() {
        let text = "<background><foo/><static><file>a.png</file><duration>5</duration></static></background>";
        let decoded = decode(text).unwrap();
        assert_eq!(decoded.document.pictures.len(), 1);
        assert_eq!(decoded.notices, vec![Notice::UnknownElement("foo".to_string())]);
        assert!(decoded.notices[0].is_user_visible());
    }

    #[test]
    fn test_decode_drops_orphan_transition() {
        let text = r#"<background>
            <static><file>a.png</file><duration>5</duration></static>
            <transition type="overlay"><duration>3</duration><from>b.png</from><to>a.png</to></transition>
        </background>"#;
        let decoded = decode(text).unwrap();
        assert_eq!(decoded.document.pictures[0].transition_seconds, 0);
        assert_eq!(decoded.notices.len(), 1);
        assert!(!decoded.notices[0].is_user_visible());
    }

    #[test]
    fn test_decode_invalid_number() {
        let text = "<background><static><file>a.png</file><duration>soon</duration></static></background>";
        assert!(matches!(decode(text), Err(Error::CorruptedFormat(_))));
    }

    #[test]
    fn test_encode_wraps_last_transition() {
        let mut doc = Document::new();
        doc.push(PictureId(0), "a.png".into(), 10, 2);
        doc.push(PictureId(1), "b & c.png".into(), 20, 3);

        let text = encode(&doc);
        assert!(text.starts_with(GENERATOR_COMMENT));
        assert!(text.contains("<file>b &amp; c.png</file>"));
        assert!(text.contains("<from>b &amp; c.png</from>\n\t\t<to>a.png</to>"));
        assert!(text.contains("<year>2018</year>"));
        assert_eq!(text.matches("<transition").count(), 2);
    }

    #[test]
    fn test_encode_skips_zero_transitions() {
        let mut doc = Document::new();
        doc.push(PictureId(0), "a.png".into(), 86_400, 0);
        let text = encode(&doc);
        assert!(!text.contains("<transition"));
    }

    #[test]
    fn test_paths_keep_surrounding_whitespace() {
        let mut doc = Document::new();
        doc.push(PictureId(0), "/a b.png ".into(), 10, 5);
        doc.push(PictureId(1), " /c.png".into(), 10, 5);

        let decoded = decode(&encode(&doc)).unwrap();
        let paths: Vec<&str> = decoded.document.pictures.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["/a b.png ", " /c.png"]);
        assert_eq!(decoded.document.durations(), vec![(10, 5), (10, 5)]);
        assert!(decoded.notices.is_empty());
    }

    #[test]
    fn test_transition_from_must_match_exactly() {
        let text = r#"<background>
            <static><file>a.png </file><duration>5</duration></static>
            <transition type="overlay"><duration>3</duration><from>a.png</from><to>a.png</to></transition>
        </background>"#;
        let decoded = decode(text).unwrap();
        assert_eq!(decoded.document.pictures[0].path, "a.png ");
        assert_eq!(decoded.document.pictures[0].transition_seconds, 0);
        assert_eq!(
            decoded.notices,
            vec![Notice::OrphanTransition { from: "a.png".to_string() }]
        );
    }

    #[test]
    fn test_roundtrip() {
        let mut doc = Document::new();
        doc.start_time = StartTime::new(2021, 3, 4, 5, 6, 7);
        doc.push(PictureId(0), "/a.png".into(), 100, 10);
        doc.push(PictureId(1), "/b.png".into(), 200, 0);
        doc.push(PictureId(2), "/c <1>.png".into(), 300, 30);

        let decoded = decode(&encode(&doc)).unwrap();
        assert_eq!(decoded.document.start_time, doc.start_time);
        assert_eq!(decoded.document.durations(), doc.durations());
        let paths: Vec<&str> = decoded.document.pictures.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["/a.png", "/b.png", "/c <1>.png"]);
    }
}
