// Krystal file format (XML).
//
// Every krystal kind shares one document layout:
//
//   <?xml version="1.0" encoding="utf-8"?>
//   <krystal>
//     <permutation source="..." axis="..." contour="..." pLevel="2" sortFirst="false" />
//     <strands>
//       <s l="1">1 2 3</s>
//       <s l="2">4 5</s>
//     </strands>
//   </krystal>
//
// The first child of `<krystal>` is the heredity element: its name is the
// krystal kind and its attributes record how the krystal was derived. Only
// permutation krystals interpret their heredity (see
// `permutation_krystal.rs`); every other kind is loaded for its strands.
// Strand order is significant.
//
// Reading goes through `quick-xml`'s pull parser. Writing builds the text
// directly so that saving the same document always yields the same bytes;
// save -> reload -> rebuild relies on that.

use std::fmt::Write;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use crate::error::KrystalError;
use crate::krystal::Strand;

/// Heredity element names that a krystal file may carry.
pub const KRYSTAL_KINDS: [&str; 7] = [
    "constant",
    "line",
    "expansion",
    "shaped",
    "modulation",
    "permutation",
    "path",
];

/// A parsed krystal file: kind, heredity attributes in document order, and
/// the strands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KrystalDocument {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
    pub strands: Vec<Strand>,
}

impl KrystalDocument {
    /// Look up a heredity attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Read and parse a krystal file.
pub fn read_document(path: &Path) -> Result<KrystalDocument, KrystalError> {
    let text = std::fs::read_to_string(path)?;
    parse_document(&text)
}

/// Serialize and write a krystal file.
pub fn write_document(path: &Path, document: &KrystalDocument) -> Result<(), KrystalError> {
    std::fs::write(path, document_to_xml(document))?;
    Ok(())
}

/// Parse the text of a krystal file.
pub fn parse_document(text: &str) -> Result<KrystalDocument, KrystalError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut in_root = false;
    let mut in_strands = false;
    let mut heredity: Option<(String, Vec<(String, String)>)> = None;
    let mut strands = Vec::new();
    // Level and accumulated values of the `<s>` element being read.
    let mut open_strand: Option<(u32, Vec<u32>)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = element_name(&e)?;
                match name.as_str() {
                    "krystal" if !in_root => in_root = true,
                    "strands" if in_root => in_strands = true,
                    "s" if in_strands => open_strand = Some((strand_level(&e)?, Vec::new())),
                    kind if in_root && heredity.is_none() => {
                        heredity = Some(read_heredity(kind, &e)?);
                    }
                    other => {
                        return Err(KrystalError::Malformed(format!(
                            "unexpected element <{other}>"
                        )));
                    }
                }
            }
            Event::Empty(e) => {
                let name = element_name(&e)?;
                match name.as_str() {
                    "s" => {
                        return Err(KrystalError::Malformed("strand element has no values".into()));
                    }
                    "strands" if in_root => {}
                    kind if in_root && heredity.is_none() => {
                        heredity = Some(read_heredity(kind, &e)?);
                    }
                    other => {
                        return Err(KrystalError::Malformed(format!(
                            "unexpected element <{other}/>"
                        )));
                    }
                }
            }
            Event::Text(t) => {
                if let Some((_, values)) = open_strand.as_mut() {
                    values.extend(parse_values(&t.unescape()?)?);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"s" => {
                    let (level, values) = open_strand.take().ok_or_else(|| {
                        KrystalError::Malformed("</s> without matching <s>".into())
                    })?;
                    if values.is_empty() {
                        return Err(KrystalError::Malformed(
                            "strand element has no values".into(),
                        ));
                    }
                    strands.push(Strand::new(level, values));
                }
                b"strands" => in_strands = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !in_root {
        return Err(KrystalError::Malformed("missing <krystal> root element".into()));
    }
    let (kind, attributes) =
        heredity.ok_or_else(|| KrystalError::Malformed("missing heredity element".into()))?;
    Ok(KrystalDocument {
        kind,
        attributes,
        strands,
    })
}

/// Render a document as XML text. Deterministic: the same document always
/// produces the same bytes.
pub fn document_to_xml(document: &KrystalDocument) -> String {
    let mut xml = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(xml, r#"<?xml version="1.0" encoding="utf-8"?>"#);
    let _ = writeln!(xml, "<krystal>");
    let _ = write!(xml, "  <{}", document.kind);
    for (key, value) in &document.attributes {
        let _ = write!(xml, r#" {}="{}""#, key, escape(value.as_str()));
    }
    let _ = writeln!(xml, " />");
    let _ = writeln!(xml, "  <strands>");
    for strand in &document.strands {
        let values = strand
            .values
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(xml, r#"    <s l="{}">{}</s>"#, strand.level, values);
    }
    let _ = writeln!(xml, "  </strands>");
    let _ = writeln!(xml, "</krystal>");
    xml
}

fn element_name(e: &BytesStart<'_>) -> Result<String, KrystalError> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_owned)
        .map_err(|_| KrystalError::Malformed("element name is not UTF-8".into()))
}

fn read_heredity(kind: &str, e: &BytesStart<'_>) -> Result<(String, Vec<(String, String)>), KrystalError> {
    if !KRYSTAL_KINDS.contains(&kind) {
        return Err(KrystalError::Malformed(format!("unknown krystal kind <{kind}>")));
    }
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|_| KrystalError::Malformed("attribute name is not UTF-8".into()))?
            .to_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok((kind.to_owned(), attributes))
}

fn strand_level(e: &BytesStart<'_>) -> Result<u32, KrystalError> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == b"l" {
            let value = attr.unescape_value()?;
            return value
                .trim()
                .parse()
                .map_err(|_| KrystalError::Malformed(format!("bad strand level {value:?}")));
        }
    }
    Err(KrystalError::Malformed("strand element has no level".into()))
}

/// Parse whitespace-separated non-negative integers.
pub fn parse_values(text: &str) -> Result<Vec<u32>, KrystalError> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse()
                .map_err(|_| KrystalError::Malformed(format!("bad strand value {token:?}")))
        })
        .collect()
}
