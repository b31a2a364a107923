//! PDF page count, Info dictionary, XMP packet and text snippet.

use anyhow::{Context, Result};
use lopdf::{Dictionary, Document, Object};
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::path::Path;

use warehouse_core::models::NewPdf;
use warehouse_core::MediaKind;

use super::{file_name, Extractor, Rows};
use crate::normalize::{decode_pdf_string, snippet, unescape_xml};

/// Characters of extracted text kept per document.
pub const TEXT_SNIPPET_CHARS: usize = 500;

/// Flattens an XMP packet into `key → value`, keys lowercased without their namespace.
#[derive(Debug, Clone)]
pub struct XmpParser {
    list: Regex,
    item: Regex,
    leaf: Regex,
    description: Regex,
    attribute: Regex,
}

impl XmpParser {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).with_context(|| format!("Failed to compile XMP pattern {}", pattern))
        };
        Ok(Self {
            list: compile(
                r"(?s)<([A-Za-z][\w.-]*):([\w.-]+)(?:\s[^>]*)?>\s*<rdf:(?:Alt|Seq|Bag)\b[^>]*>(.*?)</rdf:(?:Alt|Seq|Bag)>",
            )?,
            item: compile(r"(?s)<rdf:li\b[^>]*>([^<]*)</rdf:li>")?,
            leaf: compile(r"<([A-Za-z][\w.-]*):([\w.-]+)(?:\s[^>]*)?>([^<]*)</")?,
            description: compile(r"(?s)<rdf:Description\b([^>]*)>")?,
            attribute: compile(r#"([A-Za-z][\w.-]*):([\w.-]+)\s*=\s*"([^"]*)""#)?,
        })
    }

    pub fn parse(&self, xml: &str) -> Map<String, Value> {
        let mut out = Map::new();
        let mut put = |prefix: &str, name: &str, value: String| {
            if matches!(prefix, "rdf" | "xmlns" | "x" | "xml") || value.is_empty() {
                return;
            }
            out.entry(name.to_lowercase()).or_insert(Value::String(value));
        };

        for caps in self.list.captures_iter(xml) {
            let items: Vec<String> = self
                .item
                .captures_iter(&caps[3])
                .map(|item| unescape_xml(item[1].trim()))
                .filter(|value| !value.is_empty())
                .collect();
            put(&caps[1], &caps[2], items.join(", "));
        }
        for caps in self.leaf.captures_iter(xml) {
            put(&caps[1], &caps[2], unescape_xml(caps[3].trim()));
        }
        for description in self.description.captures_iter(xml) {
            for caps in self.attribute.captures_iter(&description[1]) {
                put(&caps[1], &caps[2], unescape_xml(caps[3].trim()));
            }
        }
        out
    }
}

fn object_value(document: &Document, object: &Object, depth: u8) -> Option<Value> {
    match object {
        Object::String(bytes, _) => Some(Value::String(
            decode_pdf_string(bytes).trim_end_matches('\0').to_string(),
        )),
        Object::Name(name) => Some(Value::String(String::from_utf8_lossy(name).into_owned())),
        Object::Integer(n) => Some(Value::Number((*n).into())),
        Object::Real(x) => Number::from_f64(f64::from(*x)).map(Value::Number),
        Object::Boolean(b) => Some(Value::Bool(*b)),
        Object::Reference(id) if depth > 0 => document
            .get_object(*id)
            .ok()
            .and_then(|target| object_value(document, target, depth - 1)),
        _ => None,
    }
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// The Info dictionary as JSON, keys as written (`Title`, `Author`, ...).
pub fn read_info(document: &Document) -> Map<String, Value> {
    let mut info = Map::new();
    if let Some(dict) = info_dictionary(document) {
        for (key, object) in dict.iter() {
            if let Some(value) = object_value(document, object, 2) {
                info.insert(String::from_utf8_lossy(key).into_owned(), value);
            }
        }
    }
    info
}

/// Raw XMP packet from the catalog's `/Metadata` stream.
pub fn read_xmp_packet(document: &Document) -> Option<String> {
    let catalog = document.catalog().ok()?;
    let stream = match catalog.get(b"Metadata").ok()? {
        Object::Reference(id) => document.get_object(*id).ok()?.as_stream().ok()?,
        Object::Stream(stream) => stream,
        _ => return None,
    };
    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    Some(String::from_utf8_lossy(&content).into_owned())
}

fn extract_text(bytes: &[u8], path: &Path) -> String {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => snippet(&text, TEXT_SNIPPET_CHARS),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, file = %path.display(), "PDF text extraction failed");
            String::new()
        }
        Err(_) => {
            tracing::warn!(file = %path.display(), "PDF text extraction panicked");
            String::new()
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfExtractor {
    xmp: XmpParser,
}

impl PdfExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            xmp: XmpParser::new()?,
        })
    }
}

impl Extractor for PdfExtractor {
    type Record = NewPdf;

    fn kind(&self) -> MediaKind {
        MediaKind::Pdf
    }

    fn extract(&self, path: &Path) -> Result<Rows<NewPdf>> {
        let filename = file_name(path)?;
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let document = Document::load_mem(&bytes).context("Failed to parse PDF")?;

        let numpages = i64::try_from(document.get_pages().len()).ok();
        let info = read_info(&document);
        let xmp = read_xmp_packet(&document)
            .map(|packet| self.xmp.parse(&packet))
            .unwrap_or_default();
        let text = extract_text(&bytes, path);

        Ok(vec![Ok(NewPdf {
            filename,
            numpages,
            text,
            xmp,
            info,
        })])
    }
}
