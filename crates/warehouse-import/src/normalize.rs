//! Field normalisation shared by the extractors.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::Metadata;

use warehouse_core::models::image::to_iso_millis;

/// Degrees, minutes and seconds from an EXIF-style value.
///
/// Accepts a number array, a single number or a string such as `"59, 19, 45.5"` or
/// `"59/1 19/1 4550/100"`.
pub fn parse_dms(value: &Value) -> Option<Vec<f64>> {
    let parts = match value {
        Value::Number(n) => vec![n.as_f64()?],
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => parse_number(s),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?,
        Value::String(s) => s
            .split(|c: char| c == ';' || c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(parse_number)
            .collect::<Option<Vec<_>>>()?,
        _ => return None,
    };
    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| !p.is_finite()) {
        return None;
    }
    Some(parts)
}

fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    match raw.split_once('/') {
        Some((num, den)) => {
            let (num, den) = (num.trim().parse::<f64>().ok()?, den.trim().parse::<f64>().ok()?);
            (den != 0.0).then(|| num / den)
        }
        None => raw.parse::<f64>().ok(),
    }
}

/// Decimal degrees from DMS parts; `S` and `W` references negate.
pub fn dms_to_decimal(parts: &[f64], reference: Option<&str>) -> Option<f64> {
    let degrees = *parts.first()?;
    let minutes = parts.get(1).copied().unwrap_or(0.0);
    let seconds = parts.get(2).copied().unwrap_or(0.0);
    let decimal = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    let negative = degrees < 0.0
        || matches!(
            reference.map(|r| r.trim().to_ascii_uppercase()).as_deref(),
            Some("S") | Some("W")
        );
    Some(if negative { -decimal } else { decimal })
}

/// `YYYY:MM:DD HH:MM:SS` (EXIF) to `YYYY-MM-DDTHH:MM:SS.000Z`.
pub fn exif_datetime_to_iso(raw: &str) -> Option<String> {
    let raw = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    ["%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| to_iso_millis(naive.and_utc()))
}

/// Trim whitespace and trailing NULs; empty becomes `None`.
pub fn clean_text(raw: &str) -> Option<String> {
    let cleaned = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

pub fn mtime_iso(metadata: &Metadata) -> Option<String> {
    metadata
        .modified()
        .ok()
        .map(|time| to_iso_millis(DateTime::<Utc>::from(time)))
}

/// `Creation Date` → `creationDate`, `revision_number` → `revisionNumber`.
pub fn to_camel_case(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let words = header
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty());
    for (i, word) in words.enumerate() {
        let mut chars = word.chars();
        let Some(first) = chars.next() else { continue };
        let rest: String = chars.collect();
        let rest = if rest.chars().all(|c| !c.is_lowercase()) {
            rest.to_lowercase()
        } else {
            rest
        };
        if i == 0 {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.push_str(&rest);
    }
    out
}

/// Drop an `application/` prefix and surrounding whitespace.
pub fn clean_mimetype(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix("application/")
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(trimmed)
        .trim();
    clean_text(stripped)
}

/// Integer cell value; `"12"` and `"12.0"` parse, anything else is `None`.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

/// Hands out unique file names, suffixing repeats with `_1`, `_2`, ...
#[derive(Debug, Default)]
pub struct FileNames {
    seen: HashMap<String, usize>,
}

impl FileNames {
    pub fn unique(&mut self, name: &str) -> String {
        if !self.seen.contains_key(name) {
            self.seen.insert(name.to_string(), 0);
            return name.to_string();
        }
        let (stem, ext) = match name.rfind('.') {
            Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
            _ => (name, ""),
        };
        loop {
            let counter = self.seen.entry(name.to_string()).or_insert(0);
            *counter += 1;
            let candidate = format!("{}_{}{}", stem, counter, ext);
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}

/// Text from a catalogue file: UTF-16 with BOM, or UTF-8 (BOM optional).
pub fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// A PDF text string: UTF-16BE when it starts with a BOM, otherwise PDFDocEncoding,
/// which agrees with Latin-1 for printable characters.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

fn entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// Decode XML character and entity references in element text. Unknown references are kept.
pub fn unescape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 12)
            .and_then(|end| entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// First `max` characters, trimmed.
pub fn snippet(text: &str, max: usize) -> String {
    let head: String = text.trim().chars().take(max).collect();
    head.trim().to_string()
}
