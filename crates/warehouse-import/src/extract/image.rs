//! EXIF extraction for photos.

use anyhow::{Context, Result};
use exif::{Exif, Field, In, Tag, Value as ExifValue};
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use warehouse_core::models::{ImageMeta, NewImage};
use warehouse_core::MediaKind;

use super::{file_name, Extractor, Rows};
use crate::normalize::{clean_text, dms_to_decimal, exif_datetime_to_iso, mtime_iso, parse_dms};

const DATE_TAGS: [Tag; 3] = [Tag::DateTimeDigitized, Tag::DateTimeOriginal, Tag::DateTime];

#[derive(Debug, Clone, Default)]
pub struct ImageExtractor;

impl ImageExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

fn numbers<T: Copy>(items: &[T], to_f64: impl Fn(T) -> f64) -> Option<Value> {
    match items {
        [] => None,
        [single] => Some(number(to_f64(*single))),
        many => Some(Value::Array(many.iter().map(|v| number(to_f64(*v))).collect())),
    }
}

fn ascii(field: &Field) -> Option<String> {
    match &field.value {
        ExifValue::Ascii(parts) => {
            let joined = parts
                .iter()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .collect::<Vec<_>>()
                .join(" ");
            clean_text(&joined)
        }
        _ => None,
    }
}

/// JSON form of one EXIF field.
fn field_value(field: &Field) -> Value {
    let converted = match &field.value {
        ExifValue::Ascii(_) => ascii(field).map(Value::String),
        ExifValue::Byte(v) => numbers(v, f64::from),
        ExifValue::Short(v) => numbers(v, f64::from),
        ExifValue::Long(v) => numbers(v, f64::from),
        ExifValue::SByte(v) => numbers(v, f64::from),
        ExifValue::SShort(v) => numbers(v, f64::from),
        ExifValue::SLong(v) => numbers(v, f64::from),
        ExifValue::Float(v) => numbers(v, f64::from),
        ExifValue::Double(v) => numbers(v, |x| x),
        ExifValue::Rational(v) => numbers(v, |r| r.to_f64()),
        ExifValue::SRational(v) => numbers(v, |r| r.to_f64()),
        _ => None,
    };
    converted.unwrap_or_else(|| Value::String(field.display_value().to_string()))
}

/// Tag name → value for every field, primary IFD first.
fn raw_tags(exif: &Exif) -> Value {
    let mut tags = Map::new();
    for field in exif.fields() {
        tags.entry(field.tag.to_string())
            .or_insert_with(|| field_value(field));
    }
    Value::Object(tags)
}

fn text_tag(exif: &Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY).and_then(ascii)
}

fn coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let parts = parse_dms(&field_value(field))?;
    let reference = text_tag(exif, ref_tag);
    dms_to_decimal(&parts, reference.as_deref())
}

fn dimension(exif: &Exif, tags: [Tag; 2]) -> Option<u32> {
    tags.iter().find_map(|tag| {
        exif.get_field(*tag, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
    })
}

fn read_exif(path: &Path) -> Result<Option<Exif>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(e) => Err(e).context("Failed to read EXIF data"),
    }
}

impl Extractor for ImageExtractor {
    type Record = NewImage;

    fn kind(&self) -> MediaKind {
        MediaKind::Image
    }

    fn extract(&self, path: &Path) -> Result<Rows<NewImage>> {
        let name = file_name(path)?;
        let stat = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?;

        let mut meta = ImageMeta {
            file_name: name.clone(),
            file_path: path.display().to_string(),
            size_bytes: stat.len(),
            mtime_iso: mtime_iso(&stat),
            make: None,
            model: None,
            create_date: None,
            latitude: None,
            longitude: None,
            width: None,
            height: None,
            raw: Value::Null,
        };

        if let Some(exif) = read_exif(path)? {
            meta.make = text_tag(&exif, Tag::Make);
            meta.model = text_tag(&exif, Tag::Model);
            meta.create_date = DATE_TAGS
                .iter()
                .find_map(|tag| text_tag(&exif, *tag))
                .and_then(|raw| exif_datetime_to_iso(&raw));
            meta.latitude = coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef);
            meta.longitude = coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef);
            meta.width = dimension(&exif, [Tag::PixelXDimension, Tag::ImageWidth]);
            meta.height = dimension(&exif, [Tag::PixelYDimension, Tag::ImageLength]);
            meta.raw = raw_tags(&exif);
        }

        Ok(vec![Ok(NewImage { file: name, meta })])
    }
}
