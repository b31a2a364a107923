//! Fixture files for import tests, built byte by byte so no binary assets are checked in.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use warehouse_import::{ImportMode, JobSettings};

pub struct Workspace {
    pub media: TempDir,
    pub logs: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            media: tempfile::tempdir().expect("Failed to create media directory"),
            logs: tempfile::tempdir().expect("Failed to create log directory"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.media.path().join(name)
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, bytes).expect("Failed to write fixture");
        path
    }

    pub fn settings(&self, extensions: &[&str], mode: ImportMode) -> JobSettings {
        JobSettings {
            dir: self.media.path().to_path_buf(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            mode,
            log_dir: self.logs.path().to_path_buf(),
        }
    }

    pub fn log_contents(&self, file: &str) -> Option<String> {
        std::fs::read_to_string(self.logs.path().join(file)).ok()
    }
}

/// Push back a file's modification time.
pub fn age(path: &Path, by: Duration) {
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(path)
        .expect("Failed to open fixture");
    file.set_modified(SystemTime::now() - by)
        .expect("Failed to set modification time");
}

/// A JPEG holding nothing but start and end markers.
pub fn jpeg_without_exif() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xD9]
}

fn ifd_entry(out: &mut Vec<u8>, tag: u16, count: u32, offset: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes()); // ASCII
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&offset.to_le_bytes());
}

/// A JPEG whose APP1 segment carries `Make` and `DateTime` in IFD0.
pub fn jpeg_with_exif(make: &str, date_time: &str) -> Vec<u8> {
    let make = format!("{}\0", make);
    let date_time = format!("{}\0", date_time);

    // Little-endian TIFF header, IFD0 at offset 8 with two entries.
    let mut tiff = b"II\x2A\x00".to_vec();
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    let data_start = 8 + 2 + 2 * 12 + 4;
    let make_offset = data_start as u32;
    let date_offset = make_offset + make.len() as u32;
    ifd_entry(&mut tiff, 0x010F, make.len() as u32, make_offset);
    ifd_entry(&mut tiff, 0x0132, date_time.len() as u32, date_offset);
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(make.as_bytes());
    tiff.extend_from_slice(date_time.as_bytes());

    let segment_len = (2 + 6 + tiff.len()) as u16;
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// One second of 8 kHz mono 16-bit silence.
pub fn silent_wav() -> Vec<u8> {
    let sample_rate: u32 = 8000;
    let data_len: u32 = sample_rate * 2;
    let mut wav = b"RIFF".to_vec();
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(wav.len() + data_len as usize, 0);
    wav
}

/// A one-page PDF with a `Title` in its Info dictionary.
pub fn write_pdf(path: &Path, title: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        b"BT /F1 12 Tf 72 720 Td (Hello warehouse) Tj ET".to_vec(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Author" => Object::string_literal("Finance"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.save(path).expect("Failed to save PDF");
}

/// A `.pptx` container holding only the two document property parts.
pub fn write_pptx(path: &Path, title: &str, company: &str, slides: u32) {
    let file = std::fs::File::create(path).expect("Failed to create pptx");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();

    zip.start_file("docProps/core.xml", options)
        .expect("Failed to add core.xml");
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><cp:revision>3</cp:revision><dcterms:created xsi:type="dcterms:W3CDTF">2020-02-03T10:00:00Z</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">2020-02-04T11:00:00Z</dcterms:modified></cp:coreProperties>"#,
        title
    )
    .expect("Failed to write core.xml");

    zip.start_file("docProps/app.xml", options)
        .expect("Failed to add app.xml");
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Slides>{}</Slides><Words>250</Words><Company>{}</Company></Properties>"#,
        slides, company
    )
    .expect("Failed to write app.xml");

    zip.finish().expect("Failed to finish pptx");
}

/// UTF-16LE with BOM, the way spreadsheet exports write "Unicode text".
pub fn utf16le(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(|unit| unit.to_le_bytes()));
    bytes
}
