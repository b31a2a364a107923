//! Presentation metadata from `.pptx` containers and from a tab-separated catalogue.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use warehouse_core::models::{NewPresentation, PresentationMeta};
use warehouse_core::MediaKind;

use super::{file_name, Extractor, Rows};
use crate::normalize::{
    clean_mimetype, clean_text, decode_text, parse_integer, to_camel_case, unescape_xml,
    FileNames,
};

pub const PPTX_MIMETYPE: &str = "vnd.openxmlformats-officedocument.presentationml.presentation";

const CATALOGUE_EXTENSIONS: [&str; 2] = ["csv", "tsv"];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn is_catalogue(path: &Path) -> bool {
    extension(path).is_some_and(|ext| CATALOGUE_EXTENSIONS.contains(&ext.as_str()))
}

fn modified(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

#[derive(Debug, Clone)]
pub struct PresentationExtractor {
    element: Regex,
}

impl PresentationExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            element: Regex::new(r"<(?:[A-Za-z][\w.-]*:)?([\w.-]+)(?:\s[^>]*)?>([^<]*)</")
                .context("Failed to compile OOXML element pattern")?,
        })
    }

    /// Local element name → text for every leaf element of an OOXML part.
    fn xml_fields(&self, xml: &str) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        for caps in self.element.captures_iter(xml) {
            if let Some(value) = clean_text(&unescape_xml(&caps[2])) {
                fields.entry(caps[1].to_string()).or_insert(value);
            }
        }
        fields
    }

    fn read_part(archive: &mut zip::ZipArchive<File>, name: &str) -> Result<Option<String>> {
        let mut part = match archive.by_name(name) {
            Ok(part) => part,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Failed to open {}", name)),
        };
        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .with_context(|| format!("Failed to read {}", name))?;
        Ok(Some(xml))
    }

    fn extract_pptx(&self, path: &Path) -> Result<PresentationMeta> {
        let name = file_name(path)?;
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let size = file.metadata().ok().map(|m| m.len());
        let mut archive = zip::ZipArchive::new(file).context("Not a valid OOXML container")?;

        let core = Self::read_part(&mut archive, "docProps/core.xml")?
            .map(|xml| self.xml_fields(&xml))
            .unwrap_or_default();
        let app = Self::read_part(&mut archive, "docProps/app.xml")?
            .map(|xml| self.xml_fields(&xml))
            .unwrap_or_default();

        Ok(PresentationMeta {
            original: Some(name.clone()),
            mimetype: Some(PPTX_MIMETYPE.to_string()),
            title: core.get("title").cloned(),
            organisation: app.get("Company").cloned(),
            file_name: name,
            creation_date: core.get("created").cloned(),
            last_modified: core.get("modified").cloned(),
            revision_number: core.get("revision").and_then(|v| parse_integer(v)),
            slide_count: app.get("Slides").and_then(|v| parse_integer(v)),
            word_count: app.get("Words").and_then(|v| parse_integer(v)),
            file_size: size.and_then(|s| i64::try_from(s).ok()),
        })
    }
}

/// Rows of a tab-separated catalogue keyed by camelCased header.
pub fn parse_catalogue(text: &str) -> Vec<HashMap<String, String>> {
    let mut lines = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<String> = header
        .split('\t')
        .map(|name| match to_camel_case(name).as_str() {
            "company" => "organisation".to_string(),
            other => other.to_string(),
        })
        .collect();

    lines
        .map(|line| {
            columns
                .iter()
                .zip(line.split('\t'))
                .filter_map(|(column, cell)| {
                    clean_text(cell).map(|value| (column.clone(), value))
                })
                .collect()
        })
        .collect()
}

/// One catalogue row as presentation metadata; `file_names` de-duplicates `fileName`.
pub fn catalogue_row(
    row: &HashMap<String, String>,
    file_names: &mut FileNames,
) -> Result<PresentationMeta> {
    let text = |key: &str| row.get(key).cloned();
    let integer = |key: &str| row.get(key).and_then(|v| parse_integer(v));

    let base_name = text("digest")
        .map(|digest| format!("{}.ppt", digest))
        .or_else(|| text("fileName"))
        .or_else(|| text("original"))
        .ok_or_else(|| anyhow!("Row has no digest, fileName or original"))?;

    Ok(PresentationMeta {
        original: text("original"),
        mimetype: row.get("mimetype").and_then(|v| clean_mimetype(v)),
        title: text("title"),
        organisation: text("organisation"),
        file_name: file_names.unique(&base_name),
        creation_date: text("creationDate"),
        last_modified: text("lastModified"),
        revision_number: integer("revisionNumber"),
        slide_count: integer("slideCount"),
        word_count: integer("wordCount"),
        file_size: integer("fileSize"),
    })
}

impl Extractor for PresentationExtractor {
    type Record = NewPresentation;

    fn kind(&self) -> MediaKind {
        MediaKind::Presentation
    }

    /// Every `.pptx` plus only the most recently modified catalogue.
    fn select_sources(&self, candidates: Vec<PathBuf>) -> Vec<PathBuf> {
        let (catalogues, mut sources): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|path| is_catalogue(path));
        if let Some(newest) = catalogues.into_iter().max_by_key(|path| modified(path)) {
            sources.push(newest);
        }
        sources
    }

    fn extract(&self, path: &Path) -> Result<Rows<NewPresentation>> {
        if !is_catalogue(path) {
            let meta = self.extract_pptx(path)?;
            return Ok(vec![Ok(NewPresentation { meta })]);
        }

        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let mut file_names = FileNames::default();
        let rows = parse_catalogue(&decode_text(&bytes))
            .iter()
            .enumerate()
            .map(|(i, row)| {
                catalogue_row(row, &mut file_names)
                    .map(|meta| NewPresentation { meta })
                    .with_context(|| format!("Catalogue row {}", i + 2))
            })
            .collect();
        Ok(rows)
    }
}
