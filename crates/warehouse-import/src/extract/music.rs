//! Audio tag extraction.

use anyhow::{Context, Result};
use lofty::file::{AudioFile, FileType, TaggedFileExt};
use lofty::tag::{Accessor, ItemKey};
use std::path::Path;

use warehouse_core::models::{AudioFormat, CommonTags, MusicMeta, NewTrack, TagNumber};
use warehouse_core::MediaKind;

use super::{file_name, Extractor, Rows};
use crate::normalize::{clean_text, mtime_iso};

#[derive(Debug, Clone, Default)]
pub struct MusicExtractor;

impl MusicExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn codec(file_type: FileType) -> Option<&'static str> {
    match file_type {
        FileType::Mpeg => Some("MPEG"),
        FileType::Flac => Some("FLAC"),
        FileType::Mp4 => Some("MPEG-4"),
        FileType::Vorbis => Some("Vorbis"),
        FileType::Opus => Some("Opus"),
        FileType::Wav => Some("PCM"),
        FileType::Aac => Some("AAC"),
        _ => None,
    }
}

impl Extractor for MusicExtractor {
    type Record = NewTrack;

    fn kind(&self) -> MediaKind {
        MediaKind::Music
    }

    fn extract(&self, path: &Path) -> Result<Rows<NewTrack>> {
        let name = file_name(path)?;
        let stat = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        let tagged_file = lofty::read_from_path(path).context("Failed to read audio tags")?;

        let properties = tagged_file.properties();
        let format = AudioFormat {
            container: Some(format!("{:?}", tagged_file.file_type())),
            codec: codec(tagged_file.file_type()).map(str::to_string),
            duration: Some(properties.duration().as_secs_f64()),
            bitrate: properties.audio_bitrate().map(|kbps| kbps * 1000),
            sample_rate: properties.sample_rate(),
            number_of_channels: properties.channels(),
            bits_per_sample: properties.bit_depth(),
        };

        let mut common = CommonTags::default();
        if let Some(tag) = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
        {
            common.title = tag.title().and_then(|s| clean_text(&s));
            common.artist = tag.artist().and_then(|s| clean_text(&s));
            common.album = tag.album().and_then(|s| clean_text(&s));
            common.albumartist = tag.get_string(&ItemKey::AlbumArtist).and_then(clean_text);
            common.genre = tag
                .genre()
                .and_then(|s| clean_text(&s))
                .into_iter()
                .collect();
            common.year = tag.year();
            common.track = TagNumber {
                no: tag.track(),
                of: tag.track_total(),
            };
            common.disk = TagNumber {
                no: tag.disk(),
                of: tag.disk_total(),
            };
            common.comment = tag.comment().and_then(|s| clean_text(&s));
        }

        let meta = MusicMeta {
            file: name.clone(),
            common,
            format,
            size_bytes: stat.len(),
            mtime_iso: mtime_iso(&stat),
        };
        Ok(vec![Ok(NewTrack { file: name, meta })])
    }
}
