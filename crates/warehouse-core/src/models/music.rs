use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;

/// `{no, of}` pair for track and disc numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagNumber {
    pub no: Option<u32>,
    pub of: Option<u32>,
}

/// Tag values common to every container format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub albumartist: Option<String>,
    pub album: Option<String>,
    pub genre: Vec<String>,
    pub year: Option<u32>,
    pub track: TagNumber,
    pub disk: TagNumber,
    pub comment: Option<String>,
}

/// Stream properties of the audio file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFormat {
    pub container: Option<String>,
    pub codec: Option<String>,
    /// Seconds
    pub duration: Option<f64>,
    /// Bits per second
    pub bitrate: Option<u32>,
    pub sample_rate: Option<u32>,
    pub number_of_channels: Option<u8>,
    pub bits_per_sample: Option<u8>,
}

/// Document stored in `music.meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicMeta {
    pub file: String,
    pub common: CommonTags,
    pub format: AudioFormat,
    pub size_bytes: u64,
    pub mtime_iso: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTrack {
    pub file: String,
    pub meta: MusicMeta,
}

/// One music search result.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MusicTrack {
    pub id: i64,
    pub file_name: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i64>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MusicRecord {
    pub id: i64,
    pub file: String,
    #[schema(value_type = Object)]
    pub meta: Json<Value>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Whether an `any` search value asks for tracks with missing tags: "unknown", or "okänd" and
/// its typing prefixes down to "oka".
pub fn is_unknown_marker(value: &str) -> bool {
    let folded: String = value
        .trim()
        .to_lowercase()
        .chars()
        .map(fold_diacritic)
        .collect();
    folded == "unknown" || (folded.len() >= 3 && "okand".starts_with(&folded))
}
