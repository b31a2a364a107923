use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::paging::PageLimits;

/// The four metadata collections served by the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum MediaKind {
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "music")]
    Music,
    #[serde(rename = "pdf")]
    Pdf,
    #[serde(rename = "ppt")]
    Presentation,
}

impl MediaKind {
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Image,
        MediaKind::Music,
        MediaKind::Pdf,
        MediaKind::Presentation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Music => "music",
            MediaKind::Pdf => "pdf",
            MediaKind::Presentation => "ppt",
        }
    }

    /// Sub-directory of `WAREHOUSE_DIR` the import job reads from.
    pub fn default_dir_name(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Music => "music",
            MediaKind::Pdf => "pdf",
            MediaKind::Presentation => "ppt",
        }
    }

    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => &["jpg", "jpeg", "tif", "tiff", "png", "heic"],
            MediaKind::Music => &["mp3", "flac", "m4a", "wav", "ogg"],
            MediaKind::Pdf => &["pdf"],
            MediaKind::Presentation => &["pptx", "csv", "tsv"],
        }
    }

    pub fn page_limits(&self) -> PageLimits {
        match self {
            MediaKind::Image => PageLimits::new(20, 100),
            MediaKind::Music | MediaKind::Pdf | MediaKind::Presentation => {
                PageLimits::new(100, 500)
            }
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" | "images" => Ok(MediaKind::Image),
            "music" => Ok(MediaKind::Music),
            "pdf" | "pdfs" => Ok(MediaKind::Pdf),
            "ppt" | "presentation" | "presentations" => Ok(MediaKind::Presentation),
            other => Err(format!("unknown media kind '{}'", other)),
        }
    }
}
