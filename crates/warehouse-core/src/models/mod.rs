pub mod fields;
pub mod geo;
pub mod image;
pub mod media;
pub mod music;
pub mod paging;
pub mod pdf;
pub mod presentation;
pub mod search;

pub use fields::{ImageField, MusicField, PdfField, PresentationField};
pub use geo::{GeoFilter, SphericalPoint, EARTH_RADIUS_KM};
pub use image::{ImageHit, ImageMeta, ImageRecord, ImageSearch, ImageSearchParams, NewImage};
pub use media::MediaKind;
pub use music::{
    is_unknown_marker, AudioFormat, CommonTags, MusicMeta, MusicRecord, MusicTrack, NewTrack,
    TagNumber,
};
pub use paging::{Page, PageLimits, PageParams};
pub use pdf::{NewPdf, PageRange, PdfRecord, PdfSummary, PdfText};
pub use presentation::{
    NewPresentation, PresentationMeta, PresentationRecord, PresentationSummary, SortParams,
};
pub use search::SearchPage;
