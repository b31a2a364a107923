//! Searchable field allow-lists.
//!
//! Path segments such as `/api/music-search/{field}/{value}` are parsed into these enums
//! before any query is built. Matching is ASCII case-insensitive.

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

macro_rules! search_fields {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical name as used in URLs and responses.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|field| field.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| AppError::InvalidField(s.to_string()))
            }
        }
    };
}

search_fields! {
    /// Image search fields. `Any` matches file name, make or model.
    ImageField {
        File => "file",
        Make => "make",
        Model => "model",
        Any => "any",
    }
}

search_fields! {
    /// Music search fields. `Any` matches all five tag columns.
    MusicField {
        File => "file",
        Title => "title",
        Album => "album",
        Artist => "artist",
        Genre => "genre",
        Year => "year",
        Any => "any",
    }
}

search_fields! {
    /// PDF search fields. `Everything` matches text, info, XMP title and file name, plus the
    /// page count when the value is a page filter.
    PdfField {
        Filename => "filename",
        Title => "title",
        Author => "author",
        Subject => "subject",
        Keywords => "keywords",
        Pages => "pages",
        Text => "text",
        Everything => "everything",
    }
}

search_fields! {
    /// Presentation metadata fields; every field except `Any` is also a sort key.
    PresentationField {
        CreationDate => "creationDate",
        FileName => "fileName",
        FileSize => "fileSize",
        Id => "id",
        LastModified => "lastModified",
        Mimetype => "mimetype",
        Organisation => "organisation",
        Original => "original",
        RevisionNumber => "revisionNumber",
        SlideCount => "slideCount",
        Title => "title",
        WordCount => "wordCount",
        Any => "any",
    }
}

impl MusicField {
    /// Concrete tag columns searched by `any`.
    pub const COLUMNS: &'static [MusicField] = &[
        MusicField::Title,
        MusicField::Album,
        MusicField::Artist,
        MusicField::Genre,
        MusicField::Year,
    ];
}

impl PresentationField {
    /// Parse a `sortField` query value. `any` is not a sort key.
    pub fn parse_sort(s: &str) -> Result<Self, AppError> {
        match s.parse::<PresentationField>()? {
            PresentationField::Any => Err(AppError::InvalidField(format!(
                "{} (not sortable)",
                s.trim()
            ))),
            field => Ok(field),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PresentationField::FileSize
                | PresentationField::Id
                | PresentationField::RevisionNumber
                | PresentationField::SlideCount
                | PresentationField::WordCount
        )
    }

    /// Concrete metadata fields searched by `any`.
    pub fn columns() -> impl Iterator<Item = PresentationField> {
        PresentationField::ALL
            .iter()
            .copied()
            .filter(|f| *f != PresentationField::Any)
    }
}
