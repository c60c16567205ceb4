//! File formats offered per item.

use std::fmt;
use std::str::FromStr;

/// A file encoding variant of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileFormat {
    /// Fixed-layout document.
    Pdf,
    /// Reflowable e-book.
    Epub,
    /// Kindle e-book.
    Mobi,
    /// Source-code archive, delivered with a `.code` name.
    Code,
}

impl FileFormat {
    /// All formats the exporter can request.
    pub const ALL: [Self; 4] = [Self::Pdf, Self::Epub, Self::Mobi, Self::Code];

    /// Identifier used by the API and as the delivered file extension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Epub => "epub",
            Self::Mobi => "mobi",
            Self::Code => "code",
        }
    }

    /// Extension the file carries once materialized.
    #[must_use]
    pub fn final_extension(self) -> &'static str {
        match self {
            Self::Code => "zip",
            other => other.as_str(),
        }
    }

    /// Whether the file is renamed to an archive extension after download.
    #[must_use]
    pub fn is_source_archive(self) -> bool {
        self == Self::Code
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized format identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown file format '{0}' (expected one of: pdf, epub, mobi, code)")]
pub struct UnknownFormat(pub String);

impl FromStr for FileFormat {
    type Err = UnknownFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "epub" => Ok(Self::Epub),
            "mobi" => Ok(Self::Mobi),
            "code" => Ok(Self::Code),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}
