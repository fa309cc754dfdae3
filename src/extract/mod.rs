//! Structured extraction from pre-sale notice documents.

pub mod gemini;
pub mod pipeline;
pub mod prompts;

pub use gemini::GeminiExtractor;
pub use pipeline::{LayoutSource, NoticeProcessor, NoticeReport, SectionFailure};
pub use prompts::Instructions;

use crate::error::ExtractError;
use std::fmt;
use std::path::{Path, PathBuf};

/// A document loaded into memory, ready to send to an extractor.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl SourceDocument {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ExtractError::DocumentRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            mime_type: "application/pdf",
        })
    }

    /// Complex name derived from the file name.
    #[must_use]
    pub fn apartment_name(&self) -> String {
        apartment_name(&self.path)
    }
}

/// Turns a document plus an instruction into the service's raw text reply.
pub trait DocumentExtractor {
    fn extract(&self, document: &SourceDocument, instruction: &str) -> Result<String, ExtractError>;
}

impl<E: DocumentExtractor + ?Sized> DocumentExtractor for &E {
    fn extract(&self, document: &SourceDocument, instruction: &str) -> Result<String, ExtractError> {
        (**self).extract(document, instruction)
    }
}

/// The sections pulled out of a notice, each answered as `{ key: [...] }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Pricing,
    Layout,
    Options,
    Balcony,
    Schedule,
    SupplyInfo,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Pricing,
        Section::Layout,
        Section::Options,
        Section::Balcony,
        Section::Schedule,
        Section::SupplyInfo,
    ];

    /// JSON key of the section's array.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Section::Pricing => "분양가",
            Section::Layout => "배치정보",
            Section::Options => "옵션",
            Section::Balcony => "발코니",
            Section::Schedule => "일정",
            Section::SupplyInfo => "타입정보",
        }
    }

    /// File-name slug used for instruction overrides.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Section::Pricing => "pricing",
            Section::Layout => "layout",
            Section::Options => "options",
            Section::Balcony => "balcony",
            Section::Schedule => "schedule",
            Section::SupplyInfo => "supply_info",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Complex name from a notice file name: everything before `입주자모집공고`.
///
/// Falls back to the whole stem when nothing precedes the marker.
#[must_use]
pub fn apartment_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = stem
        .split("입주자모집공고")
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() {
        stem.trim().to_string()
    } else {
        name.to_string()
    }
}
