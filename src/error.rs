//! Error types for presale-mapper.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading layout, unit-list and price files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the input file from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The CSV structure is unusable (missing required columns).
    #[error("invalid layout file '{path}': {message}")]
    InvalidLayout { path: PathBuf, message: String },

    /// A price tier file holds no tier array.
    #[error("invalid price table '{path}': {message}")]
    InvalidPriceTable { path: PathBuf, message: String },

    /// Failed to decode CSV records.
    #[error("CSV read failed: {source}")]
    CsvRead {
        #[from]
        source: csv::Error,
    },

    /// Failed to decode a JSON document.
    #[error("JSON parse failed: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Errors produced while pulling structured data out of a source document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Failed to read the source document.
    #[error("failed to read document '{path}': {source}")]
    DocumentRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document is larger than the service accepts inline.
    #[error("document '{path}' is {size} bytes, over the {limit} byte request limit")]
    DocumentTooLarge {
        path: PathBuf,
        size: usize,
        limit: usize,
    },

    /// The HTTP request to the extraction service failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The extraction service answered with a non-success status.
    #[error("extraction service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// The service returned no usable text.
    #[error("extraction service returned an empty response")]
    EmptyResponse,

    /// The returned payload was not the JSON shape we expected.
    #[error("malformed payload for section '{section}': {message}")]
    MalformedPayload { section: String, message: String },

    /// Gave up after retrying.
    #[error("extraction failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// A required input for the document was missing or unreadable.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Writing the results failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}

/// Errors raised by the building ledger lookup.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// An external API request failed after all retries.
    #[error("{name} request failed after {attempts} attempts: {last}")]
    Request {
        name: &'static str,
        attempts: u32,
        last: String,
    },

    /// The external API answered, but not with what we need.
    #[error("{0}")]
    UnexpectedResponse(String),

    /// The input could not be used (bad PNU, empty address).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Cache database failure.
    #[error("cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    /// Failed to create the cache directory.
    #[error("failed to prepare cache directory '{path}': {source}")]
    CacheDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Cached or fetched payload could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
