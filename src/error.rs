//! Error types for article-parser.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for article-parser operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The source document could not be opened at all.
    #[error("Cannot open source document: {0}")]
    SourceOpen(String),

    /// A page could not be rasterized.
    #[error("Rasterization error: {0}")]
    Rasterize(String),

    /// The layout detector failed on a page image.
    #[error("Layout detection error: {0}")]
    Detect(String),

    /// The OCR engine failed on a text region.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// The table-structure engine failed on a table region.
    #[error("Table extraction error: {0}")]
    TableExtract(String),

    /// A detected block violates the bounding-box invariant.
    #[error("Invalid block: {0}")]
    InvalidBlock(String),

    /// An external engine process failed or returned garbage.
    #[error("Engine bridge error: {0}")]
    Bridge(String),

    /// Image decoding or encoding failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// CSV writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The worker pool could not be created.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// The run was cancelled before the work finished.
    #[error("Operation cancelled")]
    Cancelled,

    /// A page exceeded its processing deadline.
    #[error("Page deadline of {0:?} exceeded")]
    TimedOut(Duration),

    /// A page failed and the run was configured to stop on failure.
    #[error(transparent)]
    Page(#[from] Box<PageError>),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// The step of the per-page pipeline a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Turning the source page into pixels.
    Rasterize,
    /// Running the layout model.
    Detect,
    /// Reading text regions.
    Ocr,
    /// Extracting table structure.
    TableExtract,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Rasterize => "rasterization",
            Stage::Detect => "layout detection",
            Stage::Ocr => "OCR",
            Stage::TableExtract => "table extraction",
        };
        f.write_str(name)
    }
}

/// A failure confined to a single page.
///
/// Pages are processed in isolation, so one of these never invalidates the
/// entries produced for other pages.
#[derive(Error, Debug)]
#[error("page {page} failed during {stage}: {source}")]
pub struct PageError {
    /// 0-indexed page the failure belongs to.
    pub page: usize,
    /// Pipeline step that failed.
    pub stage: Stage,
    /// Underlying cause.
    #[source]
    pub source: Box<Error>,
}

impl PageError {
    /// Create a page error.
    pub fn new(page: usize, stage: Stage, source: Error) -> Self {
        Self {
            page,
            stage,
            source: Box::new(source),
        }
    }

    /// Whether the page ran out of time rather than failing outright.
    pub fn is_timeout(&self) -> bool {
        matches!(*self.source, Error::TimedOut(_))
    }
}

impl From<PageError> for Error {
    fn from(err: PageError) -> Self {
        Error::Page(Box::new(err))
    }
}
