//! External engines the assembler depends on.
//!
//! The layout core never talks to a rasterizer, model or OCR program
//! directly. It goes through the traits in this module, which keeps the core
//! testable with in-memory doubles and lets callers plug in their own
//! engines.
//!
//! All traits take `&self` and require `Send + Sync`, so one instance can
//! serve every worker. Engines that need `&mut self` implement the `*Mut`
//! variant instead and are wrapped in [`Exclusive`], which serializes calls.

mod bridge;
mod command;
mod images;
mod pdf;
mod tesseract;

use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::model::{RasterImage, RawBlock, Table};

pub use bridge::CommandBridge;
pub use command::{CommandDetector, CommandTableExtractor};
pub use images::ImagePages;
pub use pdf::{detect_format_from_bytes, detect_format_from_path, PdfFormat, PdfRasterizer};
pub use tesseract::TesseractOcr;

/// An opened source document that can be turned into page rasters.
///
/// Opening the source is where fatal errors belong; once a `PageSource`
/// exists, failures are scoped to the page being rasterized.
pub trait PageSource: Send + Sync {
    /// Number of pages in the source.
    fn page_count(&self) -> usize;

    /// Render the 0-indexed `page` at `scale` (1.0 = 72 dpi for PDFs).
    fn rasterize(&self, page: usize, scale: f32) -> Result<RasterImage>;
}

/// Finds typed regions on a page raster.
pub trait LayoutDetector: Send + Sync {
    fn detect(&self, image: &RasterImage) -> Result<Vec<RawBlock>>;
}

/// Reads the text in a cropped region.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &RasterImage) -> Result<String>;
}

/// Recovers table structure from a cropped table region.
pub trait TableExtractor: Send + Sync {
    /// `Ok(None)` when no table could be recovered.
    fn extract(&self, image: &RasterImage) -> Result<Option<Table>>;
}

/// A layout detector that needs exclusive access while running.
pub trait LayoutDetectorMut: Send {
    fn detect(&mut self, image: &RasterImage) -> Result<Vec<RawBlock>>;
}

/// An OCR engine that needs exclusive access while running.
pub trait OcrEngineMut: Send {
    fn recognize(&mut self, image: &RasterImage) -> Result<String>;
}

/// A table extractor that needs exclusive access while running.
pub trait TableExtractorMut: Send {
    fn extract(&mut self, image: &RasterImage) -> Result<Option<Table>>;
}

/// Shares a stateful engine across workers by locking it for every call.
#[derive(Debug, Default)]
pub struct Exclusive<E> {
    inner: Mutex<E>,
}

impl<E> Exclusive<E> {
    pub fn new(engine: E) -> Self {
        Self {
            inner: Mutex::new(engine),
        }
    }

    /// Unwrap the engine.
    pub fn into_inner(self) -> Result<E> {
        self.inner
            .into_inner()
            .map_err(|_| Error::Other("engine lock poisoned".to_string()))
    }

    fn with<T>(&self, what: fn(String) -> Error, f: impl FnOnce(&mut E) -> Result<T>) -> Result<T> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| what("engine lock poisoned by an earlier panic".to_string()))?;
        f(&mut *guard)
    }
}

impl<E: LayoutDetectorMut> LayoutDetector for Exclusive<E> {
    fn detect(&self, image: &RasterImage) -> Result<Vec<RawBlock>> {
        self.with(Error::Detect, |engine| engine.detect(image))
    }
}

impl<E: OcrEngineMut> OcrEngine for Exclusive<E> {
    fn recognize(&self, image: &RasterImage) -> Result<String> {
        self.with(Error::Ocr, |engine| engine.recognize(image))
    }
}

impl<E: TableExtractorMut> TableExtractor for Exclusive<E> {
    fn extract(&self, image: &RasterImage) -> Result<Option<Table>> {
        self.with(Error::TableExtract, |engine| engine.extract(image))
    }
}

/// Table extractor that never finds a table.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTables;

impl TableExtractor for NoTables {
    fn extract(&self, _image: &RasterImage) -> Result<Option<Table>> {
        Ok(None)
    }
}
