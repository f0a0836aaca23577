//! # article-parser
//!
//! Layout reconstruction and caption association for scanned article pages.
//!
//! Given the regions a layout model detects on each page (text, titles,
//! lists, figures, tables), this library puts them in human reading order,
//! reads the text regions through an OCR engine, pairs figures and tables
//! with their captions, and merges everything into one ordered [`Document`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use article_parser::engine::{CommandBridge, CommandDetector, TesseractOcr};
//! use article_parser::{ArticleParser, ArtifactStore, Engines};
//!
//! fn main() -> article_parser::Result<()> {
//!     let detector = CommandDetector::new(CommandBridge::parse("python3 detect.py")?);
//!     let ocr = TesseractOcr::new();
//!
//!     let assembly = ArticleParser::new()
//!         .with_workers(4)
//!         .parse("paper.pdf", &Engines::new(&detector, &ocr))?;
//!
//!     ArtifactStore::new("out").persist(&assembly.document)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Column-aware reading order**: median-width column bucketing
//! - **Caption association**: neighbour probing with a nearest-block fallback
//! - **Pluggable engines**: rasterizer, layout model, OCR and table extraction
//!   are traits, with command-line adapters included
//! - **Parallel processing**: pages run on a Rayon pool with per-page
//!   failure isolation, cancellation and deadlines

pub mod assemble;
pub mod engine;
pub mod error;
pub mod layout;
pub mod model;
pub mod store;

// Re-export commonly used types
pub use assemble::{
    AssembleOptions, Assembly, CancellationToken, DocumentAssembler, ErrorMode, PageInput,
    PageSelection, PageStatus, Pipeline, Progress,
};
pub use engine::{
    Exclusive, LayoutDetector, NoTables, OcrEngine, PageSource, PdfRasterizer, TableExtractor,
};
pub use error::{Error, PageError, Result, Stage};
pub use layout::{
    normalize_ocr_text, CaptionResolver, ColumnSorter, NormalizeOptions, PageLayout,
    TextNormalizer,
};
pub use model::{
    BBox, Block, BlockType, Document, FigureEntry, Padding, PageContent, RasterImage, RawBlock,
    Region, Table, TableEntry, TableRow, TextEntry,
};
pub use store::{ArtifactStore, DocumentRecord, JsonFormat};

use std::path::Path;
use std::time::Duration;

/// The engines a parse run calls out to.
#[derive(Clone, Copy)]
pub struct Engines<'a> {
    pub detector: &'a dyn LayoutDetector,
    pub ocr: &'a dyn OcrEngine,
    pub tables: &'a dyn TableExtractor,
}

impl<'a> Engines<'a> {
    /// Detector and OCR engine, without table extraction.
    pub fn new(detector: &'a dyn LayoutDetector, ocr: &'a dyn OcrEngine) -> Self {
        Self {
            detector,
            ocr,
            tables: &NoTables,
        }
    }

    pub fn with_tables(mut self, tables: &'a dyn TableExtractor) -> Self {
        self.tables = tables;
        self
    }
}

/// Builder for parsing article PDFs.
///
/// # Example
///
/// ```no_run
/// use article_parser::engine::{CommandBridge, CommandDetector, TesseractOcr};
/// use article_parser::{ArticleParser, Engines, PageSelection};
///
/// let detector = CommandDetector::new(CommandBridge::parse("layout-model")?);
/// let ocr = TesseractOcr::new().with_lang("eng");
///
/// let assembly = ArticleParser::new()
///     .strict()
///     .with_pages(PageSelection::Range(1..=4))
///     .parse("paper.pdf", &Engines::new(&detector, &ocr))?;
/// println!("{} figures", assembly.document.figures.len());
/// # Ok::<(), article_parser::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArticleParser {
    options: AssembleOptions,
}

impl ArticleParser {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from explicit options.
    pub fn with_options(options: AssembleOptions) -> Self {
        Self { options }
    }

    /// Record failed pages and keep going (the default).
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Stop at the first failed page.
    pub fn strict(mut self) -> Self {
        self.options = self.options.strict();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set the number of worker threads (0 = one per CPU).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.options = self.options.with_workers(workers);
        self
    }

    /// Set the rasterization scale (2.0 = 144 dpi).
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.options = self.options.with_scale(scale);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Fail pages that run longer than `timeout`.
    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_page_timeout(timeout);
        self
    }

    /// Observe `token` for cancellation.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.options = self.options.with_cancellation(token);
        self
    }

    /// Enable optional text cleanup.
    pub fn with_normalize(mut self, normalize: NormalizeOptions) -> Self {
        self.options = self.options.with_normalize(normalize);
        self
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Parse a PDF file.
    pub fn parse<P: AsRef<Path>>(&self, path: P, engines: &Engines<'_>) -> Result<Assembly> {
        self.parse_with_progress(path, engines, |_| {})
    }

    /// Parse a PDF file, reporting each finished page.
    pub fn parse_with_progress<P, F>(
        &self,
        path: P,
        engines: &Engines<'_>,
        on_progress: F,
    ) -> Result<Assembly>
    where
        P: AsRef<Path>,
        F: FnMut(&Progress),
    {
        let source = PdfRasterizer::open(path)?;
        self.parse_source_with_progress(&source, engines, on_progress)
    }

    /// Parse any page source.
    pub fn parse_source(&self, source: &dyn PageSource, engines: &Engines<'_>) -> Result<Assembly> {
        self.parse_source_with_progress(source, engines, |_| {})
    }

    /// Parse any page source, reporting each finished page.
    pub fn parse_source_with_progress<F>(
        &self,
        source: &dyn PageSource,
        engines: &Engines<'_>,
        on_progress: F,
    ) -> Result<Assembly>
    where
        F: FnMut(&Progress),
    {
        Pipeline::with_options(
            source,
            engines.detector,
            engines.ocr,
            engines.tables,
            self.options.clone(),
        )
        .run_with_progress(on_progress)
    }
}
