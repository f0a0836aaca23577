//! Source-driven runs: rasterize, detect, then assemble each page.

use super::pool::{self, Progress};
use super::{AssembleOptions, Assembly, DocumentAssembler};
use crate::engine::{LayoutDetector, OcrEngine, PageSource, TableExtractor};
use crate::error::{Result, Stage};

/// Runs every selected page of a source through the full pipeline.
pub struct Pipeline<'a> {
    source: &'a dyn PageSource,
    detector: &'a dyn LayoutDetector,
    assembler: DocumentAssembler<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        source: &'a dyn PageSource,
        detector: &'a dyn LayoutDetector,
        ocr: &'a dyn OcrEngine,
        tables: &'a dyn TableExtractor,
    ) -> Self {
        Self::with_options(source, detector, ocr, tables, AssembleOptions::default())
    }

    pub fn with_options(
        source: &'a dyn PageSource,
        detector: &'a dyn LayoutDetector,
        ocr: &'a dyn OcrEngine,
        tables: &'a dyn TableExtractor,
        options: AssembleOptions,
    ) -> Self {
        Self {
            source,
            detector,
            assembler: DocumentAssembler::with_options(ocr, tables, options),
        }
    }

    pub fn options(&self) -> &AssembleOptions {
        self.assembler.options()
    }

    /// Process the selected pages.
    pub fn run(&self) -> Result<Assembly> {
        self.run_with_progress(|_| {})
    }

    /// Process the selected pages, reporting each finished page.
    pub fn run_with_progress<P>(&self, on_progress: P) -> Result<Assembly>
    where
        P: FnMut(&Progress),
    {
        let options = self.assembler.options();
        let page_count = self.source.page_count();
        let selected = options.pages.indices(page_count);
        log::info!(
            "Processing {} of {} pages at scale {}",
            selected.len(),
            page_count,
            options.scale
        );

        let outcome = pool::run_pages(
            &selected,
            options,
            |cp| {
                let page = cp.page();

                cp.check(Stage::Rasterize)?;
                let image = self
                    .source
                    .rasterize(page, options.scale)
                    .map_err(|e| cp.fail(Stage::Rasterize, e))?;

                cp.check(Stage::Detect)?;
                let blocks = self
                    .detector
                    .detect(&image)
                    .map_err(|e| cp.fail(Stage::Detect, e))?;
                log::debug!("Page {}: {} detections", page, blocks.len());

                self.assembler.process_page(&image, blocks, cp)
            },
            on_progress,
        )?;

        Ok(Assembly::from_outcome(page_count, outcome))
    }
}
