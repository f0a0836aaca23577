//! Document assembly.
//!
//! [`DocumentAssembler`] turns each page's raster and detections into text,
//! figure and table entries. [`Pipeline`] drives a whole source through
//! rasterization and layout detection first.

mod cancel;
mod options;
mod pipeline;
mod pool;

pub use cancel::CancellationToken;
pub use options::{
    AssembleOptions, ErrorMode, PageSelection, DEFAULT_SCALE, REGION_PADDING, TEXT_PADDING,
};
pub use pipeline::Pipeline;
pub use pool::{PageStatus, Progress};

use std::sync::atomic::AtomicBool;

use self::cancel::{Checkpoint, Interrupt};
use self::pool::RunOutcome;
use crate::engine::{OcrEngine, TableExtractor};
use crate::error::{Error, PageError, Result, Stage};
use crate::layout::{PageLayout, TextNormalizer};
use crate::model::{
    Block, BlockType, Document, FigureEntry, PageContent, RasterImage, RawBlock, TableEntry,
    TextEntry,
};

/// One page handed to the assembler: its raster and detected regions.
#[derive(Debug, Clone)]
pub struct PageInput {
    pub image: RasterImage,
    pub blocks: Vec<RawBlock>,
}

impl PageInput {
    pub fn new(image: RasterImage, blocks: Vec<RawBlock>) -> Self {
        Self { image, blocks }
    }
}

/// The result of a run.
#[derive(Debug)]
pub struct Assembly {
    /// Entries of every completed page
    pub document: Document,
    /// Pages that failed, ascending (always empty in strict mode)
    pub failures: Vec<PageError>,
    /// 0-indexed pages whose entries are in the document, ascending
    pub completed: Vec<usize>,
    /// Whether cancellation dropped any page
    pub cancelled: bool,
}

impl Assembly {
    /// `true` when every scheduled page made it into the document.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    fn from_outcome(num_pages: usize, outcome: RunOutcome<PageContent>) -> Self {
        let mut document = Document::new(num_pages);
        let mut completed = Vec::with_capacity(outcome.completed.len());
        for (page, content) in outcome.completed {
            completed.push(page);
            document.append_page(content);
        }
        Self {
            document,
            failures: outcome.failures,
            completed,
            cancelled: outcome.cancelled,
        }
    }
}

/// Builds a [`Document`] from per-page rasters and detections.
///
/// The OCR and table engines are borrowed for the assembler's lifetime and
/// shared by every worker.
pub struct DocumentAssembler<'a> {
    ocr: &'a dyn OcrEngine,
    tables: &'a dyn TableExtractor,
    options: AssembleOptions,
    normalizer: TextNormalizer,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(ocr: &'a dyn OcrEngine, tables: &'a dyn TableExtractor) -> Self {
        Self::with_options(ocr, tables, AssembleOptions::default())
    }

    pub fn with_options(
        ocr: &'a dyn OcrEngine,
        tables: &'a dyn TableExtractor,
        options: AssembleOptions,
    ) -> Self {
        let normalizer = TextNormalizer::new(options.normalize);
        Self {
            ocr,
            tables,
            options,
            normalizer,
        }
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Assemble `pages`, where position in the vector is the page index.
    pub fn assemble(&self, pages: Vec<PageInput>) -> Result<Assembly> {
        self.assemble_with_progress(pages, |_| {})
    }

    /// Like [`DocumentAssembler::assemble`], reporting each finished page.
    ///
    /// `on_progress` runs on the calling thread.
    pub fn assemble_with_progress<P>(&self, pages: Vec<PageInput>, on_progress: P) -> Result<Assembly>
    where
        P: FnMut(&Progress),
    {
        let indices: Vec<usize> = (0..pages.len()).collect();
        let outcome = pool::run_pages(
            &indices,
            &self.options,
            |cp| {
                let input = &pages[cp.page()];
                self.process_page(&input.image, input.blocks.clone(), cp)
            },
            on_progress,
        )?;
        Ok(Assembly::from_outcome(pages.len(), outcome))
    }

    /// Assemble a single page outside of a run.
    pub fn assemble_page(
        &self,
        page: usize,
        image: &RasterImage,
        blocks: Vec<RawBlock>,
    ) -> Result<PageContent> {
        let stop = AtomicBool::new(false);
        let cp = Checkpoint::new(
            page,
            &self.options.cancellation,
            &stop,
            self.options.page_timeout,
        );
        self.process_page(image, blocks, &cp).map_err(|interrupt| match interrupt {
            Interrupt::Failed(err) => err.into(),
            Interrupt::Cancelled | Interrupt::Stopped => Error::Cancelled,
        })
    }

    pub(crate) fn process_page(
        &self,
        image: &RasterImage,
        blocks: Vec<RawBlock>,
        cp: &Checkpoint<'_>,
    ) -> std::result::Result<PageContent, Interrupt> {
        let page = cp.page();
        let layout = PageLayout::from_detections(blocks);
        log::debug!("Page {}: {} blocks in reading order", page, layout.len());

        let layout = layout.try_map_blocks(|block| -> std::result::Result<Block, Interrupt> {
            if !block.is_text_bearing() {
                return Ok(block);
            }
            cp.check(Stage::Ocr)?;
            let text = self
                .read_text(image, &block)
                .map_err(|e| cp.fail(Stage::Ocr, e))?;
            Ok(block.with_text(text))
        })?;

        let text: Vec<TextEntry> = layout
            .text_bearing()
            .map(|(idx, block)| TextEntry::from_block(block, page, idx))
            .collect();

        let figures: Vec<FigureEntry> = layout
            .indices_of(BlockType::Figure)
            .map(|(idx, block)| FigureEntry {
                image: self.crop_region(image, block, page),
                caption: self.options.figure_captions.resolve(idx, &layout),
                kind: block.kind,
                bbox: block.bbox,
                score: block.score,
                page,
                block_id: idx,
            })
            .collect();

        let mut tables = Vec::new();
        for (idx, block) in layout.indices_of(BlockType::Table) {
            cp.check(Stage::TableExtract)?;
            let crop = self.crop_region(image, block, page);
            let table = if crop.is_empty() {
                None
            } else {
                self.tables
                    .extract(&crop)
                    .map_err(|e| cp.fail(Stage::TableExtract, e))?
            };
            tables.push(TableEntry {
                table,
                image: crop,
                caption: self.options.table_captions.resolve(idx, &layout),
                kind: block.kind,
                bbox: block.bbox,
                score: block.score,
                page,
                block_id: idx,
            });
        }

        log::debug!(
            "Page {}: {} text, {} figures, {} tables",
            page,
            text.len(),
            figures.len(),
            tables.len()
        );

        Ok(PageContent {
            text,
            figures,
            tables,
        })
    }

    fn read_text(&self, image: &RasterImage, block: &Block) -> Result<String> {
        let crop = image.crop_padded(&block.bbox, self.options.text_padding);
        if crop.is_empty() {
            log::warn!(
                "{} block at ({}, {}) lies outside the page; leaving it empty",
                block.kind,
                block.bbox.x1,
                block.bbox.y1
            );
            return Ok(String::new());
        }
        let raw = self.ocr.recognize(&crop)?;
        Ok(self.normalizer.normalize(&raw))
    }

    fn crop_region(&self, image: &RasterImage, block: &Block, page: usize) -> RasterImage {
        let crop = image.crop_padded(&block.bbox, self.options.region_padding);
        if crop.is_empty() {
            log::warn!(
                "Page {}: {} block at ({}, {}) lies outside the page",
                page,
                block.kind,
                block.bbox.x1,
                block.bbox.y1
            );
        }
        crop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NoTables;
    use crate::model::BBox;
    use std::sync::Mutex;

    /// Returns queued strings in call order.
    struct ScriptedOcr {
        replies: Mutex<Vec<&'static str>>,
    }

    impl ScriptedOcr {
        fn new(mut replies: Vec<&'static str>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
            }
        }
    }

    impl OcrEngine for ScriptedOcr {
        fn recognize(&self, _image: &RasterImage) -> Result<String> {
            let mut replies = self.replies.lock().unwrap();
            Ok(replies.pop().unwrap_or_default().to_string())
        }
    }

    struct FailingOcr;

    impl OcrEngine for FailingOcr {
        fn recognize(&self, _image: &RasterImage) -> Result<String> {
            Err(Error::Ocr("engine crashed".into()))
        }
    }

    fn raw(kind: BlockType, x1: f32, y1: f32, x2: f32, y2: f32) -> RawBlock {
        RawBlock::new(kind, BBox::new(x1, y1, x2, y2), 0.9)
    }

    #[test]
    fn test_page_entries() {
        let ocr = ScriptedOcr::new(vec!["Intro-\nduction\n", "Figure 1: a\nplot"]);
        let assembler = DocumentAssembler::new(&ocr, &NoTables);
        let image = RasterImage::blank(200, 300);
        let blocks = vec![
            raw(BlockType::Text, 10.0, 140.0, 190.0, 160.0),
            raw(BlockType::Figure, 10.0, 30.0, 190.0, 130.0),
            raw(BlockType::Title, 10.0, 5.0, 190.0, 25.0),
        ];

        let content = assembler.assemble_page(0, &image, blocks).unwrap();

        let texts: Vec<_> = content.text.iter().map(|t| (t.block_id, t.text.as_str())).collect();
        assert_eq!(texts, vec![(0, "Introduction"), (2, "Figure 1: a plot")]);
        assert_eq!(content.figures.len(), 1);
        assert_eq!(content.figures[0].block_id, 1);
        assert_eq!(content.figures[0].caption.as_deref(), Some("Figure 1: a plot"));
        // 180 x 100 region plus 15 px on each side.
        assert_eq!(content.figures[0].image.width(), 200);
        assert_eq!(content.figures[0].image.height(), 130);
        assert!(content.tables.is_empty());
    }

    #[test]
    fn test_table_without_extractor_result() {
        let ocr = ScriptedOcr::new(vec!["Table 2: totals"]);
        let assembler = DocumentAssembler::new(&ocr, &NoTables);
        let image = RasterImage::blank(200, 300);
        let blocks = vec![
            raw(BlockType::Text, 10.0, 5.0, 190.0, 25.0),
            raw(BlockType::Table, 10.0, 30.0, 190.0, 130.0),
        ];

        let content = assembler.assemble_page(3, &image, blocks).unwrap();
        assert_eq!(content.tables.len(), 1);
        let entry = &content.tables[0];
        assert!(entry.table.is_none());
        assert_eq!(entry.caption.as_deref(), Some("Table 2: totals"));
        assert_eq!(entry.page, 3);
        assert_eq!(entry.block_id, 1);
    }

    #[test]
    fn test_block_outside_page_skips_ocr() {
        let assembler = DocumentAssembler::new(&FailingOcr, &NoTables);
        let image = RasterImage::blank(100, 100);
        let blocks = vec![raw(BlockType::Text, 500.0, 500.0, 600.0, 520.0)];

        let content = assembler.assemble_page(0, &image, blocks).unwrap();
        assert_eq!(content.text.len(), 1);
        assert_eq!(content.text[0].text, "");
    }

    #[test]
    fn test_ocr_failure_is_page_error() {
        let assembler = DocumentAssembler::new(&FailingOcr, &NoTables);
        let image = RasterImage::blank(100, 100);
        let blocks = vec![raw(BlockType::Text, 0.0, 0.0, 50.0, 20.0)];

        let err = assembler.assemble_page(7, &image, blocks).unwrap_err();
        match err {
            Error::Page(p) => {
                assert_eq!(p.page, 7);
                assert_eq!(p.stage, Stage::Ocr);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_cancelled_page() {
        let token = CancellationToken::new();
        token.cancel();
        let ocr = ScriptedOcr::new(vec![]);
        let options = AssembleOptions::default().with_cancellation(token);
        let assembler = DocumentAssembler::with_options(&ocr, &NoTables, options);
        let blocks = vec![raw(BlockType::Text, 0.0, 0.0, 50.0, 20.0)];

        let err = assembler
            .assemble_page(0, &RasterImage::blank(100, 100), blocks)
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
