//! Assembly options and configuration.

use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use super::cancel::CancellationToken;
use crate::layout::{CaptionResolver, NormalizeOptions};
use crate::model::Padding;

/// Scale applied to PDF pages before detection (2.0 = 144 dpi).
pub const DEFAULT_SCALE: f32 = 2.0;

/// Padding around text regions before OCR.
pub const TEXT_PADDING: Padding = Padding::symmetric(15, 5);

/// Padding around figure and table regions before cropping.
pub const REGION_PADDING: Padding = Padding::uniform(15);

/// Options for assembling documents.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to process pages on a worker pool
    pub parallel: bool,

    /// Worker threads (0 = one per CPU)
    pub workers: usize,

    /// Rasterization scale for page sources
    pub scale: f32,

    /// Page selection (which pages to process)
    pub pages: PageSelection,

    /// Padding around text regions before OCR
    pub text_padding: Padding,

    /// Padding around figure and table crops
    pub region_padding: Padding,

    /// Caption policy for figures
    pub figure_captions: CaptionResolver,

    /// Caption policy for tables
    pub table_captions: CaptionResolver,

    /// Optional cleanup on top of OCR line joining
    pub normalize: NormalizeOptions,

    /// Per-page processing deadline
    pub page_timeout: Option<Duration>,

    /// Token observed at every page checkpoint
    pub cancellation: CancellationToken,
}

impl AssembleOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Stop at the first failing page.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Keep going when a page fails and report it.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the number of worker threads (0 = one per CPU).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the rasterization scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Process a page range (1-indexed, inclusive).
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.pages = PageSelection::Range(range);
        self
    }

    pub fn with_text_padding(mut self, padding: Padding) -> Self {
        self.text_padding = padding;
        self
    }

    pub fn with_region_padding(mut self, padding: Padding) -> Self {
        self.region_padding = padding;
        self
    }

    pub fn with_figure_captions(mut self, resolver: CaptionResolver) -> Self {
        self.figure_captions = resolver;
        self
    }

    pub fn with_table_captions(mut self, resolver: CaptionResolver) -> Self {
        self.table_captions = resolver;
        self
    }

    pub fn with_normalize(mut self, normalize: NormalizeOptions) -> Self {
        self.normalize = normalize;
        self
    }

    /// Fail pages that take longer than `timeout`.
    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = Some(timeout);
        self
    }

    /// Observe `token` for cancellation.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            parallel: true,
            workers: 0,
            scale: DEFAULT_SCALE,
            pages: PageSelection::All,
            text_padding: TEXT_PADDING,
            region_padding: REGION_PADDING,
            figure_captions: CaptionResolver::figures(),
            table_captions: CaptionResolver::tables(),
            normalize: NormalizeOptions::default(),
            page_timeout: None,
            cancellation: CancellationToken::new(),
        }
    }
}

/// What to do when a page fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Stop at the first failing page and return its error
    Strict,
    /// Record the failure, drop the page and keep going
    #[default]
    Lenient,
}

/// Page selection (1-indexed page numbers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
    /// Several ranges of pages (inclusive, 1-indexed), kept unexpanded
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
            PageSelection::Ranges(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// 0-indexed pages selected out of `page_count`, ascending.
    pub fn indices(&self, page_count: usize) -> Vec<usize> {
        (0..page_count)
            .filter(|&idx| u32::try_from(idx + 1).map_or(false, |n| self.includes(n)))
            .collect()
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start = parse_page_number(start)?;
                let end = parse_page_number(end)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut ranges = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                ranges.push(parse_page_number(start)?..=parse_page_number(end)?);
            } else {
                let page = parse_page_number(part)?;
                ranges.push(page..=page);
            }
        }

        ranges.sort_unstable_by_key(|r| (*r.start(), *r.end()));
        ranges.dedup();

        // Plain page lists stay as pages; spans are never expanded.
        if ranges.iter().all(|r| r.start() == r.end()) {
            let pages = ranges.iter().map(|r| *r.start()).collect();
            return Ok(PageSelection::Pages(pages));
        }
        Ok(PageSelection::Ranges(ranges))
    }
}

fn parse_page_number(s: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(0) => Err("Page numbers start at 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Invalid page number '{}'", s.trim())),
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
