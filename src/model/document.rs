//! The assembled document model.

use super::{BBox, Block, BlockType, RasterImage, Table};

/// A text-bearing block, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    /// Normalized OCR text
    pub text: String,
    pub kind: BlockType,
    pub bbox: BBox,
    pub score: f32,
    /// 0-indexed source page
    pub page: usize,
    /// Index of the block within its page's reading-order layout
    pub block_id: usize,
}

/// A figure with its cropped image and caption.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureEntry {
    pub image: RasterImage,
    pub caption: Option<String>,
    pub kind: BlockType,
    pub bbox: BBox,
    pub score: f32,
    pub page: usize,
    pub block_id: usize,
}

/// A table with its cropped image, caption and extracted cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    /// Extracted structure, `None` when the engine found no table
    pub table: Option<Table>,
    pub image: RasterImage,
    pub caption: Option<String>,
    pub kind: BlockType,
    pub bbox: BBox,
    pub score: f32,
    pub page: usize,
    pub block_id: usize,
}

impl TextEntry {
    /// Entry for a block that already carries its text.
    pub fn from_block(block: &Block, page: usize, block_id: usize) -> Self {
        Self {
            text: block.text().unwrap_or_default().to_string(),
            kind: block.kind,
            bbox: block.bbox,
            score: block.score,
            page,
            block_id,
        }
    }
}

/// Everything produced for one page, in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub text: Vec<TextEntry>,
    pub figures: Vec<FigureEntry>,
    pub tables: Vec<TableEntry>,
}

/// A reconstructed document.
///
/// Each sequence is ordered by page, then by reading order within the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Number of pages in the source document
    pub num_pages: usize,
    pub text: Vec<TextEntry>,
    pub figures: Vec<FigureEntry>,
    pub tables: Vec<TableEntry>,
}

impl Document {
    /// Create an empty document for a source with `num_pages` pages.
    pub fn new(num_pages: usize) -> Self {
        Self {
            num_pages,
            ..Self::default()
        }
    }

    /// Append one page's entries after everything already present.
    pub fn append_page(&mut self, content: PageContent) {
        self.text.extend(content.text);
        self.figures.extend(content.figures);
        self.tables.extend(content.tables);
    }

    /// Check if no entries were produced.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.figures.is_empty() && self.tables.is_empty()
    }

    /// All text in reading order, one block per paragraph.
    pub fn plain_text(&self) -> String {
        self.text
            .iter()
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Captions of all figures, `None` where none was found.
    pub fn figure_captions(&self) -> impl Iterator<Item = Option<&str>> {
        self.figures.iter().map(|f| f.caption.as_deref())
    }
}
