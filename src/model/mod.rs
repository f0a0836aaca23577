//! Document model types.
//!
//! Blocks come out of the layout detector without order or text; the
//! assembler turns them into text, figure and table entries that make up a
//! [`Document`].

mod block;
mod document;
mod raster;
mod table;

pub use block::{BBox, Block, BlockType, RawBlock, Region};
pub use document::{Document, FigureEntry, PageContent, TableEntry, TextEntry};
pub use raster::{Padding, RasterImage};
pub use table::{Table, TableRow};
