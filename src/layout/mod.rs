//! Page layout reconstruction.
//!
//! Orders detected blocks into reading order, attaches captions to figures
//! and tables, and normalizes recognized text.

mod caption;
mod columns;
mod normalize;
mod page;

pub use caption::CaptionResolver;
pub use columns::{column_index, column_width, sort_by_columns, ColumnSorter};
pub use normalize::{normalize_ocr_text, NormalizeOptions, TextNormalizer};
pub use page::PageLayout;
