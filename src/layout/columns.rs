//! Column-aware reading order.
//!
//! Blocks are bucketed into columns of a representative width (the median
//! block width) and read column by column, top to bottom. This handles one-,
//! two- and three-column article pages without detecting gutters explicitly.

use crate::model::Region;

/// Sorts page regions into reading order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnSorter;

impl ColumnSorter {
    pub fn new() -> Self {
        Self
    }

    /// Return `blocks` in reading order.
    ///
    /// The output is a permutation of the input; sorting it again yields the
    /// same order.
    pub fn sort<T: Region>(&self, blocks: Vec<T>) -> Vec<T> {
        sort_by_columns(blocks)
    }
}

/// Representative column width, or `None` when the page reads as one column.
pub fn column_width<T: Region>(blocks: &[T]) -> Option<f32> {
    if blocks.len() < 2 {
        return None;
    }

    let first_x = blocks[0].bbox().x1;
    if blocks.iter().all(|b| b.bbox().x1 == first_x) {
        return None;
    }

    let mut widths: Vec<f32> = blocks.iter().map(|b| b.bbox().width()).collect();
    widths.sort_by(f32::total_cmp);

    let mid = widths.len() / 2;
    let median = if widths.len() % 2 == 0 {
        (widths[mid - 1] + widths[mid]) * 0.5
    } else {
        widths[mid]
    };

    if median.is_finite() && median > 0.0 {
        Some(median)
    } else {
        None
    }
}

/// Column index of a region for a given column width.
pub fn column_index<T: Region>(block: &T, width: Option<f32>) -> i64 {
    match width {
        Some(w) => (block.bbox().x1 / w).floor() as i64,
        None => 0,
    }
}

/// Stable sort by `(column, top edge)`.
pub fn sort_by_columns<T: Region>(blocks: Vec<T>) -> Vec<T> {
    let width = column_width(&blocks);
    log::trace!("column width for {} blocks: {:?}", blocks.len(), width);

    let mut keyed: Vec<(i64, T)> = blocks
        .into_iter()
        .map(|b| (column_index(&b, width), b))
        .collect();

    // total_cmp keeps the order total when a coordinate is NaN.
    keyed.sort_by(|(col_a, a), (col_b, b)| {
        col_a.cmp(col_b).then_with(|| a.bbox().y1.total_cmp(&b.bbox().y1))
    });

    keyed.into_iter().map(|(_, b)| b).collect()
}
