//! Caption association for figures and tables.
//!
//! Resolution runs in two phases. The local phase probes fixed neighbour
//! offsets in priority order; the first neighbour that passes the prefix
//! filter wins. When nothing survives, the fallback phase scans every
//! text-bearing block on the page and picks the one whose centre lies closest
//! to the target's centre.

use super::page::PageLayout;
use crate::model::Block;

/// Where to look for a caption, and what a caption must start with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionResolver {
    offsets: Vec<isize>,
    prefixes: Option<Vec<String>>,
}

impl Default for CaptionResolver {
    fn default() -> Self {
        Self::figures()
    }
}

impl CaptionResolver {
    /// Create a resolver with explicit offsets and optional required prefixes.
    ///
    /// Prefixes are matched case-insensitively. An empty prefix list is the
    /// same as no prefix requirement.
    pub fn new<I, S>(offsets: Vec<isize>, prefixes: Option<I>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .map(|list| {
                list.into_iter()
                    .map(|p| p.as_ref().to_lowercase())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty());
        Self { offsets, prefixes }
    }

    /// Figure captions sit below the figure, occasionally above.
    pub fn figures() -> Self {
        Self::new(vec![1, -1], Some(["fig", "figure"]))
    }

    /// Table captions sit above the table, occasionally below.
    pub fn tables() -> Self {
        Self::new(vec![-1, 1], Some(["tab", "table"]))
    }

    /// Replace the neighbour offsets, highest priority first.
    pub fn with_offsets(mut self, offsets: Vec<isize>) -> Self {
        self.offsets = offsets;
        self
    }

    /// Replace the required prefixes.
    pub fn with_prefixes<I, S>(self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(self.offsets, Some(prefixes))
    }

    /// Accept any neighbour as a caption.
    pub fn without_prefixes(mut self) -> Self {
        self.prefixes = None;
        self
    }

    pub fn offsets(&self) -> &[isize] {
        &self.offsets
    }

    pub fn prefixes(&self) -> Option<&[String]> {
        self.prefixes.as_deref()
    }

    /// Caption text for the block at `target`, if one can be found.
    ///
    /// A missing caption is a normal outcome, not an error. The result only
    /// depends on the arguments.
    pub fn resolve(&self, target: usize, layout: &PageLayout) -> Option<String> {
        let target_block = layout.get(target)?;

        if let Some(found) = self.local_candidate(target, layout) {
            return found.text().map(str::to_string);
        }

        self.nearest_candidate(target_block, layout)
            .and_then(|block| block.text().map(str::to_string))
    }

    fn local_candidate<'a>(&self, target: usize, layout: &'a PageLayout) -> Option<&'a Block> {
        self.offsets
            .iter()
            .filter_map(|&offset| layout.neighbor(target, offset))
            .map(|(_, block)| block)
            .find(|block| self.matches_prefix(block))
    }

    fn nearest_candidate<'a>(&self, target: &Block, layout: &'a PageLayout) -> Option<&'a Block> {
        let mut best: Option<(f32, &Block)> = None;
        for (_, block) in layout.text_bearing() {
            if !self.matches_prefix(block) {
                continue;
            }
            let distance = block.bbox.center_distance_sq(&target.bbox);
            // Strict comparison keeps the earliest block on ties.
            match best {
                Some((d, _)) if distance >= d => {}
                _ => best = Some((distance, block)),
            }
        }
        best.map(|(_, block)| block)
    }

    fn matches_prefix(&self, block: &Block) -> bool {
        let Some(prefixes) = &self.prefixes else {
            return true;
        };
        match block.text() {
            Some(text) if !text.is_empty() => {
                let lower = text.to_lowercase();
                prefixes.iter().any(|p| lower.starts_with(p.as_str()))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, BlockType};

    fn text(x1: f32, y1: f32, x2: f32, y2: f32, s: &str) -> Block {
        Block::new(BlockType::Text, BBox::new(x1, y1, x2, y2), 0.9).with_text(s)
    }

    fn figure(x1: f32, y1: f32, x2: f32, y2: f32) -> Block {
        Block::new(BlockType::Figure, BBox::new(x1, y1, x2, y2), 0.9)
    }

    #[test]
    fn test_caption_below_figure() {
        let layout = PageLayout::from_ordered(vec![
            text(0.0, 0.0, 100.0, 20.0, "Introduction"),
            figure(0.0, 30.0, 100.0, 130.0),
            text(0.0, 140.0, 100.0, 160.0, "Figure 1: test"),
        ]);
        let caption = CaptionResolver::figures().resolve(1, &layout);
        assert_eq!(caption.as_deref(), Some("Figure 1: test"));
    }

    #[test]
    fn test_offset_order_is_priority() {
        let layout = PageLayout::from_ordered(vec![
            text(0.0, 0.0, 100.0, 20.0, "Figure 1 above"),
            figure(0.0, 30.0, 100.0, 130.0),
            text(0.0, 140.0, 100.0, 160.0, "Figure 1: test"),
        ]);

        let above_first = CaptionResolver::figures().with_offsets(vec![-1, 1]);
        assert_eq!(
            above_first.resolve(1, &layout).as_deref(),
            Some("Figure 1 above")
        );

        let below_first = CaptionResolver::figures();
        assert_eq!(
            below_first.resolve(1, &layout).as_deref(),
            Some("Figure 1: test")
        );
    }

    #[test]
    fn test_fallback_picks_nearest_centre() {
        // Target centre is (50, 50). Candidates at distance 50 and 80.
        let layout = PageLayout::from_ordered(vec![
            text(0.0, 0.0, 100.0, 20.0, "Results are shown"),
            figure(0.0, 0.0, 100.0, 100.0),
            text(0.0, 120.0, 100.0, 140.0, "See appendix"),
            text(0.0, 110.0, 100.0, 150.0, "Table 2: far"),
            text(90.0, 40.0, 110.0, 60.0, "table 1: near"),
        ]);
        assert_eq!(layout[3].bbox.center_distance_sq(&layout[1].bbox), 6400.0);
        assert_eq!(layout[4].bbox.center_distance_sq(&layout[1].bbox), 2500.0);

        let resolver = CaptionResolver::figures().with_prefixes(["tab", "table"]);
        assert_eq!(resolver.resolve(1, &layout).as_deref(), Some("table 1: near"));
    }

    #[test]
    fn test_fallback_tie_keeps_reading_order() {
        let layout = PageLayout::from_ordered(vec![
            text(0.0, 0.0, 100.0, 20.0, "Fig. A"),
            text(0.0, 300.0, 100.0, 320.0, "intro"),
            figure(0.0, 140.0, 100.0, 180.0),
            text(0.0, 400.0, 100.0, 420.0, "body"),
            text(0.0, 300.0, 100.0, 320.0, "Fig. B"),
        ]);
        // "Fig. A" centre (50, 10), "Fig. B" centre (50, 310), target (50, 160).
        assert_eq!(
            CaptionResolver::figures().resolve(2, &layout).as_deref(),
            Some("Fig. A")
        );
    }

    #[test]
    fn test_no_caption_found() {
        let layout = PageLayout::from_ordered(vec![
            text(0.0, 0.0, 100.0, 20.0, "Introduction"),
            figure(0.0, 30.0, 100.0, 130.0),
        ]);
        assert_eq!(CaptionResolver::figures().resolve(1, &layout), None);
        assert_eq!(CaptionResolver::figures().resolve(5, &layout), None);

        let lone = PageLayout::from_ordered(vec![figure(0.0, 0.0, 10.0, 10.0)]);
        assert_eq!(CaptionResolver::tables().resolve(0, &lone), None);
    }

    #[test]
    fn test_without_prefixes_takes_first_neighbour() {
        let layout = PageLayout::from_ordered(vec![
            text(0.0, 0.0, 100.0, 20.0, "anything"),
            figure(0.0, 30.0, 100.0, 130.0),
            figure(0.0, 140.0, 100.0, 240.0),
        ]);
        let resolver = CaptionResolver::figures().without_prefixes();
        // The figure below wins and carries no text.
        assert_eq!(resolver.resolve(1, &layout), None);
        assert_eq!(
            resolver.with_offsets(vec![-1]).resolve(1, &layout).as_deref(),
            Some("anything")
        );
    }

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        let layout = PageLayout::from_ordered(vec![
            Block::new(BlockType::Table, BBox::new(0.0, 30.0, 100.0, 130.0), 0.9),
            text(0.0, 140.0, 100.0, 160.0, "TABLE 3. Results"),
        ]);
        let resolver = CaptionResolver::new(vec![1], Some(["Table"]));
        assert_eq!(
            resolver.resolve(0, &layout).as_deref(),
            Some("TABLE 3. Results")
        );
    }

    #[test]
    fn test_empty_prefix_list_means_no_filter() {
        let resolver = CaptionResolver::new(vec![1], Some(Vec::<String>::new()));
        assert!(resolver.prefixes().is_none());
    }
}
