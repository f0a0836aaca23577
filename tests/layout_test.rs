//! Integration tests for reading order and caption association.

use article_parser::layout::{column_width, sort_by_columns};
use article_parser::{BBox, Block, BlockType, CaptionResolver, ColumnSorter, PageLayout};

fn block(kind: BlockType, x1: f32, y1: f32, x2: f32, y2: f32) -> Block {
    Block::new(kind, BBox::new(x1, y1, x2, y2), 0.9)
}

fn text(x1: f32, y1: f32, x2: f32, y2: f32, text: &str) -> Block {
    block(BlockType::Text, x1, y1, x2, y2).with_text(text)
}

/// Deterministic pseudo-random layout for property checks.
fn scattered_blocks(count: usize, seed: u64) -> Vec<Block> {
    let mut state = seed;
    let mut next = move |modulo: u64| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) % modulo) as f32
    };
    (0..count)
        .map(|i| {
            let x1 = next(500);
            let y1 = next(800);
            let width = 40.0 + next(200);
            text(x1, y1, x1 + width, y1 + 20.0, &format!("block {}", i))
        })
        .collect()
}

#[test]
fn test_single_column_sorts_by_y() {
    let blocks = vec![
        text(0.0, 300.0, 120.0, 320.0, "c"),
        text(0.0, 10.0, 80.0, 30.0, "a"),
        text(0.0, 150.0, 200.0, 170.0, "b"),
        text(0.0, 500.0, 60.0, 520.0, "d"),
    ];

    let sorted = ColumnSorter::new().sort(blocks);
    let order: Vec<_> = sorted.iter().filter_map(|b| b.text()).collect();
    assert_eq!(order, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_two_columns_read_left_then_right() {
    let blocks = vec![
        text(310.0, 40.0, 590.0, 80.0, "right top"),
        text(10.0, 400.0, 290.0, 440.0, "left bottom"),
        text(310.0, 420.0, 590.0, 460.0, "right bottom"),
        text(10.0, 40.0, 290.0, 80.0, "left top"),
    ];
    assert_eq!(column_width(&blocks), Some(280.0));

    let layout = PageLayout::sorted(blocks);
    let order: Vec<_> = layout.iter().filter_map(|b| b.text()).collect();
    assert_eq!(
        order,
        vec!["left top", "left bottom", "right top", "right bottom"]
    );
}

#[test]
fn test_sort_is_a_permutation() {
    let blocks = scattered_blocks(60, 7);
    let sorted = sort_by_columns(blocks.clone());

    assert_eq!(sorted.len(), blocks.len());
    let mut before: Vec<_> = blocks.iter().filter_map(|b| b.text()).collect();
    let mut after: Vec<_> = sorted.iter().filter_map(|b| b.text()).collect();
    before.sort_unstable();
    after.sort_unstable();
    assert_eq!(before, after);
}

#[test]
fn test_resorting_is_a_no_op() {
    for seed in [1, 2, 3, 42] {
        let once = sort_by_columns(scattered_blocks(40, seed));
        let twice = sort_by_columns(once.clone());
        assert_eq!(once, twice);
    }
}

#[test]
fn test_degenerate_widths_fall_back_to_y_order() {
    let blocks = vec![
        block(BlockType::Text, 50.0, 30.0, 50.0, 40.0).with_text("second"),
        block(BlockType::Text, 10.0, 10.0, 10.0, 20.0).with_text("first"),
    ];
    assert_eq!(column_width(&blocks), None);

    let sorted = sort_by_columns(blocks);
    let order: Vec<_> = sorted.iter().filter_map(|b| b.text()).collect();
    assert_eq!(order, vec!["first", "second"]);
}

#[test]
fn test_captions_on_sorted_page() {
    // Figure in the left column with its caption below; table in the right
    // column with its caption above.
    let layout = PageLayout::sorted(vec![
        block(BlockType::Table, 310.0, 120.0, 590.0, 300.0),
        text(10.0, 10.0, 290.0, 40.0, "Intro"),
        text(310.0, 80.0, 590.0, 110.0, "Table 2. Accuracy"),
        block(BlockType::Figure, 10.0, 60.0, 290.0, 260.0),
        text(10.0, 270.0, 290.0, 300.0, "Fig. 3 Architecture"),
    ]);

    let (figure, _) = layout.indices_of(BlockType::Figure).next().unwrap();
    let (table, _) = layout.indices_of(BlockType::Table).next().unwrap();

    assert_eq!(
        CaptionResolver::figures().resolve(figure, &layout).as_deref(),
        Some("Fig. 3 Architecture")
    );
    assert_eq!(
        CaptionResolver::tables().resolve(table, &layout).as_deref(),
        Some("Table 2. Accuracy")
    );
}

#[test]
fn test_fallback_picks_nearest_prefixed_block() {
    let layout = PageLayout::from_ordered(vec![
        text(0.0, 0.0, 100.0, 20.0, "Table 1: far"),
        text(0.0, 30.0, 100.0, 50.0, "body"),
        block(BlockType::Figure, 0.0, 60.0, 100.0, 160.0),
        text(0.0, 170.0, 100.0, 190.0, "body"),
        text(0.0, 300.0, 100.0, 320.0, "table 2: near"),
    ]);
    let resolver = CaptionResolver::figures().with_prefixes(["tab", "table"]);

    // Centres: target (50, 110), "far" (50, 10), "near" (50, 310).
    // Squared distances 10000 and 40000, so "far" is the nearer block.
    assert_eq!(resolver.resolve(2, &layout).as_deref(), Some("Table 1: far"));
}

#[test]
fn test_no_caption_anywhere() {
    let layout = PageLayout::from_ordered(vec![
        text(0.0, 0.0, 100.0, 20.0, "Abstract"),
        block(BlockType::Figure, 0.0, 30.0, 100.0, 130.0),
        block(BlockType::Figure, 0.0, 140.0, 100.0, 240.0),
    ]);
    assert_eq!(CaptionResolver::figures().resolve(1, &layout), None);
    assert_eq!(CaptionResolver::figures().resolve(2, &layout), None);
}
