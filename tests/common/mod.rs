//! Shared test engines.
//!
//! Pages are painted rasters: every text region is filled with a grey shade
//! and [`ShadeOcr`] "reads" a crop by looking up the shade at its centre.

#![allow(dead_code)]

use std::collections::HashMap;

use image::{DynamicImage, Rgb, RgbImage};

use article_parser::{
    BBox, BlockType, Error, LayoutDetector, OcrEngine, PageInput, RasterImage, RawBlock, Result,
    Table, TableExtractor,
};

const BACKGROUND: u8 = 255;

/// A white page with painted regions.
pub struct Canvas {
    pixels: RgbImage,
    blocks: Vec<RawBlock>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbImage::from_pixel(width, height, Rgb([BACKGROUND; 3])),
            blocks: Vec::new(),
        }
    }

    /// Add a block and fill its area with `shade`.
    pub fn paint(mut self, kind: BlockType, rect: (f32, f32, f32, f32), shade: u8) -> Self {
        let (x1, y1, x2, y2) = rect;
        let (width, height) = self.pixels.dimensions();
        for y in (y1 as u32)..(y2 as u32).min(height) {
            for x in (x1 as u32)..(x2 as u32).min(width) {
                self.pixels.put_pixel(x, y, Rgb([shade; 3]));
            }
        }
        self.blocks
            .push(RawBlock::new(kind, BBox::new(x1, y1, x2, y2), 0.9));
        self
    }

    pub fn blocks(&self) -> &[RawBlock] {
        &self.blocks
    }

    pub fn image(&self) -> RasterImage {
        RasterImage::new(DynamicImage::ImageRgb8(self.pixels.clone()))
    }

    pub fn into_input(self) -> PageInput {
        let image = self.image();
        PageInput::new(image, self.blocks)
    }
}

/// Reads the shade at the centre of a crop and returns the text registered
/// for it. Unknown shades are an OCR failure.
pub struct ShadeOcr {
    texts: HashMap<u8, String>,
}

impl ShadeOcr {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = (u8, S)>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

pub fn centre_shade(image: &RasterImage) -> u8 {
    let rgb = image.as_dynamic().to_rgb8();
    rgb.get_pixel(rgb.width() / 2, rgb.height() / 2)[0]
}

impl OcrEngine for ShadeOcr {
    fn recognize(&self, image: &RasterImage) -> Result<String> {
        let shade = centre_shade(image);
        self.texts
            .get(&shade)
            .cloned()
            .ok_or_else(|| Error::Ocr(format!("unreadable region (shade {})", shade)))
    }
}

/// Returns a one-cell table holding the crop's centre shade.
pub struct ShadeTables;

impl TableExtractor for ShadeTables {
    fn extract(&self, image: &RasterImage) -> Result<Option<Table>> {
        let shade = centre_shade(image);
        Ok(Some(Table::from_rows([vec![shade.to_string()]])))
    }
}

/// Looks detections up by page size, so each page of a source can carry its
/// own layout.
pub struct SizeDetector {
    layouts: HashMap<(u32, u32), Vec<RawBlock>>,
}

impl SizeDetector {
    pub fn new<'a>(canvases: impl IntoIterator<Item = &'a Canvas>) -> Self {
        let layouts = canvases
            .into_iter()
            .map(|c| (c.pixels.dimensions(), c.blocks.clone()))
            .collect();
        Self { layouts }
    }
}

impl LayoutDetector for SizeDetector {
    fn detect(&self, image: &RasterImage) -> Result<Vec<RawBlock>> {
        self.layouts
            .get(&(image.width(), image.height()))
            .cloned()
            .ok_or_else(|| Error::Detect(format!("no layout for {}x{}", image.width(), image.height())))
    }
}

/// A two-column article page.
///
/// Reading order: title (10), left column text (20), figure, its caption
/// (30), right column text (40), table caption (50), table (60).
pub fn article_page() -> Canvas {
    Canvas::new(400, 500)
        .paint(BlockType::Text, (210.0, 100.0, 390.0, 200.0), 40)
        .paint(BlockType::Table, (210.0, 260.0, 390.0, 400.0), 60)
        .paint(BlockType::Title, (10.0, 10.0, 190.0, 40.0), 10)
        .paint(BlockType::Figure, (10.0, 120.0, 190.0, 300.0), 0)
        .paint(BlockType::Text, (10.0, 50.0, 190.0, 110.0), 20)
        .paint(BlockType::Text, (10.0, 310.0, 190.0, 340.0), 30)
        .paint(BlockType::Text, (210.0, 220.0, 390.0, 250.0), 50)
}

pub fn article_ocr() -> ShadeOcr {
    ShadeOcr::new([
        (10, "A Study of Things"),
        (20, "We intro-\nduce things."),
        (30, "Figure 1: Things\nover time"),
        (40, "Results are\ngood."),
        (50, "Table 1: Scores"),
    ])
}
