//! Raster page images and padded region crops.

use std::fmt;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};

use super::BBox;
use crate::error::Result;

/// Padding, in pixels, added around a region before cropping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Padding {
    /// Same padding on every side.
    pub const fn uniform(px: u32) -> Self {
        Self {
            left: px,
            top: px,
            right: px,
            bottom: px,
        }
    }

    /// Horizontal padding on left/right, vertical on top/bottom.
    pub const fn symmetric(horizontal: u32, vertical: u32) -> Self {
        Self {
            left: horizontal,
            top: vertical,
            right: horizontal,
            bottom: vertical,
        }
    }
}

/// An owned page raster (or a crop of one).
#[derive(Clone, PartialEq)]
pub struct RasterImage {
    pixels: DynamicImage,
}

impl RasterImage {
    /// Wrap an already decoded image.
    pub fn new(pixels: DynamicImage) -> Self {
        Self { pixels }
    }

    /// A white RGB canvas.
    pub fn blank(width: u32, height: u32) -> Self {
        let canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        Self::new(DynamicImage::ImageRgb8(canvas))
    }

    /// Decode an image file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(image::open(path)?))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `true` when the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Borrow the decoded pixels.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Give back the decoded pixels.
    pub fn into_dynamic(self) -> DynamicImage {
        self.pixels
    }

    /// Rescale by `factor` (1.0 returns a copy).
    pub fn scaled(&self, factor: f32) -> Self {
        if (factor - 1.0).abs() < f32::EPSILON {
            return self.clone();
        }
        let width = ((self.width() as f32) * factor).round().max(1.0) as u32;
        let height = ((self.height() as f32) * factor).round().max(1.0) as u32;
        Self::new(
            self.pixels
                .resize_exact(width, height, image::imageops::FilterType::Triangle),
        )
    }

    /// Crop `bbox` grown by `padding`, clamped to the image bounds.
    ///
    /// A region lying entirely outside the image yields an empty raster.
    pub fn crop_padded(&self, bbox: &BBox, padding: Padding) -> RasterImage {
        let (x1, y1, x2, y2) = self.clamped_rect(bbox, padding);
        Self::new(self.pixels.crop_imm(x1, y1, x2 - x1, y2 - y1))
    }

    fn clamped_rect(&self, bbox: &BBox, padding: Padding) -> (u32, u32, u32, u32) {
        let width = self.width() as f32;
        let height = self.height() as f32;

        let clamp = |v: f32, max: f32| -> u32 {
            if v.is_nan() {
                0
            } else {
                v.clamp(0.0, max) as u32
            }
        };

        let x1 = clamp((bbox.x1 - padding.left as f32).floor(), width);
        let y1 = clamp((bbox.y1 - padding.top as f32).floor(), height);
        let x2 = clamp((bbox.x2 + padding.right as f32).ceil(), width);
        let y2 = clamp((bbox.y2 + padding.bottom as f32).ceil(), height);

        (x1, y1, x2.max(x1), y2.max(y1))
    }

    /// Write the raster as PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.pixels.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(pixels: DynamicImage) -> Self {
        Self::new(pixels)
    }
}
