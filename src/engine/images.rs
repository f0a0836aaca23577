//! Page sources backed by already-rendered images.

use std::path::Path;

use super::PageSource;
use crate::error::{Error, Result};
use crate::model::RasterImage;

/// A source whose pages are rasters held in memory.
///
/// `rasterize` rescales the stored page by `scale`, so a scale of 1.0
/// returns the images exactly as given.
#[derive(Debug, Clone, Default)]
pub struct ImagePages {
    pages: Vec<RasterImage>,
}

impl ImagePages {
    pub fn new(pages: Vec<RasterImage>) -> Self {
        Self { pages }
    }

    /// Decode one image file per page, in the order given.
    pub fn open<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let pages = paths
            .into_iter()
            .map(|path| {
                let path = path.as_ref();
                RasterImage::open(path)
                    .map_err(|e| Error::SourceOpen(format!("{}: {}", path.display(), e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(pages))
    }

    pub fn push(&mut self, page: RasterImage) {
        self.pages.push(page);
    }
}

impl PageSource for ImagePages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn rasterize(&self, page: usize, scale: f32) -> Result<RasterImage> {
        let image = self.pages.get(page).ok_or_else(|| {
            Error::Rasterize(format!(
                "page {} out of range ({} pages)",
                page,
                self.pages.len()
            ))
        })?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::Rasterize(format!("invalid scale {}", scale)));
        }
        Ok(image.scaled(scale))
    }
}

impl FromIterator<RasterImage> for ImagePages {
    fn from_iter<T: IntoIterator<Item = RasterImage>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
