//! OCR through the `tesseract` command-line tool.

use std::path::PathBuf;
use std::process::Command;

use super::OcrEngine;
use crate::error::{Error, Result};
use crate::model::RasterImage;

/// Calls `tesseract <png> stdout --oem 3 --psm 6 -l <lang>` per region.
///
/// `--psm 6` treats each crop as one uniform block of text, which suits the
/// padded single-block crops the assembler produces.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: PathBuf,
    lang: String,
    oem: u8,
    psm: u8,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            lang: "eng".to_string(),
            oem: 3,
            psm: 6,
        }
    }
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Tesseract language spec, e.g. `eng` or `eng+deu`.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    fn args(&self) -> Vec<String> {
        vec![
            "stdout".to_string(),
            "--oem".to_string(),
            self.oem.to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
            "-l".to_string(),
            self.lang.clone(),
        ]
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &RasterImage) -> Result<String> {
        let scratch = tempfile::Builder::new()
            .prefix("article-parser-ocr-")
            .suffix(".png")
            .tempfile()?;
        image.save_png(scratch.path())?;

        let output = Command::new(&self.binary)
            .arg(scratch.path())
            .args(self.args())
            .output()
            .map_err(|e| {
                Error::Ocr(format!(
                    "failed to invoke {}; is tesseract installed? ({})",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
