//! PDF sources rendered through poppler's `pdfinfo` and `pdftoppm`.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::PageSource;
use crate::error::{Error, Result};
use crate::model::RasterImage;

/// PDF format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Points per inch in PDF user space.
const PDF_DPI: f32 = 72.0;

/// Detect PDF format from a file path.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let mut header = Vec::with_capacity(16);
    File::open(path)?.take(16).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect PDF format from the first bytes of a file.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(version_bytes) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfFormat { version })
}

fn is_valid_version(version: &[u8]) -> bool {
    matches!(version, [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit())
}

/// Renders pages of a PDF file to rasters with `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdfRasterizer {
    path: PathBuf,
    format: PdfFormat,
    pages: usize,
    pdftoppm: PathBuf,
}

impl PdfRasterizer {
    /// Open a PDF: validate its header and read its page count.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let format = detect_format_from_path(&path).map_err(|e| match e {
            Error::Io(io) => Error::SourceOpen(format!("{}: {}", path.display(), io)),
            other => other,
        })?;
        let pages = read_page_count(Path::new("pdfinfo"), &path)?;

        log::debug!("Opened {} ({}, {} pages)", path.display(), format, pages);

        Ok(Self {
            path,
            format,
            pages,
            pdftoppm: PathBuf::from("pdftoppm"),
        })
    }

    /// Use a specific `pdftoppm` binary.
    pub fn with_pdftoppm(mut self, binary: impl Into<PathBuf>) -> Self {
        self.pdftoppm = binary.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> &PdfFormat {
        &self.format
    }
}

impl PageSource for PdfRasterizer {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn rasterize(&self, page: usize, scale: f32) -> Result<RasterImage> {
        if page >= self.pages {
            return Err(Error::Rasterize(format!(
                "page {} out of range ({} pages)",
                page, self.pages
            )));
        }

        let dpi = (PDF_DPI * scale).round().max(1.0) as u32;
        // pdftoppm numbers pages from 1
        let page_number = (page + 1).to_string();

        let scratch = tempfile::tempdir()?;
        let prefix = scratch.path().join("page");

        let output = Command::new(&self.pdftoppm)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(&page_number)
            .arg("-l")
            .arg(&page_number)
            .arg("-singlefile")
            .arg(&self.path)
            .arg(&prefix)
            .output()
            .map_err(|e| {
                Error::Rasterize(format!(
                    "failed to invoke pdftoppm; is poppler-utils installed? ({})",
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Rasterize(format!(
                "pdftoppm failed on page {} with {}: {}",
                page,
                output.status,
                stderr.trim()
            )));
        }

        let rendered = prefix.with_extension("png");
        RasterImage::open(&rendered)
            .map_err(|e| Error::Rasterize(format!("cannot read rendered page {}: {}", page, e)))
    }
}

fn read_page_count(pdfinfo: &Path, pdf: &Path) -> Result<usize> {
    let output = Command::new(pdfinfo).arg(pdf).output().map_err(|e| {
        Error::SourceOpen(format!(
            "failed to invoke pdfinfo on {}: {}",
            pdf.display(),
            e
        ))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::SourceOpen(format!(
            "pdfinfo rejected {}: {}",
            pdf.display(),
            stderr.trim()
        )));
    }

    parse_page_count(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
        Error::SourceOpen(format!(
            "pdfinfo output did not contain a 'Pages:' line for {}",
            pdf.display()
        ))
    })
}

fn parse_page_count(info: &str) -> Option<usize> {
    info.lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|rest| rest.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        let format = detect_format_from_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(format.version, "1.7");
        assert_eq!(format.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            detect_format_from_bytes(b"%PDF"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_bad_version() {
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-x.y\n"),
            Err(Error::UnsupportedVersion(v)) if v == "x.y"
        ));
    }

    #[test]
    fn test_open_rejects_non_pdf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"PK\x03\x04 not a pdf at all").unwrap();
        assert!(matches!(
            PdfRasterizer::open(file.path()),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            PdfRasterizer::open("/nonexistent/paper.pdf"),
            Err(Error::SourceOpen(_))
        ));
    }

    #[test]
    fn test_parse_page_count() {
        let info = "Title:          Paper\nProducer:       LaTeX\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(info), Some(12));
        assert_eq!(parse_page_count("Title: x\n"), None);
    }
}
